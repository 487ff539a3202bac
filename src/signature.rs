//! Cryptographic verification
//!
//! Converts a PEM X.509 certificate into an RSA verification key and checks
//! the token signature under RS256. Issuer and audience are re-asserted here
//! even though the claim validator already checked them: the two layers fail
//! independently, so a bug in one cannot silently admit a foreign token.
//!
//! This is the only point at which claims become trustworthy.

use jsonwebtoken::{Algorithm, DecodingKey, TokenData, Validation, decode};
use tracing::debug;
use x509_parser::pem::parse_x509_pem;

use crate::claims::{IdTokenClaims, expected_issuer};
use crate::error::{Error, Result};

/// Verify the token signature against a PEM signing certificate and return
/// the now-trusted claims.
///
/// # Errors
///
/// An unparsable certificate is [`Error::Certificate`]. Every signature or
/// claim re-check failure maps to the generic [`Error::InvalidSignature`] so
/// the reason a forged token failed is not leaked.
pub fn verify_signature(
    token: &str,
    certificate: &str,
    project_id: &str,
) -> Result<IdTokenClaims> {
    let decoding_key = decoding_key_from_certificate(certificate)?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[project_id]);
    validation.set_issuer(&[expected_issuer(project_id)]);
    validation.leeway = 0;

    let data: TokenData<IdTokenClaims> =
        decode(token, &decoding_key, &validation).map_err(|error| {
            debug!(error = %error, "signature verification failed");
            Error::InvalidSignature
        })?;

    debug!(subject = %data.claims.sub, "token signature verified");
    Ok(data.claims)
}

/// Parse a PEM X.509 certificate and extract its RSA public key.
fn decoding_key_from_certificate(certificate: &str) -> Result<DecodingKey> {
    let (_, pem) = parse_x509_pem(certificate.as_bytes())
        .map_err(|error| Error::Certificate(error.to_string()))?;
    let cert = pem
        .parse_x509()
        .map_err(|error| Error::Certificate(error.to_string()))?;

    // For rsaEncryption keys the subjectPublicKey bit string holds the
    // PKCS#1 RSAPublicKey structure.
    let public_key = cert.public_key();
    Ok(DecodingKey::from_rsa_der(
        public_key.subject_public_key.data.as_ref(),
    ))
}
