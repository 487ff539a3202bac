//! Error types for token verification
//!
//! Failures fall into the categories of the verification pipeline: malformed
//! input, claim validation, header validation, signature, revocation, and
//! transport. Claim and header failures carry specific messages because
//! callers match on them; signature failures are deliberately generic so a
//! forged token cannot probe why it was rejected.

/// Convenience result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// All failure modes of ID token verification.
///
/// The `Display` wording of the claim- and header-validation variants is part
/// of the public contract: callers match on these messages by substring, so
/// they must not change.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Token is not a three-part compact JWT serialization.
    #[error("Invalid JWT format")]
    MalformedToken,

    /// Payload segment is not valid base64url.
    #[error("Invalid JWT payload encoding: {0}")]
    PayloadEncoding(#[from] base64::DecodeError),

    /// Payload segment is not valid JSON.
    #[error("Invalid JWT claims: {0}")]
    PayloadJson(#[from] serde_json::Error),

    /// Header segment is not valid base64url.
    #[error("Invalid JWT header encoding: {0}")]
    HeaderEncoding(base64::DecodeError),

    /// Header segment is not valid JSON.
    #[error("Invalid JWT header: {0}")]
    HeaderJson(serde_json::Error),

    /// The `aud` claim does not match the expected project ID.
    #[error("Token audience does not match project ID, expected {expected}, got {actual}")]
    AudienceMismatch { expected: String, actual: String },

    /// The `sub` claim is missing or not a string.
    #[error("Token subject is not a string")]
    SubjectNotString,

    /// The `sub` claim is an empty string.
    #[error("Token subject is empty")]
    SubjectEmpty,

    /// The `iss` claim does not match the expected secure-token issuer.
    #[error("Token issuer does not match, expected {expected}, got {actual}")]
    IssuerMismatch { expected: String, actual: String },

    /// The `exp` claim is in the past.
    #[error("Token expiration date is in the past")]
    Expired,

    /// The `iat` claim is in the future.
    #[error("Token issued at date is in the future")]
    IssuedInFuture,

    /// The `auth_time` claim is present but not numeric.
    #[error("Token auth time is not a number")]
    AuthTimeNotNumber,

    /// The `auth_time` claim is in the future.
    #[error("Token auth time is in the future")]
    AuthTimeInFuture,

    /// Header `alg` is anything other than RS256. Symmetric algorithms are
    /// rejected here to rule out algorithm-confusion attacks.
    #[error("Token algorithm is not RS256")]
    AlgorithmNotRs256,

    /// Header `typ` is present but not `JWT`.
    #[error("Token type is not JWT")]
    TypeNotJwt,

    /// Header has no usable `kid`.
    #[error("Token key ID is missing")]
    MissingKeyId,

    /// The header `kid` is not present in the fetched signing key set. Covers
    /// both forged key IDs and key-rotation races.
    #[error("Token key ID is not in the Google API")]
    UnknownKeyId,

    /// Cryptographic verification failed. Intentionally non-specific.
    #[error("Token is invalid")]
    InvalidSignature,

    /// The signing certificate could not be parsed.
    #[error("Failed to parse signing certificate: {0}")]
    Certificate(String),

    /// The token was issued before the account's `validSince` timestamp.
    #[error("Token is revoked")]
    Revoked,

    /// Account lookup returned no record for the subject.
    #[error("No account record found for subject {0}")]
    AccountNotFound(String),

    /// Account record exists but carries no `validSince` field. This is never
    /// treated as "not revoked".
    #[error("Account record for subject {0} has no validSince field")]
    MissingValidSince(String),

    /// Account record carries a `validSince` that is not a Unix timestamp.
    #[error("Account record for subject {subject} has a malformed validSince value: {value}")]
    InvalidValidSince { subject: String, value: String },

    /// Network failure talking to the key source or account lookup endpoint.
    /// Propagated unmodified; retry policy is a caller concern.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}
