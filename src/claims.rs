//! ID token claims
//!
//! Two views of the same payload exist during verification. The raw,
//! untrusted view (`decode_payload`) is a plain JSON value decoded without
//! signature verification, used only by the claim validator. The typed
//! [`IdTokenClaims`] is produced by the cryptographic layer and is the only
//! representation treated as trustworthy.

use std::collections::HashMap;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Verified claims of a secure-token ID token.
///
/// Provider-specific claims (email, `firebase` metadata, custom claims) are
/// preserved in `additional` but never validated by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Issuer, `https://securetoken.google.com/{project_id}`.
    pub iss: String,

    /// Audience, the project ID the token was minted for.
    pub aud: String,

    /// Subject, the user ID. Non-empty.
    pub sub: String,

    /// Issued-at, Unix seconds.
    pub iat: u64,

    /// Expiration, Unix seconds.
    pub exp: u64,

    /// Time of the authentication event, Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_time: Option<u64>,

    /// Passthrough claims not validated by the core.
    #[serde(flatten)]
    pub additional: HashMap<String, serde_json::Value>,
}

/// Expected issuer for a project.
pub(crate) fn expected_issuer(project_id: &str) -> String {
    format!("https://securetoken.google.com/{project_id}")
}

/// Decode the payload segment of a compact JWT without verifying anything.
///
/// The returned value is untrusted: it exists so the claim validator can
/// reject foreign or expired tokens before any network I/O. Malformed base64
/// or JSON is a hard error; the underlying decode error is propagated.
pub(crate) fn decode_payload(token: &str) -> Result<serde_json::Value> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(Error::MalformedToken);
    }

    let payload = URL_SAFE_NO_PAD.decode(parts[1])?;
    Ok(serde_json::from_slice(&payload)?)
}

/// Decode the header segment of a compact JWT without verifying anything.
///
/// Returns the raw JSON so header validation can reject any foreign `alg`
/// value (including ones no decoder recognizes, like `none`) with its
/// specific error instead of a deserialization failure.
pub(crate) fn decode_header_segment(token: &str) -> Result<serde_json::Value> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(Error::MalformedToken);
    }

    let header = URL_SAFE_NO_PAD
        .decode(parts[0])
        .map_err(Error::HeaderEncoding)?;
    serde_json::from_slice(&header).map_err(Error::HeaderJson)
}
