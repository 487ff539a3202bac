//! Claim validation
//!
//! Pure, synchronous checks on the decoded (but unverified) token body.
//! Audience and issuer are checked first so foreign tokens are rejected as
//! cheap identity mismatches; time-based checks come last. The first failing
//! check wins and no later check runs.

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use crate::claims::{decode_payload, expected_issuer};
use crate::error::{Error, Result};

/// Validate the body of an encoded token against the expected project ID.
///
/// Performs no signature verification and no I/O. Returns the specific claim
/// error on the first failing check, in this order: audience, subject shape,
/// subject emptiness, issuer, expiration, issued-at, auth-time shape,
/// auth-time value.
///
/// # Errors
///
/// A decode failure (malformed base64 or JSON) surfaces as a hard error;
/// every claim mismatch maps to its dedicated [`Error`] variant.
pub fn validate_claims(token: &str, project_id: &str) -> Result<()> {
    let payload = decode_payload(token)?;

    // Ceil of the current time in seconds, so a token does not read as
    // expired during the truncated sub-second window.
    let now = ceil_seconds(Utc::now().timestamp_millis());

    if payload.get("aud").and_then(Value::as_str) != Some(project_id) {
        return Err(Error::AudienceMismatch {
            expected: project_id.to_owned(),
            actual: claim_repr(payload.get("aud")),
        });
    }

    match payload.get("sub") {
        Some(Value::String(sub)) if sub.is_empty() => return Err(Error::SubjectEmpty),
        Some(Value::String(_)) => {}
        _ => return Err(Error::SubjectNotString),
    }

    let issuer = expected_issuer(project_id);
    if payload.get("iss").and_then(Value::as_str) != Some(issuer.as_str()) {
        return Err(Error::IssuerMismatch {
            expected: issuer,
            actual: claim_repr(payload.get("iss")),
        });
    }

    if let Some(exp) = payload.get("exp").and_then(Value::as_i64)
        && exp < now
    {
        return Err(Error::Expired);
    }

    if let Some(iat) = payload.get("iat").and_then(Value::as_i64)
        && iat > now
    {
        return Err(Error::IssuedInFuture);
    }

    if let Some(auth_time) = payload.get("auth_time") {
        let Some(auth_time) = auth_time.as_f64() else {
            return Err(Error::AuthTimeNotNumber);
        };
        if auth_time > now as f64 {
            return Err(Error::AuthTimeInFuture);
        }
    }

    debug!(project_id = %project_id, "token body validated");
    Ok(())
}

/// Round a millisecond timestamp up to whole seconds.
fn ceil_seconds(millis: i64) -> i64 {
    millis / 1000 + i64::from(millis % 1000 != 0)
}

/// Render a claim value for an error message.
fn claim_repr(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "<missing>".to_owned(),
    }
}
