//! Revocation lookup
//!
//! Revocation is modeled as a single `validSince` timestamp per subject:
//! every token issued before it is invalid, without a token blocklist. The
//! timestamp is fetched on demand and never cached, since it must reflect the
//! latest revocation.
//!
//! The management credential authenticates the outbound lookup call. It is
//! supplied by the caller per call, forwarded verbatim as a bearer header,
//! and never stored or logged here.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Endpoint for the provider's account-lookup operation.
pub const DEFAULT_ACCOUNT_LOOKUP_URL: &str =
    "https://identitytoolkit.googleapis.com/v1/accounts:lookup";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountLookupRequest {
    local_id: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AccountLookupResponse {
    #[serde(default)]
    users: Vec<AccountRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountRecord {
    #[serde(default)]
    valid_since: Option<String>,
}

/// Client for the account-lookup endpoint.
#[derive(Debug, Clone)]
pub struct RevocationChecker {
    url: String,
    http: reqwest::Client,
}

impl Default for RevocationChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl RevocationChecker {
    /// Checker against the production account-lookup endpoint.
    pub fn new() -> Self {
        Self::with_url(DEFAULT_ACCOUNT_LOOKUP_URL)
    }

    /// Checker against a custom endpoint, for tests or proxies.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Fetch the `validSince` timestamp (Unix seconds) for a subject.
    ///
    /// # Errors
    ///
    /// Network failures propagate unmodified. A missing account record, a
    /// record without `validSince`, or an unparsable `validSince` are each
    /// distinct errors; absence is never silently treated as "never revoked".
    pub async fn valid_since(&self, subject: &str, credential: &str) -> Result<u64> {
        debug!(subject = %subject, "looking up account validSince");

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(credential)
            .json(&AccountLookupRequest {
                local_id: vec![subject.to_owned()],
            })
            .send()
            .await?
            .error_for_status()?;

        let body: AccountLookupResponse = response.json().await?;
        let record = body
            .users
            .into_iter()
            .next()
            .ok_or_else(|| Error::AccountNotFound(subject.to_owned()))?;
        let raw = record
            .valid_since
            .ok_or_else(|| Error::MissingValidSince(subject.to_owned()))?;

        raw.parse::<u64>().map_err(|_| Error::InvalidValidSince {
            subject: subject.to_owned(),
            value: raw,
        })
    }
}
