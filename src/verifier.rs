//! Verification orchestrator
//!
//! Composes the claim validator, key resolution, signature check, and the
//! optional revocation lookup into the public verify operation. The steps run
//! sequentially and short-circuit on first failure: each step gates the next,
//! so there is nothing to parallelize. No state outlives a single call except
//! the injected key cache.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::KeyCache;
use crate::claims::IdTokenClaims;
use crate::error::{Error, Result};
use crate::keys::{KeyResolver, KeySourceClient};
use crate::revocation::RevocationChecker;
use crate::signature::verify_signature;
use crate::validate::validate_claims;

/// Verifies secure-token ID tokens for one project.
///
/// # Example
///
/// ```rust,no_run
/// # use securetoken_verify::TokenVerifier;
/// # tokio_test::block_on(async {
/// let verifier = TokenVerifier::new("proj-1");
///
/// let claims = verifier
///     .verify_id_token("eyJhbGciOiJSUzI1NiIs...", "management-credential", false)
///     .await?;
///
/// println!("token belongs to {}", claims.sub);
/// # Ok::<(), securetoken_verify::Error>(())
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    project_id: String,
    resolver: KeyResolver,
    revocation: RevocationChecker,
}

impl TokenVerifier {
    /// Verifier for a project, talking to the production endpoints, with no
    /// key cache.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            resolver: KeyResolver::new(KeySourceClient::new()),
            revocation: RevocationChecker::new(),
        }
    }

    /// Attach a signing-key cache. Without one, every verification fetches
    /// the key set from the source.
    pub fn with_cache(mut self, cache: Arc<dyn KeyCache>) -> Self {
        self.resolver = self.resolver.with_cache(cache);
        self
    }

    /// Override the key-source endpoint. Intended for tests and proxies.
    pub fn with_key_source_url(mut self, url: impl Into<String>) -> Self {
        self.resolver = self.resolver.with_source(KeySourceClient::with_url(url));
        self
    }

    /// Override the account-lookup endpoint. Intended for tests and proxies.
    pub fn with_account_lookup_url(mut self, url: impl Into<String>) -> Self {
        self.revocation = RevocationChecker::with_url(url);
        self
    }

    /// The project ID tokens are verified against.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Verify an ID token and return its claims.
    ///
    /// Pipeline: claim validation (fail fast, before any I/O), signing-key
    /// resolution (cache-aside), cryptographic verification, and, when
    /// `check_revoked` is set, the revocation lookup. The lookup uses the
    /// subject from the already-verified claims; an unverified `sub` is never
    /// trusted for it. A token is revoked when `validSince` is strictly
    /// greater than its `iat` — equal timestamps pass, since the two clocks
    /// are independently sourced.
    ///
    /// `credential` is the management bearer token forwarded verbatim on the
    /// account-lookup call; it is unused unless `check_revoked` is set.
    ///
    /// # Errors
    ///
    /// The first failing step's error, per the crate's [`Error`] taxonomy.
    /// Verification is all-or-nothing; there is no partial success.
    pub async fn verify_id_token(
        &self,
        token: &str,
        credential: &str,
        check_revoked: bool,
    ) -> Result<IdTokenClaims> {
        validate_claims(token, &self.project_id)?;

        let certificate = self.resolver.resolve_signing_key(token).await?;
        let claims = verify_signature(token, &certificate, &self.project_id)?;

        if check_revoked {
            let valid_since = self.revocation.valid_since(&claims.sub, credential).await?;
            if valid_since > claims.iat {
                warn!(
                    subject = %claims.sub,
                    valid_since,
                    iat = claims.iat,
                    "token issued before account validSince"
                );
                return Err(Error::Revoked);
            }
        }

        debug!(subject = %claims.sub, project_id = %self.project_id, "id token verified");
        Ok(claims)
    }
}
