//! # securetoken-verify
//!
//! Verification of bearer ID tokens minted by Google's secure-token service
//! (the Firebase identity provider), built for stateless, resource-constrained
//! edge environments.
//!
//! The crate validates structure, signature, and claims of an RS256 ID token
//! against the provider's time-rotating public key set, with a swappable
//! cache for that key set and an optional revocation check against the
//! account's `validSince` timestamp.
//!
//! ## Architecture
//!
//! - [`validate`] - pure, ordered claim checks on the decoded token body
//! - [`keys`] - key-set fetching and cache-aside signing-key resolution
//! - [`cache`] - the injectable [`KeyCache`] capability and an in-process
//!   implementation
//! - [`signature`] - X.509 certificate handling and RS256 signature
//!   verification
//! - [`revocation`] - on-demand `validSince` lookup for a subject
//! - [`verifier`] - the [`TokenVerifier`] orchestrator tying it together
//!
//! Control flow per verification: claim validation (fail fast, no I/O), key
//! resolution (cache hit or fetch-and-populate), cryptographic verification,
//! then optionally the revocation lookup. Every step short-circuits on
//! failure and nothing outlives the call except externally-owned cache
//! entries.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use securetoken_verify::{MemoryKeyCache, TokenVerifier};
//!
//! # tokio_test::block_on(async {
//! let verifier = TokenVerifier::new("my-project").with_cache(Arc::new(MemoryKeyCache::new()));
//!
//! let claims = verifier
//!     .verify_id_token("eyJhbGciOiJSUzI1NiIs...", "management-credential", true)
//!     .await?;
//!
//! assert!(!claims.sub.is_empty());
//! # Ok::<(), securetoken_verify::Error>(())
//! # });
//! ```
//!
//! ## Error handling
//!
//! All failures surface through the single [`Error`] enum. Claim and header
//! failures carry stable, specific messages; signature failures are the
//! deliberately generic `Token is invalid`; transport failures propagate
//! unmodified so callers can apply their own retry and deadline policy.

pub mod cache;
pub mod claims;
pub mod error;
pub mod keys;
pub mod revocation;
pub mod signature;
pub mod validate;
pub mod verifier;

pub use cache::{CacheError, KeyCache, MemoryKeyCache, cache_key};
pub use claims::IdTokenClaims;
pub use error::{Error, Result};
pub use keys::{DEFAULT_KEY_SOURCE_URL, KeyResolver, KeySet, KeySourceClient};
pub use revocation::{DEFAULT_ACCOUNT_LOOKUP_URL, RevocationChecker};
pub use signature::verify_signature;
pub use validate::validate_claims;
pub use verifier::TokenVerifier;
