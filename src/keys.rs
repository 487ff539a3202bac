//! Signing-key source and cache-aside resolution
//!
//! The provider publishes its current signing keys as a JSON object mapping
//! key ID to an X.509 certificate in PEM form, with the advertised cache
//! lifetime carried in the `Cache-Control: max-age` response header. The key
//! set is never mutated, only replaced wholesale on refetch.
//!
//! [`KeyResolver`] implements the cache-aside strategy: check the injected
//! cache first, fetch on miss, then populate the cache with the
//! provider-controlled TTL. Cache writes are best-effort relative to the
//! verification outcome.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, HeaderMap};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{KeyCache, cache_key};
use crate::claims::decode_header_segment;
use crate::error::{Error, Result};

/// Endpoint serving the provider's current secure-token signing certificates.
pub const DEFAULT_KEY_SOURCE_URL: &str =
    "https://www.googleapis.com/robot/v1/metadata/x509/securetoken@system.gserviceaccount.com";

/// A fetched signing key set: key ID to PEM certificate, plus the cache
/// lifetime the provider advertised for it.
#[derive(Debug, Clone)]
pub struct KeySet {
    keys: HashMap<String, String>,
    cache_duration: Duration,
}

impl KeySet {
    /// Look up the certificate for a key ID.
    pub fn find(&self, kid: &str) -> Option<&str> {
        self.keys.get(kid).map(String::as_str)
    }

    /// How long the provider allows this set to be cached. Zero disables
    /// cache writes.
    pub fn cache_duration(&self) -> Duration {
        self.cache_duration
    }
}

/// HTTP client for the provider's public-key endpoint.
#[derive(Debug, Clone)]
pub struct KeySourceClient {
    url: String,
    http: reqwest::Client,
}

impl Default for KeySourceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySourceClient {
    /// Client against the production key-source endpoint.
    pub fn new() -> Self {
        Self::with_url(DEFAULT_KEY_SOURCE_URL)
    }

    /// Client against a custom endpoint, for tests or proxies.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Fetch the current key set.
    ///
    /// # Errors
    ///
    /// Network and non-success HTTP status failures propagate unmodified as
    /// [`Error::Transport`]; this layer neither retries nor wraps them.
    pub async fn fetch(&self) -> Result<KeySet> {
        debug!(url = %self.url, "fetching signing key set");

        let response = self.http.get(&self.url).send().await?.error_for_status()?;
        let cache_duration = cache_duration_from(response.headers());
        let keys: HashMap<String, String> = response.json().await?;

        debug!(
            key_count = keys.len(),
            max_age = cache_duration.as_secs(),
            "fetched signing key set"
        );

        Ok(KeySet {
            keys,
            cache_duration,
        })
    }
}

/// Extract the advertised cache lifetime from response headers. Absent or
/// unparsable `max-age` degrades to zero, which disables cache writes.
fn cache_duration_from(headers: &HeaderMap) -> Duration {
    let Some(value) = headers.get(CACHE_CONTROL).and_then(|v| v.to_str().ok()) else {
        warn!("key source response has no Cache-Control header, key will not be cached");
        return Duration::ZERO;
    };

    match parse_max_age(value) {
        Some(duration) => duration,
        None => {
            warn!(cache_control = %value, "no usable max-age directive, key will not be cached");
            Duration::ZERO
        }
    }
}

fn parse_max_age(cache_control: &str) -> Option<Duration> {
    let lowered = cache_control.to_ascii_lowercase();
    lowered
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|age| age.parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Resolves the signing certificate for a token, cache-aside.
#[derive(Clone)]
pub struct KeyResolver {
    source: KeySourceClient,
    cache: Option<Arc<dyn KeyCache>>,
}

impl std::fmt::Debug for KeyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyResolver")
            .field("source", &self.source)
            .field("cache", &self.cache.as_ref().map(|_| "<injected>"))
            .finish()
    }
}

impl KeyResolver {
    /// Resolver without a cache: every resolution fetches from the source.
    pub fn new(source: KeySourceClient) -> Self {
        Self {
            source,
            cache: None,
        }
    }

    /// Attach a key cache.
    pub fn with_cache(mut self, cache: Arc<dyn KeyCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Swap the key source, keeping any attached cache.
    pub fn with_source(mut self, source: KeySourceClient) -> Self {
        self.source = source;
        self
    }

    /// Validate the token header and resolve its signing certificate.
    ///
    /// Header checks run first: the algorithm must be RS256 (anything else,
    /// notably symmetric algorithms, is rejected outright), `typ` must be
    /// `JWT` when present, and a non-empty `kid` is required. On a cache hit
    /// no network call is made. On a miss the full key set is fetched and,
    /// when the provider advertised a positive lifetime, the resolved
    /// certificate is stored before returning.
    ///
    /// # Errors
    ///
    /// Header validation failures and an unknown `kid` map to their dedicated
    /// [`Error`] variants; fetch failures propagate unmodified. A failing
    /// cache read degrades to a miss and a failing cache write is logged and
    /// ignored.
    pub async fn resolve_signing_key(&self, token: &str) -> Result<String> {
        // The header is inspected as raw JSON rather than through a typed
        // decoder, so unrecognized algorithms (`none` included) get the
        // algorithm error instead of a deserialization failure.
        let header = decode_header_segment(token)?;

        if header.get("alg").and_then(Value::as_str) != Some("RS256") {
            return Err(Error::AlgorithmNotRs256);
        }
        if let Some(typ) = header.get("typ").and_then(Value::as_str)
            && !typ.eq_ignore_ascii_case("JWT")
        {
            return Err(Error::TypeNotJwt);
        }
        let kid = header
            .get("kid")
            .and_then(Value::as_str)
            .filter(|kid| !kid.is_empty())
            .map(str::to_owned)
            .ok_or(Error::MissingKeyId)?;

        let key = cache_key(&kid);
        if let Some(cache) = &self.cache {
            match cache.get(&key).await {
                Ok(Some(certificate)) => {
                    debug!(kid = %kid, "signing key cache hit");
                    return Ok(certificate);
                }
                Ok(None) => debug!(kid = %kid, "signing key cache miss"),
                Err(error) => {
                    warn!(kid = %kid, error = %error, "key cache read failed, fetching from source");
                }
            }
        }

        let key_set = self.source.fetch().await?;
        let certificate = key_set.find(&kid).ok_or(Error::UnknownKeyId)?.to_owned();

        if let Some(cache) = &self.cache
            && !key_set.cache_duration().is_zero()
        {
            if let Err(error) = cache
                .put(&key, &certificate, key_set.cache_duration())
                .await
            {
                warn!(kid = %kid, error = %error, "key cache write failed");
            }
        }

        Ok(certificate)
    }
}
