//! Common test utilities for integration tests
//!
//! Provides a mock identity provider (key-source and account-lookup
//! endpoints) plus helpers to mint real RS256 tokens from the fixture key,
//! so signature verification in the tests is the real thing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use securetoken_verify::{CacheError, KeyCache};

pub const PROJECT_ID: &str = "proj-1";
pub const KID: &str = "k1";
pub const CREDENTIAL: &str = "management-credential";

pub const SIGNING_KEY: &str = include_str!("../fixtures/signing_key.pem");
pub const SIGNING_CERT: &str = include_str!("../fixtures/signing_cert.pem");
pub const ROTATED_KEY: &str = include_str!("../fixtures/rotated_key.pem");
pub const ROTATED_CERT: &str = include_str!("../fixtures/rotated_cert.pem");

/// Mock identity provider exposing the two collaborator endpoints.
pub struct MockIdentityProvider {
    pub server: MockServer,
    pub keys_url: String,
    pub lookup_url: String,
}

impl MockIdentityProvider {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();

        Self {
            server,
            keys_url: format!("{base_url}/keys"),
            lookup_url: format!("{base_url}/accounts:lookup"),
        }
    }

    /// Serve a key set with the given `max-age` advertised in Cache-Control.
    pub async fn mock_keys(&self, keys: &[(&str, &str)], max_age: u64) {
        let body: serde_json::Value = keys
            .iter()
            .map(|(kid, cert)| ((*kid).to_owned(), json!(cert)))
            .collect::<serde_json::Map<_, _>>()
            .into();

        Mock::given(method("GET"))
            .and(path("/keys"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(body)
                    .insert_header("Cache-Control", format!("public, max-age={max_age}")),
            )
            .mount(&self.server)
            .await;
    }

    /// Serve a key set with no Cache-Control header at all.
    pub async fn mock_keys_without_cache_control(&self, keys: &[(&str, &str)]) {
        let body: serde_json::Value = keys
            .iter()
            .map(|(kid, cert)| ((*kid).to_owned(), json!(cert)))
            .collect::<serde_json::Map<_, _>>()
            .into();

        Mock::given(method("GET"))
            .and(path("/keys"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Key-source endpoint that must never be called.
    pub async fn expect_no_key_fetch(&self) {
        Mock::given(method("GET"))
            .and(path("/keys"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    /// Key-source endpoint failing with the given status.
    pub async fn mock_keys_error(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/keys"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Account lookup returning one record with the given `validSince`.
    /// Requires the management credential as a bearer header.
    pub async fn mock_lookup_valid_since(&self, valid_since: &str) {
        self.mock_lookup_users(json!([{"localId": "user-42", "validSince": valid_since}]))
            .await;
    }

    /// Account lookup returning arbitrary user records.
    pub async fn mock_lookup_users(&self, users: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/accounts:lookup"))
            .and(header("authorization", format!("Bearer {CREDENTIAL}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": users})))
            .mount(&self.server)
            .await;
    }

    /// Account lookup returning an empty body (no record for the subject).
    pub async fn mock_lookup_empty(&self) {
        Mock::given(method("POST"))
            .and(path("/accounts:lookup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&self.server)
            .await;
    }
}

/// Claims that pass every body check for [`PROJECT_ID`].
pub fn valid_claims() -> serde_json::Value {
    let now = Utc::now().timestamp();
    json!({
        "iss": format!("https://securetoken.google.com/{PROJECT_ID}"),
        "aud": PROJECT_ID,
        "sub": "user-42",
        "iat": now,
        "exp": now + 3600,
        "auth_time": now,
    })
}

/// Sign claims with the fixture RSA key under the given `kid`.
pub fn sign_token(claims: &serde_json::Value, kid: &str) -> String {
    sign_token_with(claims, kid, SIGNING_KEY)
}

/// Sign claims with an arbitrary fixture RSA key, for key-rotation tests.
pub fn sign_token_with(claims: &serde_json::Value, kid: &str, key_pem: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_owned());
    let key = EncodingKey::from_rsa_pem(key_pem.as_bytes()).expect("fixture key parses");
    encode(&header, claims, &key).expect("token signs")
}

/// Sign claims under HS256, for algorithm allow-list tests.
pub fn sign_token_hs256(claims: &serde_json::Value) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(KID.to_owned());
    let key = EncodingKey::from_secret(b"shared-secret");
    encode(&header, claims, &key).expect("token signs")
}

/// Key cache that records every write, for cache-population assertions.
#[derive(Debug, Default)]
pub struct RecordingCache {
    pub entries: Mutex<HashMap<String, String>>,
    pub puts: Mutex<Vec<(String, String, Duration)>>,
}

#[async_trait]
impl KeyCache for RecordingCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
        self.puts
            .lock()
            .unwrap()
            .push((key.to_owned(), value.to_owned(), ttl));
        Ok(())
    }
}

/// Key cache whose reads and writes always fail, for degradation tests.
#[derive(Debug, Default)]
pub struct BrokenCache;

#[async_trait]
impl KeyCache for BrokenCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err("cache backend unavailable".into())
    }

    async fn put(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err("cache backend unavailable".into())
    }
}
