//! Service-account access tokens for the storage API.
//!
//! Implements the OAuth 2.0 JWT-bearer grant: an RS256 assertion signed with
//! the key file's private key is exchanged at `token_uri` for a short-lived
//! bearer token. Tokens are cached and refreshed shortly before expiry.

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::errors::AuthError;

/// OAuth scope for object writes.
pub const STORAGE_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_write";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN: Duration = Duration::from_secs(5 * 60);

/// Supplies bearer tokens for outbound storage calls.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Return a currently valid access token.
    async fn access_token(&self) -> Result<String, AuthError>;
}

/// A fixed token, for emulators and tests.
#[derive(Clone, Debug)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wrap a token value.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, AuthError> {
        Ok(self.0.clone())
    }
}

/// Fields of a service-account key file that the grant needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Always `"service_account"`.
    #[serde(rename = "type")]
    pub key_type: String,
    /// Account email, the assertion issuer.
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// Key id, sent as the JWT `kid`.
    #[serde(default)]
    pub private_key_id: Option<String>,
    /// Token endpoint.
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Parse a key file's JSON content.
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        let key: Self =
            serde_json::from_str(json).map_err(|e| AuthError::InvalidKey(e.to_string()))?;
        if key.key_type != "service_account" {
            return Err(AuthError::InvalidKey(format!(
                "expected type \"service_account\", found \"{}\"",
                key.key_type
            )));
        }
        Ok(key)
    }

    /// Read and parse a key file.
    pub fn from_file(path: &Path) -> Result<Self, AuthError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Token source backed by a service-account key.
pub struct ServiceAccountTokenSource {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scope: String,
    client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for ServiceAccountTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountTokenSource")
            .field("key", &self.key)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountTokenSource {
    /// Build a token source for `scope`.
    pub fn new(
        key: ServiceAccountKey,
        scope: impl Into<String>,
        client: reqwest::Client,
    ) -> Result<Self, AuthError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| AuthError::InvalidKey(format!("private_key: {e}")))?;
        Ok(Self {
            key,
            encoding_key,
            scope: scope.into(),
            client,
            cached: Mutex::new(None),
        })
    }

    /// Build a storage-scoped token source from a key file.
    pub fn from_file(path: &Path, client: reqwest::Client) -> Result<Self, AuthError> {
        Self::new(ServiceAccountKey::from_file(path)?, STORAGE_SCOPE, client)
    }

    fn sign_assertion(&self) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&self.key.private_key_id);
        jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    #[instrument(skip_all, fields(account = %self.key.client_email))]
    async fn exchange(&self) -> Result<CachedToken, AuthError> {
        let assertion = self.sign_assertion()?;
        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::Exchange { status, message });
        }

        let data: TokenResponse = response.json().await?;
        debug!(expires_in = data.expires_in, "service-account token issued");
        Ok(CachedToken {
            token: data.access_token,
            expires_at: Instant::now() + Duration::from_secs(data.expires_in),
        })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> Result<String, AuthError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() + REFRESH_MARGIN < token.expires_at {
                return Ok(token.token.clone());
            }
        }
        let fresh = self.exchange().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_KEY_PEM: &str = include_str!("../tests/fixtures/test-key.pem");

    fn key_json(token_uri: &str) -> String {
        serde_json::json!({
            "type": "service_account",
            "project_id": "demo",
            "private_key_id": "kid-1",
            "private_key": TEST_KEY_PEM,
            "client_email": "uploader@demo.iam.gserviceaccount.com",
            "client_id": "1234",
            "token_uri": token_uri,
        })
        .to_string()
    }

    #[test]
    fn parses_key_file_json() {
        let key = ServiceAccountKey::from_json(&key_json("https://oauth2.googleapis.com/token"))
            .unwrap();
        assert_eq!(key.client_email, "uploader@demo.iam.gserviceaccount.com");
        assert_eq!(key.private_key_id.as_deref(), Some("kid-1"));
    }

    #[test]
    fn rejects_non_service_account_keys() {
        let json = r#"{"type":"authorized_user","client_email":"a","private_key":"b","token_uri":"c"}"#;
        assert_matches!(
            ServiceAccountKey::from_json(json),
            Err(AuthError::InvalidKey(m)) if m.contains("authorized_user")
        );
    }

    #[test]
    fn rejects_garbage_private_key() {
        let mut key = ServiceAccountKey::from_json(&key_json("http://x/token")).unwrap();
        key.private_key = "not a pem".into();
        let result = ServiceAccountTokenSource::new(key, STORAGE_SCOPE, reqwest::Client::new());
        assert_matches!(result, Err(AuthError::InvalidKey(_)));
    }

    #[test]
    fn reads_key_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sa.json");
        std::fs::write(&file, key_json("http://x/token")).unwrap();
        let source = ServiceAccountTokenSource::from_file(&file, reqwest::Client::new()).unwrap();
        assert_eq!(source.scope, STORAGE_SCOPE);
    }

    #[test]
    fn debug_hides_private_key() {
        let key = ServiceAccountKey::from_json(&key_json("http://x/token")).unwrap();
        let printed = format!("{key:?}");
        assert!(!printed.contains("PRIVATE KEY"));
    }

    #[tokio::test]
    async fn static_token() {
        let source = StaticToken::new("ya29.fixed");
        assert_eq!(source.access_token().await.unwrap(), "ya29.fixed");
    }

    #[tokio::test]
    async fn exchanges_jwt_and_caches_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"))
            .and(body_string_contains("assertion="))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.issued",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let key = ServiceAccountKey::from_json(&key_json(&format!("{}/token", server.uri())))
            .unwrap();
        let source =
            ServiceAccountTokenSource::new(key, STORAGE_SCOPE, reqwest::Client::new()).unwrap();

        assert_eq!(source.access_token().await.unwrap(), "ya29.issued");
        assert_eq!(source.access_token().await.unwrap(), "ya29.issued");
    }

    #[tokio::test]
    async fn short_lived_token_is_refreshed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.short",
                "expires_in": 60
            })))
            .expect(2)
            .mount(&server)
            .await;

        let key = ServiceAccountKey::from_json(&key_json(&format!("{}/token", server.uri())))
            .unwrap();
        let source =
            ServiceAccountTokenSource::new(key, STORAGE_SCOPE, reqwest::Client::new()).unwrap();

        let _ = source.access_token().await.unwrap();
        let _ = source.access_token().await.unwrap();
    }

    #[tokio::test]
    async fn refused_exchange_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let key = ServiceAccountKey::from_json(&key_json(&format!("{}/token", server.uri())))
            .unwrap();
        let source =
            ServiceAccountTokenSource::new(key, STORAGE_SCOPE, reqwest::Client::new()).unwrap();

        assert_matches!(
            source.access_token().await,
            Err(AuthError::Exchange { status: 400, ref message }) if message == "invalid_grant"
        );
    }
}
