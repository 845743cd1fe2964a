//! Session token verification
//!
//! Tokens are either HS256 signed with a shared secret, or RS256/ES256 signed
//! by the identity provider and verified against its JWKS document. JWKS keys
//! are cached per `kid` and refreshed after the cache TTL.

use crate::auth::models::{AuthContext, SessionClaims};
use chrono::{DateTime, Utc};
use inkwell_core::{AppError, Config, SessionKeySource};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

const JWKS_CACHE_TTL_SECONDS: i64 = 3600;

/// JWKS (JSON Web Key Set) structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    #[serde(rename = "kty")]
    pub key_type: String,
    #[serde(rename = "kid")]
    pub key_id: Option<String>,
    #[serde(rename = "n")]
    pub modulus: Option<String>, // RSA
    #[serde(rename = "e")]
    pub exponent: Option<String>, // RSA
    #[serde(rename = "x")]
    pub x_coordinate: Option<String>, // EC
    #[serde(rename = "y")]
    pub y_coordinate: Option<String>, // EC
    #[serde(rename = "crv")]
    pub curve: Option<String>, // EC
}

#[derive(Clone)]
struct CachedKey {
    key: DecodingKey,
    expires_at: DateTime<Utc>,
}

struct JwksKeys {
    url: String,
    http_client: reqwest::Client,
    cache: RwLock<HashMap<String, CachedKey>>,
}

enum KeySource {
    Shared(DecodingKey),
    Jwks(JwksKeys),
}

/// Verifies bearer session tokens and turns them into an [`AuthContext`].
pub struct SessionVerifier {
    keys: KeySource,
    issuer: Option<String>,
}

fn unauthenticated(message: impl Into<String>) -> AppError {
    AppError::Unauthenticated(message.into())
}

impl SessionVerifier {
    pub fn shared_secret(secret: &str, issuer: Option<String>) -> Self {
        Self {
            keys: KeySource::Shared(DecodingKey::from_secret(secret.as_bytes())),
            issuer,
        }
    }

    pub fn jwks(url: impl Into<String>, issuer: Option<String>) -> Self {
        Self {
            keys: KeySource::Jwks(JwksKeys {
                url: url.into(),
                http_client: reqwest::Client::new(),
                cache: RwLock::new(HashMap::new()),
            }),
            issuer,
        }
    }

    pub fn from_config(config: &Config) -> Arc<Self> {
        let issuer = config.session_issuer().map(String::from);
        let verifier = match config.session_keys() {
            SessionKeySource::SharedSecret(secret) => Self::shared_secret(secret, issuer),
            SessionKeySource::Jwks { url } => Self::jwks(url.clone(), issuer),
        };
        Arc::new(verifier)
    }

    fn validation(&self, algorithms: Vec<Algorithm>) -> Validation {
        let mut validation = Validation::new(algorithms[0]);
        validation.algorithms = algorithms;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;
        validation.validate_aud = false;
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation
    }

    /// Validate a bearer token and return the caller it belongs to.
    pub async fn verify(&self, token: &str) -> Result<AuthContext, AppError> {
        let header = decode_header(token)
            .map_err(|e| unauthenticated(format!("Invalid token header: {}", e)))?;

        let (key, algorithms) = match &self.keys {
            KeySource::Shared(key) => (key.clone(), vec![Algorithm::HS256]),
            KeySource::Jwks(jwks) => (
                jwks.decoding_key(header.kid.as_deref()).await?,
                vec![Algorithm::RS256, Algorithm::ES256],
            ),
        };

        if !algorithms.contains(&header.alg) {
            return Err(unauthenticated(format!(
                "Unsupported algorithm: {:?}",
                header.alg
            )));
        }

        let data = decode::<SessionClaims>(token, &key, &self.validation(algorithms)).map_err(
            |e| {
                tracing::debug!("Session token validation failed: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => unauthenticated("Token has expired"),
                    ErrorKind::InvalidIssuer => unauthenticated("Invalid token issuer"),
                    ErrorKind::ImmatureSignature => {
                        unauthenticated("Token is not yet valid (nbf)")
                    }
                    _ => unauthenticated("Invalid or expired token"),
                }
            },
        )?;

        if data.claims.sub.trim().is_empty() {
            return Err(unauthenticated("Token has no subject"));
        }

        Ok(AuthContext::from(data.claims))
    }
}

impl JwksKeys {
    async fn fetch(&self) -> Result<Jwks, AppError> {
        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| unauthenticated(format!("Failed to fetch JWKS: {}", e)))?;

        if !response.status().is_success() {
            return Err(unauthenticated(format!(
                "JWKS endpoint returned error: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| unauthenticated(format!("Failed to parse JWKS: {}", e)))
    }

    async fn decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, AppError> {
        let cache_key = kid.unwrap_or("default").to_string();

        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(&cache_key) {
                if cached.expires_at > Utc::now() {
                    return Ok(cached.key.clone());
                }
            }
        }

        let jwks = self.fetch().await?;
        let jwk = match kid {
            Some(kid) => jwks
                .keys
                .iter()
                .find(|k| k.key_id.as_deref() == Some(kid))
                .ok_or_else(|| unauthenticated(format!("Key ID {} not found in JWKS", kid)))?,
            None => jwks
                .keys
                .first()
                .ok_or_else(|| unauthenticated("No keys found in JWKS"))?,
        };
        let key = jwk_to_decoding_key(jwk)?;

        self.cache.write().await.insert(
            cache_key,
            CachedKey {
                key: key.clone(),
                expires_at: Utc::now() + chrono::Duration::seconds(JWKS_CACHE_TTL_SECONDS),
            },
        );

        Ok(key)
    }
}

fn jwk_to_decoding_key(jwk: &Jwk) -> Result<DecodingKey, AppError> {
    match jwk.key_type.as_str() {
        "RSA" => {
            let n = jwk
                .modulus
                .as_ref()
                .ok_or_else(|| unauthenticated("RSA key missing modulus"))?;
            let e = jwk
                .exponent
                .as_ref()
                .ok_or_else(|| unauthenticated("RSA key missing exponent"))?;
            DecodingKey::from_rsa_components(n, e)
                .map_err(|e| unauthenticated(format!("Failed to create RSA key: {}", e)))
        }
        "EC" => {
            let x = jwk
                .x_coordinate
                .as_ref()
                .ok_or_else(|| unauthenticated("EC key missing x coordinate"))?;
            let y = jwk
                .y_coordinate
                .as_ref()
                .ok_or_else(|| unauthenticated("EC key missing y coordinate"))?;
            if jwk.curve.as_deref() != Some("P-256") {
                return Err(unauthenticated("Unsupported EC curve (only P-256 is supported)"));
            }
            DecodingKey::from_ec_components(x, y)
                .map_err(|e| unauthenticated(format!("Failed to create EC key: {}", e)))
        }
        other => Err(unauthenticated(format!("Unsupported key type: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell_core::models::Plan;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn token(claims: &SessionClaims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(exp_offset: i64) -> SessionClaims {
        SessionClaims {
            sub: "user_123".to_string(),
            exp: Utc::now().timestamp() + exp_offset,
            iat: None,
            nbf: None,
            iss: Some("https://clerk.test".to_string()),
            plan: None,
            pla: Some("u:premium".to_string()),
        }
    }

    #[tokio::test]
    async fn test_valid_token_yields_context() {
        let verifier = SessionVerifier::shared_secret(SECRET, None);
        let ctx = verifier.verify(&token(&claims(3600), SECRET)).await.unwrap();
        assert_eq!(ctx.user_id, "user_123");
        assert_eq!(ctx.plan, Plan::Premium);
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let verifier = SessionVerifier::shared_secret(SECRET, None);
        let err = verifier
            .verify(&token(&claims(-3600), SECRET))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(msg) if msg.contains("expired")));
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let verifier = SessionVerifier::shared_secret(SECRET, None);
        let forged = token(&claims(3600), "ffffffffffffffffffffffffffffffff");
        assert!(verifier.verify(&forged).await.is_err());
    }

    #[tokio::test]
    async fn test_issuer_enforced_when_configured() {
        let verifier =
            SessionVerifier::shared_secret(SECRET, Some("https://other.test".to_string()));
        let err = verifier
            .verify(&token(&claims(3600), SECRET))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let verifier = SessionVerifier::shared_secret(SECRET, None);
        assert!(verifier.verify("not-a-jwt").await.is_err());
    }

    #[tokio::test]
    async fn test_jwks_fetch_failure_is_unauthenticated() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/jwks.json")
            .with_status(500)
            .create_async()
            .await;

        let verifier = SessionVerifier::jwks(format!("{}/jwks.json", server.url()), None);
        let header = Header {
            alg: Algorithm::HS256,
            kid: Some("k1".to_string()),
            ..Header::default()
        };
        let token = encode(
            &header,
            &claims(3600),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = verifier.verify(&token).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(msg) if msg.contains("JWKS")));
    }
}
