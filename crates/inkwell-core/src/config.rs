//! Configuration module
//!
//! Environment-driven settings for the gateway: server, database, session
//! verification and the external generation providers.

use std::env;
use std::time::Duration;

use crate::constants::{DEFAULT_EXTERNAL_CALL_TIMEOUT_SECS, DEFAULT_MAX_ARTICLE_TOKENS};

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_UPLOAD_SIZE_MB: usize = 10;
const DEFAULT_LLM_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const DEFAULT_LLM_MODEL: &str = "gemini-2.0-flash";

/// Where session token signing keys come from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionKeySource {
    /// HS256 tokens signed with a shared secret
    SharedSecret(String),
    /// RS256/ES256 tokens verified against a remote JWKS document
    Jwks { url: String },
}

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

/// Gateway configuration
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub base: BaseConfig,
    pub database_url: String,
    pub session_keys: SessionKeySource,
    pub session_issuer: Option<String>,
    // Text generation (OpenAI-compatible chat completions)
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    // Image generation
    pub clipdrop_api_key: String,
    // Media hosting
    pub cloudinary_cloud_name: String,
    pub cloudinary_api_key: String,
    pub cloudinary_api_secret: String,
    pub external_call_timeout_secs: u64,
    pub max_article_tokens: u32,
    pub max_upload_size_bytes: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<GatewayConfig>);

impl Config {
    fn inner(&self) -> &GatewayConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.inner().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = GatewayConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn session_keys(&self) -> &SessionKeySource {
        &self.inner().session_keys
    }

    pub fn session_issuer(&self) -> Option<&str> {
        self.inner().session_issuer.as_deref()
    }

    pub fn llm_api_key(&self) -> &str {
        &self.inner().llm_api_key
    }

    pub fn llm_base_url(&self) -> &str {
        &self.inner().llm_base_url
    }

    pub fn llm_model(&self) -> &str {
        &self.inner().llm_model
    }

    pub fn clipdrop_api_key(&self) -> &str {
        &self.inner().clipdrop_api_key
    }

    pub fn cloudinary_cloud_name(&self) -> &str {
        &self.inner().cloudinary_cloud_name
    }

    pub fn cloudinary_api_key(&self) -> &str {
        &self.inner().cloudinary_api_key
    }

    pub fn cloudinary_api_secret(&self) -> &str {
        &self.inner().cloudinary_api_secret
    }

    pub fn external_call_timeout(&self) -> Duration {
        Duration::from_secs(self.inner().external_call_timeout_secs)
    }

    pub fn max_article_tokens(&self) -> u32 {
        self.inner().max_article_tokens
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.inner().max_upload_size_bytes
    }
}

fn required(key: &str) -> Result<String, anyhow::Error> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("{} must be set", key))
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
        };

        let session_keys = match (
            env::var("SESSION_JWT_SECRET").ok().filter(|s| !s.is_empty()),
            env::var("SESSION_JWKS_URL").ok().filter(|s| !s.is_empty()),
        ) {
            (Some(secret), _) => SessionKeySource::SharedSecret(secret),
            (None, Some(url)) => SessionKeySource::Jwks { url },
            (None, None) => {
                return Err(anyhow::anyhow!(
                    "SESSION_JWT_SECRET or SESSION_JWKS_URL must be set for authentication"
                ))
            }
        };

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        Ok(GatewayConfig {
            base,
            database_url: required("DATABASE_URL")?,
            session_keys,
            session_issuer: env::var("SESSION_ISSUER").ok().filter(|s| !s.is_empty()),
            llm_api_key: required("LLM_API_KEY")?,
            llm_base_url: env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_LLM_BASE_URL.to_string()),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),
            clipdrop_api_key: required("CLIPDROP_API_KEY")?,
            cloudinary_cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
            cloudinary_api_key: required("CLOUDINARY_API_KEY")?,
            cloudinary_api_secret: required("CLOUDINARY_API_SECRET")?,
            external_call_timeout_secs: env::var("EXTERNAL_CALL_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_EXTERNAL_CALL_TIMEOUT_SECS),
            max_article_tokens: env::var("MAX_ARTICLE_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_ARTICLE_TOKENS),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let environment = self.base.environment.to_lowercase();
        let is_production = environment == "production" || environment == "prod";
        if is_production && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        match &self.session_keys {
            SessionKeySource::SharedSecret(secret) if secret.len() < 32 => {
                return Err(anyhow::anyhow!(
                    "SESSION_JWT_SECRET must be at least 32 characters long"
                ));
            }
            SessionKeySource::Jwks { url } if !url.starts_with("https://") => {
                return Err(anyhow::anyhow!("SESSION_JWKS_URL must be an https URL"));
            }
            _ => {}
        }

        if self.external_call_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "EXTERNAL_CALL_TIMEOUT_SECS must be greater than zero"
            ));
        }

        if self.max_article_tokens == 0 {
            return Err(anyhow::anyhow!("MAX_ARTICLE_TOKENS must be greater than zero"));
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than zero"));
        }

        Ok(())
    }
}
