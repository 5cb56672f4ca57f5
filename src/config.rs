//! Configuration for the record book service
//!
//! CLI arguments and environment variable handling using clap. Every flag
//! has an environment fallback, and `.env` is loaded before parsing.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::time::Duration;

use crate::auth::JwtValidator;
use crate::types::RecordError;

/// Lifetime of tokens minted by [`JwtValidator::generate_token`]
const TOKEN_EXPIRY_SECONDS: u64 = 3600;

/// Which repository implementation backs the service
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Mongo,
    Memory,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Record book - 4-H project and resume records
#[derive(Parser, Debug, Clone)]
#[command(name = "recordbook")]
#[command(about = "Record book backend for 4-H project tracking")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "recordbook")]
    pub mongodb_db: String,

    /// Storage backend
    #[arg(long, env = "STORE", value_enum, default_value = "mongo")]
    pub store: StoreKind,

    /// HS256 secret shared with the identity provider (required in production)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// Expected `iss` claim (optional)
    #[arg(long, env = "JWT_ISSUER")]
    pub jwt_issuer: Option<String>,

    /// Expected `aud` claim (optional)
    #[arg(long, env = "JWT_AUDIENCE")]
    pub jwt_audience: Option<String>,

    /// Enable development mode (built-in JWT secret, memory store fallback)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Request timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,

    /// UPC lookup endpoint
    #[arg(
        long,
        env = "UPC_API_URL",
        default_value = "https://api.upcitemdb.com/prod/trial/lookup"
    )]
    pub upc_api_url: String,

    /// UPC API key (optional, trial endpoint works without one)
    #[arg(long, env = "UPC_API_KEY")]
    pub upc_api_key: Option<String>,

    /// Value for Access-Control-Allow-Origin
    #[arg(long, env = "CORS_ORIGIN", default_value = "*")]
    pub cors_origin: String,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode {
            match self.jwt_secret.as_deref() {
                None | Some("") => {
                    return Err("JWT_SECRET is required in production mode".to_string())
                }
                Some(secret) if secret.len() < 32 => {
                    return Err("JWT_SECRET must be at least 32 characters".to_string())
                }
                _ => {}
            }
        }

        if self.request_timeout_ms == 0 {
            return Err("REQUEST_TIMEOUT_MS must be greater than zero".to_string());
        }

        Ok(())
    }

    /// Build the token validator (uses a built-in secret in dev mode)
    pub fn jwt_validator(&self) -> Result<JwtValidator, RecordError> {
        let validator = match (self.jwt_secret.clone(), self.dev_mode) {
            (Some(secret), _) if !secret.is_empty() => {
                JwtValidator::new(secret, TOKEN_EXPIRY_SECONDS)?
            }
            (_, true) => JwtValidator::new_dev(),
            (_, false) => {
                return Err(RecordError::Config(
                    "JWT_SECRET is required in production mode".into(),
                ))
            }
        };

        Ok(validator
            .with_issuer(self.jwt_issuer.clone())
            .with_audience(self.jwt_audience.clone()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
