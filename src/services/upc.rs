//! UPC Lookup Service
//!
//! Resolves a product barcode (feed bags, supplies) through a third-party
//! UPC database so clients can pre-fill feed and expense forms. The upstream
//! JSON is passed through untouched.

use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::types::RecordError;

/// UPC lookup configuration
#[derive(Debug, Clone)]
pub struct UpcConfig {
    /// Lookup endpoint, queried as `{api_url}?upc={code}`
    pub api_url: String,
    /// Optional API key sent as `user_key`
    pub api_key: Option<String>,
    /// Timeout for a single upstream request
    pub request_timeout: Duration,
}

impl Default for UpcConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.upcitemdb.com/prod/trial/lookup".to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Client for the upstream UPC database
pub struct UpcClient {
    config: UpcConfig,
    http_client: reqwest::Client,
}

impl UpcClient {
    pub fn new(config: UpcConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("recordbook/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            config,
            http_client,
        }
    }

    /// Look up a UPC/EAN/GTIN code
    pub async fn lookup(&self, code: &str) -> Result<Value, RecordError> {
        validate_code(code)?;
        debug!(code = %code, "UPC lookup");

        let mut request = self
            .http_client
            .get(&self.config.api_url)
            .query(&[("upc", code)]);
        if let Some(ref key) = self.config.api_key {
            request = request.header("user_key", key).header("key_type", "3scale");
        }

        let response = request.send().await?;
        let status = response.status();
        let body = if status.is_success() {
            response.json::<Value>().await?
        } else {
            Value::Null
        };

        interpret_response(code, status, body)
    }
}

/// Codes are 6 to 14 ASCII digits (UPC-E through GTIN-14)
pub fn validate_code(code: &str) -> Result<(), RecordError> {
    if (6..=14).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(RecordError::Validation(format!("invalid UPC code: {code}")))
    }
}

/// Map the upstream status and body to the lookup outcome
fn interpret_response(code: &str, status: StatusCode, body: Value) -> Result<Value, RecordError> {
    if status == StatusCode::NOT_FOUND {
        return Err(RecordError::NotFound(format!("UPC {code}")));
    }

    if !status.is_success() {
        warn!(code = %code, status = %status, "UPC service error");
        return Err(RecordError::Upstream(format!(
            "UPC service returned {status}"
        )));
    }

    let has_items = body
        .get("items")
        .and_then(Value::as_array)
        .map(|items| !items.is_empty())
        .unwrap_or(false);

    if has_items {
        Ok(body)
    } else {
        Err(RecordError::NotFound(format!("UPC {code}")))
    }
}
