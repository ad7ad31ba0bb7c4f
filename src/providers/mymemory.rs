/*!
 * MyMemory translation API client.
 *
 * `GET <endpoint>?q=<text>&langpair=<source>|<target>` answers with
 * `{"responseStatus": 200, "responseData": {"translatedText": "..."}}`.
 * The status is sometimes sent as a string, so the body is read as a
 * generic JSON value.
 */

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::app_config::TranslationConfig;
use crate::errors::ProviderError;
use crate::language_utils::api_language_code;
use crate::providers::Translator;

/// Public MyMemory endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.mymemory.translated.net/get";

/// Status the service reports for a usable translation
const SUCCESS_STATUS: u16 = 200;

/// MyMemory client
#[derive(Debug, Clone)]
pub struct MyMemory {
    /// HTTP client for making requests
    client: Client,
    /// Full URL of the `get` endpoint
    endpoint: String,
}

impl MyMemory {
    /// Create a new client with the given request timeout
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        let endpoint = endpoint.into();
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: if endpoint.trim().is_empty() {
                DEFAULT_ENDPOINT.to_string()
            } else {
                endpoint
            },
        }
    }

    /// Create a client from the translation settings
    pub fn from_config(config: &TranslationConfig) -> Self {
        Self::new(config.endpoint.clone(), config.timeout_secs)
    }

    /// Endpoint this client calls
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Language pair parameter for a source and target code
    pub fn language_pair(source_language: &str, target_language: &str) -> String {
        format!(
            "{}|{}",
            api_language_code(source_language),
            api_language_code(target_language)
        )
    }

    /// Extract the translation from a response body
    pub fn parse_response(body: &Value) -> Result<String, ProviderError> {
        let status = match body.get("responseStatus") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
            _ => None,
        }
        .ok_or_else(|| ProviderError::ParseError("missing responseStatus".to_string()))?;

        if status != u64::from(SUCCESS_STATUS) {
            let message = body
                .get("responseDetails")
                .and_then(Value::as_str)
                .unwrap_or("no details")
                .to_string();
            return Err(ProviderError::ApiError {
                status_code: u16::try_from(status).unwrap_or(u16::MAX),
                message,
            });
        }

        let translated = body
            .get("responseData")
            .and_then(|data| data.get("translatedText"))
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();

        if translated.is_empty() {
            return Err(ProviderError::EmptyTranslation);
        }
        Ok(translated.to_string())
    }
}

#[async_trait]
impl Translator for MyMemory {
    fn name(&self) -> &'static str {
        "mymemory"
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let langpair = Self::language_pair(source_language, target_language);
        debug!("MyMemory request: {} ({})", text, langpair);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", text), ("langpair", langpair.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("MyMemory API error ({}): {}", status, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Self::parse_response(&body)
    }
}
