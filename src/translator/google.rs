//! Google Translate web endpoint (`translate_a/single`, `client=gtx`).
//!
//! The endpoint answers with a nested JSON array rather than an object:
//!
//! ```text
//! [[["Translated first part","Original first part",null,null,10],
//!   ["Translated second part","Original second part",null,null,10]],
//!  null,"de", …]
//! ```
//!
//! Element `[0]` lists the translated segments in order; we concatenate the
//! first string of each. The request text goes in a form-encoded POST body
//! because a 5000-byte chunk, percent-encoded, overflows typical URL limits.

use super::Translator;
use crate::error::TranslatorError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default endpoint of the public web translator.
pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

const BACKEND: &str = "google";

/// Translator backed by the Google Translate web endpoint.
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
    source: String,
    target: String,
    timeout_secs: u64,
}

impl GoogleTranslator {
    /// Create a translator from `source` (`"auto"` to detect) to `target`.
    pub fn new(source: &str, target: &str, timeout_secs: u64) -> Result<Self, TranslatorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TranslatorError::Http {
                backend: BACKEND.to_string(),
                detail: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            timeout_secs,
        })
    }

    /// Point the translator at a different endpoint (proxies, test servers).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str) -> Result<String, TranslatorError> {
        debug!("google: translating {} bytes", text.len());

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source.as_str()),
                ("tl", self.target.as_str()),
                ("dt", "t"),
            ])
            .form(&[("q", text)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TranslatorError::Timeout {
                        backend: BACKEND.to_string(),
                        secs: self.timeout_secs,
                    }
                } else {
                    TranslatorError::Http {
                        backend: BACKEND.to_string(),
                        detail: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslatorError::Status {
                backend: BACKEND.to_string(),
                status: status.as_u16(),
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| TranslatorError::MalformedResponse {
                backend: BACKEND.to_string(),
                detail: e.to_string(),
            })?;

        parse_segments(&payload)
    }

    fn name(&self) -> &str {
        BACKEND
    }
}

/// Concatenate the translated segments of a `translate_a/single` payload.
pub fn parse_segments(payload: &Value) -> Result<String, TranslatorError> {
    let malformed = |detail: &str| TranslatorError::MalformedResponse {
        backend: BACKEND.to_string(),
        detail: detail.to_string(),
    };

    let segments = payload
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("missing segment list"))?;

    let mut translated = String::new();
    for segment in segments {
        match segment.get(0) {
            Some(Value::String(s)) => translated.push_str(s),
            Some(Value::Null) | None => {}
            Some(_) => return Err(malformed("segment text is not a string")),
        }
    }
    Ok(translated)
}
