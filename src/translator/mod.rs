//! The translation capability: one text in, one translated text out.
//!
//! Everything upstream of this module (chunking, budgets, sentinels) is
//! backend-agnostic and talks to a `dyn Translator`. Two backends ship with
//! the crate:
//!
//! * [`google::GoogleTranslator`] — the public Google Translate web endpoint,
//!   auto-detecting the source language. The default.
//! * [`llm::LlmTranslator`] — any chat model reachable through
//!   `edgequake-llm` (OpenAI, Anthropic, Gemini, Ollama, …).
//!
//! [`retry::RetryingTranslator`] wraps either one with exponential backoff.

use crate::config::{TranslationConfig, TranslatorBackend};
use crate::error::TranslatorError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub mod google;
pub mod llm;
pub mod retry;

pub use google::GoogleTranslator;
pub use llm::LlmTranslator;
pub use retry::RetryingTranslator;

/// A machine-translation service.
///
/// Calls are awaited one at a time by the workflow; implementations do not
/// need to handle concurrent requests but must be `Send + Sync` so they can
/// be shared as `Arc<dyn Translator>`.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into the configured target language.
    async fn translate(&self, text: &str) -> Result<String, TranslatorError>;

    /// Short backend name for logs and error messages.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: Translator + ?Sized> Translator for Arc<T> {
    async fn translate(&self, text: &str) -> Result<String, TranslatorError> {
        (**self).translate(text).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Build the translator described by `config`.
///
/// A pre-built translator in the config wins; otherwise the selected backend
/// is constructed. The result is wrapped in a [`RetryingTranslator`] when
/// `max_retries > 0`.
pub fn resolve_translator(
    config: &TranslationConfig,
) -> Result<Arc<dyn Translator>, TranslatorError> {
    let base: Arc<dyn Translator> = if let Some(ref translator) = config.translator {
        Arc::clone(translator)
    } else {
        match config.backend {
            TranslatorBackend::Google => Arc::new(GoogleTranslator::new(
                &config.source_language,
                &config.target_language,
                config.api_timeout_secs,
            )?),
            TranslatorBackend::Llm => {
                let provider = llm::resolve_provider(config)?;
                Arc::new(LlmTranslator::new(
                    provider,
                    &config.target_language,
                    config.api_timeout_secs,
                ))
            }
        }
    };
    debug!("Using translation backend '{}'", base.name());

    if config.max_retries > 0 {
        Ok(Arc::new(RetryingTranslator::new(
            base,
            config.max_retries,
            config.retry_backoff_ms,
        )))
    } else {
        Ok(base)
    }
}
