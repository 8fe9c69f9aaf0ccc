//! LLM-backed translation through `edgequake-llm`.
//!
//! Each chunk becomes one chat request: the translation instructions as the
//! system message and the chunk itself as the only user message. Prompt
//! wording lives in [`crate::prompts`].

use super::Translator;
use crate::config::TranslationConfig;
use crate::error::TranslatorError;
use crate::prompts::translation_system_prompt;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Default model when a provider is named without one.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Translator that asks a chat model for the translation.
pub struct LlmTranslator {
    provider: Arc<dyn LLMProvider>,
    system_prompt: String,
    options: CompletionOptions,
    timeout_secs: u64,
}

impl LlmTranslator {
    /// `timeout_secs` bounds each chat request; zero is treated as one second.
    pub fn new(provider: Arc<dyn LLMProvider>, target_language: &str, timeout_secs: u64) -> Self {
        Self {
            provider,
            system_prompt: translation_system_prompt(target_language),
            timeout_secs: timeout_secs.max(1),
            options: CompletionOptions {
                temperature: Some(0.0),
                ..Default::default()
            },
        }
    }

    /// Replace the built-in system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    async fn translate(&self, text: &str) -> Result<String, TranslatorError> {
        let messages = vec![
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user(text),
        ];

        let response = timeout(
            Duration::from_secs(self.timeout_secs),
            self.provider.chat(&messages, Some(&self.options)),
        )
        .await
        .map_err(|_| TranslatorError::Timeout {
            backend: self.name().to_string(),
            secs: self.timeout_secs,
        })?
        .map_err(|e| TranslatorError::Provider(e.to_string()))?;

        debug!(
            "llm: {} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content.trim().to_string())
    }

    fn name(&self) -> &str {
        "llm"
    }
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, TranslatorError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        TranslatorError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.llm_provider`) — used as-is.
/// 2. **Named provider** (`config.provider_name`) with `config.model` or
///    [`DEFAULT_MODEL`]; the API key is read from the environment.
/// 3. **Environment pair** `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`.
/// 4. **Auto-detection** via [`ProviderFactory::from_env`].
pub fn resolve_provider(config: &TranslationConfig) -> Result<Arc<dyn LLMProvider>, TranslatorError> {
    if let Some(ref provider) = config.llm_provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| TranslatorError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or use --backend google.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgequake_llm::{LLMResponse, MockProvider};

    /// Accepts every request and never answers.
    struct Stalled;

    #[async_trait]
    impl LLMProvider for Stalled {
        fn name(&self) -> &str {
            "stalled"
        }

        fn model(&self) -> &str {
            "stalled-model"
        }

        fn max_context_length(&self) -> usize {
            4096
        }

        async fn complete(&self, _prompt: &str) -> edgequake_llm::Result<LLMResponse> {
            std::future::pending().await
        }

        async fn complete_with_options(
            &self,
            _prompt: &str,
            _options: &CompletionOptions,
        ) -> edgequake_llm::Result<LLMResponse> {
            std::future::pending().await
        }

        async fn chat(
            &self,
            _messages: &[ChatMessage],
            _options: Option<&CompletionOptions>,
        ) -> edgequake_llm::Result<LLMResponse> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn reply_is_trimmed() {
        let provider = MockProvider::new();
        provider.add_response("  The bank grew.\n").await;
        let translator = LlmTranslator::new(Arc::new(provider), "en", 60);
        assert_eq!(translator.translate("Die Bank wuchs.").await.unwrap(), "The bank grew.");
    }

    #[tokio::test]
    async fn stalled_provider_times_out() {
        let translator = LlmTranslator::new(Arc::new(Stalled), "en", 1);
        let err = translator.translate("Die Bank wuchs.").await.unwrap_err();
        assert!(
            matches!(err, TranslatorError::Timeout { ref backend, secs: 1 } if backend == "llm"),
            "{err:?}"
        );
    }

    #[test]
    fn zero_timeout_is_raised_to_one_second() {
        let translator = LlmTranslator::new(Arc::new(Stalled), "en", 0);
        assert_eq!(translator.timeout_secs, 1);
    }
}
