//! Configuration types for report translation.
//!
//! Every knob lives in [`TranslationConfig`], built via its
//! [`TranslationConfigBuilder`]. The builder clamps values to sane ranges and
//! `build()` rejects combinations that could never produce output.

use crate::error::ReportError;
use crate::pipeline::chunk::{ChunkBudget, DEFAULT_CHUNK_LIMIT_BYTES};
use crate::pipeline::layout::DEFAULT_FONT_SIZE;
use crate::progress::ProgressCallback;
use crate::sentence::SentenceLanguage;
use crate::translator::Translator;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Configuration for translating one or more reports.
///
/// # Example
/// ```rust
/// use report_translate::TranslationConfig;
///
/// let config = TranslationConfig::builder()
///     .target_language("en")
///     .chunk_limit_bytes(4000)
///     .max_retries(2)
///     .build()
///     .unwrap();
/// assert_eq!(config.budget().limit(), 4000);
/// ```
#[derive(Clone)]
pub struct TranslationConfig {
    /// Per-request byte budget; every submitted chunk stays strictly below it.
    /// Default: 5000.
    pub chunk_limit_bytes: usize,

    /// Source language code handed to the translation service. Default: "auto".
    pub source_language: String,

    /// Target language code. Default: "en".
    pub target_language: String,

    /// Abbreviation set used for sentence segmentation. Default: `Auto`
    /// (union of all bundled languages).
    pub sentence_language: SentenceLanguage,

    /// Which translation service to construct. Default: Google.
    pub backend: TranslatorBackend,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// Only read when `backend` is `Llm`.
    pub provider_name: Option<String>,

    /// LLM model identifier. If None, [`crate::translator::llm::DEFAULT_MODEL`].
    pub model: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub llm_provider: Option<Arc<dyn LLMProvider>>,

    /// Pre-constructed translator. Takes precedence over `backend`.
    pub translator: Option<Arc<dyn Translator>>,

    /// Retries per failed translation request. Default: 0.
    ///
    /// Zero means a failed request aborts the file, exactly like a service
    /// outage would.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Per-request timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Body font size of the output PDF in points. Range: 4–24. Default: 7.
    pub font_size: f32,

    /// PDF user password for encrypted sources.
    pub password: Option<String>,

    /// Optional per-file/per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            chunk_limit_bytes: DEFAULT_CHUNK_LIMIT_BYTES,
            source_language: "auto".to_string(),
            target_language: "en".to_string(),
            sentence_language: SentenceLanguage::default(),
            backend: TranslatorBackend::default(),
            provider_name: None,
            model: None,
            llm_provider: None,
            translator: None,
            max_retries: 0,
            retry_backoff_ms: 500,
            api_timeout_secs: 60,
            font_size: DEFAULT_FONT_SIZE,
            password: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for TranslationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationConfig")
            .field("chunk_limit_bytes", &self.chunk_limit_bytes)
            .field("source_language", &self.source_language)
            .field("target_language", &self.target_language)
            .field("sentence_language", &self.sentence_language)
            .field("backend", &self.backend)
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field(
                "llm_provider",
                &self.llm_provider.as_ref().map(|_| "<dyn LLMProvider>"),
            )
            .field("translator", &self.translator.as_ref().map(|t| t.name()))
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("font_size", &self.font_size)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl TranslationConfig {
    /// Create a new builder for `TranslationConfig`.
    pub fn builder() -> TranslationConfigBuilder {
        TranslationConfigBuilder {
            config: Self::default(),
        }
    }

    /// The chunk budget derived from `chunk_limit_bytes`.
    ///
    /// Falls back to the default budget if the limit is zero; `build()`
    /// already rejects that case.
    pub fn budget(&self) -> ChunkBudget {
        ChunkBudget::new(self.chunk_limit_bytes).unwrap_or_default()
    }
}

/// Builder for [`TranslationConfig`].
pub struct TranslationConfigBuilder {
    config: TranslationConfig,
}

impl fmt::Debug for TranslationConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TranslationConfigBuilder")
            .field(&self.config)
            .finish()
    }
}

impl TranslationConfigBuilder {
    pub fn chunk_limit_bytes(mut self, limit: usize) -> Self {
        self.config.chunk_limit_bytes = limit;
        self
    }

    pub fn source_language(mut self, lang: impl Into<String>) -> Self {
        self.config.source_language = lang.into();
        self
    }

    pub fn target_language(mut self, lang: impl Into<String>) -> Self {
        self.config.target_language = lang.into();
        self
    }

    pub fn sentence_language(mut self, lang: SentenceLanguage) -> Self {
        self.config.sentence_language = lang;
        self
    }

    pub fn backend(mut self, backend: TranslatorBackend) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn llm_provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.llm_provider = Some(provider);
        self
    }

    pub fn translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.config.translator = Some(translator);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n.min(10);
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn font_size(mut self, size: f32) -> Self {
        self.config.font_size = size.clamp(4.0, 24.0);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.config.progress_callback = Some(callback);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<TranslationConfig, ReportError> {
        let c = &self.config;
        if c.chunk_limit_bytes == 0 {
            return Err(ReportError::InvalidConfig(
                "Chunk limit must be ≥ 1 byte".into(),
            ));
        }
        if c.target_language.trim().is_empty() {
            return Err(ReportError::InvalidConfig(
                "Target language must not be empty".into(),
            ));
        }
        if c.source_language.trim().is_empty() {
            return Err(ReportError::InvalidConfig(
                "Source language must not be empty (use \"auto\" to detect)".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Translation service used when no pre-built translator is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslatorBackend {
    /// Google Translate web endpoint. (default)
    #[default]
    Google,
    /// A chat model through `edgequake-llm`.
    Llm,
}

impl FromStr for TranslatorBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "llm" => Ok(Self::Llm),
            other => Err(format!("unknown backend '{other}' (expected google or llm)")),
        }
    }
}

impl fmt::Display for TranslatorBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Google => "google",
            Self::Llm => "llm",
        })
    }
}
