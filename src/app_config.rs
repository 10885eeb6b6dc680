/*!
 * JSON configuration for llmtrans.
 *
 * The file names the source and target languages, the provider and model
 * used for translation and evaluation, the model used for sentence
 * segmentation, and batch settings such as row concurrency. A missing file
 * is created with defaults. Command-line options override single fields
 * after loading, and `validate` runs before any request is made.
 */

use anyhow::{Context, Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use url::Url;

use crate::language_utils::LanguageTag;
use crate::llm::gateway::ModelSettings;

/// Top-level configuration file
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Source language, as an English name or ISO code
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language, as an English name or ISO code
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation and evaluation model
    #[serde(default)]
    pub llm: LlmConfig,

    /// Model used for sentence segmentation
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Batch evaluation settings
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// LLM provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    OpenAI,
    Anthropic,
}

impl LlmProvider {
    /// Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
        }
    }

    /// Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
        }
    }

    /// Environment variable holding the API key when none is configured
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider and model used for translation and evaluation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LlmConfig {
    /// Provider type
    #[serde(default)]
    pub provider: LlmProvider,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature, 0.0 to 2.0
    #[serde(default)]
    pub temperature: f32,

    /// Maximum output tokens per exchange
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Base URL override, empty for the public API
    #[serde(default = "String::new")]
    pub endpoint: String,

    /// Environment variable holding the API key, empty for the provider default
    #[serde(default = "String::new")]
    pub api_key_env: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Longest accepted input for a translate call, in characters
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

impl LlmConfig {
    /// Name of the environment variable the API key is read from
    pub fn api_key_var(&self) -> String {
        if self.api_key_env.trim().is_empty() {
            self.provider.default_api_key_env().to_string()
        } else {
            self.api_key_env.trim().to_string()
        }
    }

    /// Settings for translation and evaluation exchanges
    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings::new(self.model.clone(), self.temperature, self.max_tokens)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: default_model(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            endpoint: String::new(),
            api_key_env: String::new(),
            timeout_secs: default_timeout_secs(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

/// Model used when a language has no rule-based sentence splitter
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SegmentationConfig {
    #[serde(default = "default_segmentation_model")]
    pub model: String,

    #[serde(default)]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl SegmentationConfig {
    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings::new(self.model.clone(), self.temperature, self.max_tokens)
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            model: default_segmentation_model(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
        }
    }
}

/// Batch evaluation settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EvaluationConfig {
    /// Rows evaluated at once; 1 keeps rows strictly sequential
    #[serde(default = "default_concurrent_rows")]
    pub concurrent_rows: usize,

    /// Language reviews are written in
    #[serde(default = "default_review_language")]
    pub review_language: String,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            concurrent_rows: default_concurrent_rows(),
            review_language: default_review_language(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "English".to_string()
}

fn default_target_language() -> String {
    "Japanese".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo-0125".to_string()
}

fn default_segmentation_model() -> String {
    "gpt-3.5-turbo-0125".to_string()
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_input_chars() -> usize {
    3000
}

fn default_concurrent_rows() -> usize {
    1
}

fn default_review_language() -> String {
    "English".to_string()
}

impl Config {
    /// Load the configuration at `path`, writing a default one if it is missing.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let file = File::open(path).context(format!("Failed to open config file: {:?}", path))?;
            let reader = BufReader::new(file);
            let config: Config =
                serde_json::from_reader(reader).context(format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        let config_json =
            serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json).context(format!("Failed to write default config to file: {:?}", path))?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        LanguageTag::resolve(&self.source_language).context("Invalid source language")?;
        LanguageTag::resolve(&self.target_language).context("Invalid target language")?;
        LanguageTag::resolve(&self.evaluation.review_language).context("Invalid review language")?;

        for (name, temperature) in [
            ("llm.temperature", self.llm.temperature),
            ("segmentation.temperature", self.segmentation.temperature),
        ] {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(anyhow!("{} must be between 0.0 and 2.0, got {}", name, temperature));
            }
        }

        if self.llm.model.trim().is_empty() || self.segmentation.model.trim().is_empty() {
            return Err(anyhow!("Model name must not be empty"));
        }
        if self.llm.max_tokens == 0 || self.segmentation.max_tokens == 0 {
            return Err(anyhow!("max_tokens must be greater than 0"));
        }
        if self.llm.timeout_secs == 0 {
            return Err(anyhow!("llm.timeout_secs must be greater than 0"));
        }
        if self.llm.max_input_chars == 0 {
            return Err(anyhow!("llm.max_input_chars must be greater than 0"));
        }
        if self.evaluation.concurrent_rows == 0 {
            return Err(anyhow!("evaluation.concurrent_rows must be at least 1"));
        }
        if !self.llm.endpoint.is_empty() {
            Url::parse(&self.llm.endpoint).context(format!("Invalid llm.endpoint: {}", self.llm.endpoint))?;
        }

        Ok(())
    }

    /// Resolved source language
    pub fn source_tag(&self) -> Result<LanguageTag> {
        Ok(LanguageTag::resolve(&self.source_language)?)
    }

    /// Resolved target language
    pub fn target_tag(&self) -> Result<LanguageTag> {
        Ok(LanguageTag::resolve(&self.target_language)?)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            llm: LlmConfig::default(),
            segmentation: SegmentationConfig::default(),
            evaluation: EvaluationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
