/*!
 * Tests for application configuration functionality
 */

use llmtrans::app_config::{Config, LlmProvider, LogLevel};

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "English");
    assert_eq!(config.target_language, "Japanese");
    assert_eq!(config.llm.provider, LlmProvider::OpenAI);
    assert_eq!(config.llm.model, "gpt-3.5-turbo-0125");
    assert_eq!(config.llm.temperature, 0.0);
    assert_eq!(config.llm.max_input_chars, 3000);
    assert_eq!(config.evaluation.concurrent_rows, 1);
    assert_eq!(config.evaluation.review_language, "English");
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.source_language = "xyz".to_string();
    assert!(config.validate().is_err());
    config.source_language = "en".to_string();

    config.llm.temperature = 2.5;
    assert!(config.validate().is_err());
    config.llm.temperature = 2.0;
    assert!(config.validate().is_ok());

    config.segmentation.temperature = -0.1;
    assert!(config.validate().is_err());
    config.segmentation.temperature = 0.0;

    config.llm.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
    config.llm.endpoint = "http://localhost:8080/v1".to_string();
    assert!(config.validate().is_ok());

    config.evaluation.concurrent_rows = 0;
    assert!(config.validate().is_err());
}

/// Test that a missing config file is created with defaults
#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path).unwrap();

    assert_eq!(config, Config::default());
    assert!(path.exists());
    assert_eq!(Config::load_or_create(&path).unwrap(), config);
}

/// Test that a partial config file falls back to defaults for missing fields
#[test]
fn test_load_or_create_withPartialFile_shouldFillDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{"target_language": "fr", "llm": {"provider": "anthropic", "model": "claude-3-haiku-20240307"}}"#,
    )
    .unwrap();

    let config = Config::load_or_create(&path).unwrap();

    assert_eq!(config.source_language, "English");
    assert_eq!(config.target_language, "fr");
    assert_eq!(config.llm.provider, LlmProvider::Anthropic);
    assert_eq!(config.llm.api_key_var(), "ANTHROPIC_API_KEY");
    assert_eq!(config.llm.max_tokens, 2000);
    assert_eq!(config.target_tag().unwrap().name(), "French");
}

/// Test that a malformed config file is reported
#[test]
fn test_load_or_create_withInvalidJson_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "conf.json", "{ not json").unwrap();

    assert!(Config::load_or_create(&path).is_err());
}

/// Test the model settings derived from the config
#[test]
fn test_model_settings_shouldCopyLlmFields() {
    let mut config = Config::default();
    config.llm.model = "gpt-4-0125-preview".to_string();
    config.llm.temperature = 0.7;

    let settings = config.llm.model_settings();
    assert_eq!(settings.model, "gpt-4-0125-preview");
    assert_eq!(settings.temperature, 0.7);
    assert_eq!(settings.max_tokens, 2000);
}

/// Test log level mapping
#[test]
fn test_log_level_into_level_filter_shouldMap() {
    assert_eq!(log::LevelFilter::from(LogLevel::Warn), log::LevelFilter::Warn);
    assert_eq!(log::LevelFilter::from(LogLevel::Trace), log::LevelFilter::Trace);
}
