/*!
 * Common test utilities for the llmtrans test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use llmtrans::language_utils::LanguageTag;
use llmtrans::llm::gateway::{Gateway, ModelSettings};
use llmtrans::providers::mock::MockProvider;

/// Routes library log output through the test harness; safe to call repeatedly
pub fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Wraps a mock in a gateway, keeping a handle for assertions
pub fn mock_gateway(mock: MockProvider) -> (Gateway, Arc<MockProvider>) {
    let mock = Arc::new(mock);
    (Gateway::new(mock.clone()), mock)
}

/// Model settings used throughout the tests
pub fn test_settings() -> ModelSettings {
    ModelSettings::new("gpt-3.5-turbo-0125", 0.0, 2000)
}

/// Resolves a language that is known to exist
pub fn tag(language: &str) -> LanguageTag {
    LanguageTag::resolve(language).unwrap()
}

/// A QA reply with every axis set to `score`
pub fn qa_reply(score: u8, review: &str) -> String {
    format!(
        r#"{{"accuracy": {s}, "grammar": {s}, "fluency": {s}, "cultural": {s}, "style": {s}, "error": {s}, "review": "{r}"}}"#,
        s = score,
        r = review
    )
}

/// A comparison reply with the given winner codes
pub fn comparison_reply(accuracy: u8, grammar: u8, total: u8, review: &str) -> String {
    format!(
        r#"{{"accuracy": {}, "grammar": {}, "total": {}, "review": "{}"}}"#,
        accuracy, grammar, total, review
    )
}
