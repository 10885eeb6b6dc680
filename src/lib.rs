/*!
 * # llmtrans - translation and translation review with LLMs
 *
 * A Rust library and CLI that translates text with a chat-completion model
 * and grades existing translations against a fixed rubric.
 *
 * ## Features
 *
 * - Translate text as one block, or sentence by sentence as an aligned table
 * - Rule-based sentence splitting for Japanese and Chinese, model-based for
 *   every other language
 * - Single-engine quality assurance on six axes
 * - Two-engine comparison on three axes
 * - Cost and token accounting for every exchange
 * - OpenAI and Anthropic providers
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `app_controller`: Runs translate, QA and compare jobs for the CLI
 * - `llm`: Prompt templates, the model gateway and structured replies:
 *   - `llm::template`: `{name}` placeholder rendering
 *   - `llm::gateway`: Renders prompts and sends them to a provider
 *   - `llm::structured`: Lenient JSON reply parsing and schema checks
 *   - `llm::usage`: Cost and token accounting
 * - `providers`: Client implementations for LLM providers:
 *   - `providers::openai`: OpenAI API client
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::mock`: Scripted provider for tests
 * - `segmentation`: Sentence splitting
 * - `translation`: The translate pipeline and its result type
 * - `evaluation`: Batch QA and comparison
 * - `table_io`: Delimited table input and TSV output
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod evaluation;
pub mod language_utils;
pub mod llm;
pub mod providers;
pub mod segmentation;
pub mod table_io;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{AppError, ConfigError, CoreError, GatewayError, ProviderError, TableError, TemplateError};
pub use evaluation::{ComparisonEvaluator, QualityEvaluator};
pub use language_utils::{LanguageTag, get_language_name, language_codes_match, normalize_to_part2t};
pub use llm::{Gateway, ModelSettings, Usage};
pub use translation::{ErrorKind, OutputFormat, TranslationResult, Translator};
