/*!
 * Error types for the llmtrans application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 *
 * Only configuration errors and transport failures travel as `Err` values.
 * Malformed model output never does: it is folded into the failure fields of
 * the returned result objects instead.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors raised while rendering a prompt template
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A placeholder has no value in the supplied variables
    #[error("Missing template variable: {0}")]
    MissingVariable(String),

    /// An unmatched brace that is neither a placeholder nor an escape
    #[error("Malformed template: unmatched brace at byte {position}")]
    Malformed {
        /// Byte offset of the offending brace
        position: usize,
    },
}

/// Errors from a single model exchange
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The prompt could not be rendered, nothing was sent
    #[error("Prompt error: {0}")]
    Template(#[from] TemplateError),

    /// The provider call itself failed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Caller setup errors. These are fatal and never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// No API credential in the process environment
    #[error("{var} is not set.")]
    MissingApiKey {
        /// Environment variable that was looked up
        var: String,
    },

    /// Source and target language resolve to the same language
    #[error("Source language and target language must be different ({language}).")]
    SameLanguage {
        /// The shared language
        language: String,
    },

    /// Nothing to translate or evaluate
    #[error("Please input text.")]
    EmptyInput,

    /// A language name or code that could not be resolved
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    /// Any other out-of-range or inconsistent setting
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

/// Errors reading delimited input tables
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// A row does not have the expected number of columns
    #[error("Row {row} has {found} column(s), expected {expected}")]
    WrongColumnCount {
        /// 1-based row number
        row: usize,
        /// Columns required
        expected: usize,
        /// Columns present
        found: usize,
    },

    /// A quoted field is never closed
    #[error("Unterminated quoted field in row {row}")]
    UnterminatedQuote {
        /// 1-based row number
        row: usize,
    },
}

/// Errors that cross the pipeline and evaluator boundaries
#[derive(Error, Debug)]
pub enum CoreError {
    /// Caller setup error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Transport or prompt rendering failure
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

impl From<ProviderError> for CoreError {
    fn from(error: ProviderError) -> Self {
        Self::Gateway(GatewayError::Provider(error))
    }
}

impl From<TemplateError> for CoreError {
    fn from(error: TemplateError) -> Self {
        Self::Gateway(GatewayError::Template(error))
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the translation or evaluation core
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// Error from configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from an input table
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
