/*!
 * Result values for translation and segmentation.
 *
 * Malformed model output never travels as an `Err`; it is folded into these
 * values as a [`ResultError`] with a stable [`ErrorKind`] code that front
 * ends can branch on.
 */

use serde::Serialize;
use std::error::Error;
use std::fmt;

use crate::llm::usage::Usage;

/// Stable failure codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// The reply has no `translated_texts` key (or was unparsable)
    MissingTranslatedKey,
    /// Table mode: `translated_texts` is not a list of strings
    ResultNotList,
    /// Text mode: `translated_texts` is not a string
    ResultNotString,
    /// The segmentation reply has no `split_sentences` key
    MissingSplitKey,
    /// `split_sentences` is not a non-empty array of strings
    SplitWrongShape,
    /// Source and translated sentence counts differ
    AlignmentMismatch,
    /// Segmentation failed, so nothing was translated
    SegmentationFailed,
}

impl ErrorKind {
    /// External code, e.g. `e0200`
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::MissingTranslatedKey => "e0000",
            ErrorKind::ResultNotList => "e0001",
            ErrorKind::ResultNotString => "e0002",
            ErrorKind::MissingSplitKey => "e0100",
            ErrorKind::SplitWrongShape => "e0101",
            ErrorKind::AlignmentMismatch => "e0200",
            ErrorKind::SegmentationFailed => "e0201",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A typed failure carried inside a result value
#[derive(Debug, Clone, PartialEq)]
pub struct ResultError {
    /// Failure code
    pub kind: ErrorKind,
    /// Human readable message
    pub message: String,
    /// Failure this one was chained from
    pub cause: Option<Box<ResultError>>,
}

impl fmt::Display for ResultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

// The cause is handed out unboxed so callers can downcast it to `ResultError`.
impl Error for ResultError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|cause| cause as &(dyn Error + 'static))
    }
}

impl ResultError {
    /// Create an unchained error
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Chain this error from an earlier one
    pub fn caused_by(mut self, cause: ResultError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

/// Outcome of one translate call.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationResult {
    source_texts: Vec<String>,
    translated_texts: Vec<String>,
    usage: Usage,
    error: Option<ResultError>,
}

impl TranslationResult {
    pub(crate) fn success(translated_texts: Vec<String>, usage: Usage) -> Self {
        Self {
            source_texts: Vec::new(),
            translated_texts,
            usage,
            error: None,
        }
    }

    pub(crate) fn failure(error: ResultError, usage: Usage) -> Self {
        Self {
            source_texts: Vec::new(),
            translated_texts: Vec::new(),
            usage,
            error: Some(error),
        }
    }

    /// Downgrade to failure, keeping translated units and usage
    pub(crate) fn fail_with(mut self, error: ResultError) -> Self {
        self.error = Some(error);
        self
    }

    pub(crate) fn attach_source_texts(&mut self, source_texts: Vec<String>) {
        self.source_texts = source_texts;
    }

    pub(crate) fn add_usage(&mut self, usage: Usage) {
        self.usage += usage;
    }

    /// Source sentences, empty until segmentation output is attached
    pub fn source_texts(&self) -> &[String] {
        &self.source_texts
    }

    /// Translated units, in order
    pub fn translated_texts(&self) -> &[String] {
        &self.translated_texts
    }

    /// Whether the call succeeded
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn usage(&self) -> Usage {
        self.usage
    }

    pub fn cost(&self) -> f64 {
        self.usage.cost
    }

    pub fn tokens(&self) -> u64 {
        self.usage.tokens
    }

    pub fn error(&self) -> Option<&ResultError> {
        self.error.as_ref()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }

    /// Error message, empty on success
    pub fn error_message(&self) -> &str {
        self.error.as_ref().map(|e| e.message.as_str()).unwrap_or("")
    }

    /// Whether source and translated unit counts agree
    pub fn is_aligned(&self) -> bool {
        self.source_texts.len() == self.translated_texts.len()
    }

    /// Source/translation pairs, in order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.source_texts
            .iter()
            .zip(self.translated_texts.iter())
            .map(|(s, t)| (s.as_str(), t.as_str()))
    }

    /// Translated units joined by line feeds
    pub fn joined_translation(&self) -> String {
        self.translated_texts.join("\n")
    }
}
