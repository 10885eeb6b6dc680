/*!
 * Sentence segmentation.
 *
 * Text in a language with a rule-based splitter (see [`rules`]) is split
 * locally at no cost. Anything else is segmented by the model through the
 * gateway, with the reply checked against a one-key schema.
 */

pub mod rules;

use log::{debug, warn};
use serde::Deserialize;

use crate::errors::GatewayError;
use crate::language_utils::LanguageTag;
use crate::llm::gateway::{Gateway, ModelSettings};
use crate::llm::structured::{ReplySchema, SchemaViolation};
use crate::llm::template::{PromptTemplate, PromptVars};
use crate::llm::usage::Usage;
use crate::translation::prompts::HUMAN_TEMPLATE;
use crate::translation::result::{ErrorKind, ResultError};

pub use rules::RuleSplitter;

/// Reply key holding the sentence array
pub const SPLIT_KEY: &str = "split_sentences";

const SYSTEM_TEMPLATE: &str = "Split input text with delimiters and line feed codes.\n\
Based on the given constraints and input text, output the text segmentation results.\n\
# Constraints:\n{constraints}";

const CONSTRAINTS: &str = "- The result must be in json format with a unique key, where the key is \"split_sentences\" and the values must be separated by an array of sentences.\n\
- No key other than \"split_sentences\" may be used.\n\
- Please refer to the following output format.\n\
``` input format (string)\n\
Hi, how are you? Not bad.\nThis is a test.\n\
```\n\
```json\n\
{\n  \"split_sentences\": [\"Hi, how are you?\", \"Not bad.\", \"This is a test.\"]\n}\n\
```";

#[derive(Debug, Deserialize)]
struct SplitReply {
    split_sentences: Vec<String>,
}

/// Outcome of splitting one text into sentences
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationResult {
    /// Sentences in original order
    pub sentences: Vec<String>,
    /// Cost and tokens, zero for the rule path
    pub usage: Usage,
    /// Failure, if any
    pub error: Option<ResultError>,
}

impl SegmentationResult {
    fn success(sentences: Vec<String>, usage: Usage) -> Self {
        Self {
            sentences,
            usage,
            error: None,
        }
    }

    fn failure(error: ResultError, usage: Usage) -> Self {
        Self {
            sentences: Vec::new(),
            usage,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Sentences as a JSON array string
    pub fn dump(&self) -> String {
        serde_json::to_string(&self.sentences).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Splits text into sentences, by rule or by model.
#[derive(Debug, Clone)]
pub struct Segmenter {
    gateway: Gateway,
    settings: ModelSettings,
}

impl Segmenter {
    /// Create a segmenter that uses `settings` for model-based splitting
    pub fn new(gateway: Gateway, settings: ModelSettings) -> Self {
        Self { gateway, settings }
    }

    /// Split `text` written in `language`.
    ///
    /// Only provider failures are returned as `Err`; malformed replies come
    /// back as a failed [`SegmentationResult`].
    pub async fn split(&self, language: &LanguageTag, text: &str) -> Result<SegmentationResult, GatewayError> {
        match RuleSplitter::for_language(language) {
            Some(splitter) => {
                debug!("Splitting {} text by rule", language);
                Ok(Self::split_by_rules(&splitter, text))
            }
            None => {
                debug!("Splitting {} text with {}", language, self.settings.model);
                self.split_by_model(text).await
            }
        }
    }

    /// Rule-based split. Never fails and costs nothing.
    pub fn split_by_rules(splitter: &RuleSplitter, text: &str) -> SegmentationResult {
        SegmentationResult::success(splitter.split(text), Usage::zero())
    }

    /// Model-based split of `text` after removing blank lines.
    pub async fn split_by_model(&self, text: &str) -> Result<SegmentationResult, GatewayError> {
        let vars = PromptVars::new()
            .with("constraints", CONSTRAINTS)
            .with("text", remove_blank_lines(text));

        let reply = self
            .gateway
            .invoke_structured(
                &self.settings,
                &PromptTemplate::new(SYSTEM_TEMPLATE),
                &PromptTemplate::new(HUMAN_TEMPLATE),
                &vars,
            )
            .await?;

        let schema = ReplySchema::new().text_list(SPLIT_KEY);
        let result = match reply.decode::<SplitReply>(&schema).map(|split| non_blank(split.split_sentences)) {
            Ok(sentences) if sentences.is_empty() => SegmentationResult::failure(
                ResultError::new(ErrorKind::SplitWrongShape, "Output format is an empty list"),
                reply.usage,
            ),
            Ok(sentences) => SegmentationResult::success(sentences, reply.usage),
            Err(violation @ SchemaViolation::MissingKey(_)) => SegmentationResult::failure(
                ResultError::new(ErrorKind::MissingSplitKey, violation.to_string()),
                reply.usage,
            ),
            Err(violation) => SegmentationResult::failure(
                ResultError::new(ErrorKind::SplitWrongShape, violation.to_string()),
                reply.usage,
            ),
        };

        if let Some(error) = &result.error {
            warn!("Sentence segmentation failed: {}", error);
        }
        Ok(result)
    }
}

fn non_blank(sentences: Vec<String>) -> Vec<String> {
    sentences.into_iter().filter(|s| !s.trim().is_empty()).collect()
}

/// Drop lines that are empty or whitespace only
pub fn remove_blank_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
