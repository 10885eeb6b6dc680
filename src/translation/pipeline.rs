/*!
 * Translation pipeline.
 *
 * Text mode is a single exchange returning one string. Table mode segments
 * the source first, translates the JSON array of sentences in one exchange
 * and checks that the model returned one translation per sentence.
 */

use log::{info, warn};
use serde::Deserialize;

use crate::errors::{ConfigError, CoreError, GatewayError};
use crate::language_utils::LanguageTag;
use crate::llm::gateway::{Gateway, ModelSettings};
use crate::llm::structured::{ReplySchema, SchemaViolation};
use crate::llm::template::{PromptTemplate, PromptVars};
use crate::segmentation::Segmenter;
use crate::translation::prompts::{self, HUMAN_TEMPLATE, OutputFormat, SYSTEM_TEMPLATE, TRANSLATED_KEY};
use crate::translation::result::{ErrorKind, ResultError, TranslationResult};

const TRANSLATE_FAILED: &str = "Failed to translate.";

#[derive(Debug, Deserialize)]
struct TextReply {
    translated_texts: String,
}

#[derive(Debug, Deserialize)]
struct TableReply {
    translated_texts: Vec<String>,
}

/// Reject calls that are caller setup errors before anything is sent.
pub fn check_request(source: &LanguageTag, target: &LanguageTag, text: &str) -> Result<(), ConfigError> {
    if source.same_language(target) {
        return Err(ConfigError::SameLanguage {
            language: source.name().to_string(),
        });
    }
    if text.trim().is_empty() {
        return Err(ConfigError::EmptyInput);
    }
    Ok(())
}

/// Translates text in text mode or sentence-aligned table mode.
#[derive(Debug, Clone)]
pub struct Translator {
    gateway: Gateway,
    segmenter: Segmenter,
    settings: ModelSettings,
}

impl Translator {
    /// Create a translator. `segmentation` settings are used only when a
    /// source language has no rule-based splitter.
    pub fn new(gateway: Gateway, settings: ModelSettings, segmentation: ModelSettings) -> Self {
        Self {
            segmenter: Segmenter::new(gateway.clone(), segmentation),
            gateway,
            settings,
        }
    }

    /// Translate `text` in the requested format.
    ///
    /// Returns `Err` only for configuration errors and provider failures;
    /// malformed replies produce a failed [`TranslationResult`].
    pub async fn translate(
        &self,
        source: &LanguageTag,
        target: &LanguageTag,
        text: &str,
        format: OutputFormat,
    ) -> Result<TranslationResult, CoreError> {
        check_request(source, target, text)?;
        info!("Translating {} -> {} ({:?} mode, {})", source, target, format, self.settings.model);

        match format {
            OutputFormat::Text => Ok(self.request_translation(source, target, text, OutputFormat::Text).await?),
            OutputFormat::Table => self.translate_by_sentence(source, target, text).await,
        }
    }

    /// Segment `text`, translate the sentence array and verify alignment.
    pub async fn translate_by_sentence(
        &self,
        source: &LanguageTag,
        target: &LanguageTag,
        text: &str,
    ) -> Result<TranslationResult, CoreError> {
        check_request(source, target, text)?;

        let segmentation = self.segmenter.split(source, text).await?;
        if let Some(error) = segmentation.error.clone() {
            return Ok(TranslationResult::failure(
                ResultError::new(ErrorKind::SegmentationFailed, TRANSLATE_FAILED).caused_by(error),
                segmentation.usage,
            ));
        }

        let mut result = self
            .request_translation(source, target, &segmentation.dump(), OutputFormat::Table)
            .await?;
        result.add_usage(segmentation.usage);

        if !result.is_success() {
            return Ok(result);
        }

        let source_count = segmentation.sentences.len();
        result.attach_source_texts(segmentation.sentences);
        if result.is_aligned() {
            return Ok(result);
        }

        warn!(
            "Alignment mismatch: {} source sentences, {} translated",
            source_count,
            result.translated_texts().len()
        );
        Ok(result.fail_with(ResultError::new(ErrorKind::AlignmentMismatch, TRANSLATE_FAILED)))
    }

    /// One translation exchange and its reply validation.
    async fn request_translation(
        &self,
        source: &LanguageTag,
        target: &LanguageTag,
        text: &str,
        format: OutputFormat,
    ) -> Result<TranslationResult, GatewayError> {
        let vars = PromptVars::new()
            .with("source_language", source.name())
            .with("target_language", target.name())
            .with("output_format", format.instruction())
            .with("example", prompts::example_for(source, target, format))
            .with("text", text);

        let reply = self
            .gateway
            .invoke_structured(
                &self.settings,
                &PromptTemplate::new(SYSTEM_TEMPLATE),
                &PromptTemplate::new(HUMAN_TEMPLATE),
                &vars,
            )
            .await?;

        let decoded = match format {
            OutputFormat::Text => reply
                .decode::<TextReply>(&ReplySchema::new().text(TRANSLATED_KEY))
                .map(|r| vec![r.translated_texts]),
            OutputFormat::Table => reply
                .decode::<TableReply>(&ReplySchema::new().text_list(TRANSLATED_KEY))
                .map(|r| r.translated_texts),
        };

        Ok(match decoded {
            Ok(translated) => TranslationResult::success(translated, reply.usage),
            Err(violation) => {
                let kind = match (&violation, format) {
                    (SchemaViolation::MissingKey(_), _) => ErrorKind::MissingTranslatedKey,
                    (_, OutputFormat::Table) => ErrorKind::ResultNotList,
                    (_, OutputFormat::Text) => ErrorKind::ResultNotString,
                };
                warn!("Translation reply rejected: {}", violation);
                TranslationResult::failure(ResultError::new(kind, violation.to_string()), reply.usage)
            }
        })
    }
}
