/*!
 * Prompt templates for translation.
 *
 * The system template is filled with the language names, an output-format
 * instruction and a worked example. Examples for sentence-aligned output are
 * looked up by ordered language pair so a new pair is one table entry.
 */

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::language_utils::LanguageTag;

/// Reply key holding the translation
pub const TRANSLATED_KEY: &str = "translated_texts";

/// System prompt shared by both output formats.
pub const SYSTEM_TEMPLATE: &str = "You are a professional translator who translates {source_language} into {target_language}.\n\
Based on the given constraints and input text, please output the translation result.\n\
# Constraints:\n\
{output_format}\
- Please refer to the following output format.\n\
{example}";

/// Human prompt shared by translation and segmentation.
pub const HUMAN_TEMPLATE: &str = "# Input text:\n{text}\n # Output text:\n";

const TEXT_OUTPUT_FORMAT: &str =
    "- The result should be in json format with the key \"translated_texts\" and the translated result as its value.\n";

const TABLE_OUTPUT_FORMAT: &str = "- The outcome should be in JSON format.\n\
- The input is a JSON array of sentences. Translate each sentence and store the results, in the same order and with the same number of elements, in an array under the key \"translated_texts\".\n";

const TEXT_EXAMPLE: &str = "```json\n\
{\n  \"translated_texts\": \"Hello, how are you? I'm fine, thank you.\"\n}\n\
```\n";

const GENERIC_TABLE_EXAMPLE: &str = "```input (array)\n\
[\"<sentence 1>\", \"<sentence 2>\", \"<sentence 3>\"]\n\
```\n\
``` output (json)\n\
{\n  \"translated_texts\": [\n    \"<translation of sentence 1>\",\n    \"<translation of sentence 2>\",\n    \"<translation of sentence 3>\"\n  ]\n}\n\
```\n";

const EXAMPLE_EN_TO_JA: &str = "```input (array)\n\
[\"Hello, how are you?\", \"I'm fine, thank you.\", \"Hello, world!\"]\n\
```\n\
``` output (json)\n\
{\n  \"translated_texts\": [\n    \"こんにちは、お元気ですか？\",\n    \"元気です、ありがとう。\",\n    \"こんにちは、世界！\"\n  ]\n}\n\
```\n";

const EXAMPLE_JA_TO_EN: &str = "```input (array)\n\
[\"こんにちは、お元気ですか？\", \"元気です、ありがとう。\", \"こんにちは、世界！\"]\n\
```\n\
``` output (json)\n\
{\n  \"translated_texts\": [\n    \"Hello, how are you?\",\n    \"I'm fine, thank you.\",\n    \"Hello, world!\"\n  ]\n}\n\
```\n";

const EXAMPLE_EN_TO_FR: &str = "```input (array)\n\
[\"Hello, how are you?\", \"I'm fine, thank you.\", \"Hello, world!\"]\n\
```\n\
``` output (json)\n\
{\n  \"translated_texts\": [\n    \"Bonjour, comment allez-vous ?\",\n    \"Je vais bien, merci.\",\n    \"Bonjour le monde !\"\n  ]\n}\n\
```\n";

const EXAMPLE_FR_TO_EN: &str = "```input (array)\n\
[\"Bonjour, comment allez-vous ?\", \"Je vais bien, merci.\", \"Bonjour le monde !\"]\n\
```\n\
``` output (json)\n\
{\n  \"translated_texts\": [\n    \"Hello, how are you?\",\n    \"I'm fine, thank you.\",\n    \"Hello, world!\"\n  ]\n}\n\
```\n";

/// Sentence-aligned exemplars keyed by (source, target) ISO 639-2/T codes
static TABLE_EXAMPLES: Lazy<HashMap<(&'static str, &'static str), &'static str>> = Lazy::new(|| {
    HashMap::from([
        (("eng", "jpn"), EXAMPLE_EN_TO_JA),
        (("jpn", "eng"), EXAMPLE_JA_TO_EN),
        (("eng", "fra"), EXAMPLE_EN_TO_FR),
        (("fra", "eng"), EXAMPLE_FR_TO_EN),
    ])
});

/// Shape of the translation the model must return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One string for the whole text
    Text,
    /// One string per source sentence
    #[default]
    Table,
}

impl OutputFormat {
    /// Output-format instruction for the system prompt
    pub fn instruction(&self) -> &'static str {
        match self {
            OutputFormat::Text => TEXT_OUTPUT_FORMAT,
            OutputFormat::Table => TABLE_OUTPUT_FORMAT,
        }
    }
}

/// Worked example for a language pair and output format.
pub fn example_for(source: &LanguageTag, target: &LanguageTag, format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Text => TEXT_EXAMPLE,
        OutputFormat::Table => TABLE_EXAMPLES
            .get(&(source.code(), target.code()))
            .copied()
            .unwrap_or(GENERIC_TABLE_EXAMPLE),
    }
}
