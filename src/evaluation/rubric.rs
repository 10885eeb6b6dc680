/*!
 * Scoring rubrics and reply schemas for the evaluators.
 *
 * QA axes are integers 0-2 where higher is better. The `error` axis follows
 * the same direction: 2 means no error was found. Comparison axes are winner
 * codes: 0 = tie, 1 = engine 1 better, 2 = engine 2 better.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::llm::structured::ReplySchema;

/// QA score axes, in output column order
pub const QA_AXES: [&str; 6] = ["accuracy", "grammar", "fluency", "cultural", "style", "error"];

/// Comparison axes, in output column order
pub const COMPARISON_AXES: [&str; 3] = ["accuracy", "grammar", "total"];

/// Reply key holding the free-text review
pub const REVIEW_KEY: &str = "review";

pub const QA_SYSTEM_TEMPLATE: &str = "You are a reviewer assessing the quality of a translation.\n\
The following tsv row contains a source text in {source_language} and its translation into {target_language}.\n\
Score the translation on each axis below with an integer 0, 1 or 2, where a higher score is better.\n\
- accuracy: 0 = meaning is lost or changed, 1 = minor omissions or distortions, 2 = meaning fully preserved\n\
- grammar: 0 = ungrammatical, 1 = minor grammatical mistakes, 2 = grammatically correct\n\
- fluency: 0 = unnatural and hard to read, 1 = understandable but awkward, 2 = reads naturally\n\
- cultural: 0 = culturally inappropriate, 1 = partly adapted to the target culture, 2 = fully appropriate\n\
- style: 0 = register or tone does not match, 1 = partly matches, 2 = matches the source\n\
- error: 0 = critical mistranslation, 1 = minor error, 2 = no error\n\
- review: a concrete review of the translation written in {review_language}\n\
The output must be json in the following format and must not contain any other keys.\n\
```json\n\
{{\"accuracy\": 0, \"grammar\": 0, \"fluency\": 0, \"cultural\": 0, \"style\": 0, \"error\": 0, \"review\": \"...\"}}\n\
```\n";

pub const QA_HUMAN_TEMPLATE: &str = "```tsv\n\
source\ttarget\n\
{source}\t{target}\n\
```\n";

pub const COMPARISON_SYSTEM_TEMPLATE: &str = "Evaluate which of two translation engines produced the better translation.\n\
The following tsv row contains a source text, the translation by engine 1 and the translation by engine 2.\n\
The source text is in {source_language} and the translations are in {target_language}.\n\
Judge translation accuracy (accuracy), grammatical structure (grammar) and the overall verdict (total).\n\
- accuracy: 0 = equal, 1 = engine 1 is better, 2 = engine 2 is better\n\
- grammar: 0 = equal, 1 = engine 1 is better, 2 = engine 2 is better\n\
- total: 0 = equal, 1 = engine 1 is better, 2 = engine 2 is better\n\
- review: a concrete review of both translations written in {review_language}\n\
The output must be json in the following format and must not contain any other keys.\n\
```json\n\
{{\"accuracy\": 0 or 1 or 2, \"grammar\": 0 or 1 or 2, \"total\": 0 or 1 or 2, \"review\": \"...\"}}\n\
```\n";

pub const COMPARISON_HUMAN_TEMPLATE: &str = "```tsv\n\
source\tengine 1\tengine 2\n\
{source}\t{target1}\t{target2}\n\
```\n";

/// Schema of a QA reply: six scores plus review
pub fn qa_schema() -> ReplySchema {
    QA_AXES
        .into_iter()
        .fold(ReplySchema::new(), |schema, axis| schema.score(axis, 0, 2))
        .text(REVIEW_KEY)
}

/// Schema of a comparison reply: three winner codes plus review
pub fn comparison_schema() -> ReplySchema {
    COMPARISON_AXES
        .into_iter()
        .fold(ReplySchema::new(), |schema, axis| schema.score(axis, 0, 2))
        .text(REVIEW_KEY)
}

/// Scores of one successfully evaluated QA row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaScores {
    pub accuracy: u8,
    pub grammar: u8,
    pub fluency: u8,
    pub cultural: u8,
    pub style: u8,
    /// 0 = critical mistranslation, 1 = minor error, 2 = no error
    pub error: u8,
}

impl QaScores {
    /// Scores in [`QA_AXES`] order
    pub fn values(&self) -> [u8; 6] {
        [self.accuracy, self.grammar, self.fluency, self.cultural, self.style, self.error]
    }
}

/// Which engine won an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Winner {
    Tie,
    Engine1,
    Engine2,
}

impl Winner {
    /// Wire code: 0, 1 or 2
    pub fn code(&self) -> i8 {
        match self {
            Winner::Tie => 0,
            Winner::Engine1 => 1,
            Winner::Engine2 => 2,
        }
    }
}

impl TryFrom<u8> for Winner {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Winner::Tie),
            1 => Ok(Winner::Engine1),
            2 => Ok(Winner::Engine2),
            other => Err(format!("invalid winner code {}", other)),
        }
    }
}

impl From<Winner> for u8 {
    fn from(winner: Winner) -> u8 {
        winner.code() as u8
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Winner per axis of one successfully compared row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonScores {
    pub accuracy: Winner,
    pub grammar: Winner,
    pub total: Winner,
}

impl ComparisonScores {
    /// Winners in [`COMPARISON_AXES`] order
    pub fn values(&self) -> [Winner; 3] {
        [self.accuracy, self.grammar, self.total]
    }
}
