/*!
 * Batch evaluation of translations.
 *
 * - `qa`: scores single translations on six quality axes
 * - `compare`: picks the better of two engines' translations per axis
 * - `rubric`: prompts, schemas and score types shared by both
 *
 * Every row is attempted on its own. A row whose reply is malformed, or whose
 * exchange fails, is recorded as failed and the batch carries on. Rows with
 * an empty field are skipped and do not appear in the report.
 */

pub mod compare;
pub mod qa;
pub mod rubric;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ConfigError;
use crate::language_utils::LanguageTag;
use crate::llm::gateway::ModelSettings;
use crate::llm::usage::Usage;

pub use compare::ComparisonEvaluator;
pub use qa::QualityEvaluator;
pub use rubric::{ComparisonScores, QaScores, Winner};

/// Score written for every axis of a failed comparison row
pub const FAILED_SENTINEL: i8 = -1;

/// Review text of a failed QA row
pub const QA_FAILED_REVIEW: &str = "Quality assurance failed.";

/// Review text of a failed comparison row
pub const COMPARISON_FAILED_REVIEW: &str = "Comparison failed.";

/// Called with (completed rows, total rows) as rows finish
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Outcome of one evaluated row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RowOutcome<S> {
    /// The reply satisfied the rubric
    Scored {
        /// Axis scores
        scores: S,
        /// Free-text review
        review: String,
    },
    /// The row could not be evaluated
    Failed {
        /// Why, for logs
        reason: String,
    },
}

impl<S> RowOutcome<S> {
    pub fn is_failed(&self) -> bool {
        matches!(self, RowOutcome::Failed { .. })
    }

    pub fn scores(&self) -> Option<&S> {
        match self {
            RowOutcome::Scored { scores, .. } => Some(scores),
            RowOutcome::Failed { .. } => None,
        }
    }
}

/// One input row for single-engine QA
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaRow {
    pub source: String,
    pub target: String,
}

impl QaRow {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    fn is_complete(&self) -> bool {
        !self.source.trim().is_empty() && !self.target.trim().is_empty()
    }
}

/// One input row for two-engine comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRow {
    pub source: String,
    pub target1: String,
    pub target2: String,
}

impl ComparisonRow {
    pub fn new(source: impl Into<String>, target1: impl Into<String>, target2: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target1: target1.into(),
            target2: target2.into(),
        }
    }

    fn is_complete(&self) -> bool {
        !self.source.trim().is_empty() && !self.target1.trim().is_empty() && !self.target2.trim().is_empty()
    }
}

/// One output row of a QA table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QaScoreRecord {
    pub source: String,
    pub target: String,
    pub outcome: RowOutcome<QaScores>,
}

/// One output row of a comparison table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRecord {
    pub source: String,
    pub target1: String,
    pub target2: String,
    pub outcome: RowOutcome<ComparisonScores>,
}

/// A record that renders as one table row
pub trait TableRecord {
    /// Column names
    fn header() -> Vec<&'static str>;

    /// Cell values, one per column
    fn cells(&self) -> Vec<String>;
}

impl TableRecord for QaScoreRecord {
    fn header() -> Vec<&'static str> {
        let mut header = vec!["source", "target"];
        header.extend(rubric::QA_AXES);
        header.push(rubric::REVIEW_KEY);
        header
    }

    fn cells(&self) -> Vec<String> {
        let mut cells = vec![self.source.clone(), self.target.clone()];
        match &self.outcome {
            RowOutcome::Scored { scores, review } => {
                cells.extend(scores.values().iter().map(|v| v.to_string()));
                cells.push(review.clone());
            }
            RowOutcome::Failed { .. } => {
                cells.extend(rubric::QA_AXES.iter().map(|_| String::new()));
                cells.push(QA_FAILED_REVIEW.to_string());
            }
        }
        cells
    }
}

impl TableRecord for ComparisonRecord {
    fn header() -> Vec<&'static str> {
        let mut header = vec!["source", "target1", "target2"];
        header.extend(rubric::COMPARISON_AXES);
        header.push(rubric::REVIEW_KEY);
        header
    }

    fn cells(&self) -> Vec<String> {
        let mut cells = vec![self.source.clone(), self.target1.clone(), self.target2.clone()];
        match &self.outcome {
            RowOutcome::Scored { scores, review } => {
                cells.extend(scores.values().iter().map(|w| w.code().to_string()));
                cells.push(review.clone());
            }
            RowOutcome::Failed { .. } => {
                cells.extend(rubric::COMPARISON_AXES.iter().map(|_| FAILED_SENTINEL.to_string()));
                cells.push(COMPARISON_FAILED_REVIEW.to_string());
            }
        }
        cells
    }
}

/// Records in input order plus accumulated usage
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport<R> {
    /// One record per evaluated row, skipped rows omitted
    pub records: Vec<R>,
    /// Sum of all exchanges in the batch
    pub usage: Usage,
    /// Rows recorded as failed
    pub failed: usize,
    /// Rows skipped for an empty field
    pub skipped: usize,
}

/// Fixed configuration of one batch
#[derive(Debug, Clone)]
pub struct EvaluationSettings {
    pub source: LanguageTag,
    pub target: LanguageTag,
    pub model: ModelSettings,
    /// Language the model writes reviews in
    pub review_language: String,
    /// Rows evaluated at once; 1 is strictly sequential
    pub concurrency: usize,
}

impl EvaluationSettings {
    pub fn new(source: LanguageTag, target: LanguageTag, model: ModelSettings) -> Self {
        Self {
            source,
            target,
            model,
            review_language: "English".to_string(),
            concurrency: 1,
        }
    }

    pub fn review_language(mut self, review_language: impl Into<String>) -> Self {
        self.review_language = review_language.into();
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// One evaluated row with the usage of its exchange
struct RowResult<Rec> {
    record: Rec,
    usage: Usage,
    failed: bool,
}

/// Batch-level guard, checked before any row is processed
fn check_batch(settings: &EvaluationSettings, row_count: usize) -> Result<(), ConfigError> {
    if settings.source.same_language(&settings.target) {
        return Err(ConfigError::SameLanguage {
            language: settings.source.name().to_string(),
        });
    }
    if row_count == 0 {
        return Err(ConfigError::EmptyInput);
    }
    Ok(())
}

/// Evaluate complete rows with bounded concurrency, keeping input order.
async fn run_rows<Row, Rec, F, Fut>(
    rows: Vec<Row>,
    is_complete: fn(&Row) -> bool,
    concurrency: usize,
    progress: Option<&ProgressCallback>,
    evaluate: F,
) -> EvaluationReport<Rec>
where
    F: Fn(Row) -> Fut,
    Fut: Future<Output = RowResult<Rec>>,
{
    let total = rows.len();
    let complete: Vec<Row> = rows.into_iter().filter(is_complete).collect();
    let skipped = total - complete.len();
    let pending = complete.len();
    let done = AtomicUsize::new(0);

    let results: Vec<RowResult<Rec>> = stream::iter(complete)
        .map(|row| {
            let done = &done;
            let fut = evaluate(row);
            async move {
                let result = fut.await;
                let completed = done.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(callback) = progress {
                    callback(completed, pending);
                }
                result
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut report = EvaluationReport {
        records: Vec::with_capacity(results.len()),
        usage: Usage::zero(),
        failed: 0,
        skipped,
    };
    for result in results {
        if result.failed {
            report.failed += 1;
        }
        report.usage += result.usage;
        report.records.push(result.record);
    }
    report
}
