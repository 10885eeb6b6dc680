use log::{info, warn};

use crate::errors::CoreError;
use crate::evaluation::rubric::{self, ComparisonScores};
use crate::evaluation::{
    ComparisonRecord, ComparisonRow, EvaluationReport, EvaluationSettings, ProgressCallback, RowOutcome, RowResult,
    check_batch, run_rows,
};
use crate::llm::gateway::Gateway;
use crate::llm::template::{PromptTemplate, PromptVars};
use crate::llm::usage::Usage;

#[derive(Debug, serde::Deserialize)]
struct ComparisonReply {
    #[serde(flatten)]
    scores: ComparisonScores,
    review: String,
}

/// Compares two engines' translations row by row
#[derive(Clone)]
pub struct ComparisonEvaluator {
    gateway: Gateway,
    settings: EvaluationSettings,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for ComparisonEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparisonEvaluator")
            .field("gateway", &self.gateway)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ComparisonEvaluator {
    pub fn new(gateway: Gateway, settings: EvaluationSettings) -> Self {
        Self {
            gateway,
            settings,
            progress: None,
        }
    }

    /// Report progress as rows finish
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Compare every complete row of `rows`.
    ///
    /// Fails before any exchange when the languages match or `rows` is empty.
    pub async fn evaluate(&self, rows: Vec<ComparisonRow>) -> Result<EvaluationReport<ComparisonRecord>, CoreError> {
        check_batch(&self.settings, rows.len())?;
        info!(
            "Comparing {} row(s) {} -> {} with {}",
            rows.len(),
            self.settings.source,
            self.settings.target,
            self.settings.model.model
        );

        let report = run_rows(
            rows,
            ComparisonRow::is_complete,
            self.settings.concurrency,
            self.progress.as_ref(),
            |row| self.compare_row(row),
        )
        .await;

        info!(
            "Comparison finished: {} row(s), {} failed, {} skipped",
            report.records.len(),
            report.failed,
            report.skipped
        );
        Ok(report)
    }

    async fn compare_row(&self, row: ComparisonRow) -> RowResult<ComparisonRecord> {
        let vars = PromptVars::new()
            .with("source_language", self.settings.source.name())
            .with("target_language", self.settings.target.name())
            .with("review_language", self.settings.review_language.as_str())
            .with("source", row.source.as_str())
            .with("target1", row.target1.as_str())
            .with("target2", row.target2.as_str());

        let reply = self
            .gateway
            .invoke_structured(
                &self.settings.model,
                &PromptTemplate::new(rubric::COMPARISON_SYSTEM_TEMPLATE),
                &PromptTemplate::new(rubric::COMPARISON_HUMAN_TEMPLATE),
                &vars,
            )
            .await;

        let (outcome, usage) = match reply {
            Ok(reply) => {
                let outcome = match reply.decode::<ComparisonReply>(&rubric::comparison_schema()) {
                    Ok(r) => RowOutcome::Scored {
                        scores: r.scores,
                        review: r.review,
                    },
                    Err(violation) => RowOutcome::Failed {
                        reason: violation.to_string(),
                    },
                };
                (outcome, reply.usage)
            }
            Err(e) => (RowOutcome::Failed { reason: e.to_string() }, Usage::zero()),
        };

        if let RowOutcome::Failed { reason } = &outcome {
            warn!("Comparison row failed ({}): {}", reason, row.source);
        }

        RowResult {
            failed: outcome.is_failed(),
            record: ComparisonRecord {
                source: row.source,
                target1: row.target1,
                target2: row.target2,
                outcome,
            },
            usage,
        }
    }
}
