use log::{info, warn};
use serde::Deserialize;

use crate::errors::CoreError;
use crate::evaluation::rubric::{self, QaScores};
use crate::evaluation::{
    EvaluationReport, EvaluationSettings, ProgressCallback, QaRow, QaScoreRecord, RowOutcome, RowResult, check_batch,
    run_rows,
};
use crate::llm::gateway::Gateway;
use crate::llm::template::{PromptTemplate, PromptVars};
use crate::llm::usage::Usage;

#[derive(Debug, Deserialize)]
struct QaReply {
    accuracy: u8,
    grammar: u8,
    fluency: u8,
    cultural: u8,
    style: u8,
    error: u8,
    review: String,
}

/// Scores single translations row by row
#[derive(Clone)]
pub struct QualityEvaluator {
    gateway: Gateway,
    settings: EvaluationSettings,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for QualityEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QualityEvaluator")
            .field("gateway", &self.gateway)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl QualityEvaluator {
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

    /// Evaluate every complete row of `rows`.
    ///
    /// Fails before any exchange when the languages match or `rows` is empty.
    pub async fn evaluate(&self, rows: Vec<QaRow>) -> Result<EvaluationReport<QaScoreRecord>, CoreError> {
        check_batch(&self.settings, rows.len())?;
        info!(
            "Evaluating {} row(s) {} -> {} with {}",
            rows.len(),
            self.settings.source,
            self.settings.target,
            self.settings.model.model
        );

        let report = run_rows(
            rows,
            QaRow::is_complete,
            self.settings.concurrency,
            self.progress.as_ref(),
            |row| self.evaluate_row(row),
        )
        .await;

        info!(
            "QA finished: {} row(s), {} failed, {} skipped",
            report.records.len(),
            report.failed,
            report.skipped
        );
        Ok(report)
    }

    async fn evaluate_row(&self, row: QaRow) -> RowResult<QaScoreRecord> {
        let vars = PromptVars::new()
            .with("source_language", self.settings.source.name())
            .with("target_language", self.settings.target.name())
            .with("review_language", self.settings.review_language.as_str())
            .with("source", row.source.as_str())
            .with("target", row.target.as_str());

        let reply = self
            .gateway
            .invoke_structured(
                &self.settings.model,
                &PromptTemplate::new(rubric::QA_SYSTEM_TEMPLATE),
                &PromptTemplate::new(rubric::QA_HUMAN_TEMPLATE),
                &vars,
            )
            .await;

        let (outcome, usage) = match reply {
            Ok(reply) => match reply.decode::<QaReply>(&rubric::qa_schema()) {
                Ok(r) => (
                    RowOutcome::Scored {
                        scores: QaScores {
                            accuracy: r.accuracy,
                            grammar: r.grammar,
                            fluency: r.fluency,
                            cultural: r.cultural,
                            style: r.style,
                            error: r.error,
                        },
                        review: r.review,
                    },
                    reply.usage,
                ),
                Err(violation) => (
                    RowOutcome::Failed {
                        reason: violation.to_string(),
                    },
                    reply.usage,
                ),
            },
            Err(e) => (RowOutcome::Failed { reason: e.to_string() }, Usage::zero()),
        };

        if let RowOutcome::Failed { reason } = &outcome {
            warn!("QA row failed ({}): {}", reason, row.source);
        }

        RowResult {
            failed: outcome.is_failed(),
            record: QaScoreRecord {
                source: row.source,
                target: row.target,
                outcome,
            },
            usage,
        }
    }
}
