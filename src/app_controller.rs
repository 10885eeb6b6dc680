use anyhow::{Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::io::Write;
use std::sync::Arc;

use crate::app_config::Config;
use crate::errors::ConfigError;
use crate::evaluation::{
    ComparisonEvaluator, ComparisonRecord, ComparisonRow, EvaluationReport, EvaluationSettings, QaRow, QaScoreRecord,
    QualityEvaluator,
};
use crate::llm::gateway::Gateway;
use crate::llm::usage::CostTracker;
use crate::table_io;
use crate::translation::{ErrorKind, OutputFormat, TranslationResult, Translator};

/// Main application controller for translate, QA and compare runs
///
/// Owns the running cost total. The pipelines and evaluators only return the
/// usage of each call; the controller adds it here.
#[derive(Debug)]
pub struct Controller {
    config: Config,
    gateway: Gateway,
    costs: CostTracker,
}

impl Controller {
    /// Create a controller, building the provider from the configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let gateway = Gateway::from_config(&config.llm)?;
        Ok(Self::with_gateway(config, gateway))
    }

    /// Create a controller around an existing gateway
    pub fn with_gateway(config: Config, gateway: Gateway) -> Self {
        Self {
            config,
            gateway,
            costs: CostTracker::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Running cost total
    pub fn costs(&self) -> &CostTracker {
        &self.costs
    }

    fn translator(&self) -> Translator {
        Translator::new(
            self.gateway.clone(),
            self.config.llm.model_settings(),
            self.config.segmentation.model_settings(),
        )
    }

    fn evaluation_settings(&self) -> Result<EvaluationSettings> {
        Ok(EvaluationSettings::new(
            self.config.source_tag()?,
            self.config.target_tag()?,
            self.config.llm.model_settings(),
        )
        .review_language(self.config.evaluation.review_language.clone())
        .concurrency(self.config.evaluation.concurrent_rows))
    }

    /// Translate `text` and write the result to `out`.
    ///
    /// Text mode writes the translation. Table mode writes a TSV of
    /// source/target pairs, or the untabulated translation when the sentence
    /// counts do not line up. Other failures are returned as errors.
    pub async fn run_translate<W: Write>(
        &mut self,
        text: &str,
        format: OutputFormat,
        out: &mut W,
    ) -> Result<TranslationResult> {
        let max_chars = self.config.llm.max_input_chars;
        let length = text.chars().count();
        if length > max_chars {
            return Err(ConfigError::InvalidSetting(format!(
                "Input is {} characters, the limit is {}",
                length, max_chars
            ))
            .into());
        }

        let source = self.config.source_tag()?;
        let target = self.config.target_tag()?;

        let spinner = ProgressBar::new_spinner();
        spinner.set_message("Translating ...");
        spinner.enable_steady_tick(std::time::Duration::from_millis(120));
        let outcome = self.translator().translate(&source, &target, text, format).await;
        spinner.finish_and_clear();

        let result = outcome?;
        self.costs.add(result.usage());

        match (format, result.error_kind()) {
            (OutputFormat::Text, None) => writeln!(out, "{}", result.joined_translation())?,
            (OutputFormat::Table, None) => table_io::write_pairs(result.pairs(), &mut *out)?,
            (_, Some(ErrorKind::AlignmentMismatch)) => {
                warn!("Could not output in table.");
                writeln!(out, "{}", result.joined_translation())?;
            }
            (_, Some(kind)) => {
                return Err(anyhow!("{} ({})", result.error_message(), kind));
            }
        }

        info!("{}", self.costs.summary());
        Ok(result)
    }

    /// Score every row of a QA table and write the report to `out`
    pub async fn run_qa<W: Write>(&mut self, rows: Vec<QaRow>, out: &mut W) -> Result<EvaluationReport<QaScoreRecord>> {
        let progress_bar = Self::rows_progress_bar(rows.len());
        let evaluator = QualityEvaluator::new(self.gateway.clone(), self.evaluation_settings()?)
            .with_progress(Self::progress_callback(&progress_bar));

        let outcome = evaluator.evaluate(rows).await;
        progress_bar.finish_and_clear();
        let report = outcome?;

        self.costs.add_calls(report.usage, report.records.len());
        table_io::write_records(&report.records, &mut *out)?;
        Self::log_report_summary(report.records.len(), report.failed, report.skipped);
        info!("{}", self.costs.summary());
        Ok(report)
    }

    /// Compare every row of a two-engine table and write the report to `out`
    pub async fn run_compare<W: Write>(
        &mut self,
        rows: Vec<ComparisonRow>,
        out: &mut W,
    ) -> Result<EvaluationReport<ComparisonRecord>> {
        let progress_bar = Self::rows_progress_bar(rows.len());
        let evaluator = ComparisonEvaluator::new(self.gateway.clone(), self.evaluation_settings()?)
            .with_progress(Self::progress_callback(&progress_bar));

        let outcome = evaluator.evaluate(rows).await;
        progress_bar.finish_and_clear();
        let report = outcome?;

        self.costs.add_calls(report.usage, report.records.len());
        table_io::write_records(&report.records, &mut *out)?;
        Self::log_report_summary(report.records.len(), report.failed, report.skipped);
        info!("{}", self.costs.summary());
        Ok(report)
    }

    fn rows_progress_bar(total: usize) -> ProgressBar {
        let progress_bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message("Evaluating");
        progress_bar
    }

    fn progress_callback(progress_bar: &ProgressBar) -> crate::evaluation::ProgressCallback {
        let progress_bar = progress_bar.clone();
        Arc::new(move |completed: usize, total: usize| {
            progress_bar.set_length(total as u64);
            progress_bar.set_position(completed as u64);
        })
    }

    fn log_report_summary(rows: usize, failed: usize, skipped: usize) {
        if failed > 0 {
            warn!("{} of {} row(s) could not be evaluated", failed, rows);
        }
        if skipped > 0 {
            info!("Skipped {} row(s) with an empty field", skipped);
        }
    }
}
