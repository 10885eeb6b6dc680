/*!
 * Integration tests for batch QA and engine comparison.
 */

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use llmtrans::errors::{ConfigError, CoreError, ProviderError};
use llmtrans::evaluation::{
    ComparisonEvaluator, ComparisonRow, EvaluationSettings, QaRow, QualityEvaluator, RowOutcome, TableRecord, Winner,
};
use llmtrans::providers::mock::MockProvider;

use crate::common::{comparison_reply, mock_gateway, qa_reply, tag, test_settings};

fn settings(source: &str, target: &str) -> EvaluationSettings {
    EvaluationSettings::new(tag(source), tag(target), test_settings())
}

fn qa_rows() -> Vec<QaRow> {
    vec![
        QaRow::new("Good morning.", "おはようございます。"),
        QaRow::new("Thank you.", "ありがとう。"),
        QaRow::new("See you.", "またね。"),
    ]
}

/// Test that a malformed row is recorded as failed and the batch continues
#[tokio::test]
async fn test_qa_evaluate_withOneMalformedReply_shouldFailOnlyThatRow() {
    let (gateway, mock) = mock_gateway(MockProvider::scripted([
        qa_reply(2, "Natural."),
        r#"{"accuracy": 2, "grammar": 2, "fluency": 2, "cultural": 2, "style": 2, "error": 2}"#.to_string(),
        qa_reply(1, "Casual."),
    ]));
    let evaluator = QualityEvaluator::new(gateway, settings("en", "ja"));

    let report = evaluator.evaluate(qa_rows()).await.unwrap();

    assert_eq!(mock.call_count(), 3);
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.failed, 1);
    assert_eq!(report.skipped, 0);
    assert!(report.usage.tokens > 0);

    assert!(!report.records[0].outcome.is_failed());
    assert!(report.records[1].outcome.is_failed());
    assert_eq!(report.records[1].cells()[8], "Quality assurance failed.");
    assert_eq!(report.records[2].outcome.scores().map(|s| s.fluency), Some(1));
}

/// Test that the review language and row text reach the prompt
#[tokio::test]
async fn test_qa_evaluate_shouldRenderRowIntoPrompt() {
    let (gateway, mock) = mock_gateway(MockProvider::scripted([qa_reply(2, "Bien.")]));
    let evaluator = QualityEvaluator::new(gateway, settings("English", "Japanese").review_language("French"));

    evaluator
        .evaluate(vec![QaRow::new("Hello", "こんにちは")])
        .await
        .unwrap();

    let request = &mock.requests()[0];
    assert!(request.system.contains("written in French"));
    assert!(request.system.contains("in English and its translation into Japanese"));
    assert!(request.user.contains("Hello\tこんにちは"));
}

/// Test that a score outside 0-2 fails the row
#[tokio::test]
async fn test_qa_evaluate_withOutOfRangeScore_shouldFailRow() {
    let (gateway, _) = mock_gateway(MockProvider::scripted([qa_reply(3, "Too generous.")]));
    let evaluator = QualityEvaluator::new(gateway, settings("en", "ja"));

    let report = evaluator.evaluate(vec![QaRow::new("Hi", "やあ")]).await.unwrap();

    assert_eq!(report.failed, 1);
    assert!(matches!(report.records[0].outcome, RowOutcome::Failed { .. }));
}

/// Test that rows with an empty field are skipped without an exchange
#[tokio::test]
async fn test_qa_evaluate_withEmptyField_shouldSkipRow() {
    let (gateway, mock) = mock_gateway(MockProvider::scripted([qa_reply(2, "Fine.")]));
    let evaluator = QualityEvaluator::new(gateway, settings("en", "ja"));

    let report = evaluator
        .evaluate(vec![QaRow::new("Hi", "  "), QaRow::new("Hello", "こんにちは")])
        .await
        .unwrap();

    assert_eq!(mock.call_count(), 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].source, "Hello");
}

/// Test batch guards
#[tokio::test]
async fn test_qa_evaluate_withSameLanguageOrNoRows_shouldFailBeforeAnyExchange() {
    let (gateway, mock) = mock_gateway(MockProvider::scripted(Vec::<String>::new()));

    let same = QualityEvaluator::new(gateway.clone(), settings("ja", "Japanese"))
        .evaluate(qa_rows())
        .await;
    assert!(matches!(same, Err(CoreError::Config(ConfigError::SameLanguage { .. }))));

    let empty = QualityEvaluator::new(gateway, settings("en", "ja")).evaluate(Vec::new()).await;
    assert!(matches!(empty, Err(CoreError::Config(ConfigError::EmptyInput))));

    assert_eq!(mock.call_count(), 0);
}

/// Test that a provider failure is isolated to its row
#[tokio::test]
async fn test_qa_evaluate_withProviderFailure_shouldFailOnlyThatRow() {
    let (gateway, _) = mock_gateway(MockProvider::scripted_results(vec![
        Ok(qa_reply(2, "Good.")),
        Err(ProviderError::RateLimitExceeded("slow down".to_string())),
        Ok(qa_reply(2, "Good.")),
    ]));
    let evaluator = QualityEvaluator::new(gateway, settings("en", "ja"));

    let report = evaluator.evaluate(qa_rows()).await.unwrap();

    assert_eq!(report.failed, 1);
    assert!(report.records[1].outcome.is_failed());
    assert!(!report.records[2].outcome.is_failed());
}

/// Test winner codes and the failed-row sentinel
#[tokio::test]
async fn test_compare_evaluate_shouldRecordWinnersAndSentinel() {
    let (gateway, mock) = mock_gateway(MockProvider::scripted([
        comparison_reply(1, 0, 1, "Engine 1 keeps the nuance."),
        "I think engine 2 is better.".to_string(),
    ]));
    let evaluator = ComparisonEvaluator::new(gateway, settings("en", "ja"));

    let report = evaluator
        .evaluate(vec![
            ComparisonRow::new("Yes, sir.", "はい、先生。", "はい。"),
            ComparisonRow::new("No.", "いいえ。", "ダメ。"),
        ])
        .await
        .unwrap();

    assert_eq!(mock.call_count(), 2);
    assert_eq!(report.failed, 1);

    let scores = report.records[0].outcome.scores().copied().unwrap();
    assert_eq!(scores.accuracy, Winner::Engine1);
    assert_eq!(scores.grammar, Winner::Tie);
    assert_eq!(scores.total, Winner::Engine1);

    assert_eq!(
        report.records[1].cells(),
        vec!["No.", "いいえ。", "ダメ。", "-1", "-1", "-1", "Comparison failed."]
    );
    assert!(mock.requests()[0].user.contains("Yes, sir.\tはい、先生。\tはい。"));
}

/// Test that concurrent rows come back in input order even when later rows finish first
#[tokio::test]
async fn test_compare_evaluate_withConcurrency_shouldKeepInputOrder() {
    let finished = Arc::new(Mutex::new(Vec::new()));
    let seen = finished.clone();
    let mock = MockProvider::with_responder(move |request| {
        let row = row_index(&request.user);
        seen.lock().unwrap().push(row);
        let winner = if row % 2 == 1 { 1 } else { 2 };
        Ok(comparison_reply(winner, winner, winner, &format!("row {}", row)))
    })
    // Earlier rows answer more slowly
    .with_latency(|request| (8 - row_index(&request.user) as u64) * 15);
    let (gateway, _) = mock_gateway(mock);
    let evaluator = ComparisonEvaluator::new(gateway, settings("en", "ja").concurrency(4));

    let rows = (0..8)
        .map(|i| ComparisonRow::new(format!("row-{}", i), "a", "b"))
        .collect::<Vec<_>>();
    let report = evaluator.evaluate(rows).await.unwrap();

    let finished = finished.lock().unwrap().clone();
    assert_eq!(finished.len(), 8);
    assert_ne!(finished, (0..8).collect::<Vec<_>>());
    assert_eq!(finished[0], 3);

    assert_eq!(report.records.len(), 8);
    for (i, record) in report.records.iter().enumerate() {
        let expected = if i % 2 == 1 { Winner::Engine1 } else { Winner::Engine2 };
        assert_eq!(record.source, format!("row-{}", i));
        assert_eq!(record.outcome.scores().map(|s| s.total), Some(expected));
        assert_eq!(record.cells().last().map(String::as_str), Some(format!("row {}", i).as_str()));
    }
}

fn row_index(prompt: &str) -> usize {
    (0..8).find(|i| prompt.contains(&format!("row-{}\t", i))).unwrap_or(0)
}

/// Test the progress callback
#[tokio::test]
async fn test_qa_evaluate_withProgress_shouldReportEveryRow() {
    let (gateway, _) = mock_gateway(MockProvider::with_responder(|_| Ok(qa_reply(2, "ok"))));
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let evaluator = QualityEvaluator::new(gateway, settings("en", "ja")).with_progress(Arc::new(move |done: usize, total: usize| {
        assert!(done <= total);
        assert_eq!(total, 3);
        seen.fetch_add(1, Ordering::SeqCst);
    }));

    evaluator.evaluate(qa_rows()).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
}
