/*!
 * Tests for the application controller: output writing, degradation of
 * table output and cost accounting.
 */

use llmtrans::app_config::Config;
use llmtrans::app_controller::Controller;
use llmtrans::errors::ConfigError;
use llmtrans::evaluation::{ComparisonRow, QaRow};
use llmtrans::providers::mock::MockProvider;
use llmtrans::translation::{ErrorKind, OutputFormat};

use crate::common::{comparison_reply, init_test_logger, mock_gateway, qa_reply};

fn japanese_to_english() -> Config {
    let mut config = Config::default();
    config.source_language = "Japanese".to_string();
    config.target_language = "English".to_string();
    config
}

/// Test text output
#[tokio::test]
async fn test_run_translate_textMode_shouldWriteTranslation() {
    let (gateway, _) = mock_gateway(MockProvider::scripted([r#"{"translated_texts": "こんにちは"}"#]));
    let mut controller = Controller::with_gateway(Config::default(), gateway);

    let mut out = Vec::new();
    controller
        .run_translate("Hello", OutputFormat::Text, &mut out)
        .await
        .unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "こんにちは\n");
    assert_eq!(controller.costs().calls(), 1);
    assert!(controller.costs().total().cost > 0.0);
}

/// Test aligned table output
#[tokio::test]
async fn test_run_translate_tableMode_shouldWritePairs() {
    let (gateway, _) = mock_gateway(MockProvider::scripted([
        r#"{"translated_texts": ["Good morning.", "Nice weather!"]}"#,
    ]));
    let mut controller = Controller::with_gateway(japanese_to_english(), gateway);

    let mut out = Vec::new();
    controller
        .run_translate("おはよう。いい天気！", OutputFormat::Table, &mut out)
        .await
        .unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "source\ttarget\nおはよう。\tGood morning.\nいい天気！\tNice weather!\n"
    );
}

/// Test that a count mismatch falls back to the plain translation
#[tokio::test]
async fn test_run_translate_tableMode_withMismatch_shouldWriteJoinedTranslation() {
    init_test_logger();
    let (gateway, _) = mock_gateway(MockProvider::scripted([
        r#"{"translated_texts": ["Good morning.", "Nice", "weather!"]}"#,
    ]));
    let mut controller = Controller::with_gateway(japanese_to_english(), gateway);

    let mut out = Vec::new();
    let result = controller
        .run_translate("おはよう。いい天気！", OutputFormat::Table, &mut out)
        .await
        .unwrap();

    assert_eq!(result.error_kind(), Some(ErrorKind::AlignmentMismatch));
    assert_eq!(String::from_utf8(out).unwrap(), "Good morning.\nNice\nweather!\n");
    assert_eq!(controller.costs().calls(), 1);
}

/// Test that other failures are errors but still count their cost
#[tokio::test]
async fn test_run_translate_withMalformedReply_shouldFailAndTrackCost() {
    init_test_logger();
    let (gateway, _) = mock_gateway(MockProvider::scripted([r#"{"text": "Bonjour"}"#]));
    let mut controller = Controller::with_gateway(Config::default(), gateway);

    let mut out = Vec::new();
    let result = controller.run_translate("Hello", OutputFormat::Text, &mut out).await;

    assert!(result.is_err());
    assert!(out.is_empty());
    assert_eq!(controller.costs().calls(), 1);
    assert!(controller.costs().total().tokens > 0);
}

/// Test the input length limit
#[tokio::test]
async fn test_run_translate_withTooLongInput_shouldFailBeforeAnyExchange() {
    let (gateway, mock) = mock_gateway(MockProvider::scripted(Vec::<String>::new()));
    let mut config = Config::default();
    config.llm.max_input_chars = 5;
    let mut controller = Controller::with_gateway(config, gateway);

    let mut out = Vec::new();
    let error = controller
        .run_translate("Hello, world", OutputFormat::Text, &mut out)
        .await
        .unwrap_err();

    assert!(matches!(error.downcast_ref::<ConfigError>(), Some(ConfigError::InvalidSetting(_))));
    assert_eq!(mock.call_count(), 0);
}

/// Test QA report output
#[tokio::test]
async fn test_run_qa_shouldWriteReportAndTrackCost() {
    let (gateway, _) = mock_gateway(MockProvider::scripted([qa_reply(2, "Natural."), qa_reply(1, "Stiff.")]));
    let mut controller = Controller::with_gateway(Config::default(), gateway);

    let mut out = Vec::new();
    let report = controller
        .run_qa(
            vec![QaRow::new("Hello", "こんにちは"), QaRow::new("Bye", "さようなら")],
            &mut out,
        )
        .await
        .unwrap();

    assert_eq!(report.failed, 0);
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 3);
    assert_eq!(text.lines().nth(1), Some("Hello\tこんにちは\t2\t2\t2\t2\t2\t2\tNatural."));
    assert_eq!(controller.costs().total(), report.usage);
    assert_eq!(controller.costs().calls(), 2);
}

/// Test that the controller can be driven from synchronous code
#[test]
fn test_run_translate_fromBlockingContext_shouldComplete() {
    let (gateway, mock) = mock_gateway(MockProvider::scripted([r#"{"translated_texts": "Bonjour"}"#]));
    let mut config = Config::default();
    config.target_language = "fr".to_string();
    let mut controller = Controller::with_gateway(config, gateway);

    let mut out = Vec::new();
    let result = tokio_test::block_on(controller.run_translate("Hello", OutputFormat::Text, &mut out));

    assert!(result.is_ok());
    assert_eq!(mock.call_count(), 1);
    assert!(mock.requests()[0].system.contains("into French"));
}

/// Test comparison report output
#[tokio::test]
async fn test_run_compare_shouldWriteReport() {
    let (gateway, _) = mock_gateway(MockProvider::scripted([comparison_reply(2, 0, 2, "Engine 2 is more polite.")]));
    let mut controller = Controller::with_gateway(Config::default(), gateway);

    let mut out = Vec::new();
    controller
        .run_compare(vec![ComparisonRow::new("Thanks.", "ありがと。", "ありがとうございます。")], &mut out)
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("source\ttarget1\ttarget2\taccuracy\tgrammar\ttotal\treview\n"));
    assert!(text.ends_with("\t2\t0\t2\tEngine 2 is more polite.\n"));
}
