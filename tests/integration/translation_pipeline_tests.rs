/*!
 * Integration tests for the translate pipeline.
 *
 * Every test runs against a scripted provider, so the full path from prompt
 * rendering through reply validation to the result value is exercised
 * without network access.
 */

use std::error::Error;

use llmtrans::errors::{ConfigError, CoreError, GatewayError};
use llmtrans::providers::mock::MockProvider;
use llmtrans::translation::{ErrorKind, OutputFormat, ResultError, Translator};

use crate::common::{mock_gateway, tag, test_settings};

fn translator(mock: MockProvider) -> (Translator, std::sync::Arc<MockProvider>) {
    let (gateway, mock) = mock_gateway(mock);
    (Translator::new(gateway, test_settings(), test_settings()), mock)
}

/// Test a plain text-mode translation
#[tokio::test]
async fn test_translate_textMode_shouldReturnSingleUnit() {
    let (translator, mock) = translator(MockProvider::scripted([r#"{"translated_texts": "Bonjour"}"#]));

    let result = translator
        .translate(&tag("en"), &tag("fr"), "Hello", OutputFormat::Text)
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.translated_texts(), ["Bonjour"]);
    assert!(result.tokens() > 0);
    assert_eq!(mock.call_count(), 1);

    let request = &mock.requests()[0];
    assert!(request.system.contains("translates English into French"));
    assert!(request.user.contains("Hello"));
}

/// Test that a fenced reply is accepted
#[tokio::test]
async fn test_translate_textMode_withFencedReply_shouldSucceed() {
    let (translator, _) = translator(MockProvider::scripted([
        "```json\n{\"translated_texts\": \"Bonjour\"}\n```",
    ]));

    let result = translator
        .translate(&tag("English"), &tag("French"), "Hello", OutputFormat::Text)
        .await
        .unwrap();

    assert_eq!(result.joined_translation(), "Bonjour");
}

/// Test that a list where a string is expected is a type error
#[tokio::test]
async fn test_translate_textMode_withListReply_shouldFailWithWrongType() {
    let (translator, _) = translator(MockProvider::scripted([r#"{"translated_texts": ["a", "b"]}"#]));

    let result = translator
        .translate(&tag("en"), &tag("fr"), "Hello", OutputFormat::Text)
        .await
        .unwrap();

    assert!(!result.is_success());
    assert_eq!(result.error_kind(), Some(ErrorKind::ResultNotString));
    assert_eq!(result.error_kind().map(|k| k.code()), Some("e0002"));
    assert!(result.translated_texts().is_empty());
}

/// Test that a string where a list is expected has its own code
#[tokio::test]
async fn test_translate_tableMode_withStringReply_shouldFailWithNotList() {
    let (translator, _) = translator(MockProvider::scripted([
        r#"{"translated_texts": "Good morning. Nice weather!"}"#,
    ]));

    let result = translator
        .translate(&tag("ja"), &tag("en"), "おはよう。いい天気！", OutputFormat::Table)
        .await
        .unwrap();

    assert_eq!(result.error_kind(), Some(ErrorKind::ResultNotList));
    assert_eq!(result.error_kind().map(|k| k.code()), Some("e0001"));
    assert!(result.translated_texts().is_empty());
}

/// Test that an unparsable reply is reported as a missing key
#[tokio::test]
async fn test_translate_textMode_withProseReply_shouldFailWithMissingKey() {
    let (translator, _) = translator(MockProvider::scripted(["Sure! Here is your translation: Bonjour"]));

    let result = translator
        .translate(&tag("en"), &tag("fr"), "Hello", OutputFormat::Text)
        .await
        .unwrap();

    assert_eq!(result.error_kind(), Some(ErrorKind::MissingTranslatedKey));
    assert_eq!(result.error_message(), "Output format is not translated_texts key");
}

/// Test table mode with model-based segmentation
#[tokio::test]
async fn test_translate_tableMode_withEnglishSource_shouldAlignSentences() {
    let (translator, mock) = translator(MockProvider::scripted([
        r#"{"split_sentences": ["Hi, how are you?", "Not bad."]}"#,
        r#"{"translated_texts": ["Salut, ça va ?", "Pas mal."]}"#,
    ]));

    let result = translator
        .translate(&tag("en"), &tag("fr"), "Hi, how are you? Not bad.", OutputFormat::Table)
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(mock.call_count(), 2);
    let pairs: Vec<_> = result.pairs().collect();
    assert_eq!(pairs, vec![("Hi, how are you?", "Salut, ça va ?"), ("Not bad.", "Pas mal.")]);

    // The translation request carries the segmented sentences as a JSON array
    assert!(mock.requests()[1].user.contains(r#"["Hi, how are you?","Not bad."]"#));
}

/// Test that blank sentences from the model are neither translated nor counted
#[tokio::test]
async fn test_translate_tableMode_withBlankSegments_shouldAlignNonBlankSentences() {
    let (translator, mock) = translator(MockProvider::scripted([
        r#"{"split_sentences": ["Hi.", "", "   ", "Bye."]}"#,
        r#"{"translated_texts": ["Salut.", "Au revoir."]}"#,
    ]));

    let result = translator
        .translate(&tag("en"), &tag("fr"), "Hi. Bye.", OutputFormat::Table)
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.source_texts(), ["Hi.", "Bye."]);
    assert!(mock.requests()[1].user.contains(r#"["Hi.","Bye."]"#));
}

/// Test table mode with rule-based segmentation, which costs no exchange
#[tokio::test]
async fn test_translate_tableMode_withJapaneseSource_shouldSplitByRule() {
    let (translator, mock) = translator(MockProvider::scripted([
        r#"{"translated_texts": ["Good morning.", "The weather is nice today!"]}"#,
    ]));

    let result = translator
        .translate(&tag("ja"), &tag("en"), "おはよう。今日はいい天気ですね！", OutputFormat::Table)
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(mock.call_count(), 1);
    assert_eq!(result.source_texts(), ["おはよう。", "今日はいい天気ですね！"]);
}

/// Test that a sentence count mismatch keeps the translated units
#[tokio::test]
async fn test_translate_tableMode_withCountMismatch_shouldFailWithAlignment() {
    let (translator, _) = translator(MockProvider::scripted([
        r#"{"translated_texts": ["Good morning. The weather is nice today!"]}"#,
    ]));

    let result = translator
        .translate(&tag("ja"), &tag("en"), "おはよう。今日はいい天気ですね！", OutputFormat::Table)
        .await
        .unwrap();

    assert_eq!(result.error_kind(), Some(ErrorKind::AlignmentMismatch));
    assert_eq!(result.error_message(), "Failed to translate.");
    assert_eq!(result.source_texts().len(), 2);
    assert_eq!(result.translated_texts().len(), 1);
    assert_eq!(result.joined_translation(), "Good morning. The weather is nice today!");
}

/// Test that a segmentation failure stops before translation and keeps its cause
#[tokio::test]
async fn test_translate_tableMode_withBadSegmentation_shouldFailWithCause() {
    let (translator, mock) = translator(MockProvider::scripted([r#"{"sentences": ["Hi."]}"#]));

    let result = translator
        .translate(&tag("en"), &tag("fr"), "Hi.", OutputFormat::Table)
        .await
        .unwrap();

    assert_eq!(mock.call_count(), 1);
    assert_eq!(result.error_kind(), Some(ErrorKind::SegmentationFailed));
    assert!(result.tokens() > 0);

    let cause = result
        .error()
        .and_then(|e| e.source())
        .and_then(|s| s.downcast_ref::<ResultError>())
        .map(|e| e.kind);
    assert_eq!(cause, Some(ErrorKind::MissingSplitKey));
}

/// Test that an empty sentence list is a shape error
#[tokio::test]
async fn test_translate_tableMode_withEmptySegmentation_shouldFailWithShapeCause() {
    let (translator, _) = translator(MockProvider::scripted([r#"{"split_sentences": []}"#]));

    let result = translator
        .translate(&tag("en"), &tag("fr"), "Hi.", OutputFormat::Table)
        .await
        .unwrap();

    let cause = result.error().and_then(|e| e.cause.as_ref()).map(|c| c.kind);
    assert_eq!(cause, Some(ErrorKind::SplitWrongShape));
}

/// Test that setup errors are rejected before any exchange
#[tokio::test]
async fn test_translate_withSameLanguageOrEmptyText_shouldNotCallProvider() {
    let (translator, mock) = translator(MockProvider::scripted(Vec::<String>::new()));

    let same = translator
        .translate(&tag("en"), &tag("English"), "Hello", OutputFormat::Text)
        .await;
    assert!(matches!(same, Err(CoreError::Config(ConfigError::SameLanguage { .. }))));

    let empty = translator
        .translate(&tag("en"), &tag("fr"), "   ", OutputFormat::Table)
        .await;
    assert!(matches!(empty, Err(CoreError::Config(ConfigError::EmptyInput))));

    assert_eq!(mock.call_count(), 0);
}

/// Test that a transport failure propagates as an error
#[tokio::test]
async fn test_translate_withProviderFailure_shouldReturnGatewayError() {
    let (translator, _) = translator(MockProvider::failing());

    let result = translator
        .translate(&tag("en"), &tag("fr"), "Hello", OutputFormat::Text)
        .await;

    assert!(matches!(result, Err(CoreError::Gateway(GatewayError::Provider(_)))));
}
