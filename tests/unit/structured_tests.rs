/*!
 * Tests for prompt templates and structured replies through the public API
 */

use llmtrans::errors::TemplateError;
use llmtrans::evaluation::rubric;
use llmtrans::llm::{PromptTemplate, PromptVars, ReplySchema, SchemaViolation, StructuredReply, Usage};

/// Test that a template lists its placeholders and renders them
#[test]
fn test_prompt_template_withEscapedBraces_shouldRenderLiterals() {
    let template = PromptTemplate::new("{{\"key\": \"{value}\"}} for {name}");

    assert_eq!(template.variables(), vec!["value", "name"]);
    let rendered = template
        .render(&PromptVars::new().with("value", "x").with("name", "test"))
        .unwrap();
    assert_eq!(rendered, "{\"key\": \"x\"} for test");
}

/// Test that a missing variable fails instead of leaving a placeholder
#[test]
fn test_prompt_template_withMissingVariable_shouldFail() {
    let result = PromptTemplate::new("Translate {text}").render(&PromptVars::new());
    assert_eq!(result, Err(TemplateError::MissingVariable("text".to_string())));
}

/// Test a fenced QA reply against the QA schema
#[test]
fn test_structured_reply_withFencedQaReply_shouldValidate() {
    let raw = "```json\n{\"accuracy\": 2, \"grammar\": 2, \"fluency\": 1, \"cultural\": 2, \"style\": 2, \"error\": 2, \"review\": \"Good.\"}\n```";
    let reply = StructuredReply::from_raw(raw, Usage::new(0.001, 120));

    assert!(rubric::qa_schema().validate(&reply.fields).is_ok());
    assert_eq!(reply.usage.tokens, 120);
}

/// Test that missing keys win over wrong types
#[test]
fn test_structured_reply_withMissingReviewAndBadScore_shouldReportMissingKey() {
    let reply = StructuredReply::from_raw(
        "{\"accuracy\": 5, \"grammar\": 2, \"total\": 0}",
        Usage::zero(),
    );

    assert_eq!(
        rubric::comparison_schema().validate(&reply.fields),
        Err(SchemaViolation::MissingKey("review".to_string()))
    );
}

/// Test score range checks
#[test]
fn test_structured_reply_withOutOfRangeScore_shouldFail() {
    let reply = StructuredReply::from_raw(
        "{\"accuracy\": 3, \"grammar\": 2, \"total\": 0, \"review\": \"ok\"}",
        Usage::zero(),
    );

    assert!(matches!(
        rubric::comparison_schema().validate(&reply.fields),
        Err(SchemaViolation::OutOfRange { value: 3, .. })
    ));
}

/// Test that a string list is not accepted where a string is required
#[test]
fn test_structured_reply_withListForText_shouldReportWrongType() {
    let reply = StructuredReply::from_raw("{\"translated_texts\": [\"a\", \"b\"]}", Usage::zero());
    let schema = ReplySchema::new().text("translated_texts");

    assert_eq!(
        schema.validate(&reply.fields),
        Err(SchemaViolation::WrongType {
            key: "translated_texts".to_string(),
            expected: "str"
        })
    );
}

/// Test raw newlines inside a JSON string
#[test]
fn test_structured_reply_withRawNewlineInString_shouldParse() {
    let reply = StructuredReply::from_raw("{\"review\": \"line one\nline two\"}", Usage::zero());
    assert_eq!(reply.get("review").and_then(|v| v.as_str()), Some("line one\nline two"));
}
