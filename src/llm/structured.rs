/*!
 * Structured reply parsing and validation.
 *
 * Model replies are untrusted text. They are first lifted into an untyped
 * JSON object by [`parse_structured_reply`], which never fails: anything
 * unusable becomes an empty object. A [`ReplySchema`] then checks required
 * keys and value kinds before the object is decoded into a typed struct.
 */

use log::debug;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::llm::usage::Usage;

const FENCE_OPEN: &str = "```json";
const FENCE_CLOSE: &str = "```";

/// Parse a raw model reply into a JSON object.
///
/// A reply wrapped in a ```` ```json ```` fence is unwrapped first. Raw
/// control characters inside string literals are tolerated. Unparsable
/// replies and non-object JSON both yield an empty map.
pub fn parse_structured_reply(raw: &str) -> Map<String, Value> {
    let payload = strip_json_fence(raw);
    let lenient = escape_control_chars_in_strings(payload);

    match serde_json::from_str::<Value>(&lenient) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            debug!("Structured reply is not a JSON object: {}", other);
            Map::new()
        }
        Err(e) => {
            debug!("Structured reply is not valid JSON ({}): {}", e, raw);
            Map::new()
        }
    }
}

/// Strip one ```` ```json ```` ... ```` ``` ```` envelope, if present.
fn strip_json_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.len() >= FENCE_OPEN.len() + FENCE_CLOSE.len()
        && trimmed.starts_with(FENCE_OPEN)
        && trimmed.ends_with(FENCE_CLOSE)
    {
        &trimmed[FENCE_OPEN.len()..trimmed.len() - FENCE_CLOSE.len()]
    } else {
        raw
    }
}

/// Escape control characters that appear inside JSON string literals.
fn escape_control_chars_in_strings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }

        if escaped {
            escaped = false;
            out.push(c);
            continue;
        }

        match c {
            '\\' => {
                escaped = true;
                out.push(c);
            }
            '"' => {
                in_string = false;
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }

    out
}

/// Why a structured reply does not satisfy its schema
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaViolation {
    /// A required key is absent (also the outcome of an unparsable reply)
    #[error("Output format is not {0} key")]
    MissingKey(String),

    /// A key holds a value of the wrong kind
    #[error("Output format of {key} is not {expected}")]
    WrongType {
        /// Offending key
        key: String,
        /// Expected kind, e.g. "str" or "list"
        expected: &'static str,
    },

    /// A score outside its allowed range
    #[error("{key} must be between {min} and {max}, got {value}")]
    OutOfRange {
        /// Offending key
        key: String,
        /// Value received
        value: i64,
        /// Inclusive lower bound
        min: i64,
        /// Inclusive upper bound
        max: i64,
    },

    /// Validation passed but typed decoding still failed
    #[error("Reply could not be decoded: {0}")]
    Undecodable(String),
}

/// Expected kind of a reply field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A JSON string
    Text,
    /// A JSON array of strings
    TextList,
    /// An integer within an inclusive range
    Score {
        /// Inclusive lower bound
        min: i64,
        /// Inclusive upper bound
        max: i64,
    },
}

impl FieldKind {
    fn name(&self) -> &'static str {
        match self {
            FieldKind::Text => "str",
            FieldKind::TextList => "list",
            FieldKind::Score { .. } => "int",
        }
    }
}

/// Required keys of one reply shape and the kind of each value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplySchema {
    fields: Vec<(&'static str, FieldKind)>,
}

impl ReplySchema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a string field
    pub fn text(mut self, key: &'static str) -> Self {
        self.fields.push((key, FieldKind::Text));
        self
    }

    /// Require an array-of-strings field
    pub fn text_list(mut self, key: &'static str) -> Self {
        self.fields.push((key, FieldKind::TextList));
        self
    }

    /// Require an integer field within `min..=max`
    pub fn score(mut self, key: &'static str, min: i64, max: i64) -> Self {
        self.fields.push((key, FieldKind::Score { min, max }));
        self
    }

    /// Required keys in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(key, _)| *key)
    }

    /// Check presence first for every key, then kinds, so a reply missing
    /// any key always reports `MissingKey`.
    pub fn validate(&self, fields: &Map<String, Value>) -> Result<(), SchemaViolation> {
        if let Some((key, _)) = self.fields.iter().find(|(key, _)| !fields.contains_key(*key)) {
            return Err(SchemaViolation::MissingKey(key.to_string()));
        }

        for (key, kind) in &self.fields {
            let value = &fields[*key];
            let wrong_type = || SchemaViolation::WrongType {
                key: key.to_string(),
                expected: kind.name(),
            };

            match kind {
                FieldKind::Text => {
                    if !value.is_string() {
                        return Err(wrong_type());
                    }
                }
                FieldKind::TextList => {
                    let is_text_list = value
                        .as_array()
                        .is_some_and(|items| items.iter().all(Value::is_string));
                    if !is_text_list {
                        return Err(wrong_type());
                    }
                }
                FieldKind::Score { min, max } => {
                    let score = value.as_i64().ok_or_else(wrong_type)?;
                    if score < *min || score > *max {
                        return Err(SchemaViolation::OutOfRange {
                            key: key.to_string(),
                            value: score,
                            min: *min,
                            max: *max,
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

/// A parsed reply plus the usage of the exchange that produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredReply {
    /// Parsed object, empty when the reply was unusable
    pub fields: Map<String, Value>,
    /// Cost and tokens of the exchange
    pub usage: Usage,
}

impl StructuredReply {
    /// Parse a raw reply
    pub fn from_raw(raw: &str, usage: Usage) -> Self {
        Self {
            fields: parse_structured_reply(raw),
            usage,
        }
    }

    /// Raw value of a key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Validate against `schema`, then decode into `T`.
    pub fn decode<T: DeserializeOwned>(&self, schema: &ReplySchema) -> Result<T, SchemaViolation> {
        schema.validate(&self.fields)?;
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|e| SchemaViolation::Undecodable(e.to_string()))
    }
}
