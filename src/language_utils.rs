//! Language utilities for ISO language code handling
//!
//! Resolves user-facing language names ("Japanese") and ISO 639-1 / ISO 639-2
//! codes into one canonical tag, so that prompt rendering, exemplar lookup and
//! the same-language guard all agree.

use anyhow::{Result, anyhow};
use isolang::Language;
use std::fmt;

use crate::errors::ConfigError;

/// Language code type
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

/// ISO 639-2/B codes that differ from their ISO 639-2/T counterpart
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

fn bibliographic_to_terminology(code: &str) -> Option<&'static str> {
    BIBLIOGRAPHIC_CODES
        .iter()
        .find(|(b, _)| *b == code)
        .map(|(_, t)| *t)
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 if Language::from_639_1(&normalized_code).is_some() => Ok(LanguageCodeType::Part1),
        3 if Language::from_639_3(&normalized_code).is_some() => Ok(LanguageCodeType::Part2T),
        3 if bibliographic_to_terminology(&normalized_code).is_some() => Ok(LanguageCodeType::Part2B),
        _ => Err(anyhow!("Invalid language code: {}", code)),
    }
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
        if let Some(part2t) = bibliographic_to_terminology(&normalized_code) {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// A resolved language: canonical ISO 639-2/T code plus English name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageTag {
    code: String,
    name: String,
}

impl LanguageTag {
    /// Resolve a language from an English name or an ISO 639-1/639-2 code.
    ///
    /// Names are matched case-insensitively on their first letter only, so
    /// "japanese" and "Japanese" both resolve while "JAPANESE" does not.
    pub fn resolve(input: &str) -> Result<Self, ConfigError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::UnknownLanguage(input.to_string()));
        }

        if validate_language_code(trimmed).is_ok() {
            if let (Ok(code), Ok(name)) = (normalize_to_part2t(trimmed), get_language_name(trimmed)) {
                return Ok(Self { code, name });
            }
        }

        let capitalized = capitalize(trimmed);
        Language::from_name(trimmed)
            .or_else(|| Language::from_name(&capitalized))
            .map(|lang| Self {
                code: lang.to_639_3().to_string(),
                name: lang.to_name().to_string(),
            })
            .ok_or_else(|| ConfigError::UnknownLanguage(input.to_string()))
    }

    /// ISO 639-2/T code, e.g. `jpn`
    pub fn code(&self) -> &str {
        &self.code
    }

    /// English name used in prompts, e.g. `Japanese`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether both tags denote the same language
    pub fn same_language(&self, other: &LanguageTag) -> bool {
        language_codes_match(&self.code, &other.code)
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}
