/*!
 * Rule-based sentence boundaries for Japanese and Chinese text.
 *
 * Neither script separates words with spaces, but both end sentences with a
 * small set of full-width terminators. A boundary follows a run of
 * terminators unless it sits inside a bracketed quotation; closing quotes and
 * brackets right after the run stay with the sentence they close. Line feeds
 * are always boundaries.
 */

use crate::language_utils::LanguageTag;

const TERMINATORS: &[char] = &['。', '．', '！', '？', '!', '?'];
const OPENERS: &[char] = &['「', '『', '（', '(', '【', '〈', '《', '“'];
const CLOSERS: &[char] = &['」', '』', '）', ')', '】', '〉', '》', '”'];

/// Languages with a rule-based splitter, as ISO 639-2/T codes
const RULE_LANGUAGES: &[&str] = &["jpn", "zho"];

/// Deterministic splitter for languages with full-width sentence terminators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleSplitter;

impl RuleSplitter {
    /// The splitter for `language`, if it has one
    pub fn for_language(language: &LanguageTag) -> Option<Self> {
        RULE_LANGUAGES.contains(&language.code()).then_some(RuleSplitter)
    }

    /// Split `text` into trimmed, non-empty sentences in original order.
    pub fn split(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut current = String::new();
        let mut depth = 0usize;
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '\n' || c == '\r' {
                flush(&mut current, &mut sentences);
                depth = 0;
                continue;
            }

            current.push(c);

            if OPENERS.contains(&c) {
                depth += 1;
            } else if CLOSERS.contains(&c) {
                depth = depth.saturating_sub(1);
            } else if TERMINATORS.contains(&c) && depth == 0 {
                while let Some(&next) = chars.peek() {
                    if TERMINATORS.contains(&next) || CLOSERS.contains(&next) {
                        current.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                flush(&mut current, &mut sentences);
            }
        }

        flush(&mut current, &mut sentences);
        sentences
    }
}

fn flush(current: &mut String, sentences: &mut Vec<String>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    current.clear();
}
