//! Turning free-form model output into structured data.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::domain::{TranslationPair, WordList};

/// Upper bound on words recovered by [`scan_words`].
pub const FALLBACK_WORD_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordListParse {
    Parsed(WordList),
    Malformed(String),
}

/// Strict parse. Non-string array elements are skipped, and JSON that is not an
/// array yields an empty list. Only replies that are not JSON at all are
/// `Malformed`.
pub fn parse_word_list(raw: &str) -> WordListParse {
    match serde_json::from_str::<Value>(strip_code_fence(raw)) {
        Ok(Value::Array(items)) => WordListParse::Parsed(
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<WordList>(),
        ),
        Ok(other) => {
            tracing::warn!(reply = %other, "Reply was JSON but not an array");
            WordListParse::Parsed(WordList::new())
        }
        Err(_) => WordListParse::Malformed(raw.to_string()),
    }
}

/// Fallback for replies that are not JSON: every run of two or more ASCII
/// letters counts as a word.
pub fn scan_words(text: &str) -> WordList {
    static WORD: OnceLock<Regex> = OnceLock::new();
    let pattern = WORD.get_or_init(|| Regex::new(r"\b[a-zA-Z]{2,}\b").expect("static pattern"));

    let mut words: WordList = pattern.find_iter(text).map(|m| m.as_str()).collect();
    words.truncate(FALLBACK_WORD_LIMIT);
    words
}

/// Strict parse first, regex scan on malformed replies.
pub fn extract_word_list(raw: &str) -> WordList {
    match parse_word_list(raw) {
        WordListParse::Parsed(words) => words,
        WordListParse::Malformed(text) => {
            tracing::warn!(reply = %text, "Reply was not JSON, scanning text for words");
            scan_words(&text)
        }
    }
}

/// Returns `None` when the reply is not a JSON array. Elements missing either
/// string field are dropped.
pub fn parse_translations(raw: &str) -> Option<Vec<TranslationPair>> {
    let Value::Array(items) = serde_json::from_str::<Value>(strip_code_fence(raw)).ok()? else {
        return None;
    };

    Some(
        items
            .into_iter()
            .filter_map(|item| {
                let english = item.get("english")?.as_str()?;
                let chinese = item.get("chinese")?.as_str()?;
                Some(TranslationPair::new(english, chinese))
            })
            .collect(),
    )
}

/// Removes a surrounding Markdown code fence such as ```` ```json ... ``` ````.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_suffix("```").unwrap_or(body);
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}
