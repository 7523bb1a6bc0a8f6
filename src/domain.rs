use std::collections::HashSet;
use std::path::PathBuf;

use serde::Serialize;

/// An uploaded image sitting in the upload directory for the duration of one request.
#[derive(Debug, Clone)]
pub struct UploadedAsset {
    pub path: PathBuf,
    pub declared_mime_type: String,
    pub declared_size_bytes: u64,
    pub original_name: String,
}

/// Lowercase English words, first occurrence kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WordList(Vec<String>);

impl WordList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }
}

impl<S: AsRef<str>> FromIterator<S> for WordList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let mut words = Vec::new();
        for word in iter {
            let word = word.as_ref().trim().to_lowercase();
            if !word.is_empty() && seen.insert(word.clone()) {
                words.push(word);
            }
        }
        Self(words)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct TranslationPair {
    pub english: String,
    pub chinese: String,
}

impl TranslationPair {
    pub fn new(english: impl Into<String>, chinese: impl Into<String>) -> Self {
        Self {
            english: english.into(),
            chinese: chinese.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    Internal,
}

/// Outcome of one analysis request. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisResult {
    Success {
        message: String,
        words: WordList,
        translations: Vec<TranslationPair>,
        count: usize,
    },
    Failure {
        kind: FailureKind,
        error: String,
        details: Vec<String>,
    },
}

impl AnalysisResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Result of a round trip to the completion provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionReport {
    pub message: String,
    pub model: String,
    pub mock: bool,
}
