use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::domain::{ConnectionReport, TranslationPair, UploadedAsset, WordList};
use crate::error::AnalysisError;

use super::{ConnectionTester, Translator, WordExtractor};

pub const UNKNOWN_TRANSLATION: &str = "unknown";

const HELLO_WORDS: [&str; 3] = ["hello", "world", "welcome"];
const TEST_WORDS: [&str; 4] = ["test", "sample", "image", "text"];
const DEFAULT_WORDS: [&str; 6] = [
    "computer",
    "learning",
    "english",
    "study",
    "language",
    "education",
];

const DICTIONARY: [(&str, &str); 18] = [
    ("hello", "你好"),
    ("world", "世界"),
    ("welcome", "欢迎"),
    ("test", "测试"),
    ("sample", "样本"),
    ("image", "图片"),
    ("text", "文本"),
    ("computer", "电脑"),
    ("learning", "学习"),
    ("english", "英语"),
    ("study", "学习"),
    ("language", "语言"),
    ("education", "教育"),
    ("book", "书"),
    ("read", "读"),
    ("write", "写"),
    ("speak", "说"),
    ("listen", "听"),
];

/// Canned answers with artificial latency. Word choice depends on the upload's
/// file name only, never on the image content.
#[derive(Debug, Clone)]
pub struct MockProvider {
    extract_delay: Duration,
    translate_delay: Duration,
    probe_delay: Duration,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            extract_delay: Duration::from_millis(1000),
            translate_delay: Duration::from_millis(500),
            probe_delay: Duration::from_millis(500),
        }
    }
}

impl MockProvider {
    /// No artificial latency.
    pub fn instant() -> Self {
        Self {
            extract_delay: Duration::ZERO,
            translate_delay: Duration::ZERO,
            probe_delay: Duration::ZERO,
        }
    }

    fn canned_words(name: &str) -> &'static [&'static str] {
        let name = name.to_lowercase();
        if name.contains("hello") {
            &HELLO_WORDS
        } else if name.contains("test") {
            &TEST_WORDS
        } else {
            &DEFAULT_WORDS
        }
    }

    fn lookup(word: &str) -> &'static str {
        let word = word.to_lowercase();
        DICTIONARY
            .iter()
            .find(|(english, _)| *english == word)
            .map_or(UNKNOWN_TRANSLATION, |(_, chinese)| *chinese)
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl WordExtractor for MockProvider {
    #[tracing::instrument(skip(self, asset), fields(file = %asset.original_name))]
    async fn extract_words(&self, asset: &UploadedAsset) -> Result<WordList, AnalysisError> {
        pause(self.extract_delay).await;

        if !tokio::fs::try_exists(&asset.path).await? {
            return Err(AnalysisError::NotFound(asset.path.clone()));
        }

        let words: WordList = Self::canned_words(&asset.original_name).iter().collect();
        info!(count = words.len(), "Mock extraction finished");
        Ok(words)
    }
}

#[async_trait]
impl Translator for MockProvider {
    async fn translate(&self, words: &[String]) -> Result<Vec<TranslationPair>, AnalysisError> {
        if words.is_empty() {
            return Ok(Vec::new());
        }

        pause(self.translate_delay).await;

        let pairs: Vec<_> = words
            .iter()
            .map(|word| TranslationPair::new(word.as_str(), Self::lookup(word)))
            .collect();
        info!(count = pairs.len(), "Mock translation finished");
        Ok(pairs)
    }
}

#[async_trait]
impl ConnectionTester for MockProvider {
    async fn test_connection(&self) -> Result<ConnectionReport, AnalysisError> {
        pause(self.probe_delay).await;

        Ok(ConnectionReport {
            message: "Mock: OpenAI API connection successful (simulated)".to_string(),
            model: "mock-gpt-4.1-mini".to_string(),
            mock: true,
        })
    }
}
