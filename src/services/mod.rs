//! Word extraction, translation and connectivity, each backed by either the
//! deterministic mock provider or the live completion API.

mod factory;
mod live;
mod mock;

use async_trait::async_trait;

use crate::domain::{ConnectionReport, TranslationPair, UploadedAsset, WordList};
use crate::error::AnalysisError;

pub use factory::{build_providers, Providers};
pub use live::LiveProvider;
pub use mock::{MockProvider, UNKNOWN_TRANSLATION};

#[async_trait]
pub trait WordExtractor: Send + Sync {
    async fn extract_words(&self, asset: &UploadedAsset) -> Result<WordList, AnalysisError>;
}

#[async_trait]
pub trait Translator: Send + Sync {
    /// Implementations return an empty list for empty input without doing any work.
    async fn translate(&self, words: &[String]) -> Result<Vec<TranslationPair>, AnalysisError>;
}

#[async_trait]
pub trait ConnectionTester: Send + Sync {
    async fn test_connection(&self) -> Result<ConnectionReport, AnalysisError>;
}
