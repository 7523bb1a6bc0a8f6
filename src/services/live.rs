use std::io::ErrorKind;
use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use tracing::{info, warn};

use crate::domain::{ConnectionReport, TranslationPair, UploadedAsset, WordList};
use crate::error::AnalysisError;
use crate::llm::{
    parse, prompts, ChatClient, ChatCompletion, ChatMessage, ChatRequest, RetryPolicy, Sleeper,
    TokioSleeper, UpstreamError,
};
use crate::upload::validator::{extension_of, mime_for_extension};

use super::{ConnectionTester, Translator, WordExtractor};

/// Talks to the completion API; every call goes through the retry policy.
pub struct LiveProvider {
    client: ChatClient,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl LiveProvider {
    pub fn new(client: ChatClient) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        self.retry = retry;
        self.sleeper = sleeper;
        self
    }

    async fn complete(&self, request: ChatRequest) -> Result<ChatCompletion, UpstreamError> {
        self.retry
            .run(self.sleeper.as_ref(), || self.client.complete(&request))
            .await
    }
}

/// Content sniffing wins over the client-declared extension.
fn data_uri(bytes: &[u8], file_name: &str) -> String {
    let mime = image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or_else(|_| mime_for_extension(&extension_of(file_name)));
    format!("data:{mime};base64,{}", general_purpose::STANDARD.encode(bytes))
}

#[async_trait]
impl WordExtractor for LiveProvider {
    #[tracing::instrument(skip(self, asset), fields(file = %asset.original_name))]
    async fn extract_words(&self, asset: &UploadedAsset) -> Result<WordList, AnalysisError> {
        let bytes = match tokio::fs::read(&asset.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AnalysisError::NotFound(asset.path.clone()))
            }
            Err(e) => return Err(e.into()),
        };

        let request = ChatRequest {
            messages: vec![ChatMessage::user_with_image(
                prompts::EXTRACT_WORDS,
                &data_uri(&bytes, &asset.original_name),
            )],
            max_tokens: 1000,
            temperature: Some(0.1),
        };

        let completion = self.complete(request).await?;
        let content = completion.content().ok_or_else(|| AnalysisError::ExternalService {
            status: Some(200),
            message: "Completion had no content".to_string(),
        })?;
        let words = parse::extract_word_list(content);
        info!(count = words.len(), "Extracted words from image");
        Ok(words)
    }
}

#[async_trait]
impl Translator for LiveProvider {
    #[tracing::instrument(skip_all, fields(words = words.len()))]
    async fn translate(&self, words: &[String]) -> Result<Vec<TranslationPair>, AnalysisError> {
        if words.is_empty() {
            return Ok(Vec::new());
        }

        let request = ChatRequest {
            messages: vec![ChatMessage::user_text(&prompts::translate_words(words))],
            max_tokens: 2000,
            temperature: Some(0.1),
        };

        let completion = self.complete(request).await?;
        let Some(content) = completion.content() else {
            warn!("Translation completion had no content");
            return Ok(Vec::new());
        };
        match parse::parse_translations(content) {
            Some(pairs) => {
                info!(count = pairs.len(), "Translated words");
                Ok(pairs)
            }
            None => {
                warn!(reply = %content, "Translation reply was not a JSON array");
                Ok(Vec::new())
            }
        }
    }
}

#[async_trait]
impl ConnectionTester for LiveProvider {
    async fn test_connection(&self) -> Result<ConnectionReport, AnalysisError> {
        let request = ChatRequest {
            messages: vec![ChatMessage::user_text(prompts::CONNECTION_TEST)],
            max_tokens: 10,
            temperature: None,
        };

        let completion = self.complete(request).await?;
        let model = if completion.model.is_empty() {
            self.client.model().to_string()
        } else {
            completion.model
        };

        Ok(ConnectionReport {
            message: "OpenAI API connection successful".to_string(),
            model,
            mock: false,
        })
    }
}
