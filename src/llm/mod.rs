mod client;
pub mod parse;
pub mod prompts;
pub mod retry;

pub use client::{ChatClient, ChatCompletion, ChatMessage, ChatRequest, UpstreamError};
pub use retry::{RetryPolicy, Retryable, Sleeper, TokioSleeper};

use crate::error::AnalysisError;

impl From<UpstreamError> for AnalysisError {
    fn from(err: UpstreamError) -> Self {
        AnalysisError::ExternalService {
            status: err.status,
            message: err.message,
        }
    }
}
