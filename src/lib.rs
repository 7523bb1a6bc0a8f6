//! Backend for the English word learner: upload an image, get back the English
//! words found in it together with Chinese translations.
//!
//! Word extraction and translation run against an OpenAI-compatible completion
//! API, or against a deterministic mock when no API key is configured.

pub mod analysis;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod llm;
pub mod services;
pub mod telemetry;
pub mod upload;
