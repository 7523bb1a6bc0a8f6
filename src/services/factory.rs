use std::sync::Arc;

use tracing::info;

use crate::config::{Config, ServiceMode};
use crate::error::AnalysisError;
use crate::llm::ChatClient;

use super::{ConnectionTester, LiveProvider, MockProvider, Translator, WordExtractor};

/// The provider set chosen for this process.
#[derive(Clone)]
pub struct Providers {
    pub mode: ServiceMode,
    pub extractor: Arc<dyn WordExtractor>,
    pub translator: Arc<dyn Translator>,
    pub tester: Arc<dyn ConnectionTester>,
}

impl Providers {
    pub fn mock(mock: MockProvider) -> Self {
        let mock = Arc::new(mock);
        Self {
            mode: ServiceMode::Mock,
            extractor: mock.clone(),
            translator: mock.clone(),
            tester: mock,
        }
    }

    pub fn live(live: LiveProvider) -> Self {
        let live = Arc::new(live);
        Self {
            mode: ServiceMode::Live,
            extractor: live.clone(),
            translator: live.clone(),
            tester: live,
        }
    }
}

pub fn build_providers(config: &Config) -> Result<Providers, AnalysisError> {
    match (config.service_mode(), config.api_key.as_deref()) {
        (ServiceMode::Live, Some(api_key)) => {
            info!(model = %config.model, "Using live completion provider");
            let client = ChatClient::new(&config.base_url, api_key, &config.model)?;
            Ok(Providers::live(LiveProvider::new(client)))
        }
        _ => {
            let reason = if config.api_key_present() {
                "mock mode forced"
            } else {
                "no API key configured"
            };
            info!(reason, "Using mock provider");
            Ok(Providers::mock(MockProvider::default()))
        }
    }
}
