use std::sync::Arc;

use crate::analysis::Analyzer;
use crate::config::{Config, ServiceMode};
use crate::services::{ConnectionTester, Providers};
use crate::upload::UploadStore;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub tester: Arc<dyn ConnectionTester>,
    pub uploads: UploadStore,
    pub mode: ServiceMode,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, providers: Providers, uploads: UploadStore) -> Self {
        let analyzer = Analyzer::from_providers(&providers, config.strict_validation);
        Self {
            analyzer: Arc::new(analyzer),
            tester: providers.tester,
            uploads,
            mode: providers.mode,
            config: Arc::new(config),
        }
    }
}
