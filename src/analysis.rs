use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::domain::{AnalysisResult, FailureKind, UploadedAsset, WordList};
use crate::error::AnalysisError;
use crate::services::{Providers, Translator, WordExtractor};
use crate::upload::{self, validator::SIGNATURE_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    Validating,
    Extracting,
    Translating,
    Cleanup,
    Done,
    Failed,
}

impl fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnalysisStage::Validating => "validating",
            AnalysisStage::Extracting => "extracting",
            AnalysisStage::Translating => "translating",
            AnalysisStage::Cleanup => "cleanup",
            AnalysisStage::Done => "done",
            AnalysisStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Validate, extract, translate, then always remove the upload.
pub struct Analyzer {
    extractor: Arc<dyn WordExtractor>,
    translator: Arc<dyn Translator>,
    strict_validation: bool,
}

impl Analyzer {
    pub fn new(
        extractor: Arc<dyn WordExtractor>,
        translator: Arc<dyn Translator>,
        strict_validation: bool,
    ) -> Self {
        Self {
            extractor,
            translator,
            strict_validation,
        }
    }

    pub fn from_providers(providers: &Providers, strict_validation: bool) -> Self {
        Self::new(
            Arc::clone(&providers.extractor),
            Arc::clone(&providers.translator),
            strict_validation,
        )
    }

    /// Consumes the asset; its file is gone by the time this returns.
    #[tracing::instrument(skip_all, fields(file = %asset.original_name, path = %asset.path.display()))]
    pub async fn analyze(&self, asset: UploadedAsset) -> AnalysisResult {
        let outcome = self.run(&asset).await;

        enter(AnalysisStage::Cleanup);
        match upload::discard(&asset).await {
            Ok(true) => debug!("Temporary upload removed"),
            Ok(false) => debug!("Temporary upload already gone"),
            Err(e) => warn!(error = %e, "Temporary upload could not be removed"),
        }

        match outcome {
            Ok(result) => {
                enter(AnalysisStage::Done);
                result
            }
            Err(err) => {
                enter(AnalysisStage::Failed);
                error!(error = %err, "Image analysis failed");
                failure(err)
            }
        }
    }

    async fn run(&self, asset: &UploadedAsset) -> Result<AnalysisResult, AnalysisError> {
        enter(AnalysisStage::Validating);
        self.validate(asset).await?;

        enter(AnalysisStage::Extracting);
        let words = self.extractor.extract_words(asset).await?;
        info!(count = words.len(), words = ?words.as_slice(), "Words extracted");

        if words.is_empty() {
            return Ok(AnalysisResult::Success {
                message: "No English words found in the image".to_string(),
                words: WordList::new(),
                translations: Vec::new(),
                count: 0,
            });
        }

        enter(AnalysisStage::Translating);
        let translations = self.translator.translate(words.as_slice()).await?;
        info!(count = translations.len(), "Words translated");

        Ok(AnalysisResult::Success {
            message: format!(
                "Successfully analyzed image and found {} words",
                words.len()
            ),
            count: words.len(),
            words,
            translations,
        })
    }

    async fn validate(&self, asset: &UploadedAsset) -> Result<(), AnalysisError> {
        let report = if self.strict_validation {
            let header = match upload::read_header(&asset.path, SIGNATURE_LEN).await {
                Ok(header) => header,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(AnalysisError::NotFound(asset.path.clone()))
                }
                Err(e) => return Err(e.into()),
            };
            upload::validate_strict(Some(asset), &header)
        } else {
            upload::validate(Some(asset))
        };

        if report.is_valid {
            Ok(())
        } else {
            warn!(errors = ?report.errors, "Upload rejected");
            Err(AnalysisError::Validation(report.errors))
        }
    }
}

fn enter(stage: AnalysisStage) {
    debug!(%stage, "Analysis stage");
}

fn failure(err: AnalysisError) -> AnalysisResult {
    match err {
        AnalysisError::Validation(errors) => AnalysisResult::Failure {
            kind: FailureKind::Validation,
            error: "Invalid image file".to_string(),
            details: errors,
        },
        other => AnalysisResult::Failure {
            kind: FailureKind::Internal,
            error: other.to_string(),
            details: Vec::new(),
        },
    }
}
