use std::sync::Arc;

use async_trait::async_trait;

use word_learner::analysis::Analyzer;
use word_learner::domain::{AnalysisResult, FailureKind, TranslationPair, UploadedAsset, WordList};
use word_learner::error::AnalysisError;
use word_learner::services::{MockProvider, Translator, WordExtractor};
use word_learner::upload::UploadStore;

const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00];

struct FailingExtractor;

#[async_trait]
impl WordExtractor for FailingExtractor {
    async fn extract_words(&self, _asset: &UploadedAsset) -> Result<WordList, AnalysisError> {
        Err(AnalysisError::ExternalService {
            status: Some(503),
            message: "upstream unavailable".to_string(),
        })
    }
}

struct EmptyExtractor;

#[async_trait]
impl WordExtractor for EmptyExtractor {
    async fn extract_words(&self, _asset: &UploadedAsset) -> Result<WordList, AnalysisError> {
        Ok(WordList::new())
    }
}

struct PanickingTranslator;

#[async_trait]
impl Translator for PanickingTranslator {
    async fn translate(&self, _words: &[String]) -> Result<Vec<TranslationPair>, AnalysisError> {
        panic!("translator must not be called when no words were found");
    }
}

async fn create_store() -> (tempfile::TempDir, UploadStore) {
    let dir = tempfile::TempDir::new().unwrap();
    let store = UploadStore::new(dir.path()).await.unwrap();
    (dir, store)
}

fn mock_analyzer(strict: bool) -> Analyzer {
    let mock = Arc::new(MockProvider::instant());
    Analyzer::new(mock.clone(), mock, strict)
}

#[tokio::test]
async fn given_hello_png_in_mock_mode_when_analyzing_then_returns_canned_translations() {
    let (_dir, store) = create_store().await;
    let asset = store.save("hello.png", "image/png", PNG_BYTES).await.unwrap();
    let path = asset.path.clone();

    let result = mock_analyzer(true).analyze(asset).await;

    let AnalysisResult::Success {
        words,
        translations,
        count,
        message,
    } = result
    else {
        panic!("expected success");
    };
    assert_eq!(words.as_slice(), ["hello", "world", "welcome"]);
    assert_eq!(
        translations,
        vec![
            TranslationPair::new("hello", "你好"),
            TranslationPair::new("world", "世界"),
            TranslationPair::new("welcome", "欢迎"),
        ]
    );
    assert_eq!(count, 3);
    assert_eq!(message, "Successfully analyzed image and found 3 words");
    assert!(!path.exists(), "upload should be deleted after analysis");
}

#[tokio::test]
async fn given_failing_extraction_when_analyzing_then_fails_and_removes_upload() {
    let (_dir, store) = create_store().await;
    let asset = store.save("photo.png", "image/png", PNG_BYTES).await.unwrap();
    let path = asset.path.clone();
    let analyzer = Analyzer::new(
        Arc::new(FailingExtractor),
        Arc::new(MockProvider::instant()),
        true,
    );

    let result = analyzer.analyze(asset).await;

    assert!(!result.is_success());
    match result {
        AnalysisResult::Failure { kind, error, .. } => {
            assert_eq!(kind, FailureKind::Internal);
            assert!(error.contains("upstream unavailable"), "{error}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(!path.exists(), "upload should be deleted after a failure");
}

#[tokio::test]
async fn given_no_words_when_analyzing_then_succeeds_with_empty_lists() {
    let (_dir, store) = create_store().await;
    let asset = store.save("blank.png", "image/png", PNG_BYTES).await.unwrap();
    let analyzer = Analyzer::new(Arc::new(EmptyExtractor), Arc::new(PanickingTranslator), true);

    let result = analyzer.analyze(asset).await;

    assert_eq!(
        result,
        AnalysisResult::Success {
            message: "No English words found in the image".to_string(),
            words: WordList::new(),
            translations: Vec::new(),
            count: 0,
        }
    );
}

#[tokio::test]
async fn given_unsupported_upload_when_analyzing_then_reports_every_validation_error() {
    let (_dir, store) = create_store().await;
    let asset = store.save("notes.txt", "text/plain", b"hello").await.unwrap();
    let path = asset.path.clone();

    let result = mock_analyzer(true).analyze(asset).await;

    let AnalysisResult::Failure { kind, details, .. } = result else {
        panic!("expected validation failure");
    };
    assert_eq!(kind, FailureKind::Validation);
    assert_eq!(details.len(), 3, "{details:?}");
    assert!(details.iter().any(|d| d == "Invalid image format detected"));
    assert!(!path.exists());
}

#[tokio::test]
async fn given_spoofed_content_when_not_strict_then_declared_metadata_is_trusted() {
    let (_dir, store) = create_store().await;
    let asset = store.save("test.png", "image/png", b"not an image").await.unwrap();

    let result = mock_analyzer(false).analyze(asset).await;

    let AnalysisResult::Success { words, .. } = result else {
        panic!("expected success");
    };
    assert_eq!(words.as_slice(), ["test", "sample", "image", "text"]);
}

#[tokio::test]
async fn given_missing_file_when_analyzing_then_fails_with_not_found() {
    let (dir, _store) = create_store().await;
    let asset = UploadedAsset {
        path: dir.path().join("vanished.png"),
        declared_mime_type: "image/png".to_string(),
        declared_size_bytes: 10,
        original_name: "vanished.png".to_string(),
    };

    let result = mock_analyzer(false).analyze(asset).await;

    let AnalysisResult::Failure { kind, error, .. } = result else {
        panic!("expected failure");
    };
    assert_eq!(kind, FailureKind::Internal);
    assert!(error.starts_with("Image file not found"), "{error}");
}

#[tokio::test]
async fn given_undeletable_upload_when_analyzing_then_result_is_unchanged() {
    let (dir, _store) = create_store().await;
    // A non-empty directory where the upload should be makes `remove_file` fail.
    let path = dir.path().join("blank.png");
    std::fs::create_dir(&path).unwrap();
    std::fs::write(path.join("keep"), b"x").unwrap();
    let asset = UploadedAsset {
        path: path.clone(),
        declared_mime_type: "image/png".to_string(),
        declared_size_bytes: 10,
        original_name: "blank.png".to_string(),
    };
    let analyzer = Analyzer::new(Arc::new(EmptyExtractor), Arc::new(PanickingTranslator), false);

    let result = analyzer.analyze(asset).await;

    assert_eq!(
        result,
        AnalysisResult::Success {
            message: "No English words found in the image".to_string(),
            words: WordList::new(),
            translations: Vec::new(),
            count: 0,
        }
    );
    assert!(path.exists(), "cleanup failure should leave the path in place");
}
