use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use crate::domain::UploadedAsset;
use crate::error::CleanupError;

use super::validator::extension_of;

const MAX_STEM_LEN: usize = 50;

/// Directory holding uploads while they are being analyzed.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub async fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `data` under a fresh, sanitized name derived from `original_name`.
    pub async fn save(
        &self,
        original_name: &str,
        mime_type: &str,
        data: &[u8],
    ) -> std::io::Result<UploadedAsset> {
        let path = self.dir.join(safe_filename(original_name));
        if let Err(e) = tokio::fs::write(&path, data).await {
            if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                if remove_err.kind() != ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %remove_err, "Partial upload could not be removed");
                }
            }
            return Err(e);
        }
        debug!(path = %path.display(), bytes = data.len(), "Upload stored");

        Ok(UploadedAsset {
            path,
            declared_mime_type: mime_type.to_string(),
            declared_size_bytes: data.len() as u64,
            original_name: original_name.to_string(),
        })
    }
}

/// Reads at most `len` bytes from the start of the file.
pub async fn read_header(path: &Path, len: usize) -> std::io::Result<Vec<u8>> {
    let file = tokio::fs::File::open(path).await?;
    let mut header = Vec::with_capacity(len);
    file.take(len as u64).read_to_end(&mut header).await?;
    Ok(header)
}

/// Deletes the asset's file. Returns `Ok(false)` if it was already gone.
pub async fn discard(asset: &UploadedAsset) -> Result<bool, CleanupError> {
    match tokio::fs::remove_file(&asset.path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(source) => Err(CleanupError {
            path: asset.path.clone(),
            source,
        }),
    }
}

/// `<stem>_<millis>_<random><ext>` with unsafe stem characters replaced.
pub fn safe_filename(original_name: &str) -> String {
    let file_name = Path::new(original_name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = extension_of(&file_name);
    let stem = Path::new(&file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    static UNSAFE_CHARS: OnceLock<Regex> = OnceLock::new();
    let unsafe_chars =
        UNSAFE_CHARS.get_or_init(|| Regex::new(r"[^a-zA-Z0-9\-_]").expect("static pattern"));
    let safe_stem: String = unsafe_chars
        .replace_all(&stem, "_")
        .chars()
        .take(MAX_STEM_LEN)
        .collect();

    let random = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{safe_stem}_{}_{}{ext}",
        chrono::Utc::now().timestamp_millis(),
        &random[..8]
    )
}
