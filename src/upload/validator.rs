//! Allow-list checks for uploaded images.
//!
//! Declared MIME type and extension come from the client and are untrusted;
//! only [`validate_strict`] looks at the actual bytes.

use std::path::Path;

use serde::Serialize;

use crate::domain::UploadedAsset;

pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Accepted MIME types with their extensions.
pub const SUPPORTED_FORMATS: [(&str, &[&str]); 3] = [
    ("image/jpeg", &[".jpg", ".jpeg"]),
    ("image/png", &[".png"]),
    ("image/gif", &[".gif"]),
];

const SIGNATURES: [(&[u8], &str); 3] = [
    (&[0xFF, 0xD8], "image/jpeg"),
    (&[0x89, 0x50, 0x4E, 0x47], "image/png"),
    (&[0x47, 0x49, 0x46, 0x38], "image/gif"),
];

/// Number of leading bytes [`validate_strict`] needs.
pub const SIGNATURE_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_type: Option<&'static str>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>, detected_type: Option<&'static str>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            detected_type,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadLimits {
    pub supported_formats: Vec<&'static str>,
    pub allowed_extensions: Vec<&'static str>,
    pub max_file_size: u64,
    pub max_file_size_formatted: String,
}

pub fn limits() -> UploadLimits {
    UploadLimits {
        supported_formats: supported_mime_types().collect(),
        allowed_extensions: allowed_extensions().collect(),
        max_file_size: MAX_FILE_SIZE,
        max_file_size_formatted: format_file_size(MAX_FILE_SIZE),
    }
}

pub fn supported_mime_types() -> impl Iterator<Item = &'static str> {
    SUPPORTED_FORMATS.iter().map(|(mime, _)| *mime)
}

pub fn allowed_extensions() -> impl Iterator<Item = &'static str> {
    SUPPORTED_FORMATS
        .iter()
        .flat_map(|(_, exts)| exts.iter().copied())
}

/// Runs every declared-metadata check and collects all failures.
pub fn validate(asset: Option<&UploadedAsset>) -> ValidationReport {
    let Some(asset) = asset else {
        return ValidationReport::from_errors(vec!["No file provided".to_string()], None);
    };
    ValidationReport::from_errors(metadata_errors(asset), None)
}

/// [`validate`] plus a magic-number check on the first bytes of the content.
pub fn validate_strict(asset: Option<&UploadedAsset>, header: &[u8]) -> ValidationReport {
    let Some(asset) = asset else {
        return validate(None);
    };

    let mut errors = metadata_errors(asset);
    let detected_type = sniff_mime_type(header);

    if header.is_empty() {
        errors.push("Empty file provided".to_string());
    } else if detected_type.is_none() {
        errors.push("Invalid image format detected".to_string());
    }

    ValidationReport::from_errors(errors, detected_type)
}

fn metadata_errors(asset: &UploadedAsset) -> Vec<String> {
    let mut errors = Vec::new();

    if asset.declared_size_bytes > MAX_FILE_SIZE {
        errors.push(format!(
            "File size ({}) exceeds maximum allowed size ({})",
            format_file_size(asset.declared_size_bytes),
            format_file_size(MAX_FILE_SIZE)
        ));
    }

    if !supported_mime_types().any(|mime| mime == asset.declared_mime_type) {
        errors.push(format!(
            "Unsupported file type: {}. Supported types: {}",
            asset.declared_mime_type,
            supported_mime_types().collect::<Vec<_>>().join(", ")
        ));
    }

    let ext = extension_of(&asset.original_name);
    if !allowed_extensions().any(|allowed| allowed == ext) {
        errors.push(format!(
            "Unsupported file extension: {}. Supported extensions: {}",
            if ext.is_empty() { "(none)" } else { ext.as_str() },
            allowed_extensions().collect::<Vec<_>>().join(", ")
        ));
    }

    errors
}

/// Matches the leading bytes against the known image signatures.
pub fn sniff_mime_type(header: &[u8]) -> Option<&'static str> {
    SIGNATURES
        .iter()
        .find(|(magic, _)| header.starts_with(magic))
        .map(|(_, mime)| *mime)
}

/// Lowercased extension including the dot, or an empty string.
pub fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

pub fn mime_for_extension(ext: &str) -> &'static str {
    let ext = ext.to_lowercase();
    SUPPORTED_FORMATS
        .iter()
        .find(|(_, exts)| exts.contains(&ext.as_str()))
        .map(|(mime, _)| *mime)
        .unwrap_or("application/octet-stream")
}

/// Human-readable size in powers of 1024, e.g. `1.5 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn asset(name: &str, mime: &str, size: u64) -> UploadedAsset {
        UploadedAsset {
            path: PathBuf::from("/tmp/unused"),
            declared_mime_type: mime.to_string(),
            declared_size_bytes: size,
            original_name: name.to_string(),
        }
    }

    #[test]
    fn accepts_supported_image() {
        let report = validate(Some(&asset("photo.JPG", "image/jpeg", 1024)));
        assert!(report.is_valid, "{:?}", report.errors);
    }

    #[test]
    fn missing_asset_is_invalid() {
        let report = validate(None);
        assert!(!report.is_valid);
        assert_eq!(report.errors, vec!["No file provided"]);
    }

    #[test]
    fn oversized_file_is_rejected_even_when_otherwise_valid() {
        for size in [MAX_FILE_SIZE + 1, 12 * 1024 * 1024, u64::from(u32::MAX)] {
            let report = validate(Some(&asset("a.png", "image/png", size)));
            assert!(!report.is_valid);
            assert_eq!(report.errors.len(), 1);
            assert!(report.errors[0].contains("exceeds maximum allowed size (10 MB)"));
        }
    }

    #[test]
    fn exactly_max_size_is_allowed() {
        let report = validate(Some(&asset("a.gif", "image/gif", MAX_FILE_SIZE)));
        assert!(report.is_valid);
    }

    #[test]
    fn collects_every_failure() {
        let report = validate(Some(&asset("notes.txt", "text/plain", MAX_FILE_SIZE * 2)));
        assert_eq!(report.errors.len(), 3);
        assert!(report.errors[0].starts_with("File size (20 MB)"));
        assert!(report.errors[1].starts_with("Unsupported file type: text/plain"));
        assert!(report.errors[2].starts_with("Unsupported file extension: .txt"));
    }

    #[test]
    fn strict_validation_detects_signatures() {
        let png = asset("a.png", "image/png", 8);
        let report = validate_strict(Some(&png), &[0x89, 0x50, 0x4E, 0x47]);
        assert!(report.is_valid);
        assert_eq!(report.detected_type, Some("image/png"));

        let jpeg = asset("a.jpg", "image/jpeg", 8);
        let report = validate_strict(Some(&jpeg), &[0xFF, 0xD8, 0xFF, 0xE0]);
        assert_eq!(report.detected_type, Some("image/jpeg"));
    }

    #[test]
    fn strict_validation_rejects_spoofed_content() {
        let spoofed = asset("a.png", "image/png", 8);
        let report = validate_strict(Some(&spoofed), b"%PDF");
        assert!(!report.is_valid);
        assert_eq!(report.errors, vec!["Invalid image format detected"]);

        let report = validate_strict(Some(&spoofed), &[]);
        assert_eq!(report.errors, vec!["Empty file provided"]);
    }

    #[test]
    fn formats_sizes_like_a_human() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(MAX_FILE_SIZE), "10 MB");
        assert_eq!(format_file_size(1_288_490_189), "1.2 GB");
    }

    #[test]
    fn maps_extensions_to_mime_types() {
        assert_eq!(mime_for_extension(".JPEG"), "image/jpeg");
        assert_eq!(mime_for_extension(".gif"), "image/gif");
        assert_eq!(mime_for_extension(".bmp"), "application/octet-stream");
        assert_eq!(extension_of("archive.tar.PNG"), ".png");
        assert_eq!(extension_of("README"), "");
    }
}
