mod store;
pub mod validator;

pub use store::{discard, read_header, safe_filename, UploadStore};
pub use validator::{validate, validate_strict, ValidationReport, MAX_FILE_SIZE};
