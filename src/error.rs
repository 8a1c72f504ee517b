//! Error types for pandora operations.

use thiserror::Error;

/// Errors that abort a bundle build.
///
/// Failures of individual elements never surface here; the dispatcher turns
/// them into `error` entries of the manifest instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid bundle: {0}")]
    InvalidBundle(String),
}

pub type Result<T> = std::result::Result<T, Error>;
