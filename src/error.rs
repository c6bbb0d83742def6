//! Error types for the tracking pipeline.

use thiserror::Error;

/// Main error type for the library.
///
/// Only startup-time failures surface here: camera acquisition, asset
/// loading, configuration. Per-frame estimation failures are absorbed
/// inside the pipeline by design; a frame without tracking is the expected
/// common case, not an error.
#[derive(Error, Debug)]
pub enum Error {
    /// Camera stream could not be acquired (permission denied, device busy)
    #[error("camera acquisition error: {0}")]
    CameraAcquisition(String),

    /// A required startup asset failed to load
    #[error("asset load error: {0}")]
    AssetLoad(String),

    /// Detector backend failed to initialize or transport broke
    #[error("detector error: {0}")]
    Detector(String),

    /// Invalid input parameters provided
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
