//! Error types used by the crate.

use galileo_mvt::error::GalileoMvtError;
use thiserror::Error;

/// Parcel map error type.
#[derive(Debug, Error)]
pub enum ParcelMapError {
    /// Network error.
    #[error("failed to load data")]
    Io,
    /// Server responded with a non-success status code.
    #[error("server responded with status {0}")]
    Http(u16),
    /// A style document or a configuration file is not valid JSON or does not follow the expected structure.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Error decoding tile data.
    #[error("failed to decode tile")]
    Decoding(#[from] GalileoMvtError),
    /// A URL or popup template could not be rendered.
    #[error("invalid template: {0}")]
    Template(String),
    /// Configuration values are inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Error reading data from the FS.
    #[error("failed to read file")]
    FsIo(#[from] std::io::Error),
}

impl From<reqwest::Error> for ParcelMapError {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) => Self::Http(status.as_u16()),
            None => Self::Io,
        }
    }
}

impl From<strfmt::FmtError> for ParcelMapError {
    fn from(value: strfmt::FmtError) -> Self {
        Self::Template(value.to_string())
    }
}
