//! Error types for Faultline

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FaultlineError {
    // Catalog errors
    #[error("Fault catalog not found at {path}")]
    CatalogNotFound { path: PathBuf },

    #[error("Failed to parse fault catalog: {reason}")]
    CatalogParse { reason: String },

    #[error("Fault catalog is not a FeatureCollection")]
    CatalogNotCollection,

    // Pipeline errors
    #[error("Cannot compute a bounding box over an empty event set")]
    EmptyEventSet,

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, FaultlineError>;
