//! Error types for the overview engine

use std::path::PathBuf;

use thiserror::Error;

/// Result type for overview operations
pub type Result<T> = std::result::Result<T, OverviewError>;

/// Overview engine errors
///
/// Per-artifact failures (unresolvable keys, unparsable files) never surface
/// through this type from `scan`/`generate`; they degrade into empty results.
/// These errors come out of the lower-level entry points (parsing a single
/// file, loading configuration, opening a project).
#[derive(Error, Debug)]
pub enum OverviewError {
    #[error("Project root not found: {0}")]
    ProjectNotFound(PathBuf),

    #[error("XML error in {path}: {message}")]
    Xml { path: PathBuf, message: String },

    #[error("No root element in {0}")]
    EmptyDocument(PathBuf),

    #[error("Unknown artifact kind: {0}")]
    UnknownKind(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl OverviewError {
    pub fn xml(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Xml {
            path: path.into(),
            message: message.into(),
        }
    }
}
