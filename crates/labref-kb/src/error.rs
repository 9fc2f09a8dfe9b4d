#![deny(unsafe_code)]

use std::path::PathBuf;

use crate::integrity::IntegrityReport;

#[derive(Debug, thiserror::Error)]
pub enum KbError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse knowledge-base snapshot {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse knowledge-base snapshot: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("knowledge base rejected: {0}")]
    Integrity(IntegrityReport),
}

impl KbError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Integrity violations, when the snapshot was rejected for content.
    pub fn integrity_report(&self) -> Option<&IntegrityReport> {
        match self {
            Self::Integrity(report) => Some(report),
            _ => None,
        }
    }
}
