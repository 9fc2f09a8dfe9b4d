#![deny(unsafe_code)]

//! The knowledge-base interchange document.
//!
//! A snapshot is a JSON object holding the four tables as arrays of rows:
//!
//! ```text
//! { "tests": [...], "sources": [...], "ranges": [...], "synonyms": [...] }
//! ```
//!
//! Rows keep the column names and nullability of the relational tables.

use std::path::Path;

use labref_model::{ReferenceRange, Source, Synonym, Test};
use serde::{Deserialize, Serialize};

use sha2::{Digest, Sha256};

use crate::error::KbError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KbSnapshot {
    #[serde(default)]
    pub tests: Vec<Test>,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub ranges: Vec<ReferenceRange>,
    #[serde(default)]
    pub synonyms: Vec<Synonym>,
}

/// A parsed snapshot together with the fingerprint of its raw bytes.
#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    pub snapshot: KbSnapshot,
    pub sha256: String,
}

impl KbSnapshot {
    pub fn from_json_str(json: &str) -> Result<Self, KbError> {
        serde_json::from_str(json).map_err(KbError::Parse)
    }

    pub fn read(path: &Path) -> Result<LoadedSnapshot, KbError> {
        let bytes = std::fs::read(path).map_err(|e| KbError::io(path, e))?;
        let snapshot = serde_json::from_slice(&bytes).map_err(|e| KbError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(LoadedSnapshot {
            snapshot,
            sha256: fingerprint(&bytes),
        })
    }
}

/// Lowercase hex SHA-256 of the snapshot file as read from disk.
pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
