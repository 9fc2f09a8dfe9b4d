#![deny(unsafe_code)]

pub mod error;
pub mod integrity;
pub mod registry;
pub mod snapshot;
pub mod stats;

pub use crate::error::KbError;
pub use crate::integrity::{IntegrityReport, IntegrityViolation};
pub use crate::registry::{KbCounts, KnowledgeBase, LoadSummary};
pub use crate::snapshot::KbSnapshot;
pub use crate::stats::{KbStats, LabelCount};
