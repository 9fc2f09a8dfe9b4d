#![deny(unsafe_code)]

pub mod index;
pub mod suggest;

pub use crate::index::{NameIndex, NameMatch};
pub use crate::suggest::{DEFAULT_MIN_SCORE, Suggestion};
