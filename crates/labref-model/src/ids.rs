#![deny(unsafe_code)]

//! Integer record identifiers.
//!
//! Knowledge-base records reference each other by id only, so every table gets
//! its own newtype to keep a `TestId` from being passed where a `SourceId` is
//! expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Primary key of a canonical test.
    TestId
);
record_id!(
    /// Primary key of a reference source.
    SourceId
);
record_id!(
    /// Primary key of a reference range row.
    RangeId
);
record_id!(
    /// Primary key of a synonym row.
    SynonymId
);
