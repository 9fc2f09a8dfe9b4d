//! Library side of the `labref` command: logging setup and observation input.

#![deny(unsafe_code)]

pub mod input;
pub mod logging;
