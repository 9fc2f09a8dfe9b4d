use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown sex value: {0}")]
    InvalidSex(String),
    #[error("unknown value type: {0}")]
    InvalidValueKind(String),
}
