use thiserror::Error;

/// Errors that can occur during normalization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("subword mapping '{key}' rewrote the same position more than {limit} times")]
    MappingCycle { key: String, limit: usize },
    #[error("failed to read mapping table: {0}")]
    Io(String),
}
