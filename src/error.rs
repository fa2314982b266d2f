// src/error.rs
use std::io;
use thiserror::Error;

use crate::types::DataType;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, CollectorError>;

/// Error type for point collection and UDTF execution
#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Type mismatch: collector outputs {expected}, got {actual}")]
    TypeMismatch { expected: DataType, actual: DataType },

    #[error("Timestamp {0} has already been collected")]
    DuplicateTimestamp(i64),

    #[error("Timestamp {timestamp} is earlier than last collected timestamp {last}")]
    OutOfOrder { last: i64, timestamp: i64 },

    #[error("Collector capacity of {0} points exceeded")]
    CapacityExceeded(usize),

    #[error("UDF error: {0}")]
    Udf(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Sink error: {0}")]
    Sink(String),

    #[error("Retry error: {0}")]
    Retry(String),

    #[error("Buffer error: {0}")]
    Buffer(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl CollectorError {
    /// Wrap the final failure of a retried operation
    pub fn retry(context: &str, attempts: usize, err: impl std::fmt::Display) -> Self {
        CollectorError::Retry(format!(
            "{} failed after {} attempts: {}",
            context, attempts, err
        ))
    }

    /// Whether this error comes from violating the collector's put contract
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            CollectorError::TypeMismatch { .. }
                | CollectorError::DuplicateTimestamp(_)
                | CollectorError::OutOfOrder { .. }
        )
    }
}
