//! Error types for the cascade classifier.
//!
//! Decode failures never escape `CascadeClassifier::classify`; they are folded
//! into an `ERROR` result there. Everything else (configuration, pool plumbing,
//! fixture I/O) is reported through these enums.

use std::io;

use thiserror::Error;

/// Classifier result type
pub type ClassifyResult<T> = Result<T, ClassifyError>;

/// Errors raised around the classification core
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The byte buffer could not be interpreted as an image
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    /// An image buffer could not be encoded
    #[error("image encode failed: {0}")]
    Encode(#[source] image::ImageError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Domain name not recognised
    #[error("unknown domain: {0}")]
    UnknownDomain(String),

    /// The pool's dispatcher is gone
    #[error("classifier pool is closed")]
    PoolClosed,

    /// A worker dropped the reply channel before answering
    #[error("classifier worker dropped the task")]
    WorkerDropped,

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    /// Config file is not valid TOML for `EngineConfig`
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// A value parsed but is out of range
    #[error("invalid config value: {0}")]
    Invalid(String),
}
