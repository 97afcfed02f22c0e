// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Note that a command that fails to start, exits non-zero, or gets killed is
//! *not* an error here: those come back as a [`crate::exec::ProcessResult`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReapError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Operation not found: {0}")]
    OperationNotFound(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Resource exhausted while {context}: {source}")]
    ResourceExhausted {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReapError {
    pub(crate) fn exhausted(context: impl Into<String>, source: std::io::Error) -> Self {
        ReapError::ResourceExhausted {
            context: context.into(),
            source,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ReapError>;
