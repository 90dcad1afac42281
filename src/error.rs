use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WordListError {
    #[error("word list must contain at least one non-blank word")]
    Empty,
}

/// Failures of a single suggestion request. None of these are retried.
#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("suggestion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("suggestion service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("suggestion request timed out after {0:?}")]
    Timeout(Duration),

    #[error("suggestion response had no message content")]
    MissingContent,

    #[error("suggestion response is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("suggestion response has no \"options\" list of strings")]
    MissingOptions,

    #[error("suggestion response contained no usable words")]
    EmptyOptions,

    #[error("suggestion service is disabled: {0}")]
    Disabled(String),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("could not build email: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("email delivery timed out after {0:?}")]
    Timeout(Duration),

    #[error("email delivery is disabled: {0}")]
    Disabled(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}
