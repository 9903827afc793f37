//! Error types
//!
//! Storage, rendering, form decoding and startup configuration failures.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Page storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// No readable file for the title. Covers absent files and any other read failure.
    #[error("page '{title}' not found")]
    NotFound {
        title: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write page '{title}': {source}")]
    Write {
        title: String,
        #[source]
        source: io::Error,
    },
}

/// Template rendering errors
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to load template {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("page '{title}' body is not valid UTF-8")]
    InvalidBody { title: String },
}

/// Save form decoding errors
#[derive(Debug, Error)]
pub enum FormError {
    #[error("unsupported form encoding '{0}'")]
    Unsupported(String),

    #[error("{0}")]
    UrlEncoded(#[from] serde_urlencoded::de::Error),

    #[error("{0}")]
    Multipart(#[from] multer::Error),
}

/// Startup configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
