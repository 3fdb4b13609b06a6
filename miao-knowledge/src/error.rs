//! Error types for knowledge loading, configuration and remote search

use std::path::PathBuf;

/// Result type for knowledge operations.
pub type Result<T> = std::result::Result<T, KnowledgeError>;

/// Errors surfaced by the knowledge crate.
///
/// None of these ever escape the retrieval path as a failure of the chat
/// pipeline: [`find_best_match`](crate::search::find_best_match) turns every
/// backend error into "no match". They exist so that tooling (the CLI
/// `validate` command, configuration loading) can report what went wrong.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    /// Reading a knowledge or config file failed
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file extension does not identify a supported format
    #[error("Unsupported knowledge file format: {path} (expected .json or .toml)")]
    UnsupportedFormat { path: PathBuf },

    /// The document is not valid JSON/TOML, or has no recognizable shape
    #[error("Malformed knowledge source: {message}")]
    Malformed { message: String },

    /// Search configuration is invalid
    #[error("Invalid search configuration: {message}")]
    InvalidConfig { message: String },

    /// The remote knowledge service could not be reached or decoded
    #[error("Remote knowledge search failed: {source}")]
    Remote {
        #[from]
        source: reqwest::Error,
    },

    /// The remote knowledge service answered with a non-success status
    #[error("Remote knowledge search returned {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    /// The embedding backend failed
    #[error("Embedding search failed: {source}")]
    Embedding {
        #[from]
        source: miao_embed::EmbedError,
    },
}

impl KnowledgeError {
    /// Create a malformed-source error with a custom message.
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Create an invalid configuration error with a custom message.
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
