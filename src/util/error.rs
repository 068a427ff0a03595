//! Error types for material synthesis.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scene and pipeline operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Node does not exist at the given path
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// A container the run depends on is absent
    #[error("Missing container: {0}")]
    MissingContainer(String),

    /// A sibling with the same name already exists
    #[error("Node already exists: {0}")]
    NodeExists(String),

    /// Node name is empty or contains a path separator
    #[error("Invalid node name: {0:?}")]
    InvalidName(String),

    /// Node kind does not support the requested operation
    #[error("Kind mismatch at {path}: expected {expected}, got {actual}")]
    KindMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    /// Shading node does not expose a required input
    #[error("Input '{input}' not found on {node}")]
    InputNotFound { node: String, input: String },

    /// Input index beyond what the node accepts
    #[error("Input index {index} out of bounds on {path} (count: {count})")]
    InputOutOfBounds {
        path: String,
        index: usize,
        count: usize,
    },

    /// Parameter has an unexpected value type
    #[error("Parameter type mismatch on {path}.{parm}: expected {expected}")]
    ParmType {
        path: String,
        parm: String,
        expected: &'static str,
    },

    /// Button/action name not understood by the node
    #[error("Unknown action '{action}' on {path}")]
    UnknownAction { path: String, action: String },

    /// Texture folder is missing or is not a directory
    #[error("Texture folder not found: {0}")]
    TextureFolder(PathBuf),

    /// Invalid pipeline configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create a missing container error.
    pub fn missing_container(path: impl Into<String>) -> Self {
        Self::MissingContainer(path.into())
    }

    /// Create a node-not-found error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NodeNotFound(path.into())
    }
}

/// Result type alias for material synthesis operations.
pub type Result<T> = std::result::Result<T, Error>;
