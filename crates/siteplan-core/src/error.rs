//! Error handling for the site-planning engine
//!
//! Provides error types for every layer of the engine:
//! - Model errors (layers, features, images, tool gating)
//! - Snapshot errors (planning snapshot decoding)
//! - Conversion errors (external 3D conversion service)
//! - Persistence errors (snapshot store)
//!
//! All error types use `thiserror` for ergonomic error handling. Nothing in
//! the engine is fatal: an error always means "no change applied".

use thiserror::Error;

/// Model error type
///
/// Represents refused edits on the planning model. The model is left
/// unchanged whenever one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Layer does not exist
    #[error("Layer not found: {id}")]
    LayerNotFound {
        /// The unknown layer id.
        id: String,
    },

    /// Attempt to delete the only remaining layer
    #[error("Cannot delete the last remaining layer")]
    LastLayer,

    /// Polygon or polyline does not exist
    #[error("Feature not found: {id}")]
    FeatureNotFound {
        /// The unknown feature id.
        id: String,
    },

    /// Planning image does not exist
    #[error("Image not found: {id}")]
    ImageNotFound {
        /// The unknown image id.
        id: String,
    },

    /// The requested tool is not available on the active layer kind
    #[error("Tool {tool} is not available on {kind} layers")]
    ToolNotAllowed {
        /// The requested tool name.
        tool: String,
        /// The active layer kind.
        kind: String,
    },

    /// Owning layer or image is locked
    #[error("{what} is locked")]
    Locked {
        /// Description of the locked item.
        what: String,
    },

    /// Geometry does not meet the minimum point count
    #[error("Degenerate geometry: {reason}")]
    Degenerate {
        /// Why the geometry was rejected.
        reason: String,
    },
}

/// Snapshot error type
///
/// Represents failures while decoding a persisted planning snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Snapshot version is not understood by this engine
    #[error("Unsupported snapshot version {version} (expected {expected})")]
    UnsupportedVersion {
        /// The version found in the snapshot.
        version: u32,
        /// The version this engine writes.
        expected: u32,
    },

    /// Snapshot JSON could not be parsed
    #[error("Malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Conversion error type
///
/// Reported by the external 3D conversion service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// The service reported a failure
    #[error("Conversion failed: {message}")]
    Failed {
        /// User-visible failure message.
        message: String,
    },

    /// The snapshot was rejected before conversion started
    #[error("Conversion rejected: {reason}")]
    Rejected {
        /// Why the snapshot was rejected.
        reason: String,
    },
}

/// Persistence error type
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Stored plan could not be read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file involved.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Stored plan is not valid JSON
    #[error("Corrupted plan store: {0}")]
    Corrupted(#[from] serde_json::Error),
}

/// Main error type for the engine
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Model error
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Snapshot error
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// Conversion error
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Persistence error
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a model error
    pub fn is_model_error(&self) -> bool {
        matches!(self, Error::Model(_))
    }

    /// Check if this came from the external conversion service
    pub fn is_conversion_error(&self) -> bool {
        matches!(self, Error::Conversion(_))
    }

    /// Human-readable message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            Error::Conversion(ConversionError::Failed { message }) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
