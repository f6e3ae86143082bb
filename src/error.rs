//! Error types for rust-schemamount

use thiserror::Error;

use crate::sr_types::ErrorCode;

/// Main error type for tree assembly and schema-mount operations
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Malformed XPath handed to the tree builder
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A path or subtree names a module the schema context does not implement
    #[error("Module '{0}' is not implemented in the schema context")]
    UnknownModule(String),

    /// A mounted subtree does not fit the schema context of its mount point
    #[error("Schema mismatch at mount point {mount}: {reason}")]
    SchemaMismatch { mount: String, reason: String },

    /// A leaf value was requested on a node that cannot carry one
    #[error("Node '{0}' cannot carry a value")]
    NotALeaf(String),

    /// Children were requested under a leaf
    #[error("Leaf '{0}' cannot have children")]
    LeafHasChildren(String),

    /// The session could not provide a schema context
    #[error("Session {0} has no schema context")]
    NullContext(u32),

    /// A request reached a callback that cannot serve it
    #[error("Adapter contract violation: {0}")]
    ContractViolation(String),

    /// Device-facing or service-facing collaborator failure
    #[error("Provider error: {0}")]
    Provider(String),

    /// Collaborator data that cannot be expressed in YANG items
    #[error("Translation error: {0}")]
    Translation(String),

    /// A second provider was registered for the same extension instance
    #[error("Extension instance already has a provider: {0}")]
    DuplicateMount(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CBOR encoding error
    #[error("CBOR encode error: {0}")]
    CborEncode(String),
}

impl BridgeError {
    /// Status code reported to the datastore for this failure
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidPath { .. }
            | Self::UnknownModule(_)
            | Self::SchemaMismatch { .. }
            | Self::NotALeaf(_)
            | Self::LeafHasChildren(_) => ErrorCode::Ly,
            Self::NullContext(_) | Self::Provider(_) | Self::Translation(_) => {
                ErrorCode::OperationFailed
            }
            Self::ContractViolation(_)
            | Self::DuplicateMount(_)
            | Self::Config(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::CborEncode(_) => ErrorCode::Internal,
        }
    }

    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            BridgeError::UnknownModule("x".into()).error_code(),
            ErrorCode::Ly
        );
        assert_eq!(
            BridgeError::Provider("down".into()).error_code(),
            ErrorCode::OperationFailed
        );
        assert_eq!(
            BridgeError::ContractViolation("bad".into()).error_code(),
            ErrorCode::Internal
        );
    }
}
