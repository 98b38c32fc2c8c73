//! Core error types for graph editing, rendering and persistence
//!
//! Validation problems are resolved inside the edit session before they reach
//! the store; store failures propagate to the caller unchanged.

use std::fmt;

use thiserror::Error;

use super::types::{GraphMetaId, UserId};

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, MeshError>;

/// What kind of record a `NotFound` error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Node,
    Edge,
    Graph,
    Category,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Node => write!(f, "node"),
            EntityKind::Edge => write!(f, "edge"),
            EntityKind::Graph => write!(f, "graph"),
            EntityKind::Category => write!(f, "category"),
        }
    }
}

/// Errors surfaced by meshUp components
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("Not found: {kind} {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Invalid structure: {message}")]
    InvalidStructure { message: String },

    #[error("Permission denied: user {user} may not modify graph {graph}")]
    PermissionDenied { user: UserId, graph: GraphMetaId },

    #[error("Not signed in")]
    Unauthenticated,

    #[error("Transient I/O failure: {message}")]
    TransientIo { message: String },

    #[error("Subscription closed: {message}")]
    SubscriptionClosed { message: String },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl MeshError {
    /// Create a new not-found error
    pub fn not_found(kind: EntityKind, id: impl fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Create a new invalid-structure error
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }

    /// Create a new permission error
    pub fn permission_denied(user: UserId, graph: GraphMetaId) -> Self {
        Self::PermissionDenied { user, graph }
    }

    /// Create a new transient I/O error
    pub fn transient_io(message: impl Into<String>) -> Self {
        Self::TransientIo {
            message: message.into(),
        }
    }

    /// Create a new closed-subscription error
    pub fn subscription_closed(message: impl Into<String>) -> Self {
        Self::SubscriptionClosed {
            message: message.into(),
        }
    }

    /// True for failures the caller may reasonably retry later
    pub fn is_transient(&self) -> bool {
        matches!(self, MeshError::TransientIo { .. })
    }
}
