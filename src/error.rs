//! Error types for the peer layer.
//!
//! Every failure surfaces synchronously at the call site. Nothing here is
//! retried or recovered locally: a failing operation aborts the calling pass.

use thiserror::Error;

use crate::kind::{FieldType, NodeCategory, NodeKind};
use crate::peer::Peer;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PeerError {
    /// A required node was given the null handle
    #[error("null peer where a {expected} was required")]
    NullPeer { expected: &'static str },

    /// The handle points at a node of another kind than the wrapper expects
    #[error("peer {peer} is a {found}, expected {expected}")]
    KindMismatch {
        expected: &'static str,
        found: NodeKind,
        peer: Peer,
    },

    #[error("unknown node kind tag {0}")]
    UnknownKind(u32),

    #[error("unknown node kind name '{0}'")]
    UnknownKindName(String),

    #[error("node kind {0} is already registered with a different constructor")]
    ConflictingRegistration(NodeKind),

    /// The handle does not address a live node of this context
    #[error("invalid peer {0}")]
    InvalidPeer(Peer),

    #[error("peer {peer} belongs to context {owner}, not context {context}")]
    ForeignPeer { peer: Peer, owner: u32, context: u32 },

    #[error("node array declares {declared} elements but carries {actual}")]
    ArrayLengthMismatch { declared: u32, actual: usize },

    #[error("{kind} takes {expected} fields, got {actual}")]
    FieldCount {
        kind: NodeKind,
        expected: usize,
        actual: usize,
    },

    #[error("{kind}.{field} expects {expected:?}, got {actual}")]
    FieldType {
        kind: NodeKind,
        field: &'static str,
        expected: FieldType,
        actual: &'static str,
    },

    #[error("{kind}.{field} expects a {expected:?} node, got {found}")]
    CategoryMismatch {
        kind: NodeKind,
        field: &'static str,
        expected: NodeCategory,
        found: NodeKind,
    },

    #[error("{kind} requires field '{field}'")]
    MissingField { kind: NodeKind, field: &'static str },

    #[error("{kind} has no field #{index}")]
    NoSuchField { kind: NodeKind, index: usize },

    #[error("invalid {what} value {value}")]
    InvalidScalar { what: &'static str, value: i64 },

    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),

    #[error("unsupported construct '{construct}' at {start}..{end}")]
    Unsupported {
        construct: String,
        start: u32,
        end: u32,
    },

    #[error("operation requires context state {expected:?}, context is {actual:?}")]
    InvalidState {
        expected: crate::native::ContextState,
        actual: crate::native::ContextState,
    },

    /// Failure reported by the native compiler itself
    #[error("native error: {0}")]
    Native(String),

    #[error("JSON error: {0}")]
    Json(String),
}

impl PeerError {
    pub fn native(msg: impl Into<String>) -> Self {
        PeerError::Native(msg.into())
    }

    pub fn unsupported(construct: impl Into<String>, start: u32, end: u32) -> Self {
        PeerError::Unsupported {
            construct: construct.into(),
            start,
            end,
        }
    }
}

impl From<serde_json::Error> for PeerError {
    fn from(err: serde_json::Error) -> Self {
        PeerError::Json(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PeerError>;
