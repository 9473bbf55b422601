//! # es2panda peer layer
//!
//! Typed wrappers over AST nodes owned by a compiler context.
//!
//! ## Handle Invariants
//!
//! 1. **Peers only**: a wrapper holds a `Peer` and nothing else. Every field
//!    read goes through the context; nothing is cached on the Rust side.
//!
//! 2. **Explicit context**: every operation takes the context it acts on
//!    (`&dyn NativeContext` to read, `&mut dyn NativeContext` to mutate). A
//!    peer from one context is rejected by another.
//!
//! 3. **Kind-checked wrapping**: `wrap` asks the context for the node's kind
//!    and refuses a peer of any other kind. Dispatch from a bare peer goes
//!    through `Node::resolve`, an exhaustive match over the kind table.
//!
//! 4. **Identity-preserving update**: `update` with values native-identical to
//!    the current fields returns the original node and allocates nothing.
//!    Otherwise the replacement records the original as its provenance.

pub mod arena;
pub mod config;
pub mod dump;
pub mod error;
pub mod factory;
pub mod host;
pub mod importer;
pub mod kind;
pub mod native;
pub mod node;
pub mod nodes;
pub mod operators;
pub mod peer;
pub mod registry;
pub mod tracing_config;
pub mod visitor;

#[cfg(feature = "napi")]
mod bindings;

#[cfg(test)]
mod host_tests;
#[cfg(test)]
mod importer_tests;
#[cfg(test)]
mod peer_tests;
#[cfg(test)]
mod registry_tests;

#[cfg(feature = "napi")]
pub use bindings::{init_logging, AstContext};

pub use arena::ArenaContext;
pub use config::ContextOptions;
pub use error::{PeerError, Result};
pub use kind::{FieldSlot, FieldSpec, FieldType, NodeCategory, NodeKind};
pub use native::{ContextState, NativeContext, NativeValue, SourceRange};
pub use node::{AstNode, AstNodeWrapper, Expression, Statement, TypeNode};
pub use nodes::*;
pub use operators::{MemberExpressionKind, PrimitiveType, TokenType, VariableDeclarationKind};
pub use peer::{PackedArray, Peer};
pub use registry::{Node, NodeConstructor, NodeRegistry};
pub use visitor::{AstTransformer, AstVisitor};
