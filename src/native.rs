//! The native compiler boundary.
//!
//! Every wrapper operation reduces to one of these calls against an explicit
//! context. A context is never ambient: callers pass it to each operation.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::kind::{FieldSlot, NodeKind};
use crate::peer::Peer;

/// Argument or result of a native call in its marshaled form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum NativeValue {
    /// Single node; `Peer::NULL` encodes an absent optional child
    Node(Peer),
    Nodes(Vec<Peer>),
    Str(String),
    Bool(bool),
    Int(i32),
    Double(f64),
}

impl NativeValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            NativeValue::Node(_) => "node",
            NativeValue::Nodes(_) => "node array",
            NativeValue::Str(_) => "string",
            NativeValue::Bool(_) => "boolean",
            NativeValue::Int(_) => "int",
            NativeValue::Double(_) => "double",
        }
    }
}

/// Native-identity equality: node handles compare by peer, arrays element by
/// element, scalars by value and doubles bit for bit. Never structural.
pub fn same_native_value(a: &NativeValue, b: &NativeValue) -> bool {
    match (a, b) {
        (NativeValue::Node(a), NativeValue::Node(b)) => a == b,
        (NativeValue::Nodes(a), NativeValue::Nodes(b)) => a == b,
        (NativeValue::Str(a), NativeValue::Str(b)) => a == b,
        (NativeValue::Bool(a), NativeValue::Bool(b)) => a == b,
        (NativeValue::Int(a), NativeValue::Int(b)) => a == b,
        (NativeValue::Double(a), NativeValue::Double(b)) => a.to_bits() == b.to_bits(),
        _ => false,
    }
}

/// Compilation phase of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContextState {
    New,
    Parsed,
    Error,
}

/// Source offsets of a node, `start..end` in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceRange {
    pub start: u32,
    pub end: u32,
}

impl SourceRange {
    pub fn new(start: u32, end: u32) -> Self {
        SourceRange { start, end }
    }
}

/// Calls the peer layer makes into a compiler context.
///
/// Reads take `&self` and writes `&mut self`, so exclusive access is enforced
/// by the borrow checker instead of by convention.
pub trait NativeContext {
    /// Identifier of this context; the high half of every peer it hands out.
    fn id(&self) -> u32;

    fn state(&self) -> ContextState;

    fn error_message(&self) -> Option<&str>;

    /// Root of the parsed program, once the context has one.
    fn program(&self) -> Option<Peer>;

    /// `AstNodeTypeConst`
    fn node_kind(&self, peer: Peer) -> Result<NodeKind>;

    /// `Create<Kind>`; `fields` follow the kind's schema order.
    fn create_node(&mut self, kind: NodeKind, fields: Vec<NativeValue>) -> Result<Peer>;

    /// `<Kind><Field>Const`
    fn get_field(&self, peer: Peer, slot: FieldSlot) -> Result<NativeValue>;

    /// `<Kind>Set<Field>`
    fn set_field(&mut self, peer: Peer, slot: FieldSlot, value: NativeValue) -> Result<()>;

    /// `AstNodeParent`; `Peer::NULL` for roots.
    fn parent(&self, peer: Peer) -> Result<Peer>;

    fn set_parent(&mut self, peer: Peer, parent: Peer) -> Result<()>;

    /// Node this one replaced through an update, or `Peer::NULL`.
    fn original(&self, peer: Peer) -> Result<Peer>;

    fn set_original(&mut self, peer: Peer, original: Peer) -> Result<()>;

    /// Direct children in field order (`AstNodeIterateConst`).
    fn children(&self, peer: Peer) -> Result<Vec<Peer>>;

    fn range(&self, peer: Peer) -> Result<SourceRange>;

    fn set_range(&mut self, peer: Peer, range: SourceRange) -> Result<()>;

    fn is_same(&self, a: &NativeValue, b: &NativeValue) -> bool {
        same_native_value(a, b)
    }
}
