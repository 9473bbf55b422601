//! Peer handles and marshaling between typed wrappers and native arguments.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PeerError, Result};
use crate::native::{NativeContext, NativeValue};
use crate::node::AstNodeWrapper;

/// Opaque handle to a node owned by a native context.
///
/// The upper 32 bits name the owning context, the lower 32 bits the node slot
/// (1-based). Handles compare by value: two wrappers holding equal peers view
/// the same native node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Peer(u64);

impl Peer {
    pub const NULL: Peer = Peer(0);

    pub const fn new(context: u32, slot: u32) -> Self {
        Peer(((context as u64) << 32) | slot as u64)
    }

    pub const fn from_raw(raw: u64) -> Self {
        Peer(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    pub fn context_id(self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub fn slot(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NODE ARRAYS
// ═══════════════════════════════════════════════════════════════════════════════

/// Contiguous handle array plus the explicit length the native signature takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedArray {
    peers: Vec<Peer>,
    len: u32,
}

impl PackedArray {
    /// Validates that the declared length matches the buffer before the pair
    /// can reach a native call.
    pub fn new(peers: Vec<Peer>, len: u32) -> Result<Self> {
        if peers.len() != len as usize {
            return Err(PeerError::ArrayLengthMismatch {
                declared: len,
                actual: peers.len(),
            });
        }
        if peers.iter().any(|peer| peer.is_null()) {
            return Err(PeerError::NullPeer {
                expected: "array element",
            });
        }
        Ok(PackedArray { peers, len })
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    pub fn into_peers(self) -> Vec<Peer> {
        self.peers
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PACK / UNPACK
// ═══════════════════════════════════════════════════════════════════════════════

/// Null-safe: `None` packs to `Peer::NULL`.
pub fn pack_node<T: AstNodeWrapper>(node: Option<&T>) -> Peer {
    node.map_or(Peer::NULL, |node| node.peer())
}

pub fn pack_node_array<T: AstNodeWrapper>(nodes: &[T]) -> PackedArray {
    let peers: Vec<Peer> = nodes.iter().map(|node| node.peer()).collect();
    let len = peers.len() as u32;
    PackedArray { peers, len }
}

pub fn unpack_node<T: AstNodeWrapper>(ctx: &dyn NativeContext, peer: Peer) -> Result<Option<T>> {
    if peer.is_null() {
        return Ok(None);
    }
    T::wrap(ctx, peer).map(Some)
}

pub fn unpack_nonnull_node<T: AstNodeWrapper>(ctx: &dyn NativeContext, peer: Peer) -> Result<T> {
    T::wrap(ctx, peer)
}

pub fn unpack_node_array<T: AstNodeWrapper>(
    ctx: &dyn NativeContext,
    array: &PackedArray,
) -> Result<Vec<T>> {
    array
        .peers()
        .iter()
        .map(|peer| T::wrap(ctx, *peer))
        .collect()
}

/// Native strings may carry a trailing NUL from C buffers; it is not part of
/// the text.
pub fn unpack_string(buffer: &[u8]) -> Result<String> {
    let end = buffer
        .iter()
        .position(|byte| *byte == 0)
        .unwrap_or(buffer.len());
    String::from_utf8(buffer[..end].to_vec())
        .map_err(|err| PeerError::native(format!("string is not UTF-8: {}", err)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// FIELD CONVERSIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Conversion of a typed field value to and from its native encoding.
pub trait NativeField: Sized {
    fn pack(&self) -> NativeValue;

    fn unpack(ctx: &dyn NativeContext, value: NativeValue) -> Result<Self>;
}

fn unexpected<T>(expected: &'static str, value: &NativeValue) -> Result<T> {
    Err(PeerError::native(format!(
        "expected {} from native, got {}",
        expected,
        value.type_name()
    )))
}

impl<T: AstNodeWrapper> NativeField for T {
    fn pack(&self) -> NativeValue {
        NativeValue::Node(self.peer())
    }

    fn unpack(ctx: &dyn NativeContext, value: NativeValue) -> Result<Self> {
        match value {
            NativeValue::Node(peer) => unpack_nonnull_node(ctx, peer),
            other => unexpected("node", &other),
        }
    }
}

impl<T: AstNodeWrapper> NativeField for Option<T> {
    fn pack(&self) -> NativeValue {
        NativeValue::Node(pack_node(self.as_ref()))
    }

    fn unpack(ctx: &dyn NativeContext, value: NativeValue) -> Result<Self> {
        match value {
            NativeValue::Node(peer) => unpack_node(ctx, peer),
            other => unexpected("optional node", &other),
        }
    }
}

impl<T: AstNodeWrapper> NativeField for Vec<T> {
    fn pack(&self) -> NativeValue {
        NativeValue::Nodes(pack_node_array(self).into_peers())
    }

    fn unpack(ctx: &dyn NativeContext, value: NativeValue) -> Result<Self> {
        match value {
            NativeValue::Nodes(peers) => {
                let len = peers.len() as u32;
                unpack_node_array(ctx, &PackedArray::new(peers, len)?)
            }
            other => unexpected("node array", &other),
        }
    }
}

impl NativeField for String {
    fn pack(&self) -> NativeValue {
        NativeValue::Str(self.clone())
    }

    fn unpack(_ctx: &dyn NativeContext, value: NativeValue) -> Result<Self> {
        match value {
            NativeValue::Str(text) => Ok(text),
            other => unexpected("string", &other),
        }
    }
}

impl NativeField for bool {
    fn pack(&self) -> NativeValue {
        NativeValue::Bool(*self)
    }

    fn unpack(_ctx: &dyn NativeContext, value: NativeValue) -> Result<Self> {
        match value {
            NativeValue::Bool(flag) => Ok(flag),
            other => unexpected("boolean", &other),
        }
    }
}

impl NativeField for f64 {
    fn pack(&self) -> NativeValue {
        NativeValue::Double(*self)
    }

    fn unpack(_ctx: &dyn NativeContext, value: NativeValue) -> Result<Self> {
        match value {
            NativeValue::Double(number) => Ok(number),
            other => unexpected("double", &other),
        }
    }
}
