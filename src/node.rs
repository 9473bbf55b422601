//! Wrapper base: kind-checked construction and the operations shared by
//! every node kind.

use tracing::debug;

use crate::error::{PeerError, Result};
use crate::kind::{FieldSlot, NodeCategory, NodeKind};
use crate::native::{NativeContext, NativeValue, SourceRange};
use crate::peer::Peer;
use crate::registry::Node;

/// A typed view over one native node.
///
/// Implementors hold nothing but the peer; every accessor reads through to
/// the context.
pub trait AstNodeWrapper: Copy {
    /// Name used in kind-mismatch errors
    const EXPECTED: &'static str;

    fn accepts(kind: NodeKind) -> bool;

    /// Caller must already have checked the peer's kind.
    fn from_peer_unchecked(peer: Peer) -> Self;

    fn peer(&self) -> Peer;

    /// Wraps `peer`, failing unless the context reports an accepted kind.
    fn wrap(ctx: &dyn NativeContext, peer: Peer) -> Result<Self> {
        if peer.is_null() {
            return Err(PeerError::NullPeer {
                expected: Self::EXPECTED,
            });
        }
        let found = ctx.node_kind(peer)?;
        if !Self::accepts(found) {
            return Err(PeerError::KindMismatch {
                expected: Self::EXPECTED,
                found,
                peer,
            });
        }
        Ok(Self::from_peer_unchecked(peer))
    }

    fn kind(&self, ctx: &dyn NativeContext) -> Result<NodeKind> {
        ctx.node_kind(self.peer())
    }

    fn as_ast_node(&self) -> AstNode {
        AstNode::from_peer_unchecked(self.peer())
    }

    /// Re-wraps this node as its concrete kind.
    fn as_node(&self, ctx: &dyn NativeContext) -> Result<Node> {
        Node::resolve(ctx, self.peer())
    }

    fn parent(&self, ctx: &dyn NativeContext) -> Result<Option<AstNode>> {
        let parent = ctx.parent(self.peer())?;
        Ok((!parent.is_null()).then(|| AstNode::from_peer_unchecked(parent)))
    }

    fn original(&self, ctx: &dyn NativeContext) -> Result<Option<AstNode>> {
        let original = ctx.original(self.peer())?;
        Ok((!original.is_null()).then(|| AstNode::from_peer_unchecked(original)))
    }

    fn children(&self, ctx: &dyn NativeContext) -> Result<Vec<Node>> {
        ctx.children(self.peer())?
            .into_iter()
            .map(|peer| Node::resolve(ctx, peer))
            .collect()
    }

    fn range(&self, ctx: &dyn NativeContext) -> Result<SourceRange> {
        ctx.range(self.peer())
    }
}

/// Untyped view accepting any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AstNode {
    peer: Peer,
}

impl AstNodeWrapper for AstNode {
    const EXPECTED: &'static str = "AstNode";

    fn accepts(_kind: NodeKind) -> bool {
        true
    }

    fn from_peer_unchecked(peer: Peer) -> Self {
        AstNode { peer }
    }

    fn peer(&self) -> Peer {
        self.peer
    }
}

macro_rules! category_wrapper {
    ($(#[$meta:meta])* $name:ident => $category:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name {
            peer: Peer,
        }

        impl AstNodeWrapper for $name {
            const EXPECTED: &'static str = stringify!($name);

            fn accepts(kind: NodeKind) -> bool {
                kind.category() == NodeCategory::$category
            }

            fn from_peer_unchecked(peer: Peer) -> Self {
                $name { peer }
            }

            fn peer(&self) -> Peer {
                self.peer
            }
        }
    };
}

category_wrapper! {
    /// Any node in expression position
    Expression => Expression
}

category_wrapper! {
    /// Any node in statement position
    Statement => Statement
}

category_wrapper! {
    TypeNode => TypeNode
}

/// Shared body of every `update`.
///
/// Returns `original` untouched when each candidate value is native-identical
/// to the current one. Otherwise creates a replacement, links it to
/// `original` as its provenance and gives it the original's parent and range.
pub(crate) fn update_node<T: AstNodeWrapper>(
    ctx: &mut dyn NativeContext,
    original: T,
    kind: NodeKind,
    fields: Vec<NativeValue>,
) -> Result<T> {
    let peer = original.peer();
    let found = ctx.node_kind(peer)?;
    if found != kind {
        return Err(PeerError::KindMismatch {
            expected: kind.name(),
            found,
            peer,
        });
    }

    let mut unchanged = fields.len() == kind.fields().len();
    if unchanged {
        for (index, candidate) in fields.iter().enumerate() {
            let current = ctx.get_field(peer, FieldSlot::new(kind, index))?;
            if !ctx.is_same(&current, candidate) {
                unchanged = false;
                break;
            }
        }
    }
    if unchanged {
        return Ok(original);
    }

    let parent = ctx.parent(peer)?;
    let range = ctx.range(peer)?;
    let replacement = ctx.create_node(kind, fields)?;
    ctx.set_original(replacement, peer)?;
    ctx.set_parent(replacement, parent)?;
    ctx.set_range(replacement, range)?;
    debug!(%kind, original = %peer, %replacement, "node updated");
    Ok(T::from_peer_unchecked(replacement))
}
