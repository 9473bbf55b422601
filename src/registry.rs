//! Kind-tag dispatch: turning a bare peer into its concrete wrapper.
//!
//! The built-in table is an exhaustive match over `NodeKind`. `NodeRegistry`
//! layers a runtime map on top for hosts that resolve by tag and want
//! duplicate registration reported instead of silently replaced.

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::{PeerError, Result};
use crate::kind::NodeKind;
use crate::native::NativeContext;
use crate::node::{AstNode, AstNodeWrapper};
use crate::nodes::*;
use crate::peer::Peer;

pub type NodeConstructor = fn(Peer) -> Node;

macro_rules! node_variants {
    ($($kind:ident),* $(,)?) => {
        /// A node wrapped as its concrete kind.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Node {
            $($kind($kind)),*
        }

        impl Node {
            /// Built-in constructor for `kind`.
            pub fn constructor(kind: NodeKind) -> NodeConstructor {
                match kind {
                    $(NodeKind::$kind => |peer: Peer| Node::$kind($kind::from_peer_unchecked(peer)),)*
                }
            }

            pub fn kind(&self) -> NodeKind {
                match self {
                    $(Node::$kind(_) => NodeKind::$kind,)*
                }
            }

            pub fn peer(&self) -> Peer {
                match self {
                    $(Node::$kind(node) => node.peer(),)*
                }
            }
        }

        $(
            impl From<$kind> for Node {
                fn from(node: $kind) -> Self {
                    Node::$kind(node)
                }
            }
        )*
    };
}

node_variants! {
    Program,
    Identifier,
    StringLiteral,
    NumberLiteral,
    BooleanLiteral,
    NullLiteral,
    UndefinedLiteral,
    ThisExpression,
    BinaryExpression,
    UnaryExpression,
    AssignmentExpression,
    ConditionalExpression,
    CallExpression,
    MemberExpression,
    ArrayExpression,
    ExpressionStatement,
    BlockStatement,
    IfStatement,
    ReturnStatement,
    WhileStatement,
    EmptyStatement,
    VariableDeclaration,
    VariableDeclarator,
    ETSPrimitiveType,
    ETSTypeReference,
    ETSUnionType,
}

impl Node {
    /// Wraps `peer` as `kind` without consulting the context.
    pub fn from_kind(kind: NodeKind, peer: Peer) -> Node {
        Node::constructor(kind)(peer)
    }

    /// Asks the context for the peer's kind tag and wraps accordingly.
    pub fn resolve(ctx: &dyn NativeContext, peer: Peer) -> Result<Node> {
        if peer.is_null() {
            return Err(PeerError::NullPeer { expected: "node" });
        }
        let kind = ctx.node_kind(peer)?;
        Ok(Node::from_kind(kind, peer))
    }

    pub fn as_ast_node(&self) -> AstNode {
        AstNode::from_peer_unchecked(self.peer())
    }

    pub fn children(&self, ctx: &dyn NativeContext) -> Result<Vec<Node>> {
        self.as_ast_node().children(ctx)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

// Never handed out by a context: slot 0 is reserved.
const SAMPLE_PEER: Peer = Peer::new(u32::MAX, 0);

#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    constructors: HashMap<NodeKind, NodeConstructor>,
}

impl NodeRegistry {
    /// Empty registry; every resolve fails until kinds are registered.
    pub fn new() -> Self {
        NodeRegistry::default()
    }

    /// Registry preloaded with every built-in kind.
    pub fn builtin() -> Self {
        let constructors = NodeKind::ALL
            .iter()
            .map(|kind| (*kind, Node::constructor(*kind)))
            .collect();
        NodeRegistry { constructors }
    }

    /// Registering the same constructor twice is a no-op; a different
    /// constructor for an already registered kind is rejected. Constructors
    /// are compared by the node they build, not by function address.
    pub fn register(&mut self, kind: NodeKind, constructor: NodeConstructor) -> Result<()> {
        match self.constructors.get(&kind) {
            Some(existing) if existing(SAMPLE_PEER) == constructor(SAMPLE_PEER) => Ok(()),
            Some(_) => {
                warn!(%kind, "conflicting constructor registration");
                Err(PeerError::ConflictingRegistration(kind))
            }
            None => {
                debug!(%kind, "constructor registered");
                self.constructors.insert(kind, constructor);
                Ok(())
            }
        }
    }

    pub fn is_registered(&self, kind: NodeKind) -> bool {
        self.constructors.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    pub fn resolve(&self, kind: NodeKind, peer: Peer) -> Result<Node> {
        self.constructors
            .get(&kind)
            .map(|constructor| constructor(peer))
            .ok_or(PeerError::UnknownKind(kind.tag()))
    }

    /// Resolves a raw tag as reported by the native side.
    pub fn resolve_tag(&self, tag: u32, peer: Peer) -> Result<Node> {
        self.resolve(NodeKind::from_tag(tag)?, peer)
    }

    pub fn resolve_peer(&self, ctx: &dyn NativeContext, peer: Peer) -> Result<Node> {
        if peer.is_null() {
            return Err(PeerError::NullPeer { expected: "node" });
        }
        self.resolve(ctx.node_kind(peer)?, peer)
    }
}
