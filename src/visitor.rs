//! Traversal over context-owned trees.
//!
//! `AstVisitor` is the read-only walk: implementers override `visit_*` hooks
//! and call the matching `walk_*` to keep descending, or return early to
//! prune. `AstTransformer` is the rewriting walk: `visit_each_child` rebuilds
//! a node through `update`, so a subtree whose children all come back
//! unchanged keeps its identity and allocates nothing.

use crate::error::Result;
use crate::factory;
use crate::kind::FieldSlot;
use crate::native::{NativeContext, NativeValue};
use crate::nodes::*;
use crate::peer::Peer;
use crate::registry::Node;

/// Children are visited in field order, the order `children` reports.
pub trait AstVisitor {
    fn visit_program(&mut self, ctx: &dyn NativeContext, program: Program) -> Result<()> {
        walk_children(self, ctx, program.into())
    }

    fn visit_node(&mut self, ctx: &dyn NativeContext, node: Node) -> Result<()> {
        walk_node(self, ctx, node)
    }

    fn visit_identifier(&mut self, _ctx: &dyn NativeContext, _identifier: Identifier) -> Result<()> {
        // Leaf node, nothing to walk
        Ok(())
    }

    fn visit_binary_expression(
        &mut self,
        ctx: &dyn NativeContext,
        expression: BinaryExpression,
    ) -> Result<()> {
        walk_children(self, ctx, expression.into())
    }

    fn visit_call_expression(&mut self, ctx: &dyn NativeContext, call: CallExpression) -> Result<()> {
        walk_children(self, ctx, call.into())
    }

    fn visit_member_expression(
        &mut self,
        ctx: &dyn NativeContext,
        member: MemberExpression,
    ) -> Result<()> {
        walk_children(self, ctx, member.into())
    }

    fn visit_block_statement(&mut self, ctx: &dyn NativeContext, block: BlockStatement) -> Result<()> {
        walk_children(self, ctx, block.into())
    }

    fn visit_variable_declarator(
        &mut self,
        ctx: &dyn NativeContext,
        declarator: VariableDeclarator,
    ) -> Result<()> {
        walk_children(self, ctx, declarator.into())
    }
}

pub fn walk_node<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    ctx: &dyn NativeContext,
    node: Node,
) -> Result<()> {
    match node {
        Node::Program(program) => visitor.visit_program(ctx, program),
        Node::Identifier(identifier) => visitor.visit_identifier(ctx, identifier),
        Node::BinaryExpression(expression) => visitor.visit_binary_expression(ctx, expression),
        Node::CallExpression(call) => visitor.visit_call_expression(ctx, call),
        Node::MemberExpression(member) => visitor.visit_member_expression(ctx, member),
        Node::BlockStatement(block) => visitor.visit_block_statement(ctx, block),
        Node::VariableDeclarator(declarator) => visitor.visit_variable_declarator(ctx, declarator),
        other => walk_children(visitor, ctx, other),
    }
}

pub fn walk_children<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    ctx: &dyn NativeContext,
    node: Node,
) -> Result<()> {
    for child in node.children(ctx)? {
        visitor.visit_node(ctx, child)?;
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSFORMER
// ═══════════════════════════════════════════════════════════════════════════════

/// A rewriting pass. Returning the input node means "unchanged".
pub trait AstTransformer {
    fn transform(&mut self, ctx: &mut dyn NativeContext, node: Node) -> Result<Node>;
}

impl<F> AstTransformer for F
where
    F: FnMut(&mut dyn NativeContext, Node) -> Result<Node>,
{
    fn transform(&mut self, ctx: &mut dyn NativeContext, node: Node) -> Result<Node> {
        self(ctx, node)
    }
}

/// Transforms every direct child of `node` and rebuilds it through the
/// dynamic `update`. Scalar fields are carried over untouched.
pub fn visit_each_child<T: AstTransformer + ?Sized>(
    transformer: &mut T,
    ctx: &mut dyn NativeContext,
    node: Node,
) -> Result<Node> {
    let kind = node.kind();
    let mut fields = Vec::with_capacity(kind.fields().len());
    for index in 0..kind.fields().len() {
        let value = ctx.get_field(node.peer(), FieldSlot::new(kind, index))?;
        let value = match value {
            NativeValue::Node(peer) if !peer.is_null() => {
                NativeValue::Node(transform_peer(transformer, ctx, peer)?)
            }
            NativeValue::Nodes(peers) => {
                let mut transformed = Vec::with_capacity(peers.len());
                for peer in peers {
                    transformed.push(transform_peer(transformer, ctx, peer)?);
                }
                NativeValue::Nodes(transformed)
            }
            other => other,
        };
        fields.push(value);
    }
    factory::update(ctx, node, fields)
}

fn transform_peer<T: AstTransformer + ?Sized>(
    transformer: &mut T,
    ctx: &mut dyn NativeContext,
    peer: Peer,
) -> Result<Peer> {
    let child = Node::resolve(ctx, peer)?;
    Ok(transformer.transform(ctx, child)?.peer())
}

/// Applies `transformer` bottom-up to every node under and including `root`.
pub fn transform_tree<T: AstTransformer + ?Sized>(
    transformer: &mut T,
    ctx: &mut dyn NativeContext,
    root: Node,
) -> Result<Node> {
    struct BottomUp<'t, T: ?Sized> {
        inner: &'t mut T,
    }

    impl<T: AstTransformer + ?Sized> AstTransformer for BottomUp<'_, T> {
        fn transform(&mut self, ctx: &mut dyn NativeContext, node: Node) -> Result<Node> {
            let rebuilt = visit_each_child(self, ctx, node)?;
            self.inner.transform(ctx, rebuilt)
        }
    }

    BottomUp { inner: transformer }.transform(ctx, root)
}
