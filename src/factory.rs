//! Factory: the create/update entry point pair of every node kind.
//!
//! Typed entry points delegate to the wrapper associated functions. The
//! dynamic `create`/`update` take schema-ordered native values and are what
//! host bindings and generic tree rewrites use.

use crate::error::{PeerError, Result};
use crate::kind::{FieldSlot, FieldType, NodeKind};
use crate::native::{NativeContext, NativeValue};
use crate::node::{update_node, AstNodeWrapper, Expression, Statement, TypeNode};
use crate::nodes::*;
use crate::operators::{MemberExpressionKind, PrimitiveType, TokenType, VariableDeclarationKind};
use crate::peer::Peer;
use crate::registry::Node;

macro_rules! factory {
    ($($create:ident, $update:ident => $node:ident($($field:ident: $ty:ty),*);)*) => {
        $(
            pub fn $create(ctx: &mut dyn NativeContext $(, $field: $ty)*) -> Result<$node> {
                $node::create(ctx $(, $field)*)
            }

            pub fn $update(
                ctx: &mut dyn NativeContext,
                original: $node
                $(, $field: $ty)*
            ) -> Result<$node> {
                original.update(ctx $(, $field)*)
            }
        )*

        /// Names of the typed create/update pair for `kind`.
        pub fn entry_points(kind: NodeKind) -> (&'static str, &'static str) {
            match kind {
                $(NodeKind::$node => (stringify!($create), stringify!($update)),)*
            }
        }
    };
}

factory! {
    create_program, update_program => Program(file_name: String, statements: Vec<Statement>);
    create_identifier, update_identifier => Identifier(name: String);
    create_string_literal, update_string_literal => StringLiteral(value: String);
    create_number_literal, update_number_literal => NumberLiteral(value: f64);
    create_boolean_literal, update_boolean_literal => BooleanLiteral(value: bool);
    create_null_literal, update_null_literal => NullLiteral();
    create_undefined_literal, update_undefined_literal => UndefinedLiteral();
    create_this_expression, update_this_expression => ThisExpression();
    create_binary_expression, update_binary_expression =>
        BinaryExpression(left: Expression, right: Expression, operator: TokenType);
    create_unary_expression, update_unary_expression =>
        UnaryExpression(argument: Expression, operator: TokenType);
    create_assignment_expression, update_assignment_expression =>
        AssignmentExpression(left: Expression, right: Expression, operator: TokenType);
    create_conditional_expression, update_conditional_expression =>
        ConditionalExpression(test: Expression, consequent: Expression, alternate: Expression);
    create_call_expression, update_call_expression =>
        CallExpression(callee: Expression, arguments: Vec<Expression>, optional: bool);
    create_member_expression, update_member_expression => MemberExpression(
        object: Expression,
        property: Expression,
        member_kind: MemberExpressionKind,
        computed: bool,
        optional: bool
    );
    create_array_expression, update_array_expression => ArrayExpression(elements: Vec<Expression>);
    create_expression_statement, update_expression_statement =>
        ExpressionStatement(expression: Expression);
    create_block_statement, update_block_statement => BlockStatement(statements: Vec<Statement>);
    create_if_statement, update_if_statement =>
        IfStatement(test: Expression, consequent: Statement, alternate: Option<Statement>);
    create_return_statement, update_return_statement =>
        ReturnStatement(argument: Option<Expression>);
    create_while_statement, update_while_statement =>
        WhileStatement(test: Expression, body: Statement);
    create_empty_statement, update_empty_statement => EmptyStatement();
    create_variable_declaration, update_variable_declaration => VariableDeclaration(
        declaration_kind: VariableDeclarationKind,
        declarators: Vec<VariableDeclarator>
    );
    create_variable_declarator, update_variable_declarator => VariableDeclarator(
        id: Identifier,
        init: Option<Expression>,
        type_annotation: Option<TypeNode>
    );
    create_ets_primitive_type, update_ets_primitive_type =>
        ETSPrimitiveType(primitive: PrimitiveType);
    create_ets_type_reference, update_ets_type_reference => ETSTypeReference(name: Identifier);
    create_ets_union_type, update_ets_union_type => ETSUnionType(types: Vec<TypeNode>);
}

// ═══════════════════════════════════════════════════════════════════════════════
// DYNAMIC ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Creates a node of `kind` from schema-ordered values.
pub fn create(ctx: &mut dyn NativeContext, kind: NodeKind, fields: Vec<NativeValue>) -> Result<Node> {
    let peer = ctx.create_node(kind, fields)?;
    Ok(Node::from_kind(kind, peer))
}

/// Update with the complete field set; same identity rule as the typed
/// entry points.
pub fn update(ctx: &mut dyn NativeContext, node: Node, fields: Vec<NativeValue>) -> Result<Node> {
    let kind = node.kind();
    let updated = update_node(ctx, node.as_ast_node(), kind, fields)?;
    Ok(Node::from_kind(kind, updated.peer()))
}

/// Current values of every field of `node`, in schema order.
pub fn current_fields(ctx: &dyn NativeContext, node: Node) -> Result<Vec<NativeValue>> {
    let kind = node.kind();
    (0..kind.fields().len())
        .map(|index| ctx.get_field(node.peer(), FieldSlot::new(kind, index)))
        .collect()
}

/// Update where only the listed slots change; the rest are read back from
/// `node` first.
pub fn update_with(
    ctx: &mut dyn NativeContext,
    node: Node,
    changes: Vec<(usize, NativeValue)>,
) -> Result<Node> {
    let kind = node.kind();
    let mut fields = current_fields(ctx, node)?;
    for (index, value) in changes {
        let slot = fields
            .get_mut(index)
            .ok_or(PeerError::NoSuchField { kind, index })?;
        *slot = value;
    }
    update(ctx, node, fields)
}

/// Value an omitted field takes when creating from a partial description:
/// absent for optional children, empty for sequences, false for flags.
/// Required children and other scalars have no default.
pub fn default_field(kind: NodeKind, index: usize) -> Result<NativeValue> {
    let spec = FieldSlot::new(kind, index).spec()?;
    match spec.ty {
        FieldType::OptNode(_) => Ok(NativeValue::Node(Peer::NULL)),
        FieldType::Nodes(_) => Ok(NativeValue::Nodes(Vec::new())),
        FieldType::Bool => Ok(NativeValue::Bool(false)),
        FieldType::Node(_)
        | FieldType::Ident
        | FieldType::Str
        | FieldType::Int
        | FieldType::Double => {
            Err(PeerError::MissingField {
                kind,
                field: spec.name,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_points_cover_every_kind() {
        for kind in NodeKind::ALL {
            let (create, update) = entry_points(*kind);
            assert!(create.starts_with("create_"), "{}", create);
            assert_eq!(update, create.replacen("create_", "update_", 1));
        }
        assert_eq!(
            entry_points(NodeKind::ETSUnionType),
            ("create_ets_union_type", "update_ets_union_type")
        );
    }

    #[test]
    fn test_default_fields() {
        assert_eq!(
            default_field(NodeKind::IfStatement, 2),
            Ok(NativeValue::Node(Peer::NULL))
        );
        assert_eq!(
            default_field(NodeKind::CallExpression, 2),
            Ok(NativeValue::Bool(false))
        );
        assert_eq!(
            default_field(NodeKind::BinaryExpression, 0),
            Err(PeerError::MissingField {
                kind: NodeKind::BinaryExpression,
                field: "left"
            })
        );
    }
}
