//! Concrete node wrappers, one per kind.
//!
//! Each `ast_node!` entry expands to the wrapper struct, its kind check, a
//! `create` factory, an identity-preserving `update`, and a read-through
//! getter plus an in-place setter per field. Slot indices follow the schema
//! order in `kind.rs`.

use crate::error::Result;
use crate::kind::{FieldSlot, NodeKind};
use crate::native::NativeContext;
use crate::node::{update_node, AstNodeWrapper, Expression, Statement, TypeNode};
use crate::operators::{MemberExpressionKind, PrimitiveType, TokenType, VariableDeclarationKind};
use crate::peer::{NativeField, Peer};

macro_rules! ast_node {
    (
        $(#[$meta:meta])*
        $name:ident $([$($category:ident),+])? {
            $($index:literal => $field:ident, $setter:ident: $ty:ty;)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name {
            peer: Peer,
        }

        impl AstNodeWrapper for $name {
            const EXPECTED: &'static str = stringify!($name);

            fn accepts(kind: NodeKind) -> bool {
                kind == NodeKind::$name
            }

            fn from_peer_unchecked(peer: Peer) -> Self {
                $name { peer }
            }

            fn peer(&self) -> Peer {
                self.peer
            }
        }

        impl $name {
            pub const KIND: NodeKind = NodeKind::$name;

            pub fn create(ctx: &mut dyn NativeContext $(, $field: $ty)*) -> Result<Self> {
                let peer = ctx.create_node(Self::KIND, vec![$(NativeField::pack(&$field)),*])?;
                Ok($name { peer })
            }

            /// Returns `self` when every argument is identical to the current
            /// field; otherwise a replacement whose original is `self`.
            pub fn update(self, ctx: &mut dyn NativeContext $(, $field: $ty)*) -> Result<Self> {
                update_node(ctx, self, Self::KIND, vec![$(NativeField::pack(&$field)),*])
            }

            $(
                pub fn $field(&self, ctx: &dyn NativeContext) -> Result<$ty> {
                    let value = ctx.get_field(self.peer, FieldSlot::new(Self::KIND, $index))?;
                    <$ty as NativeField>::unpack(ctx, value)
                }

                pub fn $setter(&self, ctx: &mut dyn NativeContext, value: $ty) -> Result<()> {
                    ctx.set_field(
                        self.peer,
                        FieldSlot::new(Self::KIND, $index),
                        NativeField::pack(&value),
                    )
                }
            )*
        }

        $($(
            impl From<$name> for $category {
                fn from(node: $name) -> Self {
                    $category::from_peer_unchecked(node.peer)
                }
            }
        )+)?
    };
}

ast_node! {
    /// Root of a parsed or synthesized compilation unit
    Program {
        0 => file_name, set_file_name: String;
        1 => statements, set_statements: Vec<Statement>;
    }
}

ast_node! {
    Identifier [Expression] {
        0 => name, set_name: String;
    }
}

ast_node! {
    StringLiteral [Expression] {
        0 => value, set_value: String;
    }
}

ast_node! {
    NumberLiteral [Expression] {
        0 => value, set_value: f64;
    }
}

ast_node! {
    BooleanLiteral [Expression] {
        0 => value, set_value: bool;
    }
}

ast_node! {
    NullLiteral [Expression] {}
}

ast_node! {
    UndefinedLiteral [Expression] {}
}

ast_node! {
    ThisExpression [Expression] {}
}

ast_node! {
    /// `left <operator> right`, including the logical `&&`, `||` and `??`
    BinaryExpression [Expression] {
        0 => left, set_left: Expression;
        1 => right, set_right: Expression;
        2 => operator, set_operator: TokenType;
    }
}

impl BinaryExpression {
    pub fn is_logical(&self, ctx: &dyn NativeContext) -> Result<bool> {
        Ok(self.operator(ctx)?.is_logical())
    }

    pub fn is_logical_extended(&self, ctx: &dyn NativeContext) -> Result<bool> {
        Ok(self.operator(ctx)?.is_logical_extended())
    }

    pub fn is_bitwise(&self, ctx: &dyn NativeContext) -> Result<bool> {
        Ok(self.operator(ctx)?.is_bitwise())
    }

    pub fn is_arithmetic(&self, ctx: &dyn NativeContext) -> Result<bool> {
        Ok(self.operator(ctx)?.is_arithmetic())
    }
}

ast_node! {
    UnaryExpression [Expression] {
        0 => argument, set_argument: Expression;
        1 => operator, set_operator: TokenType;
    }
}

ast_node! {
    AssignmentExpression [Expression] {
        0 => left, set_left: Expression;
        1 => right, set_right: Expression;
        2 => operator, set_operator: TokenType;
    }
}

ast_node! {
    ConditionalExpression [Expression] {
        0 => test, set_test: Expression;
        1 => consequent, set_consequent: Expression;
        2 => alternate, set_alternate: Expression;
    }
}

ast_node! {
    CallExpression [Expression] {
        0 => callee, set_callee: Expression;
        1 => arguments, set_arguments: Vec<Expression>;
        2 => optional, set_optional: bool;
    }
}

ast_node! {
    /// `object.property` or `object[property]`
    MemberExpression [Expression] {
        0 => object, set_object: Expression;
        1 => property, set_property: Expression;
        2 => member_kind, set_member_kind: MemberExpressionKind;
        3 => computed, set_computed: bool;
        4 => optional, set_optional: bool;
    }
}

ast_node! {
    ArrayExpression [Expression] {
        0 => elements, set_elements: Vec<Expression>;
    }
}

ast_node! {
    ExpressionStatement [Statement] {
        0 => expression, set_expression: Expression;
    }
}

ast_node! {
    BlockStatement [Statement] {
        0 => statements, set_statements: Vec<Statement>;
    }
}

ast_node! {
    IfStatement [Statement] {
        0 => test, set_test: Expression;
        1 => consequent, set_consequent: Statement;
        2 => alternate, set_alternate: Option<Statement>;
    }
}

ast_node! {
    ReturnStatement [Statement] {
        0 => argument, set_argument: Option<Expression>;
    }
}

ast_node! {
    WhileStatement [Statement] {
        0 => test, set_test: Expression;
        1 => body, set_body: Statement;
    }
}

ast_node! {
    EmptyStatement [Statement] {}
}

ast_node! {
    VariableDeclaration [Statement] {
        0 => declaration_kind, set_declaration_kind: VariableDeclarationKind;
        1 => declarators, set_declarators: Vec<VariableDeclarator>;
    }
}

ast_node! {
    VariableDeclarator {
        0 => id, set_id: Identifier;
        1 => init, set_init: Option<Expression>;
        2 => type_annotation, set_type_annotation: Option<TypeNode>;
    }
}

ast_node! {
    ETSPrimitiveType [TypeNode] {
        0 => primitive, set_primitive: PrimitiveType;
    }
}

ast_node! {
    ETSTypeReference [TypeNode] {
        0 => name, set_name: Identifier;
    }
}

ast_node! {
    ETSUnionType [TypeNode] {
        0 => types, set_types: Vec<TypeNode>;
    }
}

impl Program {
    /// Root of the context's parsed program, if it has been parsed.
    pub fn from_context(ctx: &dyn NativeContext) -> Result<Option<Program>> {
        match ctx.program() {
            Some(peer) => Program::wrap(ctx, peer).map(Some),
            None => Ok(None),
        }
    }
}
