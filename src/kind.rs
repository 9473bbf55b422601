//! Node kind tags and the per-kind field schema.
//!
//! The kind table is closed: every tag is listed once in `node_kinds!` and
//! every lookup over it is an exhaustive match, so a kind cannot exist without
//! a name, a category and a schema.

use convert_case::{Case, Casing};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{PeerError, Result};

/// Capability family of a node kind.
///
/// Fields are typed by category rather than by a class lattice: an
/// `Expression` slot accepts any kind whose category is `Expression`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeCategory {
    Program,
    Expression,
    Statement,
    Declarator,
    TypeNode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Required child
    Node(NodeCategory),
    /// Required child that must be an `Identifier`
    Ident,
    /// Child that may be the null peer
    OptNode(NodeCategory),
    /// Ordered child sequence
    Nodes(NodeCategory),
    Str,
    Bool,
    Int,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
}

impl FieldSpec {
    /// Key used for this field in host-facing JSON, e.g. `typeAnnotation`.
    pub fn json_key(&self) -> String {
        self.name.to_case(Case::Camel)
    }
}

// Struct literal so the schema arrays are promoted to `'static`.
macro_rules! field {
    ($name:literal, $ty:expr) => {
        FieldSpec {
            name: $name,
            ty: $ty,
        }
    };
}

macro_rules! node_kinds {
    ($($kind:ident = $tag:literal),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[repr(u32)]
        pub enum NodeKind {
            $($kind = $tag),*
        }

        impl NodeKind {
            pub const ALL: &'static [NodeKind] = &[$(NodeKind::$kind),*];

            pub fn from_tag(tag: u32) -> Result<NodeKind> {
                match tag {
                    $($tag => Ok(NodeKind::$kind),)*
                    _ => Err(PeerError::UnknownKind(tag)),
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(NodeKind::$kind => stringify!($kind)),*
                }
            }
        }
    };
}

node_kinds! {
    Program = 1,
    Identifier = 10,
    StringLiteral = 11,
    NumberLiteral = 12,
    BooleanLiteral = 13,
    NullLiteral = 14,
    UndefinedLiteral = 15,
    ThisExpression = 16,
    BinaryExpression = 17,
    UnaryExpression = 18,
    AssignmentExpression = 19,
    ConditionalExpression = 20,
    CallExpression = 21,
    MemberExpression = 22,
    ArrayExpression = 23,
    ExpressionStatement = 40,
    BlockStatement = 41,
    IfStatement = 42,
    ReturnStatement = 43,
    WhileStatement = 44,
    EmptyStatement = 45,
    VariableDeclaration = 46,
    VariableDeclarator = 60,
    ETSPrimitiveType = 80,
    ETSTypeReference = 81,
    ETSUnionType = 82,
}

lazy_static! {
    static ref KINDS_BY_NAME: HashMap<&'static str, NodeKind> =
        NodeKind::ALL.iter().map(|kind| (kind.name(), *kind)).collect();
}

use FieldType::*;
use NodeCategory::*;

const EXPR: FieldType = Node(Expression);

impl NodeKind {
    pub fn tag(self) -> u32 {
        self as u32
    }

    pub fn from_name(name: &str) -> Result<NodeKind> {
        KINDS_BY_NAME
            .get(name)
            .copied()
            .ok_or_else(|| PeerError::UnknownKindName(name.to_string()))
    }

    pub fn category(self) -> NodeCategory {
        match self {
            NodeKind::Program => Program,
            NodeKind::Identifier
            | NodeKind::StringLiteral
            | NodeKind::NumberLiteral
            | NodeKind::BooleanLiteral
            | NodeKind::NullLiteral
            | NodeKind::UndefinedLiteral
            | NodeKind::ThisExpression
            | NodeKind::BinaryExpression
            | NodeKind::UnaryExpression
            | NodeKind::AssignmentExpression
            | NodeKind::ConditionalExpression
            | NodeKind::CallExpression
            | NodeKind::MemberExpression
            | NodeKind::ArrayExpression => Expression,
            NodeKind::ExpressionStatement
            | NodeKind::BlockStatement
            | NodeKind::IfStatement
            | NodeKind::ReturnStatement
            | NodeKind::WhileStatement
            | NodeKind::EmptyStatement
            | NodeKind::VariableDeclaration => Statement,
            NodeKind::VariableDeclarator => Declarator,
            NodeKind::ETSPrimitiveType | NodeKind::ETSTypeReference | NodeKind::ETSUnionType => {
                TypeNode
            }
        }
    }

    pub fn is_expression(self) -> bool {
        self.category() == Expression
    }

    pub fn is_statement(self) -> bool {
        self.category() == Statement
    }

    pub fn is_type_node(self) -> bool {
        self.category() == TypeNode
    }

    /// Ordered field schema; the position of a field is its slot index.
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            NodeKind::Program => &[
                field!("file_name", Str),
                field!("statements", Nodes(Statement)),
            ],
            NodeKind::Identifier => &[field!("name", Str)],
            NodeKind::StringLiteral => &[field!("value", Str)],
            NodeKind::NumberLiteral => &[field!("value", Double)],
            NodeKind::BooleanLiteral => &[field!("value", Bool)],
            NodeKind::NullLiteral | NodeKind::UndefinedLiteral | NodeKind::ThisExpression => &[],
            NodeKind::BinaryExpression | NodeKind::AssignmentExpression => &[
                field!("left", EXPR),
                field!("right", EXPR),
                field!("operator", Int),
            ],
            NodeKind::UnaryExpression => &[field!("argument", EXPR), field!("operator", Int)],
            NodeKind::ConditionalExpression => &[
                field!("test", EXPR),
                field!("consequent", EXPR),
                field!("alternate", EXPR),
            ],
            NodeKind::CallExpression => &[
                field!("callee", EXPR),
                field!("arguments", Nodes(Expression)),
                field!("optional", Bool),
            ],
            NodeKind::MemberExpression => &[
                field!("object", EXPR),
                field!("property", EXPR),
                field!("member_kind", Int),
                field!("computed", Bool),
                field!("optional", Bool),
            ],
            NodeKind::ArrayExpression => &[field!("elements", Nodes(Expression))],
            NodeKind::ExpressionStatement => &[field!("expression", EXPR)],
            NodeKind::BlockStatement => &[field!("statements", Nodes(Statement))],
            NodeKind::IfStatement => &[
                field!("test", EXPR),
                field!("consequent", Node(Statement)),
                field!("alternate", OptNode(Statement)),
            ],
            NodeKind::ReturnStatement => &[field!("argument", OptNode(Expression))],
            NodeKind::WhileStatement => &[field!("test", EXPR), field!("body", Node(Statement))],
            NodeKind::EmptyStatement => &[],
            NodeKind::VariableDeclaration => &[
                field!("declaration_kind", Int),
                field!("declarators", Nodes(Declarator)),
            ],
            NodeKind::VariableDeclarator => &[
                field!("id", Ident),
                field!("init", OptNode(Expression)),
                field!("type_annotation", OptNode(TypeNode)),
            ],
            NodeKind::ETSPrimitiveType => &[field!("primitive", Int)],
            NodeKind::ETSTypeReference => &[field!("name", Ident)],
            NodeKind::ETSUnionType => &[field!("types", Nodes(TypeNode))],
        }
    }

    pub fn field_index(self, name: &str) -> Option<usize> {
        self.fields().iter().position(|spec| spec.name == name)
    }

    /// Native entry point that allocates a node of this kind.
    pub fn create_symbol(self) -> String {
        format!("Create{}", self.name())
    }

    /// Native entry point that rebuilds a node of this kind from an original.
    pub fn update_symbol(self) -> String {
        format!("Update{}", self.name())
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Address of one field of one node kind at the native boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldSlot {
    pub kind: NodeKind,
    pub index: usize,
}

impl FieldSlot {
    pub const fn new(kind: NodeKind, index: usize) -> Self {
        FieldSlot { kind, index }
    }

    pub fn spec(self) -> Result<&'static FieldSpec> {
        self.kind
            .fields()
            .get(self.index)
            .ok_or(PeerError::NoSuchField {
                kind: self.kind,
                index: self.index,
            })
    }

    /// e.g. `BinaryExpressionLeftConst`
    pub fn getter_symbol(self) -> Result<String> {
        let spec = self.spec()?;
        Ok(format!("{}{}Const", self.kind.name(), spec.name.to_case(Case::Pascal)))
    }

    /// e.g. `BinaryExpressionSetLeft`
    pub fn setter_symbol(self) -> Result<String> {
        let spec = self.spec()?;
        Ok(format!("{}Set{}", self.kind.name(), spec.name.to_case(Case::Pascal)))
    }
}
