//! Debug output: a JSON tree dump and a source-text printer.

use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::kind::{FieldSlot, FieldType, NodeKind};
use crate::native::{NativeContext, NativeValue};
use crate::operators::{scalar_text, TokenType};
use crate::peer::Peer;
use crate::registry::Node;

// ═══════════════════════════════════════════════════════════════════════════════
// JSON
// ═══════════════════════════════════════════════════════════════════════════════

/// Tree rooted at `peer` as JSON: `type` names the kind, every field appears
/// under its camelCase key, enumerants print as their source spelling and
/// `range` is included once the node has a source position.
pub fn dump_json(ctx: &dyn NativeContext, peer: Peer) -> Result<Value> {
    if peer.is_null() {
        return Ok(Value::Null);
    }
    let kind = ctx.node_kind(peer)?;
    let mut object = Map::new();
    object.insert("type".to_string(), Value::from(kind.name()));
    for (index, spec) in kind.fields().iter().enumerate() {
        let value = ctx.get_field(peer, FieldSlot::new(kind, index))?;
        let value = match value {
            NativeValue::Node(child) => dump_json(ctx, child)?,
            NativeValue::Nodes(children) => Value::Array(
                children
                    .into_iter()
                    .map(|child| dump_json(ctx, child))
                    .collect::<Result<Vec<_>>>()?,
            ),
            other => scalar_json(spec.name, spec.ty, other)?,
        };
        object.insert(spec.json_key(), value);
    }
    let range = ctx.range(peer)?;
    if range.end > 0 {
        object.insert("range".to_string(), json!([range.start, range.end]));
    }
    Ok(Value::Object(object))
}

/// JSON form of a non-node field value.
pub fn scalar_json(field: &str, ty: FieldType, value: NativeValue) -> Result<Value> {
    Ok(match value {
        NativeValue::Int(raw) if ty == FieldType::Int => Value::from(scalar_text(field, raw)?),
        NativeValue::Int(raw) => Value::from(raw),
        NativeValue::Str(text) => Value::from(text),
        NativeValue::Bool(flag) => Value::from(flag),
        NativeValue::Double(number) if number.is_finite() => Value::from(number),
        // JSON has no non-finite numbers; spell them the way source does
        NativeValue::Double(number) => Value::from(number_text(number)),
        NativeValue::Node(peer) => Value::from(peer.raw()),
        NativeValue::Nodes(peers) => Value::from(peers.iter().map(|p| p.raw()).collect::<Vec<_>>()),
    })
}

/// Source spelling of a number literal value.
pub fn number_text(number: f64) -> String {
    if number.is_nan() {
        "NaN".to_string()
    } else if number == f64::INFINITY {
        "Infinity".to_string()
    } else if number == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        number.to_string()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE
// ═══════════════════════════════════════════════════════════════════════════════

// Binding power of expression forms, loosest first. Binary operators sit
// between CONDITIONAL and UNARY at BINARY_BASE + their own precedence.
const ASSIGNMENT: u8 = 1;
const CONDITIONAL: u8 = 2;
const BINARY_BASE: u8 = 2;
const UNARY: u8 = 20;
const POSTFIX: u8 = 21;
const PRIMARY: u8 = 22;

/// Pretty-prints the tree rooted at `peer` as ArkTS source, two-space
/// indented. Parentheses are inserted only where precedence requires them.
pub fn dump_source(ctx: &dyn NativeContext, peer: Peer) -> Result<String> {
    let mut printer = SourcePrinter {
        ctx,
        out: String::new(),
        indent: 0,
    };
    let node = Node::resolve(ctx, peer)?;
    match node.kind().category() {
        crate::kind::NodeCategory::Expression => printer.expression(peer, ASSIGNMENT)?,
        crate::kind::NodeCategory::TypeNode => printer.type_node(peer)?,
        crate::kind::NodeCategory::Declarator => printer.declarator(peer)?,
        _ => printer.statement(peer)?,
    }
    Ok(printer.out)
}

struct SourcePrinter<'c> {
    ctx: &'c dyn NativeContext,
    out: String,
    indent: usize,
}

impl SourcePrinter<'_> {
    fn field(&self, peer: Peer, kind: NodeKind, index: usize) -> Result<NativeValue> {
        self.ctx.get_field(peer, FieldSlot::new(kind, index))
    }

    fn node(&self, peer: Peer, kind: NodeKind, index: usize) -> Result<Peer> {
        match self.field(peer, kind, index)? {
            NativeValue::Node(child) => Ok(child),
            other => Err(unexpected(kind, index, &other)),
        }
    }

    fn nodes(&self, peer: Peer, kind: NodeKind, index: usize) -> Result<Vec<Peer>> {
        match self.field(peer, kind, index)? {
            NativeValue::Nodes(children) => Ok(children),
            other => Err(unexpected(kind, index, &other)),
        }
    }

    fn text(&self, peer: Peer, kind: NodeKind, index: usize) -> Result<String> {
        match self.field(peer, kind, index)? {
            NativeValue::Str(text) => Ok(text),
            other => Err(unexpected(kind, index, &other)),
        }
    }

    fn flag(&self, peer: Peer, kind: NodeKind, index: usize) -> Result<bool> {
        match self.field(peer, kind, index)? {
            NativeValue::Bool(flag) => Ok(flag),
            other => Err(unexpected(kind, index, &other)),
        }
    }

    fn int(&self, peer: Peer, kind: NodeKind, index: usize) -> Result<i32> {
        match self.field(peer, kind, index)? {
            NativeValue::Int(raw) => Ok(raw),
            other => Err(unexpected(kind, index, &other)),
        }
    }

    fn token(&self, peer: Peer, kind: NodeKind, index: usize) -> Result<TokenType> {
        TokenType::from_i32(self.int(peer, kind, index)?)
    }

    fn new_line(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    // ─── statements ─────────────────────────────────────────────────────────

    fn statement(&mut self, peer: Peer) -> Result<()> {
        let kind = self.ctx.node_kind(peer)?;
        match kind {
            NodeKind::Program => {
                for (i, statement) in self.nodes(peer, kind, 1)?.into_iter().enumerate() {
                    if i > 0 {
                        self.new_line();
                    }
                    self.statement(statement)?;
                }
                self.out.push('\n');
            }
            NodeKind::ExpressionStatement => {
                self.expression(self.node(peer, kind, 0)?, ASSIGNMENT)?;
                self.out.push(';');
            }
            NodeKind::BlockStatement => {
                let statements = self.nodes(peer, kind, 0)?;
                if statements.is_empty() {
                    self.out.push_str("{}");
                    return Ok(());
                }
                self.out.push('{');
                self.indent += 1;
                for statement in statements {
                    self.new_line();
                    self.statement(statement)?;
                }
                self.indent -= 1;
                self.new_line();
                self.out.push('}');
            }
            NodeKind::IfStatement => {
                self.out.push_str("if (");
                self.expression(self.node(peer, kind, 0)?, ASSIGNMENT)?;
                self.out.push_str(") ");
                self.statement(self.node(peer, kind, 1)?)?;
                let alternate = self.node(peer, kind, 2)?;
                if !alternate.is_null() {
                    self.out.push_str(" else ");
                    self.statement(alternate)?;
                }
            }
            NodeKind::ReturnStatement => {
                let argument = self.node(peer, kind, 0)?;
                if argument.is_null() {
                    self.out.push_str("return;");
                } else {
                    self.out.push_str("return ");
                    self.expression(argument, ASSIGNMENT)?;
                    self.out.push(';');
                }
            }
            NodeKind::WhileStatement => {
                self.out.push_str("while (");
                self.expression(self.node(peer, kind, 0)?, ASSIGNMENT)?;
                self.out.push_str(") ");
                self.statement(self.node(peer, kind, 1)?)?;
            }
            NodeKind::EmptyStatement => self.out.push(';'),
            NodeKind::VariableDeclaration => {
                self.out.push_str(scalar_text("declaration_kind", self.int(peer, kind, 0)?)?);
                self.out.push(' ');
                for (i, declarator) in self.nodes(peer, kind, 1)?.into_iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.declarator(declarator)?;
                }
                self.out.push(';');
            }
            _ => {
                // Expression or type node reached in statement position
                return self.expression(peer, ASSIGNMENT);
            }
        }
        Ok(())
    }

    fn declarator(&mut self, peer: Peer) -> Result<()> {
        let kind = NodeKind::VariableDeclarator;
        self.expression(self.node(peer, kind, 0)?, PRIMARY)?;
        let annotation = self.node(peer, kind, 2)?;
        if !annotation.is_null() {
            self.out.push_str(": ");
            self.type_node(annotation)?;
        }
        let init = self.node(peer, kind, 1)?;
        if !init.is_null() {
            self.out.push_str(" = ");
            self.expression(init, ASSIGNMENT)?;
        }
        Ok(())
    }

    fn type_node(&mut self, peer: Peer) -> Result<()> {
        let kind = self.ctx.node_kind(peer)?;
        match kind {
            NodeKind::ETSPrimitiveType => {
                self.out.push_str(scalar_text("primitive", self.int(peer, kind, 0)?)?);
            }
            NodeKind::ETSTypeReference => self.expression(self.node(peer, kind, 0)?, PRIMARY)?,
            NodeKind::ETSUnionType => {
                for (i, member) in self.nodes(peer, kind, 0)?.into_iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(" | ");
                    }
                    self.type_node(member)?;
                }
            }
            _ => return self.expression(peer, ASSIGNMENT),
        }
        Ok(())
    }

    // ─── expressions ────────────────────────────────────────────────────────

    fn precedence(&self, peer: Peer, kind: NodeKind) -> Result<u8> {
        Ok(match kind {
            NodeKind::AssignmentExpression => ASSIGNMENT,
            NodeKind::ConditionalExpression => CONDITIONAL,
            NodeKind::BinaryExpression => {
                BINARY_BASE + self.token(peer, kind, 2)?.binary_precedence().unwrap_or(0)
            }
            NodeKind::UnaryExpression => UNARY,
            // A negative literal prints with a leading `-`
            NodeKind::NumberLiteral => match self.field(peer, kind, 0)? {
                NativeValue::Double(number) if number.is_sign_negative() && !number.is_nan() => {
                    UNARY
                }
                _ => PRIMARY,
            },
            NodeKind::CallExpression | NodeKind::MemberExpression => POSTFIX,
            _ => PRIMARY,
        })
    }

    /// Prints `peer`, parenthesized when it binds looser than `min`.
    fn expression(&mut self, peer: Peer, min: u8) -> Result<()> {
        let kind = self.ctx.node_kind(peer)?;
        let precedence = self.precedence(peer, kind)?;
        let parens = precedence < min;
        if parens {
            self.out.push('(');
        }
        match kind {
            NodeKind::Identifier => {
                let name = self.text(peer, kind, 0)?;
                self.out.push_str(&name);
            }
            NodeKind::StringLiteral => {
                let value = self.text(peer, kind, 0)?;
                self.out.push_str(&serde_json::to_string(&value)?);
            }
            NodeKind::NumberLiteral => match self.field(peer, kind, 0)? {
                NativeValue::Double(number) => self.out.push_str(&number_text(number)),
                other => return Err(unexpected(kind, 0, &other)),
            },
            NodeKind::BooleanLiteral => {
                let value = self.flag(peer, kind, 0)?;
                self.out.push_str(if value { "true" } else { "false" });
            }
            NodeKind::NullLiteral => self.out.push_str("null"),
            NodeKind::UndefinedLiteral => self.out.push_str("undefined"),
            NodeKind::ThisExpression => self.out.push_str("this"),
            NodeKind::BinaryExpression => {
                let operator = self.token(peer, kind, 2)?;
                // `**` groups to the right and takes no bare unary on its left;
                // everything else groups to the left
                let (left_min, right_min) = if operator == TokenType::Exponentiation {
                    (POSTFIX, precedence)
                } else {
                    (precedence, precedence + 1)
                };
                let left = self.node(peer, kind, 0)?;
                let right = self.node(peer, kind, 1)?;
                let left_min = self.operand_min(left, operator, left_min)?;
                let right_min = self.operand_min(right, operator, right_min)?;
                self.expression(left, left_min)?;
                self.out.push(' ');
                self.out.push_str(operator.as_str());
                self.out.push(' ');
                self.expression(right, right_min)?;
            }
            NodeKind::UnaryExpression => {
                let operator = self.token(peer, kind, 1)?;
                let text = operator.as_str();
                self.out.push_str(text);
                if text.chars().all(char::is_alphabetic) {
                    self.out.push(' ');
                }
                let start = self.out.len();
                self.expression(self.node(peer, kind, 0)?, UNARY)?;
                // `- -x` must not collapse into `--x`
                if matches!(text, "+" | "-") && self.out[start..].starts_with(text) {
                    self.out.insert(start, ' ');
                }
            }
            NodeKind::AssignmentExpression => {
                let operator = self.token(peer, kind, 2)?;
                self.expression(self.node(peer, kind, 0)?, POSTFIX)?;
                self.out.push(' ');
                self.out.push_str(operator.as_str());
                self.out.push(' ');
                self.expression(self.node(peer, kind, 1)?, ASSIGNMENT)?;
            }
            NodeKind::ConditionalExpression => {
                self.expression(self.node(peer, kind, 0)?, CONDITIONAL + 1)?;
                self.out.push_str(" ? ");
                self.expression(self.node(peer, kind, 1)?, ASSIGNMENT)?;
                self.out.push_str(" : ");
                self.expression(self.node(peer, kind, 2)?, ASSIGNMENT)?;
            }
            NodeKind::CallExpression => {
                self.expression(self.node(peer, kind, 0)?, POSTFIX)?;
                if self.flag(peer, kind, 2)? {
                    self.out.push_str("?.");
                }
                self.out.push('(');
                self.list(self.nodes(peer, kind, 1)?)?;
                self.out.push(')');
            }
            NodeKind::MemberExpression => {
                self.expression(self.node(peer, kind, 0)?, POSTFIX)?;
                let optional = self.flag(peer, kind, 4)?;
                let property = self.node(peer, kind, 1)?;
                if self.flag(peer, kind, 3)? {
                    self.out.push_str(if optional { "?.[" } else { "[" });
                    self.expression(property, ASSIGNMENT)?;
                    self.out.push(']');
                } else {
                    self.out.push_str(if optional { "?." } else { "." });
                    self.expression(property, PRIMARY)?;
                }
            }
            NodeKind::ArrayExpression => {
                self.out.push('[');
                self.list(self.nodes(peer, kind, 0)?)?;
                self.out.push(']');
            }
            NodeKind::ETSPrimitiveType | NodeKind::ETSTypeReference | NodeKind::ETSUnionType => {
                self.type_node(peer)?;
            }
            NodeKind::VariableDeclarator => self.declarator(peer)?,
            _ => self.statement(peer)?,
        }
        if parens {
            self.out.push(')');
        }
        Ok(())
    }

    /// `??` cannot share an unparenthesized operand with `||` or `&&`.
    fn operand_min(&self, operand: Peer, operator: TokenType, min: u8) -> Result<u8> {
        let kind = self.ctx.node_kind(operand)?;
        if kind != NodeKind::BinaryExpression {
            return Ok(min);
        }
        let inner = self.token(operand, kind, 2)?;
        let mixed = (operator == TokenType::NullishCoalescing && inner.is_logical())
            || (operator.is_logical() && inner == TokenType::NullishCoalescing);
        Ok(if mixed { PRIMARY } else { min })
    }

    fn list(&mut self, items: Vec<Peer>) -> Result<()> {
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expression(item, ASSIGNMENT)?;
        }
        Ok(())
    }
}

fn unexpected(kind: NodeKind, index: usize, value: &NativeValue) -> crate::error::PeerError {
    crate::error::PeerError::native(format!(
        "{} field #{} holds an unexpected {}",
        kind,
        index,
        value.type_name()
    ))
}
