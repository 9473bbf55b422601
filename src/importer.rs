//! Source import: parses text with oxc and materializes the supported subset
//! as context nodes, recording each node's source range.
//!
//! Anything outside the node set (functions, classes, loops other than
//! `while`, patterns, templates, ...) fails with `Unsupported` naming the
//! construct and its offsets; nothing is silently dropped.

use oxc_allocator::Allocator;
use oxc_ast::ast;
use oxc_parser::{ParseOptions, Parser};
use oxc_span::{GetSpan, SourceType, Span};
use tracing::debug;

use crate::config::ContextOptions;
use crate::error::{PeerError, Result};
use crate::native::{NativeContext, SourceRange};
use crate::node::{AstNodeWrapper, Expression, Statement};
use crate::nodes::*;
use crate::operators::{MemberExpressionKind, TokenType, VariableDeclarationKind};
use crate::peer::Peer;

/// Parses `source` and builds its `Program` in `ctx`.
pub fn import_program(
    ctx: &mut dyn NativeContext,
    options: &ContextOptions,
    source: &str,
) -> Result<Peer> {
    let allocator = Allocator::default();
    let source_type = SourceType::default()
        .with_module(true)
        .with_typescript(options.typescript);
    // Top-level `return` is accepted: the node set has no function bodies.
    let parse_options = ParseOptions {
        allow_return_outside_function: true,
        ..ParseOptions::default()
    };
    let ret = Parser::new(&allocator, source, source_type)
        .with_options(parse_options)
        .parse();
    if !ret.errors.is_empty() {
        let messages: Vec<String> = ret.errors.iter().map(|err| err.to_string()).collect();
        return Err(PeerError::native(format!(
            "{}: {}",
            options.file_name,
            messages.join("; ")
        )));
    }

    let mut importer = Importer { ctx };
    let statements = importer.statements(&ret.program.body)?;
    let program = Program::create(&mut *importer.ctx, options.file_name.clone(), statements)?;
    importer.locate(program, ret.program.span)?;
    debug!(file = %options.file_name, statements = ret.program.body.len(), "program imported");
    Ok(program.peer())
}

struct Importer<'c> {
    ctx: &'c mut dyn NativeContext,
}

impl Importer<'_> {
    fn locate<T: AstNodeWrapper>(&mut self, node: T, span: Span) -> Result<T> {
        self.ctx
            .set_range(node.peer(), SourceRange::new(span.start, span.end))?;
        Ok(node)
    }

    fn statements(&mut self, body: &[ast::Statement<'_>]) -> Result<Vec<Statement>> {
        body.iter().map(|stmt| self.statement(stmt)).collect()
    }

    fn statement(&mut self, stmt: &ast::Statement<'_>) -> Result<Statement> {
        let span = stmt.span();
        let node: Statement = match stmt {
            ast::Statement::ExpressionStatement(s) => {
                let expression = self.expression(&s.expression)?;
                ExpressionStatement::create(&mut *self.ctx, expression)?.into()
            }
            ast::Statement::BlockStatement(block) => {
                let statements = self.statements(&block.body)?;
                BlockStatement::create(&mut *self.ctx, statements)?.into()
            }
            ast::Statement::IfStatement(s) => {
                let test = self.expression(&s.test)?;
                let consequent = self.statement(&s.consequent)?;
                let alternate = match &s.alternate {
                    Some(alternate) => Some(self.statement(alternate)?),
                    None => None,
                };
                IfStatement::create(&mut *self.ctx, test, consequent, alternate)?.into()
            }
            ast::Statement::ReturnStatement(s) => {
                let argument = match &s.argument {
                    Some(argument) => Some(self.expression(argument)?),
                    None => None,
                };
                ReturnStatement::create(&mut *self.ctx, argument)?.into()
            }
            ast::Statement::WhileStatement(s) => {
                let test = self.expression(&s.test)?;
                let body = self.statement(&s.body)?;
                WhileStatement::create(&mut *self.ctx, test, body)?.into()
            }
            ast::Statement::EmptyStatement(_) => EmptyStatement::create(&mut *self.ctx)?.into(),
            ast::Statement::VariableDeclaration(decl) => self.variable_declaration(decl)?.into(),
            other => return Err(unsupported(statement_label(other), span)),
        };
        self.locate(node, span)
    }

    fn variable_declaration(
        &mut self,
        decl: &ast::VariableDeclaration<'_>,
    ) -> Result<VariableDeclaration> {
        let kind = match decl.kind {
            ast::VariableDeclarationKind::Var => VariableDeclarationKind::Var,
            ast::VariableDeclarationKind::Let => VariableDeclarationKind::Let,
            ast::VariableDeclarationKind::Const => VariableDeclarationKind::Const,
            _ => return Err(unsupported("using declaration", decl.span)),
        };
        let mut declarators = Vec::with_capacity(decl.declarations.len());
        for declarator in &decl.declarations {
            let id = match &declarator.id {
                ast::BindingPattern::BindingIdentifier(id) => {
                    let name = Identifier::create(&mut *self.ctx, id.name.to_string())?;
                    self.locate(name, id.span)?
                }
                _ => return Err(unsupported("destructuring pattern", declarator.span)),
            };
            let init = match &declarator.init {
                Some(init) => Some(self.expression(init)?),
                None => None,
            };
            let node = VariableDeclarator::create(&mut *self.ctx, id, init, None)?;
            declarators.push(self.locate(node, declarator.span)?);
        }
        VariableDeclaration::create(&mut *self.ctx, kind, declarators)
    }

    fn expression(&mut self, expr: &ast::Expression<'_>) -> Result<Expression> {
        let span = expr.span();
        let node: Expression = match expr {
            ast::Expression::ParenthesizedExpression(paren) => {
                return self.expression(&paren.expression);
            }
            ast::Expression::Identifier(id) if id.name == "undefined" => {
                UndefinedLiteral::create(&mut *self.ctx)?.into()
            }
            ast::Expression::Identifier(id) => {
                Identifier::create(&mut *self.ctx, id.name.to_string())?.into()
            }
            ast::Expression::StringLiteral(lit) => {
                StringLiteral::create(&mut *self.ctx, lit.value.to_string())?.into()
            }
            ast::Expression::NumericLiteral(lit) => {
                NumberLiteral::create(&mut *self.ctx, lit.value)?.into()
            }
            ast::Expression::BooleanLiteral(lit) => {
                BooleanLiteral::create(&mut *self.ctx, lit.value)?.into()
            }
            ast::Expression::NullLiteral(_) => NullLiteral::create(&mut *self.ctx)?.into(),
            ast::Expression::ThisExpression(_) => ThisExpression::create(&mut *self.ctx)?.into(),
            ast::Expression::BinaryExpression(bin) => {
                let operator = token(bin.operator.as_str(), span)?;
                let left = self.expression(&bin.left)?;
                let right = self.expression(&bin.right)?;
                BinaryExpression::create(&mut *self.ctx, left, right, operator)?.into()
            }
            ast::Expression::LogicalExpression(logical) => {
                let operator = token(logical.operator.as_str(), span)?;
                let left = self.expression(&logical.left)?;
                let right = self.expression(&logical.right)?;
                BinaryExpression::create(&mut *self.ctx, left, right, operator)?.into()
            }
            ast::Expression::UnaryExpression(unary) => {
                let operator = token(unary.operator.as_str(), span)?;
                let argument = self.expression(&unary.argument)?;
                UnaryExpression::create(&mut *self.ctx, argument, operator)?.into()
            }
            ast::Expression::AssignmentExpression(assign) => {
                let operator = token(assign.operator.as_str(), span)?;
                let left = self.assignment_target(&assign.left, span)?;
                let right = self.expression(&assign.right)?;
                AssignmentExpression::create(&mut *self.ctx, left, right, operator)?.into()
            }
            ast::Expression::ConditionalExpression(cond) => {
                let test = self.expression(&cond.test)?;
                let consequent = self.expression(&cond.consequent)?;
                let alternate = self.expression(&cond.alternate)?;
                ConditionalExpression::create(&mut *self.ctx, test, consequent, alternate)?.into()
            }
            ast::Expression::CallExpression(call) => self.call(call)?,
            ast::Expression::ChainExpression(chain) => match &chain.expression {
                ast::ChainElement::CallExpression(call) => self.call(call)?,
                ast::ChainElement::StaticMemberExpression(member) => self.static_member(member)?,
                ast::ChainElement::ComputedMemberExpression(member) => {
                    self.computed_member(member)?
                }
                _ => return Err(unsupported("optional chain", span)),
            },
            ast::Expression::StaticMemberExpression(member) => self.static_member(member)?,
            ast::Expression::ComputedMemberExpression(member) => self.computed_member(member)?,
            ast::Expression::ArrayExpression(array) => {
                let mut elements = Vec::with_capacity(array.elements.len());
                for element in &array.elements {
                    match element.as_expression() {
                        Some(element) => elements.push(self.expression(element)?),
                        None => return Err(unsupported("array hole or spread", span)),
                    }
                }
                ArrayExpression::create(&mut *self.ctx, elements)?.into()
            }
            _ => return Err(unsupported("expression", span)),
        };
        self.locate(node, span)
    }

    fn assignment_target(
        &mut self,
        target: &ast::AssignmentTarget<'_>,
        span: Span,
    ) -> Result<Expression> {
        match target {
            ast::AssignmentTarget::AssignmentTargetIdentifier(id) => {
                let name = Identifier::create(&mut *self.ctx, id.name.to_string())?;
                Ok(self.locate(name, id.span)?.into())
            }
            ast::AssignmentTarget::StaticMemberExpression(member) => {
                let node = self.static_member(member)?;
                self.locate(node, member.span)
            }
            ast::AssignmentTarget::ComputedMemberExpression(member) => {
                let node = self.computed_member(member)?;
                self.locate(node, member.span)
            }
            _ => Err(unsupported("destructuring assignment", span)),
        }
    }

    fn call(&mut self, call: &ast::CallExpression<'_>) -> Result<Expression> {
        let callee = self.expression(&call.callee)?;
        let mut arguments = Vec::with_capacity(call.arguments.len());
        for argument in &call.arguments {
            match argument.as_expression() {
                Some(argument) => arguments.push(self.expression(argument)?),
                None => return Err(unsupported("spread argument", argument.span())),
            }
        }
        let node = CallExpression::create(&mut *self.ctx, callee, arguments, call.optional)?;
        Ok(node.into())
    }

    fn static_member(&mut self, member: &ast::StaticMemberExpression<'_>) -> Result<Expression> {
        let object = self.expression(&member.object)?;
        let property = Identifier::create(&mut *self.ctx, member.property.name.to_string())?;
        let property = self.locate(property, member.property.span)?;
        let node = MemberExpression::create(
            &mut *self.ctx,
            object,
            property.into(),
            MemberExpressionKind::PropertyAccess,
            false,
            member.optional,
        )?;
        Ok(node.into())
    }

    fn computed_member(&mut self, member: &ast::ComputedMemberExpression<'_>) -> Result<Expression> {
        let object = self.expression(&member.object)?;
        let property = self.expression(&member.expression)?;
        let node = MemberExpression::create(
            &mut *self.ctx,
            object,
            property,
            MemberExpressionKind::ElementAccess,
            true,
            member.optional,
        )?;
        Ok(node.into())
    }
}

fn token(text: &str, span: Span) -> Result<TokenType> {
    TokenType::from_source(text)
        .ok_or_else(|| unsupported(format!("operator '{}'", text), span))
}

fn unsupported(construct: impl Into<String>, span: Span) -> PeerError {
    PeerError::unsupported(construct, span.start, span.end)
}

fn statement_label(stmt: &ast::Statement<'_>) -> &'static str {
    match stmt {
        ast::Statement::ForStatement(_)
        | ast::Statement::ForInStatement(_)
        | ast::Statement::ForOfStatement(_) => "for loop",
        ast::Statement::DoWhileStatement(_) => "do-while loop",
        ast::Statement::FunctionDeclaration(_) => "function declaration",
        ast::Statement::ClassDeclaration(_) => "class declaration",
        ast::Statement::SwitchStatement(_) => "switch statement",
        ast::Statement::TryStatement(_) => "try statement",
        ast::Statement::ThrowStatement(_) => "throw statement",
        ast::Statement::BreakStatement(_) | ast::Statement::ContinueStatement(_) => "jump statement",
        ast::Statement::ImportDeclaration(_) | ast::Statement::ExportNamedDeclaration(_) => {
            "module declaration"
        }
        _ => "statement",
    }
}
