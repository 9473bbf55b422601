//! Parsing source into a context.

#[cfg(test)]
mod tests {
    use crate::arena::ArenaContext;
    use crate::config::ContextOptions;
    use crate::error::PeerError;
    use crate::kind::NodeKind;
    use crate::native::{ContextState, NativeContext, SourceRange};
    use crate::node::AstNodeWrapper;
    use crate::nodes::*;
    use crate::operators::{MemberExpressionKind, TokenType, VariableDeclarationKind};
    use crate::registry::Node;

    fn parse(source: &str) -> (ArenaContext, Program) {
        let mut ctx = ArenaContext::from_source(ContextOptions::default(), source);
        ctx.proceed_to_state(ContextState::Parsed).unwrap();
        let program = Program::from_context(&ctx).unwrap().unwrap();
        (ctx, program)
    }

    fn only_expression(ctx: &ArenaContext, program: Program) -> Node {
        assert_eq!(program.statements(ctx).unwrap().len(), 1);
        only_expression_at(ctx, program, 0)
    }

    fn only_expression_at(ctx: &ArenaContext, program: Program, index: usize) -> Node {
        let statements = program.statements(ctx).unwrap();
        match statements[index].as_node(ctx).unwrap() {
            Node::ExpressionStatement(statement) => {
                statement.expression(ctx).unwrap().as_node(ctx).unwrap()
            }
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_program_root() {
        let (ctx, program) = parse("let x = 1;");
        assert_eq!(ctx.state(), ContextState::Parsed);
        assert_eq!(program.file_name(&ctx).unwrap(), "main.ets");
        assert_eq!(program.range(&ctx).unwrap(), SourceRange::new(0, 10));
        assert!(program.parent(&ctx).unwrap().is_none());
    }

    #[test]
    fn test_binary_precedence_shape() {
        let (ctx, program) = parse("a + b * c;");
        let sum = match only_expression(&ctx, program) {
            Node::BinaryExpression(sum) => sum,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(sum.operator(&ctx).unwrap(), TokenType::Plus);
        match sum.right(&ctx).unwrap().as_node(&ctx).unwrap() {
            Node::BinaryExpression(product) => {
                assert_eq!(product.operator(&ctx).unwrap(), TokenType::Multiply)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_logical_maps_to_binary() {
        let (ctx, program) = parse("a ?? (b || c);");
        match only_expression(&ctx, program) {
            Node::BinaryExpression(expr) => {
                assert_eq!(expr.operator(&ctx).unwrap(), TokenType::NullishCoalescing);
                assert!(expr.is_logical_extended(&ctx).unwrap());
                let right = expr.right(&ctx).unwrap().as_node(&ctx).unwrap();
                assert_eq!(right.kind(), NodeKind::BinaryExpression);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_member_and_call() {
        let (ctx, program) = parse("obj.items[0](x, 'y');");
        let call = match only_expression(&ctx, program) {
            Node::CallExpression(call) => call,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(call.arguments(&ctx).unwrap().len(), 2);
        assert!(!call.optional(&ctx).unwrap());

        let element = match call.callee(&ctx).unwrap().as_node(&ctx).unwrap() {
            Node::MemberExpression(member) => member,
            other => panic!("unexpected {:?}", other),
        };
        assert!(element.computed(&ctx).unwrap());
        assert_eq!(
            element.member_kind(&ctx).unwrap(),
            MemberExpressionKind::ElementAccess
        );

        let property = match element.object(&ctx).unwrap().as_node(&ctx).unwrap() {
            Node::MemberExpression(member) => member,
            other => panic!("unexpected {:?}", other),
        };
        assert!(!property.computed(&ctx).unwrap());
        match property.property(&ctx).unwrap().as_node(&ctx).unwrap() {
            Node::Identifier(name) => assert_eq!(name.name(&ctx).unwrap(), "items"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_variable_declaration() {
        let (ctx, program) = parse("const answer = 42, other;");
        let statements = program.statements(&ctx).unwrap();
        let declaration = match statements[0].as_node(&ctx).unwrap() {
            Node::VariableDeclaration(declaration) => declaration,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(
            declaration.declaration_kind(&ctx).unwrap(),
            VariableDeclarationKind::Const
        );
        let declarators = declaration.declarators(&ctx).unwrap();
        assert_eq!(declarators.len(), 2);
        assert_eq!(declarators[0].id(&ctx).unwrap().name(&ctx).unwrap(), "answer");
        match declarators[0].init(&ctx).unwrap().map(|e| e.as_node(&ctx).unwrap()) {
            Some(Node::NumberLiteral(number)) => assert_eq!(number.value(&ctx).unwrap(), 42.0),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(declarators[1].init(&ctx).unwrap(), None);
        assert_eq!(declarators[0].type_annotation(&ctx).unwrap(), None);
    }

    #[test]
    fn test_control_flow() {
        let (ctx, program) = parse("while (i < 3) { if (i) i = i - 1; else return; }");
        let body = match program.statements(&ctx).unwrap()[0].as_node(&ctx).unwrap() {
            Node::WhileStatement(stmt) => stmt.body(&ctx).unwrap(),
            other => panic!("unexpected {:?}", other),
        };
        let block = match body.as_node(&ctx).unwrap() {
            Node::BlockStatement(block) => block,
            other => panic!("unexpected {:?}", other),
        };
        let branch = match block.statements(&ctx).unwrap()[0].as_node(&ctx).unwrap() {
            Node::IfStatement(branch) => branch,
            other => panic!("unexpected {:?}", other),
        };
        let alternate = branch.alternate(&ctx).unwrap().unwrap();
        match alternate.as_node(&ctx).unwrap() {
            Node::ReturnStatement(ret) => assert_eq!(ret.argument(&ctx).unwrap(), None),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            branch.parent(&ctx).unwrap().map(|p| p.peer()),
            Some(block.peer())
        );
    }

    #[test]
    fn test_literals() {
        let (ctx, program) = parse("[true, null, undefined, this, \"s\", -1];");
        let array = match only_expression(&ctx, program) {
            Node::ArrayExpression(array) => array,
            other => panic!("unexpected {:?}", other),
        };
        let kinds: Vec<_> = array
            .elements(&ctx)
            .unwrap()
            .iter()
            .map(|e| e.kind(&ctx).unwrap())
            .collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::BooleanLiteral,
                NodeKind::NullLiteral,
                NodeKind::UndefinedLiteral,
                NodeKind::ThisExpression,
                NodeKind::StringLiteral,
                NodeKind::UnaryExpression
            ]
        );
    }

    #[test]
    fn test_ranges_recorded() {
        let (ctx, program) = parse("foo + bar;");
        let sum = match only_expression(&ctx, program) {
            Node::BinaryExpression(sum) => sum,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(sum.range(&ctx).unwrap(), SourceRange::new(0, 9));
        assert_eq!(sum.right(&ctx).unwrap().range(&ctx).unwrap(), SourceRange::new(6, 9));
    }

    #[test]
    fn test_unicode_identifiers() {
        let (ctx, program) = parse("let café = 1; let π = café * 2; x\u{200c}y;");
        let statements = program.statements(&ctx).unwrap();
        assert_eq!(statements.len(), 3);
        let names: Vec<String> = statements[..2]
            .iter()
            .map(|statement| match statement.as_node(&ctx).unwrap() {
                Node::VariableDeclaration(declaration) => {
                    let declarator = declaration.declarators(&ctx).unwrap()[0];
                    declarator.id(&ctx).unwrap().name(&ctx).unwrap()
                }
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(names, vec!["café", "π"]);
        match only_expression_at(&ctx, program, 2) {
            Node::Identifier(id) => assert_eq!(id.name(&ctx).unwrap(), "x\u{200c}y"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_identifier_validation_is_unicode_aware() {
        let mut ctx = ArenaContext::default();
        for name in ["名前", "_private", "$el", "ünïcödé"] {
            assert!(Identifier::create(&mut ctx, name.to_string()).is_ok(), "{}", name);
        }
        for name in ["1abc", "a-b", "", "x y"] {
            assert_eq!(
                Identifier::create(&mut ctx, name.to_string()),
                Err(PeerError::InvalidIdentifier(name.to_string()))
            );
        }
    }

    #[test]
    fn test_unsupported_construct_sets_error_state() {
        let mut ctx = ArenaContext::from_source(ContextOptions::default(), "function f() {}");
        let err = ctx.proceed_to_state(ContextState::Parsed).unwrap_err();
        assert!(matches!(
            err,
            PeerError::Unsupported { ref construct, start: 0, .. } if construct == "function declaration"
        ));
        assert_eq!(ctx.state(), ContextState::Error);
        assert!(ctx.error_message().unwrap().contains("function declaration"));
        assert!(ctx.program().is_none());
    }

    #[test]
    fn test_syntax_error_is_native_error() {
        let mut ctx = ArenaContext::from_source(ContextOptions::default(), "let = ;");
        let err = ctx.proceed_to_state(ContextState::Parsed).unwrap_err();
        assert!(matches!(err, PeerError::Native(_)));
        assert_eq!(ctx.state(), ContextState::Error);
    }

    #[test]
    fn test_state_transitions() {
        let mut ctx = ArenaContext::new(ContextOptions::default());
        assert!(matches!(
            ctx.proceed_to_state(ContextState::Parsed),
            Err(PeerError::Native(_))
        ));

        let (mut parsed, _) = parse("x;");
        assert!(parsed.proceed_to_state(ContextState::Parsed).is_ok());
        assert_eq!(
            parsed.proceed_to_state(ContextState::New),
            Err(PeerError::InvalidState {
                expected: ContextState::New,
                actual: ContextState::Parsed,
            })
        );
    }
}
