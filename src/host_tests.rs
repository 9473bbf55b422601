//! JSON field encoding used by the N-API class.

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::arena::ArenaContext;
    use crate::error::PeerError;
    use crate::host::*;
    use crate::kind::NodeKind;
    use crate::native::NativeContext;
    use crate::peer::Peer;
    use crate::registry::Node;

    fn create(ctx: &mut ArenaContext, kind: &str, fields: serde_json::Value) -> i64 {
        peer_to_host(create_from_json(ctx, kind, &fields).unwrap().peer())
    }

    #[test]
    fn test_create_and_read_back() {
        let mut ctx = ArenaContext::default();
        let a = create(&mut ctx, "Identifier", json!({ "name": "a" }));
        let b = create(&mut ctx, "Identifier", json!({ "name": "b" }));
        let sum = create(
            &mut ctx,
            "BinaryExpression",
            json!({ "left": a, "right": b, "operator": "+" }),
        );
        let sum = peer_from_host(sum).unwrap();

        assert_eq!(ctx.node_kind(sum), Ok(NodeKind::BinaryExpression));
        assert_eq!(field_to_json(&ctx, sum, "left").unwrap(), json!(a));
        assert_eq!(field_to_json(&ctx, sum, "operator").unwrap(), json!("+"));
    }

    #[test]
    fn test_create_defaults() {
        let mut ctx = ArenaContext::default();
        let callee = create(&mut ctx, "Identifier", json!({ "name": "f" }));
        let call = create(&mut ctx, "CallExpression", json!({ "callee": callee }));
        let call = peer_from_host(call).unwrap();
        assert_eq!(field_to_json(&ctx, call, "arguments").unwrap(), json!([]));
        assert_eq!(field_to_json(&ctx, call, "optional").unwrap(), json!(false));

        let err = create_from_json(&mut ctx, "BinaryExpression", &json!({})).unwrap_err();
        assert_eq!(
            err,
            PeerError::MissingField {
                kind: NodeKind::BinaryExpression,
                field: "left"
            }
        );
    }

    #[test]
    fn test_update_keeps_omitted_fields() {
        let mut ctx = ArenaContext::default();
        let a = create(&mut ctx, "Identifier", json!({ "name": "a" }));
        let b = create(&mut ctx, "Identifier", json!({ "name": "b" }));
        let c = create(&mut ctx, "Identifier", json!({ "name": "c" }));
        let sum = create(
            &mut ctx,
            "BinaryExpression",
            json!({ "left": a, "right": b, "operator": "+" }),
        );
        let sum = peer_from_host(sum).unwrap();

        let same = update_from_json(&mut ctx, sum, &json!({ "operator": "+" })).unwrap();
        assert_eq!(same.peer(), sum);

        let updated = update_from_json(&mut ctx, sum, &json!({ "left": c })).unwrap();
        assert_ne!(updated.peer(), sum);
        assert_eq!(field_to_json(&ctx, updated.peer(), "right").unwrap(), json!(b));
        assert_eq!(ctx.original(updated.peer()), Ok(sum));
    }

    #[test]
    fn test_camel_case_keys_and_enumerants() {
        let mut ctx = ArenaContext::default();
        let id = create(&mut ctx, "Identifier", json!({ "name": "x" }));
        let int = create(&mut ctx, "ETSPrimitiveType", json!({ "primitive": "int" }));
        let declarator = create(
            &mut ctx,
            "VariableDeclarator",
            json!({ "id": id, "typeAnnotation": int }),
        );
        let declaration = create(
            &mut ctx,
            "VariableDeclaration",
            json!({ "declarationKind": "const", "declarators": [declarator] }),
        );
        let declaration = peer_from_host(declaration).unwrap();
        assert_eq!(
            field_to_json(&ctx, declaration, "declarationKind").unwrap(),
            json!("const")
        );
        let declarator = peer_from_host(declarator).unwrap();
        assert_eq!(field_to_json(&ctx, declarator, "init").unwrap(), json!(null));
        assert_eq!(
            field_to_json(&ctx, declarator, "type_annotation").unwrap(),
            json!(int)
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        let mut ctx = ArenaContext::default();
        assert!(matches!(
            create_from_json(&mut ctx, "ClassDeclaration", &json!({})),
            Err(PeerError::UnknownKindName(_))
        ));
        assert!(matches!(
            create_from_json(&mut ctx, "Identifier", &json!({ "name": 3 })),
            Err(PeerError::FieldType { field: "name", .. })
        ));
        assert!(matches!(
            create_from_json(&mut ctx, "Identifier", &json!({ "name": "x", "extra": 1 })),
            Err(PeerError::Native(_))
        ));
        let unknown_operator = json!({ "argument": null, "operator": "@" });
        assert!(matches!(
            create_from_json(&mut ctx, "UnaryExpression", &unknown_operator),
            Err(PeerError::Native(_))
        ));
        assert_eq!(peer_from_host(-1), Err(PeerError::InvalidPeer(Peer::NULL)));
    }

    #[test]
    fn test_operator_checked_against_kind() {
        let mut ctx = ArenaContext::default();
        let a = create(&mut ctx, "Identifier", json!({ "name": "a" }));
        let b = create(&mut ctx, "Identifier", json!({ "name": "b" }));
        let with_operator =
            |operator: serde_json::Value| json!({ "left": a, "right": b, "operator": operator });

        assert_eq!(
            create_from_json(&mut ctx, "BinaryExpression", &with_operator(json!("typeof")))
                .unwrap_err(),
            PeerError::InvalidScalar {
                what: "binary operator",
                value: 42
            }
        );
        assert!(matches!(
            create_from_json(&mut ctx, "BinaryExpression", &with_operator(json!(999))),
            Err(PeerError::InvalidScalar { value: 999, .. })
        ));
        assert!(create_from_json(&mut ctx, "AssignmentExpression", &with_operator(json!("+=")))
            .is_ok());

        let number = create(&mut ctx, "NumberLiteral", json!({ "value": 1 }));
        let declarator = create_from_json(&mut ctx, "VariableDeclarator", &json!({ "id": number }));
        assert!(matches!(declarator, Err(PeerError::KindMismatch { .. })));
    }

    #[test]
    fn test_non_finite_number_values() {
        let mut ctx = ArenaContext::default();
        let inf = create(&mut ctx, "NumberLiteral", json!({ "value": "Infinity" }));
        let inf = peer_from_host(inf).unwrap();
        assert_eq!(field_to_json(&ctx, inf, "value").unwrap(), json!("Infinity"));
        assert!(matches!(
            create_from_json(&mut ctx, "NumberLiteral", &json!({ "value": "lots" })),
            Err(PeerError::FieldType { field: "value", .. })
        ));
    }

    #[test]
    fn test_host_context_limit() {
        assert!(check_host_context(1).is_ok());
        assert!(check_host_context(MAX_HOST_CONTEXT_ID).is_ok());
        assert!(matches!(
            check_host_context(MAX_HOST_CONTEXT_ID + 1),
            Err(PeerError::Native(_))
        ));
        let last = Peer::new(MAX_HOST_CONTEXT_ID, u32::MAX);
        assert!(peer_to_host(last) < (1_i64 << 53));
    }

    #[test]
    fn test_dynamic_node_matches_kind() {
        let mut ctx = ArenaContext::default();
        let node = create_from_json(&mut ctx, "EmptyStatement", &json!(null)).unwrap();
        assert!(matches!(node, Node::EmptyStatement(_)));
    }
}
