//! Kind table and registry dispatch.

#[cfg(test)]
mod tests {
    use crate::arena::ArenaContext;
    use crate::error::PeerError;
    use crate::kind::NodeKind;
    use crate::node::AstNodeWrapper;
    use crate::nodes::*;
    use crate::operators::TokenType;
    use crate::peer::Peer;
    use crate::registry::{Node, NodeRegistry};

    fn as_identifier(peer: Peer) -> Node {
        Node::Identifier(Identifier::from_peer_unchecked(peer))
    }

    #[test]
    fn test_resolve_yields_matching_variant() {
        for kind in NodeKind::ALL {
            let node = Node::from_kind(*kind, Peer::new(1, 1));
            assert_eq!(node.kind(), *kind);
            assert_eq!(node.peer(), Peer::new(1, 1));
        }
    }

    #[test]
    fn test_resolve_against_context() {
        let mut ctx = ArenaContext::default();
        let a = Identifier::create(&mut ctx, "a".to_string()).unwrap();
        let b = Identifier::create(&mut ctx, "b".to_string()).unwrap();
        let sum = BinaryExpression::create(&mut ctx, a.into(), b.into(), TokenType::Plus).unwrap();

        assert_eq!(Node::resolve(&ctx, sum.peer()), Ok(Node::BinaryExpression(sum)));
        assert_eq!(Node::resolve(&ctx, a.peer()), Ok(Node::Identifier(a)));
        assert!(matches!(
            Node::resolve(&ctx, Peer::NULL),
            Err(PeerError::NullPeer { .. })
        ));

        let children = sum.children(&ctx).unwrap();
        assert_eq!(children, vec![Node::Identifier(a), Node::Identifier(b)]);
    }

    #[test]
    fn test_builtin_registry_resolves_every_kind() {
        let registry = NodeRegistry::builtin();
        assert_eq!(registry.len(), NodeKind::ALL.len());
        for kind in NodeKind::ALL {
            let node = registry.resolve(*kind, Peer::new(1, 7)).unwrap();
            assert_eq!(node.kind(), *kind);
        }
    }

    #[test]
    fn test_unregistered_kind_is_unknown() {
        let registry = NodeRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(
            registry.resolve(NodeKind::IfStatement, Peer::new(1, 1)),
            Err(PeerError::UnknownKind(NodeKind::IfStatement.tag()))
        );
        assert_eq!(
            NodeRegistry::builtin().resolve_tag(9999, Peer::new(1, 1)),
            Err(PeerError::UnknownKind(9999))
        );
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = NodeRegistry::new();
        registry.register(NodeKind::Identifier, as_identifier).unwrap();
        registry.register(NodeKind::Identifier, as_identifier).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.is_registered(NodeKind::Identifier));
    }

    #[test]
    fn test_equivalent_constructor_is_idempotent() {
        fn also_identifier(peer: Peer) -> Node {
            Node::Identifier(Identifier::from_peer_unchecked(peer))
        }

        let mut registry = NodeRegistry::builtin();
        let before = registry.len();
        registry
            .register(NodeKind::Identifier, Node::constructor(NodeKind::Identifier))
            .unwrap();
        registry.register(NodeKind::Identifier, also_identifier).unwrap();
        registry.register(NodeKind::Identifier, as_identifier).unwrap();
        assert_eq!(registry.len(), before);
    }

    #[test]
    fn test_conflicting_registration_rejected() {
        let mut registry = NodeRegistry::builtin();
        assert_eq!(
            registry.register(NodeKind::StringLiteral, as_identifier),
            Err(PeerError::ConflictingRegistration(NodeKind::StringLiteral))
        );
        // The built-in constructor is still in place
        let node = registry.resolve(NodeKind::StringLiteral, Peer::new(1, 1)).unwrap();
        assert_eq!(node.kind(), NodeKind::StringLiteral);
    }

    #[test]
    fn test_resolve_peer_uses_context_kind() {
        let mut ctx = ArenaContext::default();
        let empty = EmptyStatement::create(&mut ctx).unwrap();
        let registry = NodeRegistry::builtin();
        assert_eq!(
            registry.resolve_peer(&ctx, empty.peer()),
            Ok(Node::EmptyStatement(empty))
        );
    }

    #[test]
    fn test_categories() {
        assert!(NodeKind::MemberExpression.is_expression());
        assert!(NodeKind::WhileStatement.is_statement());
        assert!(NodeKind::ETSUnionType.is_type_node());
        assert!(!NodeKind::VariableDeclarator.is_expression());
        assert!(!NodeKind::Program.is_statement());
    }
}
