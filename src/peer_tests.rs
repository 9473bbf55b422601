//! Peer handles, wrapping and marshaling.

#[cfg(test)]
mod tests {
    use crate::arena::ArenaContext;
    use crate::error::PeerError;
    use crate::kind::NodeKind;
    use crate::native::NativeContext;
    use crate::node::{AstNode, AstNodeWrapper, Expression, Statement};
    use crate::nodes::*;
    use crate::peer::*;

    #[test]
    fn test_peer_layout() {
        let peer = Peer::new(3, 17);
        assert_eq!(peer.context_id(), 3);
        assert_eq!(peer.slot(), 17);
        assert_eq!(Peer::from_raw(peer.raw()), peer);
        assert!(Peer::NULL.is_null());
        assert!(!peer.is_null());
        assert_eq!(peer.to_string(), "0x300000011");
    }

    #[test]
    fn test_wrap_unwrap_round_trip() {
        let mut ctx = ArenaContext::default();
        let id = Identifier::create(&mut ctx, "x".to_string()).unwrap();
        let wrapped = Identifier::wrap(&ctx, id.peer()).unwrap();
        assert_eq!(wrapped.peer(), id.peer());
        assert_eq!(Expression::wrap(&ctx, id.peer()).unwrap().peer(), id.peer());
        assert_eq!(AstNode::wrap(&ctx, id.peer()).unwrap().peer(), id.peer());
    }

    #[test]
    fn test_wrap_wrong_kind_fails() {
        let mut ctx = ArenaContext::default();
        let id = Identifier::create(&mut ctx, "x".to_string()).unwrap();

        let err = StringLiteral::wrap(&ctx, id.peer()).unwrap_err();
        assert_eq!(
            err,
            PeerError::KindMismatch {
                expected: "StringLiteral",
                found: NodeKind::Identifier,
                peer: id.peer(),
            }
        );
        assert!(matches!(
            Statement::wrap(&ctx, id.peer()),
            Err(PeerError::KindMismatch { expected: "Statement", .. })
        ));
    }

    #[test]
    fn test_wrap_null_fails() {
        let ctx = ArenaContext::default();
        assert_eq!(
            Identifier::wrap(&ctx, Peer::NULL),
            Err(PeerError::NullPeer {
                expected: "Identifier"
            })
        );
    }

    #[test]
    fn test_foreign_peer_rejected() {
        let mut first = ArenaContext::default();
        let second = ArenaContext::default();
        let id = Identifier::create(&mut first, "x".to_string()).unwrap();

        let err = second.node_kind(id.peer()).unwrap_err();
        assert_eq!(
            err,
            PeerError::ForeignPeer {
                peer: id.peer(),
                owner: first.id(),
                context: second.id(),
            }
        );
    }

    #[test]
    fn test_dangling_slot_rejected() {
        let ctx = ArenaContext::default();
        let dangling = Peer::new(ctx.id(), 42);
        assert_eq!(ctx.node_kind(dangling), Err(PeerError::InvalidPeer(dangling)));
    }

    #[test]
    fn test_pack_node_null_safe() {
        let mut ctx = ArenaContext::default();
        let id = Identifier::create(&mut ctx, "x".to_string()).unwrap();
        assert_eq!(pack_node(Some(&id)), id.peer());
        assert_eq!(pack_node::<Identifier>(None), Peer::NULL);
        assert_eq!(unpack_node::<Identifier>(&ctx, Peer::NULL), Ok(None));
        assert_eq!(unpack_node::<Identifier>(&ctx, id.peer()), Ok(Some(id)));
        assert!(matches!(
            unpack_nonnull_node::<Identifier>(&ctx, Peer::NULL),
            Err(PeerError::NullPeer { .. })
        ));
    }

    #[test]
    fn test_node_array_preserves_identity() {
        let mut ctx = ArenaContext::default();
        let nodes: Vec<Identifier> = ["a", "b", "c"]
            .iter()
            .map(|name| Identifier::create(&mut ctx, name.to_string()).unwrap())
            .collect();

        let packed = pack_node_array(&nodes);
        assert_eq!(packed.len(), 3);
        let unpacked: Vec<Identifier> = unpack_node_array(&ctx, &packed).unwrap();
        assert_eq!(unpacked, nodes);

        let empty = pack_node_array::<Identifier>(&[]);
        assert!(empty.is_empty());
        assert_eq!(unpack_node_array::<Identifier>(&ctx, &empty), Ok(vec![]));
    }

    #[test]
    fn test_packed_array_length_checked() {
        let peers = vec![Peer::new(1, 1), Peer::new(1, 2)];
        assert_eq!(
            PackedArray::new(peers.clone(), 3),
            Err(PeerError::ArrayLengthMismatch {
                declared: 3,
                actual: 2
            })
        );
        assert!(PackedArray::new(peers, 2).is_ok());
        assert!(matches!(
            PackedArray::new(vec![Peer::NULL], 1),
            Err(PeerError::NullPeer { .. })
        ));
    }

    #[test]
    fn test_unpack_string_trims_nul() {
        assert_eq!(unpack_string(b"name\0garbage"), Ok("name".to_string()));
        assert_eq!(unpack_string(b"plain"), Ok("plain".to_string()));
        assert!(unpack_string(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_array_element_kind_checked_on_unpack() {
        let mut ctx = ArenaContext::default();
        let id = Identifier::create(&mut ctx, "x".to_string()).unwrap();
        let lit = NumberLiteral::create(&mut ctx, 1.0).unwrap();
        let packed = PackedArray::new(vec![id.peer(), lit.peer()], 2).unwrap();
        assert!(matches!(
            unpack_node_array::<Identifier>(&ctx, &packed),
            Err(PeerError::KindMismatch { .. })
        ));
        assert_eq!(
            unpack_node_array::<Expression>(&ctx, &packed).unwrap().len(),
            2
        );
    }
}
