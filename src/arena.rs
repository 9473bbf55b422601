//! In-process compiler context.
//!
//! Nodes live in a flat arena owned by the context; a peer is the context id
//! plus the node's slot. Provenance (which node an update replaced) is kept
//! in a side table rather than on the node record.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, trace};

use crate::config::ContextOptions;
use crate::error::{PeerError, Result};
use crate::kind::{FieldSlot, FieldSpec, FieldType, NodeCategory, NodeKind};
use crate::native::{ContextState, NativeContext, NativeValue, SourceRange};
use crate::operators::check_scalar;
use crate::peer::Peer;

lazy_static! {
    // ECMAScript IdentifierName: ID_Start | $ | _, then ID_Continue | $ | ZWNJ | ZWJ
    static ref IDENTIFIER_RE: Regex =
        Regex::new(r"^[\p{ID_Start}$_][\p{ID_Continue}$\x{200C}\x{200D}]*$").unwrap();
}

static CONTEXT_ID_COUNTER: AtomicU32 = AtomicU32::new(1);

fn next_context_id() -> u32 {
    CONTEXT_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}

pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name)
}

#[derive(Debug, Clone)]
struct NodeRecord {
    kind: NodeKind,
    fields: Vec<NativeValue>,
    parent: Peer,
    range: SourceRange,
}

#[derive(Debug)]
pub struct ArenaContext {
    id: u32,
    options: ContextOptions,
    state: ContextState,
    nodes: Vec<NodeRecord>,
    provenance: HashMap<Peer, Peer>,
    program: Option<Peer>,
    source: Option<String>,
    error: Option<String>,
}

impl ArenaContext {
    pub fn new(options: ContextOptions) -> Self {
        let id = next_context_id();
        debug!(context = id, file = %options.file_name, "context created");
        ArenaContext {
            id,
            nodes: Vec::with_capacity(options.capacity_hint),
            options,
            state: ContextState::New,
            provenance: HashMap::new(),
            program: None,
            source: None,
            error: None,
        }
    }

    /// Context holding `source`, not yet parsed.
    pub fn from_source(options: ContextOptions, source: impl Into<String>) -> Self {
        let mut ctx = ArenaContext::new(options);
        ctx.source = Some(source.into());
        ctx
    }

    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Advances the context to `target`. Only `New -> Parsed` does work;
    /// asking for the current state is a no-op.
    pub fn proceed_to_state(&mut self, target: ContextState) -> Result<()> {
        if self.state == target {
            return Ok(());
        }
        match (self.state, target) {
            (ContextState::New, ContextState::Parsed) => {
                let source = self.source.clone().ok_or_else(|| {
                    PeerError::native("context was created without source text")
                })?;
                let options = self.options.clone();
                match crate::importer::import_program(self, &options, &source) {
                    Ok(program) => {
                        self.program = Some(program);
                        self.state = ContextState::Parsed;
                        debug!(context = self.id, nodes = self.nodes.len(), "context parsed");
                        Ok(())
                    }
                    Err(err) => {
                        self.state = ContextState::Error;
                        self.error = Some(err.to_string());
                        debug!(context = self.id, error = %err, "parse failed");
                        Err(err)
                    }
                }
            }
            (actual, expected) => Err(PeerError::InvalidState { expected, actual }),
        }
    }

    fn record(&self, peer: Peer) -> Result<&NodeRecord> {
        self.check_owner(peer)?;
        self.nodes
            .get(peer.slot() as usize - 1)
            .ok_or(PeerError::InvalidPeer(peer))
    }

    fn record_mut(&mut self, peer: Peer) -> Result<&mut NodeRecord> {
        self.check_owner(peer)?;
        self.nodes
            .get_mut(peer.slot() as usize - 1)
            .ok_or(PeerError::InvalidPeer(peer))
    }

    fn check_owner(&self, peer: Peer) -> Result<()> {
        if peer.is_null() || peer.slot() == 0 {
            return Err(PeerError::InvalidPeer(peer));
        }
        if peer.context_id() != self.id {
            return Err(PeerError::ForeignPeer {
                peer,
                owner: peer.context_id(),
                context: self.id,
            });
        }
        Ok(())
    }

    fn check_child(
        &self,
        kind: NodeKind,
        spec: &FieldSpec,
        category: NodeCategory,
        peer: Peer,
    ) -> Result<()> {
        let found = self.record(peer)?.kind;
        if found.category() != category {
            return Err(PeerError::CategoryMismatch {
                kind,
                field: spec.name,
                expected: category,
                found,
            });
        }
        Ok(())
    }

    fn check_value(&self, kind: NodeKind, spec: &FieldSpec, value: &NativeValue) -> Result<()> {
        let mismatch = || PeerError::FieldType {
            kind,
            field: spec.name,
            expected: spec.ty,
            actual: value.type_name(),
        };
        match (spec.ty, value) {
            (FieldType::Node(category), NativeValue::Node(peer)) => {
                if peer.is_null() {
                    return Err(PeerError::NullPeer {
                        expected: spec.name,
                    });
                }
                self.check_child(kind, spec, category, *peer)
            }
            (FieldType::Ident, NativeValue::Node(peer)) => {
                if peer.is_null() {
                    return Err(PeerError::NullPeer {
                        expected: spec.name,
                    });
                }
                let found = self.record(*peer)?.kind;
                if found != NodeKind::Identifier {
                    return Err(PeerError::KindMismatch {
                        expected: "Identifier",
                        found,
                        peer: *peer,
                    });
                }
                Ok(())
            }
            (FieldType::OptNode(category), NativeValue::Node(peer)) => {
                if peer.is_null() {
                    return Ok(());
                }
                self.check_child(kind, spec, category, *peer)
            }
            (FieldType::Nodes(category), NativeValue::Nodes(peers)) => {
                for peer in peers {
                    if peer.is_null() {
                        return Err(PeerError::NullPeer {
                            expected: spec.name,
                        });
                    }
                    self.check_child(kind, spec, category, *peer)?;
                }
                Ok(())
            }
            (FieldType::Str, NativeValue::Str(text)) => {
                if kind == NodeKind::Identifier
                    && self.options.strict_identifiers
                    && !is_valid_identifier(text)
                {
                    return Err(PeerError::InvalidIdentifier(text.clone()));
                }
                Ok(())
            }
            (FieldType::Int, NativeValue::Int(raw)) => check_scalar(kind, spec.name, *raw),
            (FieldType::Bool, NativeValue::Bool(_)) | (FieldType::Double, NativeValue::Double(_)) => {
                Ok(())
            }
            _ => Err(mismatch()),
        }
    }

    fn adopt(&mut self, parent: Peer, value: &NativeValue) -> Result<()> {
        match value {
            NativeValue::Node(child) if !child.is_null() => {
                self.record_mut(*child)?.parent = parent;
            }
            NativeValue::Nodes(children) => {
                for child in children {
                    self.record_mut(*child)?.parent = parent;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl Default for ArenaContext {
    fn default() -> Self {
        ArenaContext::new(ContextOptions::default())
    }
}

impl NativeContext for ArenaContext {
    fn id(&self) -> u32 {
        self.id
    }

    fn state(&self) -> ContextState {
        self.state
    }

    fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn program(&self) -> Option<Peer> {
        self.program
    }

    fn node_kind(&self, peer: Peer) -> Result<NodeKind> {
        Ok(self.record(peer)?.kind)
    }

    fn create_node(&mut self, kind: NodeKind, fields: Vec<NativeValue>) -> Result<Peer> {
        let schema = kind.fields();
        if schema.len() != fields.len() {
            return Err(PeerError::FieldCount {
                kind,
                expected: schema.len(),
                actual: fields.len(),
            });
        }
        for (spec, value) in schema.iter().zip(&fields) {
            self.check_value(kind, spec, value)?;
        }

        let slot = u32::try_from(self.nodes.len() + 1)
            .map_err(|_| PeerError::native("node arena exhausted"))?;
        let peer = Peer::new(self.id, slot);
        for value in &fields {
            self.adopt(peer, value)?;
        }
        self.nodes.push(NodeRecord {
            kind,
            fields,
            parent: Peer::NULL,
            range: SourceRange::default(),
        });
        trace!(%kind, %peer, "node created");
        Ok(peer)
    }

    fn get_field(&self, peer: Peer, slot: FieldSlot) -> Result<NativeValue> {
        let record = self.record(peer)?;
        if record.kind != slot.kind {
            return Err(PeerError::KindMismatch {
                expected: slot.kind.name(),
                found: record.kind,
                peer,
            });
        }
        record
            .fields
            .get(slot.index)
            .cloned()
            .ok_or(PeerError::NoSuchField {
                kind: slot.kind,
                index: slot.index,
            })
    }

    fn set_field(&mut self, peer: Peer, slot: FieldSlot, value: NativeValue) -> Result<()> {
        let found = self.record(peer)?.kind;
        if found != slot.kind {
            return Err(PeerError::KindMismatch {
                expected: slot.kind.name(),
                found,
                peer,
            });
        }
        let spec = slot.spec()?;
        self.check_value(slot.kind, spec, &value)?;
        self.adopt(peer, &value)?;
        self.record_mut(peer)?.fields[slot.index] = value;
        trace!(kind = %slot.kind, field = spec.name, %peer, "field set");
        Ok(())
    }

    fn parent(&self, peer: Peer) -> Result<Peer> {
        Ok(self.record(peer)?.parent)
    }

    fn set_parent(&mut self, peer: Peer, parent: Peer) -> Result<()> {
        if !parent.is_null() {
            self.record(parent)?;
        }
        self.record_mut(peer)?.parent = parent;
        Ok(())
    }

    fn original(&self, peer: Peer) -> Result<Peer> {
        self.record(peer)?;
        Ok(self.provenance.get(&peer).copied().unwrap_or(Peer::NULL))
    }

    fn set_original(&mut self, peer: Peer, original: Peer) -> Result<()> {
        self.record(peer)?;
        if original.is_null() {
            self.provenance.remove(&peer);
        } else {
            self.record(original)?;
            self.provenance.insert(peer, original);
        }
        Ok(())
    }

    fn children(&self, peer: Peer) -> Result<Vec<Peer>> {
        let record = self.record(peer)?;
        let mut children = Vec::new();
        for value in &record.fields {
            match value {
                NativeValue::Node(child) if !child.is_null() => children.push(*child),
                NativeValue::Nodes(list) => children.extend(list.iter().copied()),
                _ => {}
            }
        }
        Ok(children)
    }

    fn range(&self, peer: Peer) -> Result<SourceRange> {
        Ok(self.record(peer)?.range)
    }

    fn set_range(&mut self, peer: Peer, range: SourceRange) -> Result<()> {
        self.record_mut(peer)?.range = range;
        Ok(())
    }
}
