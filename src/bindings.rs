//! N-API surface: one `AstContext` class per compiler context.
//!
//! Peers cross into JS as numbers. Every error becomes a thrown JS `Error`
//! carrying the `PeerError` message.

use napi_derive::napi;
use serde_json::Value;

use crate::arena::ArenaContext;
use crate::config::ContextOptions;
use crate::dump;
use crate::error::PeerError;
use crate::host::{self, peer_from_host, peer_to_host};
use crate::native::{ContextState, NativeContext};

fn to_napi(err: PeerError) -> napi::Error {
    napi::Error::from_reason(err.to_string())
}

fn options_from(options: Option<Value>) -> napi::Result<ContextOptions> {
    match options {
        Some(value) => {
            serde_json::from_value(value).map_err(|e| napi::Error::from_reason(e.to_string()))
        }
        None => Ok(ContextOptions::default()),
    }
}

#[napi]
pub struct AstContext {
    inner: ArenaContext,
}

impl AstContext {
    fn wrap(inner: ArenaContext) -> napi::Result<Self> {
        host::check_host_context(inner.id()).map_err(to_napi)?;
        Ok(AstContext { inner })
    }
}

#[napi]
impl AstContext {
    /// Empty context for synthesizing trees from scratch.
    #[napi(constructor)]
    pub fn new(options: Option<Value>) -> napi::Result<Self> {
        AstContext::wrap(ArenaContext::new(options_from(options)?))
    }

    #[napi(factory)]
    pub fn from_source(source: String, options: Option<Value>) -> napi::Result<Self> {
        AstContext::wrap(ArenaContext::from_source(options_from(options)?, source))
    }

    #[napi]
    pub fn proceed_to_parsed(&mut self) -> napi::Result<()> {
        self.inner
            .proceed_to_state(ContextState::Parsed)
            .map_err(to_napi)
    }

    #[napi]
    pub fn state(&self) -> String {
        match self.inner.state() {
            ContextState::New => "new",
            ContextState::Parsed => "parsed",
            ContextState::Error => "error",
        }
        .to_string()
    }

    #[napi]
    pub fn error_message(&self) -> Option<String> {
        self.inner.error_message().map(str::to_string)
    }

    #[napi]
    pub fn program(&self) -> Option<i64> {
        self.inner.program().map(peer_to_host)
    }

    #[napi]
    pub fn node_count(&self) -> u32 {
        self.inner.node_count() as u32
    }

    #[napi]
    pub fn node_kind(&self, peer: i64) -> napi::Result<String> {
        let peer = peer_from_host(peer).map_err(to_napi)?;
        let kind = self.inner.node_kind(peer).map_err(to_napi)?;
        Ok(kind.name().to_string())
    }

    #[napi]
    pub fn children(&self, peer: i64) -> napi::Result<Vec<i64>> {
        let peer = peer_from_host(peer).map_err(to_napi)?;
        let children = self.inner.children(peer).map_err(to_napi)?;
        Ok(children.into_iter().map(peer_to_host).collect())
    }

    #[napi]
    pub fn parent(&self, peer: i64) -> napi::Result<Option<i64>> {
        let peer = peer_from_host(peer).map_err(to_napi)?;
        let parent = self.inner.parent(peer).map_err(to_napi)?;
        Ok((!parent.is_null()).then(|| peer_to_host(parent)))
    }

    #[napi]
    pub fn original(&self, peer: i64) -> napi::Result<Option<i64>> {
        let peer = peer_from_host(peer).map_err(to_napi)?;
        let original = self.inner.original(peer).map_err(to_napi)?;
        Ok((!original.is_null()).then(|| peer_to_host(original)))
    }

    /// `create("BinaryExpression", { left, right, operator: "+" })`
    #[napi]
    pub fn create(&mut self, kind: String, fields: Option<Value>) -> napi::Result<i64> {
        let fields = fields.unwrap_or(Value::Null);
        let node = host::create_from_json(&mut self.inner, &kind, &fields).map_err(to_napi)?;
        Ok(peer_to_host(node.peer()))
    }

    /// Returns the same peer when nothing changed, else the replacement.
    #[napi]
    pub fn update(&mut self, peer: i64, fields: Option<Value>) -> napi::Result<i64> {
        let peer = peer_from_host(peer).map_err(to_napi)?;
        let fields = fields.unwrap_or(Value::Null);
        let node = host::update_from_json(&mut self.inner, peer, &fields).map_err(to_napi)?;
        Ok(peer_to_host(node.peer()))
    }

    #[napi]
    pub fn get_field(&self, peer: i64, field: String) -> napi::Result<Value> {
        let peer = peer_from_host(peer).map_err(to_napi)?;
        host::field_to_json(&self.inner, peer, &field).map_err(to_napi)
    }

    #[napi]
    pub fn dump_json(&self, peer: i64) -> napi::Result<Value> {
        let peer = peer_from_host(peer).map_err(to_napi)?;
        dump::dump_json(&self.inner, peer).map_err(to_napi)
    }

    #[napi]
    pub fn dump_source(&self, peer: i64) -> napi::Result<String> {
        let peer = peer_from_host(peer).map_err(to_napi)?;
        dump::dump_source(&self.inner, peer).map_err(to_napi)
    }
}

/// Installs the tracing subscriber when `ES2PANDA_LOG` or `RUST_LOG` is set.
#[napi]
pub fn init_logging() -> bool {
    crate::tracing_config::init_tracing()
}
