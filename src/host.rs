//! Host-facing field encoding.
//!
//! A JS host describes fields as a JSON object keyed by camelCase field
//! names. Node fields carry peers as numbers (`null` for an absent optional
//! child), enumerant fields carry their source spelling (`"+"`, `"const"`)
//! or the raw integer.

use serde_json::{Map, Value};

use crate::error::{PeerError, Result};
use crate::factory;
use crate::kind::{FieldSlot, FieldSpec, FieldType, NodeKind};
use crate::native::{NativeContext, NativeValue};
use crate::operators::scalar_from_text;
use crate::peer::Peer;
use crate::registry::Node;

/// Largest context id whose peers are still exact as JS doubles (2^53).
pub const MAX_HOST_CONTEXT_ID: u32 = (1 << 21) - 1;

/// Fails for a context whose peers would lose precision in JS.
pub fn check_host_context(id: u32) -> Result<()> {
    if id > MAX_HOST_CONTEXT_ID {
        return Err(PeerError::native(format!(
            "context id {} exceeds the host limit of {}",
            id, MAX_HOST_CONTEXT_ID
        )));
    }
    Ok(())
}

/// Peers travel to JS as numbers; exact only for contexts that passed
/// [`check_host_context`].
pub fn peer_to_host(peer: Peer) -> i64 {
    peer.raw() as i64
}

pub fn peer_from_host(raw: i64) -> Result<Peer> {
    u64::try_from(raw)
        .map(Peer::from_raw)
        .map_err(|_| PeerError::InvalidPeer(Peer::NULL))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn json_peer(value: &Value) -> Option<Peer> {
    value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|number| number.fract() == 0.0 && *number >= 0.0)
                .map(|number| number as u64)
        })
        .map(Peer::from_raw)
}

/// Converts one JSON field value according to its schema entry.
pub fn value_from_json(kind: NodeKind, spec: &FieldSpec, value: &Value) -> Result<NativeValue> {
    let mismatch = || PeerError::FieldType {
        kind,
        field: spec.name,
        expected: spec.ty,
        actual: json_type(value),
    };
    match spec.ty {
        FieldType::Node(_) | FieldType::Ident | FieldType::OptNode(_) => match value {
            Value::Null => Ok(NativeValue::Node(Peer::NULL)),
            _ => json_peer(value).map(NativeValue::Node).ok_or_else(mismatch),
        },
        FieldType::Nodes(_) => {
            let items = value.as_array().ok_or_else(mismatch)?;
            let peers = items
                .iter()
                .map(|item| json_peer(item).ok_or_else(mismatch))
                .collect::<Result<Vec<_>>>()?;
            Ok(NativeValue::Nodes(peers))
        }
        FieldType::Str => value
            .as_str()
            .map(|text| NativeValue::Str(text.to_string()))
            .ok_or_else(mismatch),
        FieldType::Bool => value.as_bool().map(NativeValue::Bool).ok_or_else(mismatch),
        FieldType::Double => match value {
            Value::String(text) => match text.as_str() {
                "Infinity" => Ok(NativeValue::Double(f64::INFINITY)),
                "-Infinity" => Ok(NativeValue::Double(f64::NEG_INFINITY)),
                "NaN" => Ok(NativeValue::Double(f64::NAN)),
                _ => Err(mismatch()),
            },
            _ => value.as_f64().map(NativeValue::Double).ok_or_else(mismatch),
        },
        FieldType::Int => match value {
            Value::String(text) => scalar_from_text(spec.name, text)
                .map(NativeValue::Int)
                .ok_or_else(|| {
                    PeerError::native(format!("{}.{}: unknown '{}'", kind, spec.name, text))
                }),
            _ => value
                .as_i64()
                .and_then(|raw| i32::try_from(raw).ok())
                .map(NativeValue::Int)
                .ok_or_else(mismatch),
        },
    }
}

/// Schema-ordered values from a JSON object. Keys missing from `json` come
/// from `base` when given (update), otherwise from the kind's defaults.
pub fn fields_from_json(
    kind: NodeKind,
    json: &Value,
    base: Option<&[NativeValue]>,
) -> Result<Vec<NativeValue>> {
    let empty = Map::new();
    let object = match json {
        Value::Object(object) => object,
        Value::Null => &empty,
        other => {
            return Err(PeerError::native(format!(
                "{} fields must be an object, got {}",
                kind,
                json_type(other)
            )))
        }
    };
    for key in object.keys() {
        let known = kind
            .fields()
            .iter()
            .any(|spec| spec.json_key() == *key || spec.name == key.as_str());
        if !known {
            return Err(PeerError::native(format!("{} has no field '{}'", kind, key)));
        }
    }

    let mut fields = Vec::with_capacity(kind.fields().len());
    for (index, spec) in kind.fields().iter().enumerate() {
        let given = object.get(&spec.json_key()).or_else(|| object.get(spec.name));
        let value = match (given, base) {
            (Some(value), _) => value_from_json(kind, spec, value)?,
            (None, Some(base)) => base
                .get(index)
                .cloned()
                .ok_or(PeerError::NoSuchField { kind, index })?,
            (None, None) => factory::default_field(kind, index)?,
        };
        fields.push(value);
    }
    Ok(fields)
}

/// `create` from a kind name and a JSON field object.
pub fn create_from_json(ctx: &mut dyn NativeContext, kind_name: &str, json: &Value) -> Result<Node> {
    let kind = NodeKind::from_name(kind_name)?;
    let fields = fields_from_json(kind, json, None)?;
    factory::create(ctx, kind, fields)
}

/// `update` where omitted keys keep the node's current values.
pub fn update_from_json(ctx: &mut dyn NativeContext, peer: Peer, json: &Value) -> Result<Node> {
    let node = Node::resolve(ctx, peer)?;
    let current = factory::current_fields(ctx, node)?;
    let fields = fields_from_json(node.kind(), json, Some(&current))?;
    factory::update(ctx, node, fields)
}

/// One field of `peer` by JSON key or schema name. Child nodes come back as
/// peers; use `dump::dump_json` for whole subtrees.
pub fn field_to_json(ctx: &dyn NativeContext, peer: Peer, name: &str) -> Result<Value> {
    let kind = ctx.node_kind(peer)?;
    let index = kind
        .fields()
        .iter()
        .position(|spec| spec.json_key() == name || spec.name == name)
        .ok_or_else(|| PeerError::native(format!("{} has no field '{}'", kind, name)))?;
    let spec = FieldSlot::new(kind, index).spec()?;
    let value = ctx.get_field(peer, FieldSlot::new(kind, index))?;
    match value {
        NativeValue::Node(child) if child.is_null() => Ok(Value::Null),
        NativeValue::Node(child) => Ok(Value::from(peer_to_host(child))),
        NativeValue::Nodes(children) => Ok(Value::from(
            children.into_iter().map(peer_to_host).collect::<Vec<_>>(),
        )),
        other => crate::dump::scalar_json(spec.name, spec.ty, other),
    }
}
