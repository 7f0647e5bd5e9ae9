//! JSON documents as object graphs.
//!
//! Objects become maps keyed by member name, arrays become lists and scalars
//! become leaves. Integers that fit `i64` are `i64` leaves, other integers
//! `u64`, everything else `f64`.

use serde_json::Value;

use crate::graph::{NodeId, SequenceKind, TypeKey};
use crate::introspect::{GraphBuilder, Introspect};

impl Introspect for Value {
    fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
        match self {
            Value::Null => graph.null(TypeKey::of::<Value>()),
            Value::Bool(value) => graph.leaf(*value),
            Value::Number(number) => {
                if let Some(value) = number.as_i64() {
                    graph.leaf(value)
                } else if let Some(value) = number.as_u64() {
                    graph.leaf(value)
                } else {
                    graph.leaf(number.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(value) => graph.leaf(value.clone()),
            Value::Array(items) => graph.sequence(
                TypeKey::of::<Vec<Value>>(),
                SequenceKind::List,
                items.iter(),
            ),
            Value::Object(members) => graph.map(
                TypeKey::of::<serde_json::Map<String, Value>>(),
                true,
                members.iter().map(|(key, value)| (key.clone(), value)),
            ),
        }
    }
}
