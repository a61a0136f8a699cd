//! Conversion between [`Node`] trees and `serde_json` values.
//!
//! Integers that fit in `i64` become [`Node::Int`], larger non-negative
//! integers become [`Node::Uint`], everything else numeric becomes
//! [`Node::Float`]. On the way out, non-finite floats have no JSON
//! representation and are written as `null`.

use serde_json::{Map, Number, Value};

use crate::error::BridgeError;
use crate::node::{Node, Object};

impl From<Value> for Node {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Node::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Node::Uint(u)
                } else {
                    Node::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            Value::String(s) => Node::from(s),
            Value::Array(items) => Node::array(items.into_iter().map(Node::from)),
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| (k, Node::from(v)))
                .collect::<Object>()
                .into(),
        }
    }
}

impl From<&Node> for Value {
    fn from(node: &Node) -> Self {
        match node {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Int(i) => Value::from(*i),
            Node::Uint(u) => Value::from(*u),
            Node::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Node::String(s) => Value::String(s.to_string()),
            Node::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            Node::Object(obj) => Value::Object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

/// Parse JSON text into a node tree.
pub fn parse(text: &str) -> Result<Node, BridgeError> {
    let value: Value = serde_json::from_str(text)?;
    Ok(Node::from(value))
}

/// Serialize a node tree to compact JSON text.
pub fn to_string(node: &Node) -> String {
    Value::from(node).to_string()
}
