//! Read-only views over finalized nodes.

use crate::error::BridgeError;
use crate::handle::Handle;
use crate::node::{Kind, Node};

/// A cheap, re-creatable read-only wrapper over a finalized node, as seen
/// through one handle.
///
/// A view of an absent or zero handle behaves as a null node. Views never
/// own the node; the [`HandleTable`](crate::HandleTable) does.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'t> {
    handle: Handle,
    node: Option<&'t Node>,
}

impl<'t> NodeView<'t> {
    pub(crate) fn new(handle: Handle, node: Option<&'t Node>) -> Self {
        Self { handle, node }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn node(&self) -> Option<&'t Node> {
        self.node
    }

    pub fn kind(&self) -> Kind {
        self.node.map_or(Kind::Null, Node::kind)
    }

    pub fn size(&self) -> usize {
        self.node.map_or(0, Node::size)
    }

    fn resolved(&self) -> Result<&'t Node, BridgeError> {
        self.node.ok_or(BridgeError::LookupMiss(self.handle))
    }

    fn mismatch(&self, expected: Kind) -> BridgeError {
        BridgeError::KindMismatch {
            expected,
            actual: self.kind(),
        }
    }

    pub fn try_as_str(&self) -> Result<&'t str, BridgeError> {
        match self.resolved()? {
            Node::String(s) => Ok(&s[..]),
            _ => Err(self.mismatch(Kind::String)),
        }
    }

    pub fn try_as_int(&self) -> Result<i64, BridgeError> {
        match self.resolved()? {
            Node::Int(v) => Ok(*v),
            _ => Err(self.mismatch(Kind::Int)),
        }
    }

    pub fn try_as_uint(&self) -> Result<u64, BridgeError> {
        match self.resolved()? {
            Node::Uint(v) => Ok(*v),
            _ => Err(self.mismatch(Kind::Uint)),
        }
    }

    pub fn try_as_float(&self) -> Result<f64, BridgeError> {
        match self.resolved()? {
            Node::Float(v) => Ok(*v),
            _ => Err(self.mismatch(Kind::Float)),
        }
    }

    pub fn try_as_bool(&self) -> Result<bool, BridgeError> {
        match self.resolved()? {
            Node::Bool(v) => Ok(*v),
            _ => Err(self.mismatch(Kind::Bool)),
        }
    }

    // Zero-value accessors: a kind mismatch yields the type's default.

    pub fn as_str(&self) -> &'t str {
        self.try_as_str().unwrap_or_default()
    }

    pub fn as_int(&self) -> i64 {
        self.try_as_int().unwrap_or_default()
    }

    pub fn as_uint(&self) -> u64 {
        self.try_as_uint().unwrap_or_default()
    }

    pub fn as_float(&self) -> f64 {
        self.try_as_float().unwrap_or_default()
    }

    pub fn as_bool(&self) -> bool {
        self.try_as_bool().unwrap_or_default()
    }

    /// Key at `index` in the object's sorted key order.
    pub fn key_at(&self, index: usize) -> Result<&'t str, BridgeError> {
        match self.resolved()? {
            Node::Object(obj) => {
                let keys = obj.keys();
                keys.get(index)
                    .map(String::as_str)
                    .ok_or(BridgeError::IndexOutOfRange {
                        index,
                        size: keys.len(),
                    })
            }
            _ => Err(self.mismatch(Kind::Object)),
        }
    }

    /// Child at `index`: the element of an array, or the value bound to
    /// [`key_at(index)`](Self::key_at) of an object.
    pub fn child_at(&self, index: usize) -> Result<&'t Node, BridgeError> {
        match self.resolved()? {
            Node::Array(items) => items.get(index).ok_or(BridgeError::IndexOutOfRange {
                index,
                size: items.len(),
            }),
            Node::Object(obj) => {
                let key = self.key_at(index)?;
                obj.get(key)
                    .ok_or_else(|| BridgeError::MissingKey(key.to_owned()))
            }
            other => Err(BridgeError::NotContainer(other.kind())),
        }
    }

    /// Whether both views wrap the same underlying data. Handles are not
    /// compared.
    ///
    /// A view whose handle did not resolve reads as null, so it is the same
    /// as the zero handle and as any other unresolved view.
    pub fn same_as(&self, other: &NodeView<'_>) -> bool {
        match (self.node, other.node) {
            (Some(a), Some(b)) => a.same(b),
            (a, b) => a.map_or(true, Node::is_null) && b.map_or(true, Node::is_null),
        }
    }
}
