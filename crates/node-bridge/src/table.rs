//! The handle table: sole owner of every node and builder reachable from
//! the foreign side.
//!
//! Finalized nodes and temporary builders live in two separate maps keyed by
//! [`Handle`]. Both draw handles from one monotonically increasing counter,
//! so a handle never names two things and is never reused while the table is
//! alive.
//!
//! # Usage precondition
//!
//! Only [`allocate`](HandleTable::allocate) is safe to call concurrently.
//! Everything else takes `&mut self` or reads the maps, and callers must
//! serialize access to one table; in particular [`free`](HandleTable::free)
//! must not overlap any lookup.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::builder::{BuilderMode, TmpNode};
use crate::error::{BridgeError, Violation};
use crate::handle::Handle;
use crate::node::Node;
use crate::view::NodeView;

#[derive(Debug, Default)]
pub struct HandleTable {
    last: AtomicU64,
    nodes: HashMap<Handle, Node>,
    tmp: HashMap<Handle, TmpNode>,
}

impl HandleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh non-zero handle.
    pub fn allocate(&self) -> Handle {
        let h = Handle::from_raw(self.last.fetch_add(1, Ordering::Relaxed) + 1);
        tracing::trace!(handle = h.raw(), "allocated handle");
        h
    }

    /// Bind a finalized node to a new handle. Null nodes get [`Handle::NULL`].
    pub fn register_final(&mut self, node: Node) -> Handle {
        if node.is_null() {
            return Handle::NULL;
        }
        let h = self.allocate();
        self.nodes.insert(h, node);
        h
    }

    /// The finalized node bound to `h`, if any. Handles of open builders do
    /// not resolve here.
    pub fn lookup_final(&self, h: Handle) -> Option<&Node> {
        if h.is_null() {
            return None;
        }
        self.nodes.get(&h)
    }

    /// Bind a new builder of the given mode to a new handle. For arrays
    /// `size` is the exact length; for objects it is a capacity hint.
    pub fn register_temp(&mut self, mode: BuilderMode, size: usize) -> Handle {
        let tmp = match mode {
            BuilderMode::Object => TmpNode::object(size),
            BuilderMode::Array => TmpNode::array(size),
        };
        let h = self.allocate();
        self.tmp.insert(h, tmp);
        h
    }

    pub fn lookup_temp(&self, h: Handle) -> Option<&TmpNode> {
        if h.is_null() {
            return None;
        }
        self.tmp.get(&h)
    }

    pub fn lookup_temp_mut(&mut self, h: Handle) -> Option<&mut TmpNode> {
        if h.is_null() {
            return None;
        }
        self.tmp.get_mut(&h)
    }

    /// A read-only view through `h`. Unknown handles give a null view.
    pub fn view(&self, h: Handle) -> NodeView<'_> {
        NodeView::new(h, self.lookup_final(h))
    }

    /// Register the child at `index` of the node behind `h` under a fresh
    /// handle. Every call allocates a new handle, even for the same child;
    /// a null child yields [`Handle::NULL`].
    pub fn value_at(&mut self, h: Handle, index: usize) -> Result<Handle, BridgeError> {
        let child = self.view(h).child_at(index)?.clone();
        Ok(self.register_final(child))
    }

    fn resolve_child(&self, child: Handle) -> Result<Node, BridgeError> {
        if child.is_null() {
            return Ok(Node::Null);
        }
        self.lookup_final(child)
            .cloned()
            .ok_or_else(|| Violation::UnresolvedChild(child).into())
    }

    fn temp_mut(&mut self, h: Handle) -> Result<&mut TmpNode, BridgeError> {
        self.lookup_temp_mut(h)
            .ok_or_else(|| Violation::NotTemporary(h).into())
    }

    /// Store the finalized node behind `child` at `index` of the array
    /// builder `tmp`.
    pub fn set_value(
        &mut self,
        tmp: Handle,
        index: usize,
        child: Handle,
    ) -> Result<(), BridgeError> {
        let value = self.resolve_child(child)?;
        self.temp_mut(tmp)?.set_value(index, value)?;
        Ok(())
    }

    /// Bind `key` to the finalized node behind `child` on the object builder
    /// `tmp`.
    pub fn set_key_value(
        &mut self,
        tmp: Handle,
        key: &str,
        child: Handle,
    ) -> Result<(), BridgeError> {
        let value = self.resolve_child(child)?;
        self.temp_mut(tmp)?.set_key_value(key, value)?;
        Ok(())
    }

    /// Finalize the builder behind `tmp` and register the result.
    ///
    /// Returns the new node's handle. The builder handle itself is rebound
    /// to the finalized node, so reads through it see the built value.
    /// Building an already built builder, or any finalized handle, returns
    /// [`Handle::NULL`].
    pub fn build(&mut self, tmp: Handle) -> Result<Handle, BridgeError> {
        let Some(builder) = self.lookup_temp_mut(tmp) else {
            if self.lookup_final(tmp).is_some() {
                return Ok(Handle::NULL);
            }
            return Err(Violation::NotTemporary(tmp).into());
        };
        let Some(node) = builder.build() else {
            return Ok(Handle::NULL);
        };
        let built = self.register_final(node.clone());
        self.nodes.insert(tmp, node);
        tracing::trace!(tmp = tmp.raw(), built = built.raw(), "built temporary node");
        Ok(built)
    }

    /// Release every node and builder. Subsequent lookups of earlier handles
    /// miss; handles issued afterwards continue from the same counter.
    pub fn free(&mut self) {
        tracing::debug!(
            nodes = self.nodes.len(),
            tmp = self.tmp.len(),
            "freeing handle table"
        );
        self.nodes = HashMap::new();
        self.tmp = HashMap::new();
    }

    pub fn len_final(&self) -> usize {
        self.nodes.len()
    }

    pub fn len_temp(&self) -> usize {
        self.tmp.len()
    }
}
