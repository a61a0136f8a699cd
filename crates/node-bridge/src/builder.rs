//! Temporary nodes: mutable objects and arrays under construction by the
//! foreign caller.
//!
//! A [`TmpNode`] is created in one [`BuilderMode`] and stays in it. It moves
//! from open to built exactly once, in [`TmpNode::build`]; any mutation after
//! that is a [`Violation`].

use std::fmt;

use indexmap::IndexMap;

use crate::error::Violation;
use crate::node::{Node, Object};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderMode {
    Object,
    Array,
}

impl fmt::Display for BuilderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BuilderMode::Object => "object",
            BuilderMode::Array => "array",
        })
    }
}

#[derive(Debug)]
enum Staged {
    Object(IndexMap<String, Node>),
    Array(Vec<Node>),
}

#[derive(Debug)]
pub struct TmpNode {
    mode: BuilderMode,
    /// `None` once built.
    staged: Option<Staged>,
}

impl TmpNode {
    /// An object builder. `capacity` is only a preallocation hint.
    pub fn object(capacity: usize) -> Self {
        Self {
            mode: BuilderMode::Object,
            staged: Some(Staged::Object(IndexMap::with_capacity(capacity))),
        }
    }

    /// An array builder with `len` slots, all initially null.
    pub fn array(len: usize) -> Self {
        Self {
            mode: BuilderMode::Array,
            staged: Some(Staged::Array(vec![Node::Null; len])),
        }
    }

    pub fn mode(&self) -> BuilderMode {
        self.mode
    }

    pub fn is_built(&self) -> bool {
        self.staged.is_none()
    }

    /// Number of staged entries (object) or declared slots (array).
    pub fn len(&self) -> usize {
        match &self.staged {
            Some(Staged::Object(entries)) => entries.len(),
            Some(Staged::Array(items)) => items.len(),
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store `value` at `index` of an array builder. Last write wins.
    pub fn set_value(&mut self, index: usize, value: Node) -> Result<(), Violation> {
        match &mut self.staged {
            None => Err(Violation::AlreadyBuilt),
            Some(Staged::Object(_)) => Err(Violation::WrongMode {
                expected: BuilderMode::Array,
                actual: BuilderMode::Object,
            }),
            Some(Staged::Array(items)) => {
                let len = items.len();
                let slot = items
                    .get_mut(index)
                    .ok_or(Violation::IndexBeyondLength { index, len })?;
                *slot = value;
                Ok(())
            }
        }
    }

    /// Bind `key` to `value` on an object builder. Last write wins; a null
    /// value is stored explicitly.
    pub fn set_key_value(&mut self, key: impl Into<String>, value: Node) -> Result<(), Violation> {
        match &mut self.staged {
            None => Err(Violation::AlreadyBuilt),
            Some(Staged::Array(_)) => Err(Violation::WrongMode {
                expected: BuilderMode::Object,
                actual: BuilderMode::Array,
            }),
            Some(Staged::Object(entries)) => {
                entries.insert(key.into(), value);
                Ok(())
            }
        }
    }

    /// Consume the staged data into a finalized node. Returns `None` if the
    /// builder was already built.
    pub fn build(&mut self) -> Option<Node> {
        match self.staged.take()? {
            Staged::Object(entries) => Some(Object::new(entries).into()),
            Staged::Array(items) => Some(items.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_builder_fills_slots() {
        let mut tmp = TmpNode::array(3);
        assert_eq!(tmp.mode(), BuilderMode::Array);
        tmp.set_value(2, Node::from(3i64)).unwrap();
        tmp.set_value(0, Node::from(1i64)).unwrap();
        tmp.set_value(0, Node::from(10i64)).unwrap();
        let node = tmp.build().unwrap();
        assert_eq!(
            node,
            Node::array([Node::Int(10), Node::Null, Node::Int(3)])
        );
    }

    #[test]
    fn array_builder_rejects_out_of_range_index() {
        let mut tmp = TmpNode::array(2);
        assert_eq!(
            tmp.set_value(2, Node::Null),
            Err(Violation::IndexBeyondLength { index: 2, len: 2 })
        );
    }

    #[test]
    fn object_builder_stores_explicit_null() {
        let mut tmp = TmpNode::object(1);
        tmp.set_key_value("a", Node::Null).unwrap();
        tmp.set_key_value("b", Node::from(true)).unwrap();
        tmp.set_key_value("b", Node::from(false)).unwrap();
        assert_eq!(tmp.len(), 2);
        let Some(Node::Object(obj)) = tmp.build() else {
            panic!("expected object");
        };
        assert!(obj.contains_key("a"));
        assert_eq!(obj.get("a"), Some(&Node::Null));
        assert_eq!(obj.get("b"), Some(&Node::Bool(false)));
    }

    #[test]
    fn object_capacity_is_only_a_hint() {
        let mut tmp = TmpNode::object(0);
        for i in 0..8 {
            tmp.set_key_value(format!("k{i}"), Node::from(i as i64)).unwrap();
        }
        assert_eq!(tmp.build().unwrap().size(), 8);
    }

    #[test]
    fn modes_are_fixed() {
        let mut arr = TmpNode::array(1);
        assert_eq!(
            arr.set_key_value("a", Node::Null),
            Err(Violation::WrongMode {
                expected: BuilderMode::Object,
                actual: BuilderMode::Array,
            })
        );
        let mut obj = TmpNode::object(1);
        assert_eq!(
            obj.set_value(0, Node::Null),
            Err(Violation::WrongMode {
                expected: BuilderMode::Array,
                actual: BuilderMode::Object,
            })
        );
    }

    #[test]
    fn build_is_terminal() {
        let mut tmp = TmpNode::object(0);
        assert!(tmp.build().is_some());
        assert!(tmp.is_built());
        assert!(tmp.build().is_none());
        assert_eq!(
            tmp.set_key_value("a", Node::Null),
            Err(Violation::AlreadyBuilt)
        );
        assert_eq!(tmp.set_value(0, Node::Null), Err(Violation::AlreadyBuilt));
    }
}
