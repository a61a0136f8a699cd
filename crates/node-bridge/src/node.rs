//! Finalized tree nodes.
//!
//! A [`Node`] is an immutable value of exactly one [`Kind`]. Composite nodes
//! (objects and arrays) live behind an [`Arc`], so cloning a node is cheap
//! and two clones of the same child share one allocation. Identity checks
//! ([`Node::same`]) rely on that sharing.

use std::fmt;
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;

/// The tag distinguishing node variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Object,
    Array,
    String,
    Int,
    Uint,
    Float,
    Bool,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Object => "object",
            Kind::Array => "array",
            Kind::String => "string",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::Bool => "bool",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An immutable string-keyed mapping of child nodes.
///
/// Keys are unique. Entries keep the order they were inserted in, but
/// indexed enumeration goes through [`Object::keys`], which is a sorted
/// snapshot computed on first use and cached for the life of the object.
#[derive(Default)]
pub struct Object {
    entries: IndexMap<String, Node>,
    sorted: OnceLock<Vec<String>>,
}

impl Object {
    pub fn new(entries: IndexMap<String, Node>) -> Self {
        Self {
            entries,
            sorted: OnceLock::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in byte-wise lexicographic order.
    pub fn keys(&self) -> &[String] {
        self.sorted.get_or_init(|| {
            let mut keys: Vec<String> = self.entries.keys().cloned().collect();
            keys.sort_unstable();
            keys
        })
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Node> {
        self.entries.iter()
    }
}

impl FromIterator<(String, Node)> for Object {
    fn from_iter<I: IntoIterator<Item = (String, Node)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|w| v == w))
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

/// A finalized tree node.
#[derive(Debug, Clone, Default)]
pub enum Node {
    #[default]
    Null,
    Object(Arc<Object>),
    Array(Arc<[Node]>),
    String(Arc<str>),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
}

impl Node {
    /// Build an object node from key/value pairs. Later duplicates win.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Node)>,
    {
        Node::Object(Arc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn array<I: IntoIterator<Item = Node>>(items: I) -> Self {
        Node::Array(items.into_iter().collect())
    }

    pub fn kind(&self) -> Kind {
        match self {
            Node::Null => Kind::Null,
            Node::Object(_) => Kind::Object,
            Node::Array(_) => Kind::Array,
            Node::String(_) => Kind::String,
            Node::Int(_) => Kind::Int,
            Node::Uint(_) => Kind::Uint,
            Node::Float(_) => Kind::Float,
            Node::Bool(_) => Kind::Bool,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    /// Number of keys for objects, number of elements for arrays, 0 otherwise.
    pub fn size(&self) -> usize {
        match self {
            Node::Object(obj) => obj.len(),
            Node::Array(arr) => arr.len(),
            _ => 0,
        }
    }

    /// Identity comparison.
    ///
    /// Composites are the same only when they share one allocation; scalars
    /// compare by value, floats bit-for-bit.
    pub fn same(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Null, Node::Null) => true,
            (Node::Object(a), Node::Object(b)) => Arc::ptr_eq(a, b),
            (Node::Array(a), Node::Array(b)) => Arc::ptr_eq(a, b),
            (Node::String(a), Node::String(b)) => a == b,
            (Node::Int(a), Node::Int(b)) => a == b,
            (Node::Uint(a), Node::Uint(b)) => a == b,
            (Node::Float(a), Node::Float(b)) => a.to_bits() == b.to_bits(),
            (Node::Bool(a), Node::Bool(b)) => a == b,
            _ => false,
        }
    }
}

/// Deep value equality. Unlike [`Node::same`], two separately built
/// composites with equal contents compare equal.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Null, Node::Null) => true,
            (Node::Object(a), Node::Object(b)) => Arc::ptr_eq(a, b) || a == b,
            (Node::Array(a), Node::Array(b)) => a == b,
            (Node::String(a), Node::String(b)) => a == b,
            (Node::Int(a), Node::Int(b)) => a == b,
            (Node::Uint(a), Node::Uint(b)) => a == b,
            (Node::Float(a), Node::Float(b)) => a == b,
            (Node::Bool(a), Node::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.into())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s.into())
    }
}

impl From<i64> for Node {
    fn from(v: i64) -> Self {
        Node::Int(v)
    }
}

impl From<u64> for Node {
    fn from(v: u64) -> Self {
        Node::Uint(v)
    }
}

impl From<f64> for Node {
    fn from(v: f64) -> Self {
        Node::Float(v)
    }
}

impl From<bool> for Node {
    fn from(v: bool) -> Self {
        Node::Bool(v)
    }
}

impl From<Object> for Node {
    fn from(obj: Object) -> Self {
        Node::Object(Arc::new(obj))
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::Array(items.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_of_each_variant() {
        assert_eq!(Node::Null.kind(), Kind::Null);
        assert_eq!(Node::object([("a", Node::Null)]).kind(), Kind::Object);
        assert_eq!(Node::array(Vec::new()).kind(), Kind::Array);
        assert_eq!(Node::from("x").kind(), Kind::String);
        assert_eq!(Node::from(-1i64).kind(), Kind::Int);
        assert_eq!(Node::from(1u64).kind(), Kind::Uint);
        assert_eq!(Node::from(0.5).kind(), Kind::Float);
        assert_eq!(Node::from(true).kind(), Kind::Bool);
    }

    #[test]
    fn size_counts_children_only_for_composites() {
        let obj = Node::object([("a", Node::from(1i64)), ("b", Node::Null)]);
        assert_eq!(obj.size(), 2);
        assert_eq!(Node::array([Node::Null, Node::Null, Node::Null]).size(), 3);
        assert_eq!(Node::from("abc").size(), 0);
        assert_eq!(Node::Null.size(), 0);
    }

    #[test]
    fn object_keys_are_sorted_and_cached() {
        let obj: Object = [
            ("zeta".to_string(), Node::Null),
            ("alpha".to_string(), Node::Null),
            ("Mid".to_string(), Node::Null),
        ]
        .into_iter()
        .collect();
        assert_eq!(obj.keys(), ["Mid", "alpha", "zeta"]);
        let first = obj.keys().as_ptr();
        assert_eq!(obj.keys().as_ptr(), first);
        let insertion: Vec<&str> = obj.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(insertion, ["zeta", "alpha", "Mid"]);
    }

    #[test]
    fn duplicate_keys_keep_last_value() {
        let obj = Node::object([("k", Node::from(1i64)), ("k", Node::from(2i64))]);
        let Node::Object(obj) = obj else {
            panic!("expected object");
        };
        assert_eq!(obj.len(), 1);
        assert_eq!(obj.get("k"), Some(&Node::Int(2)));
    }

    #[test]
    fn same_uses_identity_for_composites() {
        let a = Node::array([Node::from(1i64)]);
        let b = Node::array([Node::from(1i64)]);
        assert!(a.same(&a.clone()));
        assert!(!a.same(&b));
        assert_eq!(a, b);

        let o1 = Node::object([("x", Node::Null)]);
        let o2 = Node::object([("x", Node::Null)]);
        assert!(o1.same(&o1.clone()));
        assert!(!o1.same(&o2));
        assert_eq!(o1, o2);
    }

    #[test]
    fn same_uses_value_for_scalars() {
        assert!(Node::from("x").same(&Node::from("x".to_string())));
        assert!(Node::from(3i64).same(&Node::from(3i64)));
        assert!(!Node::from(3i64).same(&Node::from(3u64)));
        assert!(Node::from(f64::NAN).same(&Node::from(f64::NAN)));
        assert!(!Node::from(0.0).same(&Node::from(-0.0)));
        assert!(Node::Null.same(&Node::Null));
    }
}
