//! Address and build tree nodes through opaque integer handles.
//!
//! A caller on the far side of a foreign-function boundary cannot hold
//! references into the tree, only integers. This crate owns the mapping from
//! those integers to nodes:
//!
//! - [`HandleTable`] allocates handles and owns finalized [`Node`]s and
//!   in-progress [`TmpNode`] builders.
//! - [`NodeView`] is a read-only view over a finalized node.
//! - [`Session`] bundles one table with one [`ErrorChannel`] and exposes the
//!   boundary entry points, which never fail but record errors instead.
//!
//! # Example
//!
//! ```
//! use node_bridge::{Kind, Session};
//!
//! let mut s = Session::new();
//! let arr = s.new_array(2);
//! let one = s.new_int(1);
//! let two = s.new_int(2);
//! s.set_value(arr, 0, one);
//! s.set_value(arr, 1, two);
//! let built = s.build(arr);
//!
//! assert_eq!(s.kind(built), Kind::Array);
//! assert_eq!(s.size(built), 2);
//! let second = s.value_at(built, 1);
//! assert_eq!(s.as_int(second), 2);
//! ```

pub mod builder;
pub mod error;
pub mod handle;
pub mod json;
pub mod node;
pub mod options;
pub mod session;
pub mod table;
pub mod view;

pub use builder::{BuilderMode, TmpNode};
pub use error::{BridgeError, ErrorChannel, Violation};
pub use handle::Handle;
pub use node::{Kind, Node, Object};
pub use options::{SessionOptions, ViolationPolicy};
pub use session::Session;
pub use table::HandleTable;
pub use view::NodeView;
