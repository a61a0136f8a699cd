//! Sessions: one handle table plus one error channel, driven call by call
//! from the foreign side.
//!
//! Every method here is a boundary entry point. None of them fail: errors
//! are recorded on the session's [`ErrorChannel`] and the call returns its
//! documented empty value (`Handle::NULL`, `0`, `false`, `""` or `None`).
//! A miss on a read path is the null node and is not an error; a miss on a
//! write path is a contract violation.

use crate::builder::BuilderMode;
use crate::error::{BridgeError, ErrorChannel};
use crate::handle::Handle;
use crate::json;
use crate::node::{Kind, Node};
use crate::options::SessionOptions;
use crate::table::HandleTable;

#[derive(Debug)]
pub struct Session {
    table: HandleTable,
    errors: ErrorChannel,
    options: SessionOptions,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_options(SessionOptions::default())
    }

    pub fn with_options(options: SessionOptions) -> Self {
        tracing::debug!(?options, "opening bridge session");
        Self {
            table: HandleTable::new(),
            errors: ErrorChannel::new(options.violation_policy),
            options,
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn table(&self) -> &HandleTable {
        &self.table
    }

    pub fn errors(&self) -> &ErrorChannel {
        &self.errors
    }

    pub fn last_error(&self) -> Option<&BridgeError> {
        self.errors.last()
    }

    pub fn clear_error(&mut self) {
        self.errors.clear();
    }

    /// Record an error raised by the embedding layer, such as a malformed
    /// argument that never reached the table.
    pub fn report(&mut self, err: BridgeError) {
        self.errors.record(err);
    }

    /// Record `err` unless it is a read-path miss, and fall back to `T`'s
    /// empty value.
    fn read_or_default<T: Default>(&mut self, res: Result<T, BridgeError>) -> T {
        match res {
            Ok(v) => v,
            Err(BridgeError::LookupMiss(_)) => T::default(),
            Err(err) => {
                self.errors.record(err);
                T::default()
            }
        }
    }

    fn write_or_default<T: Default>(&mut self, res: Result<T, BridgeError>) -> T {
        res.unwrap_or_else(|err| {
            self.errors.record(err);
            T::default()
        })
    }

    // Read path.

    pub fn kind(&self, h: Handle) -> Kind {
        self.table.view(h).kind()
    }

    /// The string behind `h`. `None` if `h` does not resolve; an empty
    /// string if it resolves to another kind.
    pub fn as_string(&mut self, h: Handle) -> Option<&str> {
        let view = self.table.view(h);
        match view.try_as_str() {
            Ok(s) => Some(s),
            Err(BridgeError::LookupMiss(_)) => None,
            Err(err) => {
                self.errors.record(err);
                Some("")
            }
        }
    }

    pub fn as_int(&mut self, h: Handle) -> i64 {
        let res = self.table.view(h).try_as_int();
        self.read_or_default(res)
    }

    pub fn as_uint(&mut self, h: Handle) -> u64 {
        let res = self.table.view(h).try_as_uint();
        self.read_or_default(res)
    }

    pub fn as_float(&mut self, h: Handle) -> f64 {
        let res = self.table.view(h).try_as_float();
        self.read_or_default(res)
    }

    pub fn as_bool(&mut self, h: Handle) -> bool {
        let res = self.table.view(h).try_as_bool();
        self.read_or_default(res)
    }

    pub fn size(&self, h: Handle) -> usize {
        self.table.view(h).size()
    }

    /// Key at `index` in the sorted key order of the object behind `h`.
    pub fn key_at(&mut self, h: Handle, index: usize) -> Option<&str> {
        let view = self.table.view(h);
        match view.key_at(index) {
            Ok(key) => Some(key),
            Err(BridgeError::LookupMiss(_)) => None,
            Err(err) => {
                self.errors.record(err);
                None
            }
        }
    }

    /// A fresh handle for the child at `index` of the node behind `h`.
    pub fn value_at(&mut self, h: Handle, index: usize) -> Handle {
        let res = self.table.value_at(h, index);
        self.read_or_default(res)
    }

    /// Whether `a` and `b` view the same underlying node. Handles that do not
    /// resolve, including open builders, read as null and so match
    /// [`Handle::NULL`].
    pub fn same_as(&self, a: Handle, b: Handle) -> bool {
        self.table.view(a).same_as(&self.table.view(b))
    }

    /// A cheap clone of the native node behind `h`.
    pub fn node(&self, h: Handle) -> Option<Node> {
        self.table.lookup_final(h).cloned()
    }

    pub fn to_json(&self, h: Handle) -> Option<String> {
        self.table.lookup_final(h).map(json::to_string)
    }

    // Construction path.

    /// Register an already built native tree.
    pub fn register(&mut self, node: Node) -> Handle {
        self.table.register_final(node)
    }

    pub fn load_json(&mut self, text: &str) -> Handle {
        let res = json::parse(text);
        let node = self.write_or_default(res);
        self.table.register_final(node)
    }

    pub fn new_object(&mut self, capacity_hint: usize) -> Handle {
        let capacity = capacity_hint.min(self.options.max_capacity_hint);
        self.table.register_temp(BuilderMode::Object, capacity)
    }

    pub fn new_array(&mut self, len: usize) -> Handle {
        let max = self.options.max_array_len;
        if len > max {
            self.errors.record(BridgeError::ArrayTooLarge { len, max });
            return Handle::NULL;
        }
        self.table.register_temp(BuilderMode::Array, len)
    }

    pub fn new_string(&mut self, v: &str) -> Handle {
        self.table.register_final(Node::from(v))
    }

    pub fn new_int(&mut self, v: i64) -> Handle {
        self.table.register_final(Node::Int(v))
    }

    pub fn new_uint(&mut self, v: u64) -> Handle {
        self.table.register_final(Node::Uint(v))
    }

    pub fn new_float(&mut self, v: f64) -> Handle {
        self.table.register_final(Node::Float(v))
    }

    pub fn new_bool(&mut self, v: bool) -> Handle {
        self.table.register_final(Node::Bool(v))
    }

    pub fn set_value(&mut self, tmp: Handle, index: usize, value: Handle) {
        let res = self.table.set_value(tmp, index, value);
        self.write_or_default(res)
    }

    pub fn set_key_value(&mut self, tmp: Handle, key: &str, value: Handle) {
        let res = self.table.set_key_value(tmp, key, value);
        self.write_or_default(res)
    }

    pub fn build(&mut self, tmp: Handle) -> Handle {
        let res = self.table.build(tmp);
        self.write_or_default(res)
    }

    /// Release every node and builder of this session. The session stays
    /// usable; earlier handles no longer resolve.
    pub fn free(&mut self) {
        self.table.free();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        tracing::debug!(
            nodes = self.table.len_final(),
            tmp = self.table.len_temp(),
            "closing bridge session"
        );
    }
}
