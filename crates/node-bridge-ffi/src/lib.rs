//! C ABI for `node-bridge`.
//!
//! Every entry point takes the session pointer as its first argument and
//! exchanges only handles and primitives. Nothing here unwinds or returns an
//! error code: failures are recorded on the session's error channel and the
//! call returns its empty value (`0`, `NULL`, `false`). A `NULL` session
//! pointer yields the same empty values.
//!
//! Strings returned by this library are owned by the caller and must be
//! released with [`nb_string_free`].
//!
//! # Usage precondition
//!
//! A session is not thread-safe. The embedder must serialize every call that
//! passes the same session pointer, including [`nb_free_nodes`] and
//! [`nb_session_free`].

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use node_bridge::{BridgeError, Handle, Kind, Session, SessionOptions};

pub type NodeHandle = u64;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Null = 0,
    Object = 1,
    Array = 2,
    String = 3,
    Int = 4,
    Uint = 5,
    Float = 6,
    Bool = 7,
}

impl From<Kind> for NodeKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Null => NodeKind::Null,
            Kind::Object => NodeKind::Object,
            Kind::Array => NodeKind::Array,
            Kind::String => NodeKind::String,
            Kind::Int => NodeKind::Int,
            Kind::Uint => NodeKind::Uint,
            Kind::Float => NodeKind::Float,
            Kind::Bool => NodeKind::Bool,
        }
    }
}

// ── Marshaling helpers ───────────────────────────────────────────────────────

unsafe fn session<'a>(ctx: *mut Session) -> Option<&'a mut Session> {
    let s = ctx.as_mut();
    if s.is_none() {
        tracing::debug!(error = %BridgeError::MissingSession, "bridge call ignored");
    }
    s
}

unsafe fn read_c_str<'a>(ptr: *const c_char) -> Result<&'a str, BridgeError> {
    if ptr.is_null() {
        return Err(BridgeError::InvalidInput("null string pointer".into()));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|e| BridgeError::InvalidInput(format!("string is not UTF-8: {e}")))
}

/// Copy `s` into a caller-owned C string, cut at the first interior NUL.
fn to_c_string(s: &str) -> *mut c_char {
    let end = s.find('\0').unwrap_or(s.len());
    CString::new(&s[..end]).map_or(ptr::null_mut(), CString::into_raw)
}

fn handle(raw: NodeHandle) -> Handle {
    Handle::from_raw(raw)
}

// ── Session lifecycle ────────────────────────────────────────────────────────

/// Open a session with default options.
#[no_mangle]
pub extern "C" fn nb_session_new() -> *mut Session {
    Box::into_raw(Box::new(Session::new()))
}

/// Open a session configured from a JSON options document. Returns `NULL`
/// if the options do not parse.
///
/// # Safety
/// `options_json` must be `NULL` or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn nb_session_new_with_options(
    options_json: *const c_char,
) -> *mut Session {
    let options = read_c_str(options_json).and_then(SessionOptions::from_json);
    match options {
        Ok(options) => Box::into_raw(Box::new(Session::with_options(options))),
        Err(err) => {
            tracing::warn!(error = %err, "rejecting session options");
            ptr::null_mut()
        }
    }
}

/// Close a session, releasing every node it owns.
///
/// # Safety
/// `ctx` must be `NULL` or a pointer returned by `nb_session_new*` that has
/// not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn nb_session_free(ctx: *mut Session) {
    if !ctx.is_null() {
        drop(Box::from_raw(ctx));
    }
}

/// Release every node and builder of the session. Earlier handles stop
/// resolving; the session stays open.
///
/// # Safety
/// `ctx` must be `NULL` or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn nb_free_nodes(ctx: *mut Session) {
    if let Some(s) = session(ctx) {
        s.free();
    }
}

/// Release a string returned by this library.
///
/// # Safety
/// `s` must be `NULL` or a string returned by this library that has not been
/// freed yet.
#[no_mangle]
pub unsafe extern "C" fn nb_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

// ── Error channel ────────────────────────────────────────────────────────────

/// The last recorded error message, or `NULL` if there is none.
///
/// # Safety
/// `ctx` must be `NULL` or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn nb_last_error(ctx: *mut Session) -> *mut c_char {
    match session(ctx).and_then(|s| s.last_error()) {
        Some(err) => to_c_string(&err.to_string()),
        None => ptr::null_mut(),
    }
}

/// # Safety
/// `ctx` must be `NULL` or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn nb_has_error(ctx: *mut Session) -> bool {
    session(ctx).is_some_and(|s| s.last_error().is_some())
}

/// # Safety
/// `ctx` must be `NULL` or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn nb_clear_error(ctx: *mut Session) {
    if let Some(s) = session(ctx) {
        s.clear_error();
    }
}

// ── Read path ────────────────────────────────────────────────────────────────

/// # Safety
/// `ctx` must be `NULL` or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn nb_kind(ctx: *mut Session, node: NodeHandle) -> NodeKind {
    session(ctx).map_or(NodeKind::Null, |s| s.kind(handle(node)).into())
}

/// The string value of `node`: `NULL` if the handle does not resolve, an
/// empty string if it is not a string node.
///
/// # Safety
/// `ctx` must be `NULL` or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn nb_as_string(ctx: *mut Session, node: NodeHandle) -> *mut c_char {
    match session(ctx).and_then(|s| s.as_string(handle(node))) {
        Some(v) => to_c_string(v),
        None => ptr::null_mut(),
    }
}

/// # Safety
/// `ctx` must be `NULL` or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn nb_as_int(ctx: *mut Session, node: NodeHandle) -> i64 {
    session(ctx).map_or(0, |s| s.as_int(handle(node)))
}

/// # Safety
/// `ctx` must be `NULL` or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn nb_as_uint(ctx: *mut Session, node: NodeHandle) -> u64 {
    session(ctx).map_or(0, |s| s.as_uint(handle(node)))
}

/// # Safety
/// `ctx` must be `NULL` or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn nb_as_float(ctx: *mut Session, node: NodeHandle) -> f64 {
    session(ctx).map_or(0.0, |s| s.as_float(handle(node)))
}

/// # Safety
/// `ctx` must be `NULL` or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn nb_as_bool(ctx: *mut Session, node: NodeHandle) -> bool {
    session(ctx).is_some_and(|s| s.as_bool(handle(node)))
}

/// # Safety
/// `ctx` must be `NULL` or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn nb_size(ctx: *mut Session, node: NodeHandle) -> usize {
    session(ctx).map_or(0, |s| s.size(handle(node)))
}

/// # Safety
/// `ctx` must be `NULL` or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn nb_key_at(
    ctx: *mut Session,
    node: NodeHandle,
    index: usize,
) -> *mut c_char {
    match session(ctx).and_then(|s| s.key_at(handle(node), index)) {
        Some(key) => to_c_string(key),
        None => ptr::null_mut(),
    }
}

/// # Safety
/// `ctx` must be `NULL` or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn nb_value_at(
    ctx: *mut Session,
    node: NodeHandle,
    index: usize,
) -> NodeHandle {
    session(ctx).map_or(0, |s| s.value_at(handle(node), index).raw())
}

/// Whether two handles view the same underlying node.
///
/// Handles that do not resolve (unknown, freed, or an unbuilt builder) read
/// as null, so they compare the same as handle `0` and as each other.
///
/// # Safety
/// `ctx` must be `NULL` or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn nb_same_as(ctx: *mut Session, a: NodeHandle, b: NodeHandle) -> bool {
    session(ctx).is_some_and(|s| s.same_as(handle(a), handle(b)))
}

/// Serialize the node behind `node` as JSON. `NULL` if it does not resolve.
///
/// # Safety
/// `ctx` must be `NULL` or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn nb_to_json(ctx: *mut Session, node: NodeHandle) -> *mut c_char {
    match session(ctx).and_then(|s| s.to_json(handle(node))) {
        Some(json) => to_c_string(&json),
        None => ptr::null_mut(),
    }
}

// ── Construction path ────────────────────────────────────────────────────────

/// Parse a JSON document into a finalized tree.
///
/// # Safety
/// `ctx` must be `NULL` or a live session pointer; `json` must be `NULL` or a
/// valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn nb_load_json(ctx: *mut Session, json: *const c_char) -> NodeHandle {
    let Some(s) = session(ctx) else {
        return 0;
    };
    match read_c_str(json) {
        Ok(text) => s.load_json(text).raw(),
        Err(err) => {
            s.report(err);
            0
        }
    }
}

/// Start an object builder. `capacity_hint` only sizes the preallocation.
///
/// # Safety
/// `ctx` must be `NULL` or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn nb_new_object(ctx: *mut Session, capacity_hint: usize) -> NodeHandle {
    session(ctx).map_or(0, |s| s.new_object(capacity_hint).raw())
}

/// Start an array builder with exactly `len` slots.
///
/// # Safety
/// `ctx` must be `NULL` or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn nb_new_array(ctx: *mut Session, len: usize) -> NodeHandle {
    session(ctx).map_or(0, |s| s.new_array(len).raw())
}

/// # Safety
/// `ctx` must be `NULL` or a live session pointer; `v` must be `NULL` or a
/// valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn nb_new_string(ctx: *mut Session, v: *const c_char) -> NodeHandle {
    let Some(s) = session(ctx) else {
        return 0;
    };
    match read_c_str(v) {
        Ok(v) => s.new_string(v).raw(),
        Err(err) => {
            s.report(err);
            0
        }
    }
}

/// # Safety
/// `ctx` must be `NULL` or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn nb_new_int(ctx: *mut Session, v: i64) -> NodeHandle {
    session(ctx).map_or(0, |s| s.new_int(v).raw())
}

/// # Safety
/// `ctx` must be `NULL` or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn nb_new_uint(ctx: *mut Session, v: u64) -> NodeHandle {
    session(ctx).map_or(0, |s| s.new_uint(v).raw())
}

/// # Safety
/// `ctx` must be `NULL` or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn nb_new_float(ctx: *mut Session, v: f64) -> NodeHandle {
    session(ctx).map_or(0, |s| s.new_float(v).raw())
}

/// # Safety
/// `ctx` must be `NULL` or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn nb_new_bool(ctx: *mut Session, v: bool) -> NodeHandle {
    session(ctx).map_or(0, |s| s.new_bool(v).raw())
}

/// Store `value` at `index` of the array builder `node`.
///
/// # Safety
/// `ctx` must be `NULL` or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn nb_set_value(
    ctx: *mut Session,
    node: NodeHandle,
    index: usize,
    value: NodeHandle,
) {
    if let Some(s) = session(ctx) {
        s.set_value(handle(node), index, handle(value));
    }
}

/// Bind `key` to `value` on the object builder `node`.
///
/// # Safety
/// `ctx` must be `NULL` or a live session pointer; `key` must be `NULL` or a
/// valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn nb_set_key_value(
    ctx: *mut Session,
    node: NodeHandle,
    key: *const c_char,
    value: NodeHandle,
) {
    let Some(s) = session(ctx) else {
        return;
    };
    match read_c_str(key) {
        Ok(key) => s.set_key_value(handle(node), key, handle(value)),
        Err(err) => s.report(err),
    }
}

/// Finalize the builder `node`. Returns the finalized node's handle, or `0`
/// if `node` was already built.
///
/// # Safety
/// `ctx` must be `NULL` or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn nb_build(ctx: *mut Session, node: NodeHandle) -> NodeHandle {
    session(ctx).map_or(0, |s| s.build(handle(node)).raw())
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe fn take_string(s: *mut c_char) -> Option<String> {
        if s.is_null() {
            return None;
        }
        let out = CStr::from_ptr(s).to_string_lossy().into_owned();
        nb_string_free(s);
        Some(out)
    }

    #[test]
    fn ffi_null_session_returns_empty_values() {
        let ctx = ptr::null_mut();
        unsafe {
            assert_eq!(nb_kind(ctx, 1), NodeKind::Null);
            assert!(nb_as_string(ctx, 1).is_null());
            assert_eq!(nb_as_int(ctx, 1), 0);
            assert!(!nb_as_bool(ctx, 1));
            assert_eq!(nb_size(ctx, 1), 0);
            assert!(nb_key_at(ctx, 1, 0).is_null());
            assert_eq!(nb_value_at(ctx, 1, 0), 0);
            assert_eq!(nb_new_array(ctx, 3), 0);
            assert_eq!(nb_new_int(ctx, 3), 0);
            assert_eq!(nb_build(ctx, 1), 0);
            nb_set_value(ctx, 1, 0, 2);
            assert!(nb_last_error(ctx).is_null());
            assert!(!nb_has_error(ctx));
            nb_free_nodes(ctx);
            nb_session_free(ctx);
        }
    }

    #[test]
    fn ffi_build_object_and_read_back() {
        unsafe {
            let ctx = nb_session_new();
            let obj = nb_new_object(ctx, 2);
            let name = CString::new("name").unwrap();
            let value = CString::new("File").unwrap();
            let v = nb_new_string(ctx, value.as_ptr());
            nb_set_key_value(ctx, obj, name.as_ptr(), v);
            let count = CString::new("count").unwrap();
            let n = nb_new_uint(ctx, 42);
            nb_set_key_value(ctx, obj, count.as_ptr(), n);
            let built = nb_build(ctx, obj);

            assert_eq!(nb_kind(ctx, built), NodeKind::Object);
            assert_eq!(nb_size(ctx, built), 2);
            assert_eq!(take_string(nb_key_at(ctx, built, 0)).as_deref(), Some("count"));
            assert_eq!(take_string(nb_key_at(ctx, built, 1)).as_deref(), Some("name"));
            let first = nb_value_at(ctx, built, 0);
            assert_eq!(nb_as_uint(ctx, first), 42);
            let second = nb_value_at(ctx, built, 1);
            assert_eq!(take_string(nb_as_string(ctx, second)).as_deref(), Some("File"));
            assert!(!nb_has_error(ctx));

            assert_eq!(nb_build(ctx, obj), 0);
            nb_session_free(ctx);
        }
    }

    #[test]
    fn ffi_errors_reach_the_channel() {
        unsafe {
            let ctx = nb_session_new();
            let arr = nb_load_json(ctx, c"[1,2,3]".as_ptr());
            assert_eq!(nb_value_at(ctx, arr, 5), 0);
            assert!(nb_has_error(ctx));
            assert_eq!(
                take_string(nb_last_error(ctx)).as_deref(),
                Some("index out of bounds: 5, 3")
            );
            nb_clear_error(ctx);
            assert!(nb_last_error(ctx).is_null());

            let one = nb_value_at(ctx, arr, 0);
            assert_eq!(take_string(nb_as_string(ctx, one)).as_deref(), Some(""));
            assert!(nb_has_error(ctx));

            nb_set_key_value(ctx, arr, ptr::null(), 0);
            assert_eq!(
                take_string(nb_last_error(ctx)).as_deref(),
                Some("invalid input: null string pointer")
            );
            nb_session_free(ctx);
        }
    }

    #[test]
    fn ffi_identity_and_free() {
        unsafe {
            let ctx = nb_session_new();
            let root = nb_load_json(ctx, c"{\"a\":[true]}".as_ptr());
            let a1 = nb_value_at(ctx, root, 0);
            let a2 = nb_value_at(ctx, root, 0);
            assert_ne!(a1, a2);
            assert!(nb_same_as(ctx, a1, a2));
            assert!(nb_same_as(ctx, 999, 0));
            assert!(!nb_same_as(ctx, a1, 0));
            assert_eq!(take_string(nb_to_json(ctx, a1)).as_deref(), Some("[true]"));

            nb_free_nodes(ctx);
            assert_eq!(nb_kind(ctx, root), NodeKind::Null);
            assert!(nb_to_json(ctx, a1).is_null());
            let fresh = nb_new_bool(ctx, true);
            assert!(fresh > a2);
            assert!(nb_as_bool(ctx, fresh));
            nb_session_free(ctx);
        }
    }

    #[test]
    fn ffi_session_options() {
        unsafe {
            let ctx = nb_session_new_with_options(c"{\"max_array_len\":2}".as_ptr());
            assert!(!ctx.is_null());
            assert_eq!(nb_new_array(ctx, 3), 0);
            assert!(nb_has_error(ctx));
            assert_ne!(nb_new_array(ctx, 2), 0);
            nb_session_free(ctx);

            assert!(nb_session_new_with_options(c"not json".as_ptr()).is_null());
            assert!(nb_session_new_with_options(ptr::null()).is_null());
        }
    }

    #[test]
    fn ffi_strings_are_cut_at_interior_nul() {
        unsafe {
            let ctx = nb_session_new();
            let h = (*ctx).new_string("ab\0cd");
            assert_eq!(take_string(nb_as_string(ctx, h.raw())).as_deref(), Some("ab"));
            nb_session_free(ctx);
        }
    }
}
