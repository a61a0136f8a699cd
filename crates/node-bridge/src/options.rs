//! Per-session configuration.

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// What a session does when the foreign caller breaks the builder protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationPolicy {
    /// Record the violation on the error channel and return the empty
    /// sentinel. Table state is left untouched.
    #[default]
    Report,
    /// Log the violation and abort the process.
    Abort,
}

/// Limits and policies applied by a [`Session`](crate::Session).
///
/// ```
/// use node_bridge::{SessionOptions, ViolationPolicy};
///
/// let opts = SessionOptions::from_json(r#"{"violation_policy":"abort"}"#).unwrap();
/// assert_eq!(opts.violation_policy, ViolationPolicy::Abort);
/// assert_eq!(opts.max_array_len, SessionOptions::default().max_array_len);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    pub violation_policy: ViolationPolicy,
    /// Largest length accepted by `new_array`.
    pub max_array_len: usize,
    /// Upper bound on the preallocation done for an object capacity hint.
    pub max_capacity_hint: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            violation_policy: ViolationPolicy::Report,
            max_array_len: 1 << 24,
            max_capacity_hint: 4096,
        }
    }
}

impl SessionOptions {
    pub fn from_json(json: &str) -> Result<Self, BridgeError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
