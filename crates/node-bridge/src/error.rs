//! Error taxonomy and the per-session last-error channel.

use thiserror::Error;

use crate::builder::BuilderMode;
use crate::handle::Handle;
use crate::node::Kind;
use crate::options::ViolationPolicy;

/// Breaches of the builder protocol. These indicate a bug in the foreign
/// caller rather than a data condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("{expected} builder required, got {actual} builder")]
    WrongMode {
        expected: BuilderMode,
        actual: BuilderMode,
    },
    #[error("builder was already built")]
    AlreadyBuilt,
    #[error("index {index} is beyond the declared array length {len}")]
    IndexBeyondLength { index: usize, len: usize },
    #[error("handle {0} is not a temporary node")]
    NotTemporary(Handle),
    #[error("child handle {0} does not resolve to a finalized node")]
    UnresolvedChild(Handle),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    #[error("handle {0} does not resolve to a node")]
    LookupMiss(Handle),
    #[error("expected {expected}, got: {actual}")]
    KindMismatch { expected: Kind, actual: Kind },
    #[error("expected object or array, got: {0}")]
    NotContainer(Kind),
    #[error("index out of bounds: {index}, {size}")]
    IndexOutOfRange { index: usize, size: usize },
    #[error("cannot fetch key: {0:?}")]
    MissingKey(String),
    #[error("contract violation: {0}")]
    ContractViolation(#[from] Violation),
    #[error("array length {len} exceeds the configured maximum of {max}")]
    ArrayTooLarge { len: usize, max: usize },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no session context")]
    MissingSession,
}

impl BridgeError {
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, BridgeError::ContractViolation(_))
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::InvalidInput(err.to_string())
    }
}

/// Last-error sink for one session. The newest error overwrites the
/// previous one; the foreign side inspects it after a suspicious return.
#[derive(Debug, Default)]
pub struct ErrorChannel {
    last: Option<BridgeError>,
    policy: ViolationPolicy,
}

impl ErrorChannel {
    pub fn new(policy: ViolationPolicy) -> Self {
        Self { last: None, policy }
    }

    /// Store `err` as the last error.
    ///
    /// Under [`ViolationPolicy::Abort`] a contract violation terminates the
    /// process instead.
    pub fn record(&mut self, err: BridgeError) {
        if err.is_contract_violation() && self.policy == ViolationPolicy::Abort {
            tracing::error!(error = %err, "aborting on contract violation");
            std::process::abort();
        }
        tracing::warn!(error = %err, "bridge call failed");
        self.last = Some(err);
    }

    pub fn last(&self) -> Option<&BridgeError> {
        self.last.as_ref()
    }

    pub fn take(&mut self) -> Option<BridgeError> {
        self.last.take()
    }

    pub fn clear(&mut self) {
        self.last = None;
    }

    pub fn is_set(&self) -> bool {
        self.last.is_some()
    }
}
