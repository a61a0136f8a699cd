//! Opaque node handles shared with the foreign side.

use std::fmt;

/// Opaque integer naming a finalized node or a temporary builder within one
/// [`HandleTable`](crate::HandleTable).
///
/// Handles are plain copyable values; they carry no ownership. `0` is
/// reserved and always means "no node".
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Handle(u64);

impl Handle {
    /// The reserved null handle.
    pub const NULL: Handle = Handle(0);

    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for Handle {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<Handle> for u64 {
    fn from(h: Handle) -> Self {
        h.0
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.0)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
