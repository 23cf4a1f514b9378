//! Guest-side error types for the adventure host.
//!
//! `GuestError` covers everything that can go wrong while calling through
//! the guest export table or touching its linear memory. Every variant is
//! terminal for the session that produced it; there are no retries.

/// Error raised by a guest call or a guest-memory access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuestError {
    /// An export was called that the guest module does not provide.
    #[error("guest does not export '{0}'")]
    MissingExport(String),

    /// A pointer/length pair fell outside the current linear memory.
    #[error("bad pointer: [{ptr}, +{len}) outside {mem_size}-byte memory")]
    BadPointer {
        /// Offset requested by the caller.
        ptr: i64,
        /// Byte count requested by the caller.
        len: i64,
        /// Size of linear memory at the time of the access.
        mem_size: usize,
    },

    /// The guest trapped while running.
    #[error("guest trapped: {0}")]
    Trap(String),

    /// The per-call instruction budget ran out.
    #[error("guest exhausted its instruction budget")]
    FuelExhausted,
}

impl GuestError {
    /// Create a bad-pointer error for the region `[ptr, ptr+len)`.
    pub fn bad_pointer(ptr: impl Into<i64>, len: impl Into<i64>, mem_size: usize) -> Self {
        Self::BadPointer {
            ptr: ptr.into(),
            len: len.into(),
            mem_size,
        }
    }

    /// Create a missing-export error.
    pub fn missing_export(name: &str) -> Self {
        Self::MissingExport(name.to_owned())
    }
}
