//! `advent-guestapi` — guest export contract for the adventure host.
//!
//! This crate defines the interface the host bridge drives when running a
//! text-adventure guest module. It provides:
//!
//! - `GuestExports` / `GuestMemory` traits — the guest's export table and
//!   linear memory as a capability interface
//! - `Slot` and `OutputBundle` — the four pointer/length output strings
//! - Export-name constants and the input buffer capacity
//! - `MemGuest` — scripted in-memory guest for testing
//! - `GuestError` — failures raised by guest calls and memory access

pub mod error;
pub mod types;
pub mod traits;
pub mod mem_guest;

// Re-export commonly used types at the crate root.
pub use error::GuestError;
pub use types::{OutputBundle, Slot, INPUT_CAPACITY};
pub use traits::{GuestExports, GuestMemory};
pub use mem_guest::MemGuest;
