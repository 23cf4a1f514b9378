//! Guest export table as a capability interface.
//!
//! The command loop and memory bridge depend only on these traits, so a
//! scripted guest can stand in for a compiled module in tests.
//!
//! Linear memory is exposed as a borrow of the guest. Every export call
//! takes `&mut self`, so a byte view obtained before a call cannot be held
//! across it; callers re-borrow after each call and always see the
//! current buffer, even if the guest grew its memory.

use crate::error::GuestError;
use crate::types::Slot;

/// Host access to the guest's linear memory.
pub trait GuestMemory {
    /// Current contents of linear memory.
    fn view(&self) -> &[u8];

    /// Current contents of linear memory, writable.
    fn view_mut(&mut self) -> &mut [u8];
}

/// Typed calls into the guest's exported function table.
///
/// Implementations do not add logic of their own beyond resolving the
/// export and mapping failures to [`GuestError`].
pub trait GuestExports: GuestMemory {
    /// Whether the guest exports `init`.
    fn has_init(&self) -> bool;

    /// Call `init`. Only meaningful when [`has_init`](Self::has_init) is true.
    fn init(&mut self) -> Result<(), GuestError>;

    /// Call `get_<slot>_ptr`.
    fn slot_ptr(&mut self, slot: Slot) -> Result<i32, GuestError>;

    /// Call `get_<slot>_len`.
    fn slot_len(&mut self, slot: Slot) -> Result<i32, GuestError>;

    /// Call `get_input_ptr`. Must be queried fresh for every command.
    fn input_ptr(&mut self) -> Result<i32, GuestError>;

    /// Call `run_command` with the byte length written at the input buffer.
    fn run_command(&mut self, len: i32) -> Result<(), GuestError>;
}
