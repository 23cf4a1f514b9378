//! Memory bridge: strings across the host/guest linear memory boundary.
//!
//! All functions validate pointer and length arguments against the size of
//! linear memory *as it is now*. Callers pass a fresh borrow of the guest
//! for every access; a view taken before a guest call cannot outlive it,
//! because every guest call needs `&mut` access to the guest.

use advent_guestapi::{GuestError, GuestExports, GuestMemory, OutputBundle, Slot};

/// Result of writing a string into a guest buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Written {
    /// Bytes written, to be passed to the guest out-of-band.
    pub len: usize,
    /// Whether the encoded text was cut to fit the buffer.
    pub truncated: bool,
}

/// Borrow `len` bytes of guest memory at `ptr`.
///
/// Returns `Err(BadPointer)` if the range `[ptr, ptr+len)` is out of bounds.
pub fn read_bytes(mem: &[u8], ptr: i32, len: i32) -> Result<&[u8], GuestError> {
    let (start, end) = checked_range(mem.len(), ptr, len)?;
    Ok(&mem[start..end])
}

/// Write `data` bytes to guest memory at `ptr`.
///
/// Returns `Err(BadPointer)` if the range `[ptr, ptr+data.len())` is out of bounds.
pub fn write_bytes(mem: &mut [u8], ptr: i32, data: &[u8]) -> Result<(), GuestError> {
    let len = i32::try_from(data.len())
        .map_err(|_| GuestError::bad_pointer(ptr, i64::MAX, mem.len()))?;
    let (start, end) = checked_range(mem.len(), ptr, len)?;
    mem[start..end].copy_from_slice(data);
    Ok(())
}

/// Validate that `[ptr, ptr+len)` lies within `mem_size` bytes.
fn checked_range(mem_size: usize, ptr: i32, len: i32) -> Result<(usize, usize), GuestError> {
    if ptr < 0 || len < 0 {
        return Err(GuestError::bad_pointer(ptr, len, mem_size));
    }
    let start = ptr as usize;
    let end = start
        .checked_add(len as usize)
        .ok_or_else(|| GuestError::bad_pointer(ptr, len, mem_size))?;
    if end > mem_size {
        return Err(GuestError::bad_pointer(ptr, len, mem_size));
    }
    Ok((start, end))
}

/// Decode the UTF-8 string at `[ptr, ptr+len)` in the guest's current memory.
///
/// Invalid sequences decode to U+FFFD rather than failing.
pub fn decode_string<M>(mem: &M, ptr: i32, len: i32) -> Result<String, GuestError>
where
    M: GuestMemory + ?Sized,
{
    let bytes = read_bytes(mem.view(), ptr, len)?;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

/// Longest prefix of `text` whose UTF-8 encoding fits in `capacity` bytes
/// without splitting a code point.
pub fn truncate_to_capacity(text: &str, capacity: usize) -> &str {
    if text.len() <= capacity {
        return text;
    }
    let mut end = capacity;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Encode `text` as UTF-8 into the guest buffer at `buffer_ptr`.
///
/// At most `capacity` bytes are written, cut at a code-point boundary. No
/// terminator or padding is written; the returned length travels to the
/// guest separately. A non-positive `capacity` writes nothing.
pub fn encode_and_write<M>(
    mem: &mut M,
    text: &str,
    buffer_ptr: i32,
    capacity: i32,
) -> Result<Written, GuestError>
where
    M: GuestMemory + ?Sized,
{
    if capacity <= 0 {
        return Ok(Written {
            len: 0,
            truncated: !text.is_empty(),
        });
    }

    let view = mem.view_mut();
    // The whole buffer must be addressable, not just the bytes we write.
    checked_range(view.len(), buffer_ptr, capacity)?;

    let fitted = truncate_to_capacity(text, capacity as usize);
    write_bytes(view, buffer_ptr, fitted.as_bytes())?;

    Ok(Written {
        len: fitted.len(),
        truncated: fitted.len() < text.len(),
    })
}

/// Fetch one slot's pointer and length from the guest and decode it.
pub fn read_slot<G>(guest: &mut G, slot: Slot) -> Result<String, GuestError>
where
    G: GuestExports + ?Sized,
{
    let ptr = guest.slot_ptr(slot)?;
    let len = guest.slot_len(slot)?;
    decode_string(&*guest, ptr, len)
}

/// Fetch and decode all four slots of the output bundle.
pub fn read_bundle<G>(guest: &mut G) -> Result<OutputBundle, GuestError>
where
    G: GuestExports + ?Sized,
{
    let mut bundle = OutputBundle::default();
    for slot in Slot::ALL {
        *bundle.slot_mut(slot) = read_slot(guest, slot)?;
    }
    Ok(bundle)
}
