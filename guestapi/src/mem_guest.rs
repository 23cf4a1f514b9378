//! Scripted in-memory guest for testing.
//!
//! `MemGuest` implements [`GuestExports`] over a plain `Vec<u8>` linear
//! memory. A responder closure plays the part of the game: it receives
//! each decoded command and returns the bundle to publish. The guest lays
//! the bundle out in its own memory and hands back pointer/length pairs,
//! exactly as a compiled module would, so host code is exercised through
//! the same memory protocol.
//!
//! Knobs simulate the awkward parts of a real guest: memory growth that
//! relocates the output strings, an input buffer that moves between
//! commands, missing optional exports, and traps.

use std::collections::BTreeSet;

use crate::error::GuestError;
use crate::traits::{GuestExports, GuestMemory};
use crate::types::{OutputBundle, Slot, EXPORT_INIT, INPUT_CAPACITY};

const PAGE_SIZE: usize = 65_536;

/// Where published strings start when memory is not grown per command.
const PUBLISH_BASE: usize = 1024;

/// Callback producing the guest's reply to one command.
pub type Responder = Box<dyn FnMut(&str) -> OutputBundle>;

/// In-memory guest driven by a [`Responder`].
pub struct MemGuest {
    memory: Vec<u8>,
    input_ptr: usize,
    published: [(i32, i32); 4],
    responder: Responder,
    init_bundle: Option<OutputBundle>,
    missing: BTreeSet<Slot>,
    trap_on: Option<String>,
    grow_on_command: bool,
    relocate_input: bool,
    received: Vec<Vec<u8>>,
    input_ptr_queries: usize,
}

impl MemGuest {
    /// Create a guest with one page of memory and no `init` export.
    pub fn new(responder: impl FnMut(&str) -> OutputBundle + 'static) -> Self {
        Self {
            memory: vec![0; PAGE_SIZE],
            input_ptr: 0,
            published: [(0, 0); 4],
            responder: Box::new(responder),
            init_bundle: None,
            missing: BTreeSet::new(),
            trap_on: None,
            grow_on_command: false,
            relocate_input: false,
            received: Vec::new(),
            input_ptr_queries: 0,
        }
    }

    /// A guest that answers every command with the same bundle.
    pub fn fixed(bundle: OutputBundle) -> Self {
        Self::new(move |_| bundle.clone())
    }

    /// A guest whose narrative output repeats the command it received.
    pub fn echo() -> Self {
        Self::new(|cmd| OutputBundle {
            output: cmd.to_owned(),
            ..OutputBundle::default()
        })
    }

    /// Export `init`, publishing `bundle` when it is called.
    pub fn with_init(mut self, bundle: OutputBundle) -> Self {
        self.init_bundle = Some(bundle);
        self
    }

    /// Drop both exports for `slot`.
    pub fn without(mut self, slot: Slot) -> Self {
        self.missing.insert(slot);
        self
    }

    /// Trap inside `run_command` when the decoded command equals `command`.
    pub fn trapping_on(mut self, command: &str) -> Self {
        self.trap_on = Some(command.to_owned());
        self
    }

    /// Grow memory by one page on every command and publish into the new page.
    pub fn growing(mut self) -> Self {
        self.grow_on_command = true;
        self
    }

    /// Move the input buffer to a different address after every command.
    pub fn relocating_input(mut self) -> Self {
        self.relocate_input = true;
        self
    }

    /// Raw input bytes seen by each `run_command` call, in order.
    pub fn received(&self) -> &[Vec<u8>] {
        &self.received
    }

    /// Lengths passed to each `run_command` call, in order.
    pub fn received_lengths(&self) -> Vec<usize> {
        self.received.iter().map(Vec::len).collect()
    }

    /// How many times `get_input_ptr` was called.
    pub fn input_ptr_queries(&self) -> usize {
        self.input_ptr_queries
    }

    /// Current linear memory size in bytes.
    pub fn memory_size(&self) -> usize {
        self.memory.len()
    }

    /// Lay `bundle` out in memory and record the slot addresses.
    fn publish(&mut self, bundle: &OutputBundle) {
        let mut cursor = if self.grow_on_command {
            let base = self.memory.len();
            self.memory.resize(base + PAGE_SIZE, 0);
            base
        } else {
            PUBLISH_BASE
        };

        for (i, slot) in Slot::ALL.into_iter().enumerate() {
            let bytes = bundle.get(slot).as_bytes();
            let end = cursor + bytes.len();
            if end > self.memory.len() {
                self.memory.resize(end, 0);
            }
            self.memory[cursor..end].copy_from_slice(bytes);
            self.published[i] = (cursor as i32, bytes.len() as i32);
            cursor = end;
        }
    }

    fn slot_index(&self, slot: Slot, export: &str) -> Result<usize, GuestError> {
        if self.missing.contains(&slot) {
            return Err(GuestError::missing_export(export));
        }
        // `Slot::ALL` lists variants in declaration order.
        Ok(slot as usize)
    }
}

impl GuestMemory for MemGuest {
    fn view(&self) -> &[u8] {
        &self.memory
    }

    fn view_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }
}

impl GuestExports for MemGuest {
    fn has_init(&self) -> bool {
        self.init_bundle.is_some()
    }

    fn init(&mut self) -> Result<(), GuestError> {
        let bundle = self
            .init_bundle
            .clone()
            .ok_or_else(|| GuestError::missing_export(EXPORT_INIT))?;
        self.publish(&bundle);
        Ok(())
    }

    fn slot_ptr(&mut self, slot: Slot) -> Result<i32, GuestError> {
        let i = self.slot_index(slot, slot.ptr_export())?;
        Ok(self.published[i].0)
    }

    fn slot_len(&mut self, slot: Slot) -> Result<i32, GuestError> {
        let i = self.slot_index(slot, slot.len_export())?;
        Ok(self.published[i].1)
    }

    fn input_ptr(&mut self) -> Result<i32, GuestError> {
        self.input_ptr_queries += 1;
        Ok(self.input_ptr as i32)
    }

    fn run_command(&mut self, len: i32) -> Result<(), GuestError> {
        if len < 0 || len as usize > INPUT_CAPACITY {
            return Err(GuestError::Trap(format!(
                "input length {} outside buffer capacity {}",
                len, INPUT_CAPACITY
            )));
        }
        let start = self.input_ptr;
        let raw = self.memory[start..start + len as usize].to_vec();
        let command = String::from_utf8_lossy(&raw).into_owned();
        self.received.push(raw);

        if self.trap_on.as_deref() == Some(command.as_str()) {
            return Err(GuestError::Trap("unreachable".into()));
        }

        let bundle = (self.responder)(&command);
        self.publish(&bundle);

        if self.relocate_input {
            self.input_ptr = (self.input_ptr + INPUT_CAPACITY) % (PUBLISH_BASE - INPUT_CAPACITY);
        }
        Ok(())
    }
}
