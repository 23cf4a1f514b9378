//! `advent-bridge` — host bridge for a sandboxed text-adventure guest.
//!
//! This crate loads a compiled game module into a Wasmtime sandbox and
//! drives it one typed command at a time:
//!
//! - **Guest adapter:** typed calls over the guest's export table, with
//!   mandatory exports checked at load
//! - **Memory bridge:** pointer/length strings across linear memory,
//!   always against a fresh view
//! - **Command loop:** `Idle → Submitted → Dispatching → Rendering → Idle`,
//!   rejecting submissions that arrive mid-command
//! - **Renderer:** an append-only log plus three prompt panels
//!
//! The primary entry point is [`Session`].

pub mod error;
pub mod config;
pub mod memory;
pub mod validation;
pub mod runtime;
pub mod render;
pub mod command_loop;
pub mod session;

pub use error::BridgeError;
pub use config::BridgeConfig;
pub use command_loop::{CommandLoop, LoopState, Submission};
pub use render::{LogCategory, Panel, Renderer, TerminalRenderer, Transcript};
pub use runtime::WasmGuest;
pub use session::Session;
