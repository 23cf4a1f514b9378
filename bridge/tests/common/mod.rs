//! Shared test helpers for integration tests.
//!
//! Provides inline WAT guest modules and session factories used across all
//! integration test files. Guests are compiled by wasmtime from text, so no
//! prebuilt artifacts are needed.

#![allow(dead_code)]

use advent_bridge::{BridgeConfig, BridgeError, Session, Transcript, WasmGuest};
use advent_guestapi::{MemGuest, OutputBundle};

// ── Guest Modules ──

/// Answers every command with "You see a room." and empty prompts.
/// No `init` export.
pub const ROOM_GUEST: &str = r#"
    (module
        (memory (export "memory") 1)
        (data (i32.const 1024) "You see a room.")
        (global $out_len (mut i32) (i32.const 0))
        (func (export "get_output_ptr") (result i32) i32.const 1024)
        (func (export "get_output_len") (result i32) global.get $out_len)
        (func (export "get_image_ptr") (result i32) i32.const 0)
        (func (export "get_image_len") (result i32) i32.const 0)
        (func (export "get_tts_ptr") (result i32) i32.const 0)
        (func (export "get_tts_len") (result i32) i32.const 0)
        (func (export "get_sfx_ptr") (result i32) i32.const 0)
        (func (export "get_sfx_len") (result i32) i32.const 0)
        (func (export "get_input_ptr") (result i32) i32.const 0)
        (func (export "run_command") (param $len i32)
            (global.set $out_len (i32.const 15)))
    )
"#;

/// Greets from `init`, then echoes each command back as narrative output.
///
/// Every command grows memory by one page and copies the input into the
/// new page, so the output pointer moves and the memory buffer is replaced
/// on each call.
pub const ECHO_GUEST: &str = r#"
    (module
        (memory (export "memory") 1)
        (global $out_ptr (mut i32) (i32.const 1024))
        (global $out_len (mut i32) (i32.const 0))
        (data (i32.const 1024) "Welcome.")
        (data (i32.const 2048) "a bare room")
        (data (i32.const 2080) "echo")
        (data (i32.const 2096) "drip")
        (func (export "init")
            (global.set $out_len (i32.const 8)))
        (func (export "get_output_ptr") (result i32) global.get $out_ptr)
        (func (export "get_output_len") (result i32) global.get $out_len)
        (func (export "get_image_ptr") (result i32) i32.const 2048)
        (func (export "get_image_len") (result i32) i32.const 11)
        (func (export "get_tts_ptr") (result i32) i32.const 2080)
        (func (export "get_tts_len") (result i32) i32.const 4)
        (func (export "get_sfx_ptr") (result i32) i32.const 2096)
        (func (export "get_sfx_len") (result i32) i32.const 4)
        (func (export "get_input_ptr") (result i32) i32.const 256)
        (func (export "run_command") (param $len i32)
            (local $base i32)
            (local.set $base (i32.mul (memory.grow (i32.const 1)) (i32.const 65536)))
            (memory.copy (local.get $base) (i32.const 256) (local.get $len))
            (global.set $out_ptr (local.get $base))
            (global.set $out_len (local.get $len)))
    )
"#;

/// Traps on every command.
pub const TRAP_GUEST: &str = r#"
    (module
        (memory (export "memory") 1)
        (func (export "get_output_ptr") (result i32) i32.const 0)
        (func (export "get_output_len") (result i32) i32.const 0)
        (func (export "get_input_ptr") (result i32) i32.const 0)
        (func (export "run_command") (param i32)
            unreachable)
    )
"#;

/// Never returns from `run_command`. Only usable with a fuel limit.
pub const SPIN_GUEST: &str = r#"
    (module
        (memory (export "memory") 1)
        (func (export "get_output_ptr") (result i32) i32.const 0)
        (func (export "get_output_len") (result i32) i32.const 0)
        (func (export "get_input_ptr") (result i32) i32.const 0)
        (func (export "run_command") (param i32)
            (loop $forever (br $forever)))
    )
"#;

/// Exports only the mandatory table: no prompt getters, no `init`.
pub const BARE_GUEST: &str = r#"
    (module
        (memory (export "memory") 1)
        (data (i32.const 512) "Dark.")
        (func (export "get_output_ptr") (result i32) i32.const 512)
        (func (export "get_output_len") (result i32) i32.const 5)
        (func (export "get_input_ptr") (result i32) i32.const 0)
        (func (export "run_command") (param i32))
    )
"#;

/// Lacks `run_command`; must fail to load.
pub const NO_RUN_COMMAND_GUEST: &str = r#"
    (module
        (memory (export "memory") 1)
        (func (export "get_output_ptr") (result i32) i32.const 0)
        (func (export "get_output_len") (result i32) i32.const 0)
        (func (export "get_input_ptr") (result i32) i32.const 0)
    )
"#;

// ── Session Factories ──

/// Start a session on an inline WAT guest with the given config.
pub fn start_wat_with_config(
    wat: &str,
    config: &BridgeConfig,
) -> (Result<Session<WasmGuest>, BridgeError>, Transcript) {
    let mut transcript = Transcript::new();
    let session = Session::start(
        || WasmGuest::new(wat.as_bytes(), config),
        &mut transcript,
        config,
    );
    (session, transcript)
}

/// Start a session on an inline WAT guest with default config.
pub fn start_wat(wat: &str) -> (Session<WasmGuest>, Transcript) {
    let (session, transcript) = start_wat_with_config(wat, &BridgeConfig::default());
    (session.expect("guest should load"), transcript)
}

/// Start a session on a scripted in-memory guest.
pub fn start_mem(guest: MemGuest) -> (Session<MemGuest>, Transcript) {
    let mut transcript = Transcript::new();
    let session = Session::start(|| Ok(guest), &mut transcript, &BridgeConfig::default())
        .expect("scripted guest should start");
    (session, transcript)
}

/// Bundle with only narrative output set.
pub fn narrative(text: &str) -> OutputBundle {
    OutputBundle {
        output: text.to_owned(),
        ..OutputBundle::default()
    }
}

/// Texts of all log entries, in order.
pub fn log_texts(transcript: &Transcript) -> Vec<String> {
    transcript
        .log()
        .entries()
        .iter()
        .map(|e| e.text.clone())
        .collect()
}
