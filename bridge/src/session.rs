//! Session context — one guest instance plus its command loop.
//!
//! A `Session` replaces process-wide module and memory handles: it owns the
//! guest and the loop state, and borrows the renderer per call. Several
//! sessions can live side by side, and tests construct one around a
//! scripted guest.
//!
//! Failures are reported to the player exactly once, as a `Fatal` log
//! entry, and leave the session halted.

use std::path::Path;

use tracing::{debug, error, info};

use advent_guestapi::GuestExports;

use crate::command_loop::{CommandLoop, LoopState, Submission};
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::render::{LogCategory, Renderer};
use crate::runtime::WasmGuest;

/// Shown when the guest module cannot be fetched or instantiated.
pub const LOAD_FAILURE_MESSAGE: &str = "CRITICAL SYSTEM FAILURE: WASM MODULE MISSING.";

/// A running guest and the loop that drives it.
pub struct Session<G> {
    guest: G,
    command_loop: CommandLoop,
}

impl<G: GuestExports> Session<G> {
    /// Acquire a guest through `load` and bring it up.
    ///
    /// On load failure a single fatal entry is logged, no panels are
    /// rendered, and the error is returned. Otherwise `init` is called if
    /// the guest exports it and its bundle is rendered; a guest without
    /// `init` is assumed to be ready and nothing is rendered yet.
    pub fn start<F, R>(load: F, renderer: &mut R, config: &BridgeConfig) -> Result<Self, BridgeError>
    where
        F: FnOnce() -> Result<G, BridgeError>,
        R: Renderer + ?Sized,
    {
        let guest = match load() {
            Ok(guest) => guest,
            Err(e) => {
                error!(error = %e, "guest module failed to load");
                renderer.append_log(LOAD_FAILURE_MESSAGE, LogCategory::Fatal);
                return Err(e);
            }
        };

        let mut session = Self {
            guest,
            command_loop: CommandLoop::new(config.input_capacity_i32()),
        };

        if session.guest.has_init() {
            let result = session
                .guest
                .init()
                .map_err(BridgeError::from)
                .and_then(|()| session.command_loop.render_current(&mut session.guest, renderer));
            if let Err(e) = result {
                session.fail(renderer, &e);
                return Err(e);
            }
            info!("guest initialised");
        } else {
            debug!("guest has no init export; assuming it is self-initialised");
        }

        Ok(session)
    }

    /// Submit one line of player input.
    ///
    /// Blank input is ignored. A guest failure during the command is logged
    /// as a fatal entry and halts the session.
    pub fn submit<R>(&mut self, renderer: &mut R, raw: &str) -> Result<Submission, BridgeError>
    where
        R: Renderer + ?Sized,
    {
        match self.command_loop.submit(&mut self.guest, renderer, raw) {
            Err(e) if e.is_guest_failure() => {
                self.fail(renderer, &e);
                Err(e)
            }
            other => other,
        }
    }

    pub fn state(&self) -> LoopState {
        self.command_loop.state()
    }

    pub fn is_halted(&self) -> bool {
        self.state() == LoopState::Halted
    }

    pub fn guest(&self) -> &G {
        &self.guest
    }

    fn fail<R>(&mut self, renderer: &mut R, e: &BridgeError)
    where
        R: Renderer + ?Sized,
    {
        error!(error = %e, "guest failure; halting session");
        self.command_loop.halt();
        renderer.append_log(&format!("SYSTEM FAILURE: {}", e), LogCategory::Fatal);
    }
}

impl Session<WasmGuest> {
    /// Start a session on the module named by `config.module_path`.
    pub fn open<R>(config: &BridgeConfig, renderer: &mut R) -> Result<Self, BridgeError>
    where
        R: Renderer + ?Sized,
    {
        Self::open_path(&config.module_path, config, renderer)
    }

    /// Start a session on the module at `path`.
    pub fn open_path<R>(path: &Path, config: &BridgeConfig, renderer: &mut R) -> Result<Self, BridgeError>
    where
        R: Renderer + ?Sized,
    {
        Self::start(|| WasmGuest::from_file(path, config), renderer, config)
    }
}
