//! Command loop — drives one player command from submission to render.
//!
//! ```text
//! Idle ──submit──▶ Submitted ──write+run──▶ Dispatching ──decode──▶ Rendering ──▶ Idle
//!                                   │                      │
//!                                   └────── guest error ───┴──────▶ Halted
//! ```
//!
//! The echo is appended in `Submitted`, before any guest work. The input
//! pointer is re-queried for every command and all four output slots are
//! re-fetched after every `run_command`; nothing read from the guest is
//! carried from one command to the next.

use advent_guestapi::{GuestExports, OutputBundle};
use tracing::{debug, warn};

use crate::error::BridgeError;
use crate::memory::{self, Written};
use crate::render::{LogCategory, Panel, Renderer};

/// Where the loop is in handling a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Waiting for input.
    Idle,
    /// Command accepted and echoed.
    Submitted,
    /// Command written to the guest; `run_command` in progress.
    Dispatching,
    /// Reading the output bundle and updating the display.
    Rendering,
    /// A guest call failed. Terminal.
    Halted,
}

/// Outcome of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Blank input; nothing logged, guest untouched.
    Ignored,
    /// Command dispatched and its response rendered.
    Completed(Written),
}

/// Trim and lower-case raw input. `None` if nothing is left.
pub fn normalize_command(raw: &str) -> Option<String> {
    let cmd = raw.trim().to_lowercase();
    if cmd.is_empty() {
        None
    } else {
        Some(cmd)
    }
}

/// State machine for a single session's commands.
#[derive(Debug)]
pub struct CommandLoop {
    state: LoopState,
    input_capacity: i32,
}

impl CommandLoop {
    /// Create an idle loop writing into an input buffer of `input_capacity` bytes.
    pub fn new(input_capacity: i32) -> Self {
        Self {
            state: LoopState::Idle,
            input_capacity,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Submit raw player input.
    ///
    /// Rejected unless the loop is `Idle`. Any guest failure moves the loop
    /// to `Halted` and is returned to the caller.
    pub fn submit<G, R>(
        &mut self,
        guest: &mut G,
        renderer: &mut R,
        raw: &str,
    ) -> Result<Submission, BridgeError>
    where
        G: GuestExports + ?Sized,
        R: Renderer + ?Sized,
    {
        self.ensure_idle()?;
        let Some(command) = normalize_command(raw) else {
            return Ok(Submission::Ignored);
        };

        self.state = LoopState::Submitted;
        renderer.append_log(&format!("> {}", command), LogCategory::UserInput);

        match self.dispatch_and_render(guest, renderer, &command) {
            Ok(written) => {
                self.state = LoopState::Idle;
                Ok(Submission::Completed(written))
            }
            Err(e) => {
                self.state = LoopState::Halted;
                Err(e)
            }
        }
    }

    /// Render whatever bundle the guest currently publishes.
    ///
    /// Used after `init`, outside of any command.
    pub fn render_current<G, R>(&mut self, guest: &mut G, renderer: &mut R) -> Result<(), BridgeError>
    where
        G: GuestExports + ?Sized,
        R: Renderer + ?Sized,
    {
        self.ensure_idle()?;
        self.state = LoopState::Rendering;
        match render_bundle(guest, renderer) {
            Ok(()) => {
                self.state = LoopState::Idle;
                Ok(())
            }
            Err(e) => {
                self.state = LoopState::Halted;
                Err(e)
            }
        }
    }

    /// Stop accepting commands.
    pub fn halt(&mut self) {
        self.state = LoopState::Halted;
    }

    fn ensure_idle(&self) -> Result<(), BridgeError> {
        match self.state {
            LoopState::Idle => Ok(()),
            LoopState::Halted => Err(BridgeError::Halted),
            busy => Err(BridgeError::Busy(busy)),
        }
    }

    fn dispatch_and_render<G, R>(
        &mut self,
        guest: &mut G,
        renderer: &mut R,
        command: &str,
    ) -> Result<Written, BridgeError>
    where
        G: GuestExports + ?Sized,
        R: Renderer + ?Sized,
    {
        self.state = LoopState::Dispatching;
        let input_ptr = guest.input_ptr()?;
        let written =
            memory::encode_and_write(&mut *guest, command, input_ptr, self.input_capacity)?;
        if written.truncated {
            warn!(
                original = command.len(),
                written = written.len,
                capacity = self.input_capacity,
                "command truncated to fit input buffer"
            );
        }
        debug!(input_ptr, len = written.len, "dispatching command");
        // `written.len` never exceeds `input_capacity`, which is an i32.
        guest.run_command(written.len as i32)?;

        self.state = LoopState::Rendering;
        render_bundle(guest, renderer)?;
        Ok(written)
    }
}

/// Decode the current output bundle and push it to the display.
fn render_bundle<G, R>(guest: &mut G, renderer: &mut R) -> Result<(), BridgeError>
where
    G: GuestExports + ?Sized,
    R: Renderer + ?Sized,
{
    let OutputBundle {
        output,
        image,
        tts,
        sfx,
    } = memory::read_bundle(guest)?;

    renderer.append_log(&output, LogCategory::SystemOutput);
    for (panel, text) in Panel::ALL.into_iter().zip([image, tts, sfx]) {
        renderer.set_panel(panel, &text);
    }
    Ok(())
}
