//! Export names, string slots, and the decoded output bundle.
//!
//! The guest publishes four independently addressed strings after `init`
//! and after every `run_command`. Each is a (pointer, length) pair into
//! linear memory with no terminator.

/// Name of the guest's exported linear memory.
pub const EXPORT_MEMORY: &str = "memory";
/// Optional one-shot initializer.
pub const EXPORT_INIT: &str = "init";
/// Base address of the input buffer.
pub const EXPORT_INPUT_PTR: &str = "get_input_ptr";
/// Command entry point, takes the encoded byte length.
pub const EXPORT_RUN_COMMAND: &str = "run_command";

/// Documented capacity of the guest's input buffer, in bytes.
pub const INPUT_CAPACITY: usize = 256;

/// One of the four pointer/length string slots in the output bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    /// Narrative text shown in the log.
    Output,
    /// Image generation prompt.
    Image,
    /// Text-to-speech prompt.
    Tts,
    /// Sound-effect prompt.
    Sfx,
}

impl Slot {
    /// All slots, in the order the host reads them.
    pub const ALL: [Slot; 4] = [Slot::Output, Slot::Image, Slot::Tts, Slot::Sfx];

    /// Export that returns this slot's pointer.
    pub fn ptr_export(self) -> &'static str {
        match self {
            Slot::Output => "get_output_ptr",
            Slot::Image => "get_image_ptr",
            Slot::Tts => "get_tts_ptr",
            Slot::Sfx => "get_sfx_ptr",
        }
    }

    /// Export that returns this slot's length.
    pub fn len_export(self) -> &'static str {
        match self {
            Slot::Output => "get_output_len",
            Slot::Image => "get_image_len",
            Slot::Tts => "get_tts_len",
            Slot::Sfx => "get_sfx_len",
        }
    }

    /// Whether the host refuses to load a guest lacking this slot.
    pub fn is_mandatory(self) -> bool {
        matches!(self, Slot::Output)
    }
}

/// The four strings decoded from one output bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputBundle {
    /// Narrative output.
    pub output: String,
    /// Image prompt.
    pub image: String,
    /// TTS prompt.
    pub tts: String,
    /// SFX prompt.
    pub sfx: String,
}

impl OutputBundle {
    /// Mutable access to the string for `slot`.
    pub fn slot_mut(&mut self, slot: Slot) -> &mut String {
        match slot {
            Slot::Output => &mut self.output,
            Slot::Image => &mut self.image,
            Slot::Tts => &mut self.tts,
            Slot::Sfx => &mut self.sfx,
        }
    }

    /// The string for `slot`.
    pub fn get(&self, slot: Slot) -> &str {
        match slot {
            Slot::Output => &self.output,
            Slot::Image => &self.image,
            Slot::Tts => &self.tts,
            Slot::Sfx => &self.sfx,
        }
    }
}
