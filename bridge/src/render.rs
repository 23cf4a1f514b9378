//! UI renderer: the log and the three prompt panels.
//!
//! Pure presentation. The log is append-only and displayed in insertion
//! order; panels hold only their latest value.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

use colored::Colorize;

/// Category of a log entry, which determines how it is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    /// Echo of a command the player typed.
    UserInput,
    /// Narrative text returned by the guest.
    SystemOutput,
    /// Unrecoverable host or guest failure.
    Fatal,
}

impl LogCategory {
    /// Style class name for this category.
    pub fn class_name(self) -> &'static str {
        match self {
            LogCategory::UserInput => "user-input",
            LogCategory::SystemOutput => "system-output",
            LogCategory::Fatal => "fatal",
        }
    }
}

/// A prompt panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Panel {
    Image,
    Tts,
    Sfx,
}

impl Panel {
    /// All panels in display order.
    pub const ALL: [Panel; 3] = [Panel::Image, Panel::Tts, Panel::Sfx];

    /// Stable element id of the panel.
    pub fn id(self) -> &'static str {
        match self {
            Panel::Image => "image-prompt",
            Panel::Tts => "tts-prompt",
            Panel::Sfx => "sfx-prompt",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Panel::Image => "IMAGE",
            Panel::Tts => "VOICE",
            Panel::Sfx => "SFX",
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One entry in the log. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub text: String,
    pub category: LogCategory,
}

/// Append-only, ordered log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Log {
    entries: Vec<LogEntry>,
}

impl Log {
    /// Append an entry and return its index.
    pub fn push(&mut self, text: &str, category: LogCategory) -> usize {
        self.entries.push(LogEntry {
            text: text.to_owned(),
            category,
        });
        self.entries.len() - 1
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of one category, in order.
    pub fn of(&self, category: LogCategory) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }
}

/// Display surface driven by the command loop.
pub trait Renderer {
    /// Append one entry to the log and bring it into view.
    fn append_log(&mut self, text: &str, category: LogCategory);

    /// Replace the text of `panel`.
    fn set_panel(&mut self, panel: Panel, text: &str);
}

/// In-memory renderer holding the log and the current panel values.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    log: Log,
    panels: BTreeMap<Panel, String>,
    follow: Option<usize>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &Log {
        &self.log
    }

    /// Current text of `panel`, or `None` if it was never rendered.
    pub fn panel(&self, panel: Panel) -> Option<&str> {
        self.panels.get(&panel).map(String::as_str)
    }

    /// Whether any panel has been rendered.
    pub fn has_panels(&self) -> bool {
        !self.panels.is_empty()
    }

    /// Index of the entry currently scrolled into view.
    pub fn scrolled_to(&self) -> Option<usize> {
        self.follow
    }
}

impl Renderer for Transcript {
    fn append_log(&mut self, text: &str, category: LogCategory) {
        let index = self.log.push(text, category);
        self.follow = Some(index);
    }

    fn set_panel(&mut self, panel: Panel, text: &str) {
        self.panels.insert(panel, text.to_owned());
    }
}

/// Renderer that writes to a terminal or any other byte sink.
///
/// Log entries are printed as they arrive, so the newest entry is always
/// the last line on screen. Panel replacements print as labelled lines.
pub struct TerminalRenderer<W: Write> {
    out: W,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: fmt::Arguments<'_>) {
        if let Err(e) = self.out.write_fmt(line).and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "terminal write failed");
        }
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn append_log(&mut self, text: &str, category: LogCategory) {
        let styled = match category {
            LogCategory::UserInput => text.dimmed(),
            LogCategory::SystemOutput => text.normal(),
            LogCategory::Fatal => text.red().bold(),
        };
        self.emit(format_args!("{}\n", styled));
    }

    fn set_panel(&mut self, panel: Panel, text: &str) {
        let label = format!("[{}]", panel.label());
        self.emit(format_args!("{} {}\n", label.cyan(), text));
    }
}
