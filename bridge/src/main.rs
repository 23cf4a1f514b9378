//! `advent` — play a text-adventure guest module in the terminal.
//!
//! Loads the guest, renders its opening text, then reads commands from an
//! interactive prompt until end of input. With `--command`, the given
//! commands are played in order and the process exits.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use advent_bridge::{BridgeConfig, Session, TerminalRenderer, WasmGuest};

/// Terminal host for a sandboxed text-adventure module
#[derive(Parser)]
#[command(name = "advent")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Guest module to load (overrides `module_path` from the config file)
    #[arg(short, long)]
    module: Option<PathBuf>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Play this command instead of prompting; repeat for several
    #[arg(short = 'e', long = "command", value_name = "TEXT")]
    commands: Vec<String>,

    /// Enable verbose diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => BridgeConfig::load(path)?,
        None => BridgeConfig::default(),
    };
    if let Some(module) = cli.module {
        config.module_path = module;
    }

    let mut renderer = TerminalRenderer::new(io::stdout());
    let mut session = Session::open(&config, &mut renderer)?;

    if cli.commands.is_empty() {
        repl(&mut session, &mut renderer)
    } else {
        for command in &cli.commands {
            session.submit(&mut renderer, command)?;
        }
        Ok(())
    }
}

/// Diagnostics go to stderr so game text on stdout stays clean.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,advent_bridge=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn repl<W: Write>(
    session: &mut Session<WasmGuest>,
    renderer: &mut TerminalRenderer<W>,
) -> Result<()> {
    let mut editor = DefaultEditor::new()?;

    loop {
        let line = match editor.readline("> ") {
            Ok(line) => line,
            // Ctrl-C drops the line being typed.
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        if !line.trim().is_empty() {
            let _ = editor.add_history_entry(line.trim());
        }
        session.submit(renderer, &line)?;
    }

    Ok(())
}
