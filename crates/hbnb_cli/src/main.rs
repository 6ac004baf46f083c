//! HBNB console entry point.
//!
//! # Responsibility
//! - Parse process arguments and optionally start file logging.
//! - Open the JSON object store and run the interactive read loop on stdin.

use clap::Parser;
use hbnb_core::{default_log_level, init_logging, Console, JsonFileStore, ModelRegistry, PROMPT};
use log::error;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "hbnb")]
#[command(version, about = "HBNB - command console for stored model objects", long_about = None)]
struct Cli {
    /// JSON file holding all stored objects
    #[arg(long, default_value = "hbnb.json")]
    file: PathBuf,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long)]
    log_level: Option<String>,

    /// Absolute directory for rotated log files; logging is off when omitted
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    }

    let registry = ModelRegistry::with_builtin_classes();
    let store = match JsonFileStore::open(&cli.file, &registry) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("Error: cannot load `{}`: {err}", cli.file.display());
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    let prompt = stdin.is_terminal().then_some(PROMPT);
    let mut console = Console::new(store, registry);
    if let Err(err) = console.run(stdin.lock(), &mut io::stdout().lock(), prompt) {
        error!("event=console_stop module=cli status=error error={err}");
        eprintln!("Error: {err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
