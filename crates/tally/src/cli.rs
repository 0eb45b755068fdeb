//! Command line entry point.
//!
//! Flags layer on top of the TOML configuration: `--config` selects the
//! file, and the remaining flags override individual fields after the file
//! has been parsed. Configuration errors are fatal and map to exit code 2
//! through [`CalcError::exit_code`].

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tally_core::{CalcError, OpRegistry, Result};
use tally_engine::{CalcConfig, Calculator, LoggingObserver};
use tracing_subscriber::EnvFilter;

use crate::repl;

#[derive(Debug, Parser)]
#[command(
    name = "tally",
    about = "Interactive decimal calculator with persistent history and undo/redo",
    version
)]
pub struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the base directory for history and log files.
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Override the maximum number of retained history entries.
    #[arg(long, value_name = "N")]
    pub max_history: Option<usize>,

    /// Save history after every successful calculation.
    #[arg(long)]
    pub autosave: bool,
}

impl Cli {
    /// Resolves the effective configuration: file first, flags second.
    pub fn load_config(&self) -> Result<CalcConfig> {
        let mut config = match &self.config {
            Some(path) => CalcConfig::from_toml_file(path)?,
            None => CalcConfig::default(),
        };
        if let Some(base_dir) = &self.base_dir {
            config.base_dir = base_dir.clone();
        }
        if let Some(max_history) = self.max_history {
            config.max_history_size = max_history;
        }
        if self.autosave {
            config.autosave = true;
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let config = cli.load_config()?;
    config.ensure_directories()?;
    init_logging(&config)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        base_dir = %config.base_dir.display(),
        "session started"
    );

    let mut calculator = Calculator::new(config, OpRegistry::with_builtins())?;
    calculator.add_observer(Box::new(LoggingObserver));

    let stdin = io::stdin();
    let stdout = io::stdout();
    repl::run(&mut calculator, stdin.lock(), stdout.lock())?;
    tracing::info!("session ended");
    Ok(())
}

/// Routes `tracing` output to the configured log file. `RUST_LOG` narrows
/// the filter; the default keeps everything at `info` and above.
fn init_logging(config: &CalcConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_file())
        .map_err(CalcError::Io)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
