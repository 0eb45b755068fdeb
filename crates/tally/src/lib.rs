#![forbid(unsafe_code)]

//! Interactive calculator front end.
//!
//! The binary is a thin shell around [`tally_engine::Calculator`]: command
//! line flags select and override a TOML configuration, a file-backed
//! `tracing` subscriber captures structured logs, and a line-oriented REPL
//! drives the engine. The REPL is generic over its input and output streams
//! so scripted sessions can exercise it from tests.

pub mod cli;
pub mod help;
pub mod repl;

pub use cli::run_from_env;
pub use tally_core::{CalcError, Result};
