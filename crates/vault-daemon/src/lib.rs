//! prompt-vault command-line front end.
//!
//! # Modules
//!
//! - `cli`: argument parsing with clap
//! - `commands`: settings, logging setup, and command handlers

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{exit_code, init_logging, load_settings, run};
