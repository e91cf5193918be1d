//! Location Service cmdlets CLI library.
//!
//! Exposes the cmdlet declarations, the command-line builder, the
//! configuration file and the runner so they can be tested without
//! spawning the binary.

pub mod cli;
pub mod cmdlets;
pub mod config;
pub mod confirm;
pub mod formatters;
pub mod runner;

pub use cli::{CmdletArgs, GlobalArgs};
pub use config::Settings;
