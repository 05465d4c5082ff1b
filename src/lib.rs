//! # st2-rs
//!
//! Command-line front end and configuration for the StackStorm API client.
//! The client itself lives in `st2-api`; this crate wires it to an INI
//! config file and a small set of commands.

pub mod cli;
pub mod commands;
pub mod config;
pub mod display;
pub mod errors;

// Re-export main public types
pub use errors::{CliError, ConfigError, Result};
pub use st2_api::{ClientOptions, St2, St2ApiClient};

// Re-export for CLI usage
pub use config::Config;
