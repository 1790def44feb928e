//! Presentation layer for council
//!
//! This crate contains the CLI definition and the console/JSON output
//! formatters for transcripts, tallies and session status.

pub mod cli;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormat};
pub use output::console::ConsoleFormatter;
pub use output::formatter::OutputFormatter;
