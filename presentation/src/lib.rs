//! Presentation layer for tutor-reasoning
//!
//! This crate contains the CLI definition, output formatters, the live
//! thought stream and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::{ChatRepl, ChatSession};
pub use cli::commands::{Cli, OutputFormat};
pub use config::ReplConfig;
pub use output::console::ConsoleFormatter;
pub use output::formatter::OutputFormatter;
pub use progress::reporter::{SimpleThoughts, ThoughtReporter, format_thought};
