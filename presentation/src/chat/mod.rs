//! Interactive chat module
//!
//! Provides a line-editor based chat interface that carries conversation
//! history between questions.

mod repl;

pub use repl::{ChatRepl, ChatSession, ReplCommand};
