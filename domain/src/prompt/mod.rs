//! Prompt domain
//!
//! Instruction templates for each model call of an orchestration run.

mod template;

pub use template::{DEGRADED_NOTICE, PromptTemplate};
