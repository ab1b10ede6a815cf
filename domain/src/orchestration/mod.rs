//! Orchestration domain
//!
//! Values shared by the top-level orchestrator: the complexity gate,
//! the streamed thought events, and the final result shape.

pub mod complexity;
pub mod result;
pub mod thought;
