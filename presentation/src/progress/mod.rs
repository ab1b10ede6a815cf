//! Live thought stream and task progress

pub mod reporter;
