//! Performance feedback persistence.

mod jsonl_store;

pub use jsonl_store::JsonlPerformanceStore;
