//! Candidate plans: task graphs proposed by the model as answering strategies.

pub mod entities;
pub mod graph;
pub mod parser;
pub mod policy;
pub mod value_objects;
