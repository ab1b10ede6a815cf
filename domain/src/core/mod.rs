//! Core domain concepts shared across all subdomains.
//!
//! - [`query::Query`] - the user's question plus its request context
//! - [`error::DomainError`] - domain-level errors

pub mod error;
pub mod query;
