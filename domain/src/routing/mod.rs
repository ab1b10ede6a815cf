//! Provider routing domain
//!
//! Value objects and pure helpers used by the provider router:
//!
//! - [`provider::ProviderKind`] / [`provider::ModelTarget`] - who serves a call
//! - [`category::QueryCategory`] - coarse query classification
//! - [`tier::ModelTier`] / [`tier::ModelProfile`] - the routable model catalog
//! - [`decision::ProviderDecision`] - chosen model plus fallback chain

pub mod category;
pub mod decision;
pub mod provider;
pub mod tier;
