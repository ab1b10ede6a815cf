//! Liveness probe for the locally hosted provider.

use async_trait::async_trait;

/// Port for checking whether the local provider is reachable.
#[async_trait]
pub trait LocalProviderProbe: Send + Sync {
    async fn is_alive(&self) -> bool;
}

/// Probe that always reports the local provider as alive.
pub struct AssumeAlive;

#[async_trait]
impl LocalProviderProbe for AssumeAlive {
    async fn is_alive(&self) -> bool {
        true
    }
}
