use std::sync::Arc;

#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, key: &[u8], payload: &[u8]) -> anyhow::Result<()>;
}

#[async_trait::async_trait]
pub trait EventConsumer: Send + Sync {
    /// Delivers every message on `topics` to `handler` until cancelled. The group's position
    /// moves past a message once the handler commits it, or once it has failed
    /// [`MAX_DELIVERY_ATTEMPTS`] times in a row.
    async fn run(
        &self,
        consumer_group_id: &str,
        topics: &[&str],
        handler: Arc<dyn EventHandler>,
    ) -> anyhow::Result<()>;
}

/// Deliveries of one message (retries and handler errors alike) before the consumer commits
/// past it anyway.
pub const MAX_DELIVERY_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum HandleOutcome {
    Commit,
    /// Deliver the same message again before anything behind it, up to
    /// [`MAX_DELIVERY_ATTEMPTS`].
    Retry,
}

#[async_trait::async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, payload: &[u8]) -> anyhow::Result<HandleOutcome>;
}
