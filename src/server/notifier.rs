use crate::domain_model::EventType;
use crate::domain_port::*;
use crate::server::EventPublisher;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const CLAIM_BATCH: u32 = 256;
const IDLE_POLL: Duration = Duration::from_millis(200);
const RETRY_BACKOFF_SECS: i64 = 2;

pub fn topic_name(prefix: &str, event_type: EventType) -> String {
    format!("{prefix}{event_type}")
}

/// Relays committed outbox rows to the bus, one topic per event type, keyed by the
/// event's partition subject. Delivery is at-least-once.
pub struct Notifier {
    tx_manager: Arc<dyn TxManager>,
    outbox_repo: Arc<dyn OutboxRepo>,
    event_publisher: Arc<dyn EventPublisher>,
    topic_prefix: String,
    cancellation_token: CancellationToken,
}

impl Notifier {
    pub fn new(
        tx_manager: Arc<dyn TxManager>,
        outbox_repo: Arc<dyn OutboxRepo>,
        event_publisher: Arc<dyn EventPublisher>,
        topic_prefix: &str,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            tx_manager,
            outbox_repo,
            event_publisher,
            topic_prefix: topic_prefix.to_owned(),
            cancellation_token,
        }
    }

    /// Returns how many events were handed to the publisher.
    async fn tick_once(&self) -> anyhow::Result<usize> {
        let mut tx = self.tx_manager.begin().await?;

        let now = Utc::now();
        let batch = self
            .outbox_repo
            .claim_ready_batch_in_tx(&mut *tx, now, CLAIM_BATCH)
            .await?;

        if batch.is_empty() {
            tx.commit().await?;
            return Ok(0);
        }

        let mut delivered = 0;
        for event in &batch {
            let topic = topic_name(&self.topic_prefix, event.event_type);
            let payload = serde_json::to_vec(&event.payload_json)?;

            match self
                .event_publisher
                .publish(&topic, event.partition_key.as_bytes(), &payload)
                .await
            {
                Ok(()) => {
                    self.outbox_repo
                        .mark_delivered_in_tx(&mut *tx, event.event_id, Utc::now())
                        .await?;
                    delivered += 1;
                }
                Err(e) => {
                    warn!(event_id = %event.event_id, %topic, "publish failed, rescheduling: {e:#}");
                    let next = Utc::now() + chrono::Duration::seconds(RETRY_BACKOFF_SECS);
                    self.outbox_repo
                        .reschedule_in_tx(&mut *tx, event.event_id, next, &format!("{e:#}"))
                        .await?;
                }
            }
        }

        tx.commit().await?;
        debug!(claimed = batch.len(), delivered, "outbox batch relayed");
        Ok(delivered)
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        info!(topic_prefix = %self.topic_prefix, "notifier started");
        loop {
            tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    info!("notifier shutting down...");
                    break;
                }
                result = self.tick_once() => {
                    match result {
                        Ok(0) => tokio::time::sleep(IDLE_POLL).await,
                        Ok(_) => {}
                        Err(e) => {
                            error!("notifier error: {e:#}");
                            tokio::time::sleep(IDLE_POLL).await;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_follow_the_event_type() {
        assert_eq!(
            topic_name("", EventType::FriendRequested),
            "relation.friend.requested"
        );
        assert_eq!(
            topic_name("staging.", EventType::PartyUnfavorited),
            "staging.relation.party.unfavorited"
        );
    }
}
