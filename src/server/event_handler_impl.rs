use crate::application_impl::CounterProjector;
use crate::domain_model::*;
use crate::server::{EventHandler, HandleOutcome};
use std::sync::Arc;
use tracing::{error, warn};

/// Bus adapter for the counter projector.
pub struct CounterProjectionHandler {
    projector: Arc<CounterProjector>,
}

impl CounterProjectionHandler {
    pub fn new(projector: Arc<CounterProjector>) -> Self {
        Self { projector }
    }
}

#[async_trait::async_trait]
impl EventHandler for CounterProjectionHandler {
    async fn handle(&self, payload: &[u8]) -> anyhow::Result<HandleOutcome> {
        let envelope = match serde_json::from_slice::<EventEnvelope>(payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                // poison message: nothing would ever decode it, so drop it
                warn!(error = %e, bytes = payload.len(), "undecodable event dropped");
                return Ok(HandleOutcome::Commit);
            }
        };

        // a failed projection is dropped, never redelivered
        if let Err(e) = self.projector.project(&envelope).await {
            error!(
                event_id = %envelope.event_id,
                event_type = %envelope.body.event_type(),
                "counter projection failed, event dropped: {e:#}"
            );
        }

        Ok(HandleOutcome::Commit)
    }
}
