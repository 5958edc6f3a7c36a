use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;
use tracing::debug;

/// Folds relation lifecycle events into the denormalized counters.
///
/// Safe under at-least-once delivery: every delta is keyed by `(event_id, kind, subject)`
/// and the counter store applies each key once, so redelivered or reordered events converge
/// to the same totals.
pub struct CounterProjector {
    counter_store: Arc<dyn CounterStore>,
}

impl CounterProjector {
    pub fn new(counter_store: Arc<dyn CounterStore>) -> Self {
        Self { counter_store }
    }

    pub async fn project(&self, envelope: &EventEnvelope) -> anyhow::Result<()> {
        for delta in CounterDelta::for_event(&envelope.body) {
            match self.counter_store.apply_once(envelope.event_id, delta).await? {
                ApplyOutcome::Applied { value } => {
                    debug!(
                        event_id = %envelope.event_id,
                        counter = delta.kind.as_str(),
                        subject = %delta.subject,
                        value,
                        "counter updated"
                    );
                }
                ApplyOutcome::Duplicate { .. } => {
                    debug!(
                        event_id = %envelope.event_id,
                        counter = delta.kind.as_str(),
                        subject = %delta.subject,
                        "duplicate delivery skipped"
                    );
                }
            }
        }

        Ok(())
    }
}
