use crate::application_port::RelationError;
use crate::domain_model::*;
use crate::domain_port::{OutboxEvent, OutboxRepo, StorageTx};

/// Enqueues `body` in the same transaction as the write it describes, so the event is
/// published if and only if that write commits.
pub(crate) async fn enqueue_event(
    outbox_repo: &dyn OutboxRepo,
    tx: &mut dyn StorageTx<'_>,
    body: RelationEvent,
) -> Result<EventId, RelationError> {
    let envelope = EventEnvelope::new(body);
    let event = OutboxEvent::new(&envelope).map_err(|e| {
        RelationError::Store(format!(
            "compose {} event: {e}",
            envelope.body.event_type()
        ))
    })?;
    outbox_repo.enqueue_in_tx(tx, &event).await.map_err(|e| {
        RelationError::Store(format!(
            "enqueue {} event to outbox: {e}",
            event.event_type
        ))
    })?;

    Ok(envelope.event_id)
}
