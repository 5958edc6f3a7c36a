use super::database::{OutboxRow, downcast};
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};

pub struct MemoryOutboxRepo;

impl MemoryOutboxRepo {
    pub fn new() -> Self {
        MemoryOutboxRepo
    }
}

impl Default for MemoryOutboxRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl OutboxRepo for MemoryOutboxRepo {
    async fn enqueue_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        event: &OutboxEvent,
    ) -> anyhow::Result<()> {
        let tables = downcast(tx)?.tables();

        if tables
            .outbox
            .iter()
            .any(|row| row.event.event_id == event.event_id)
        {
            return Ok(());
        }
        tables.outbox.push(OutboxRow {
            event: event.clone(),
            next_attempt_at: event.created_at,
            attempt_count: 0,
            last_error: None,
        });

        Ok(())
    }

    async fn claim_ready_batch_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        now: DateTime<Utc>,
        limit: u32,
    ) -> anyhow::Result<Vec<OutboxEvent>> {
        let tables = downcast(tx)?.tables();

        // rows are kept in enqueue order, which is created_at order
        Ok(tables
            .outbox
            .iter()
            .filter(|row| row.next_attempt_at <= now)
            .take(limit as usize)
            .map(|row| row.event.clone())
            .collect())
    }

    async fn mark_delivered_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        event_id: EventId,
        _delivered_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let tables = downcast(tx)?.tables();
        tables.outbox.retain(|row| row.event.event_id != event_id);
        Ok(())
    }

    async fn reschedule_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        event_id: EventId,
        next_attempt_at: DateTime<Utc>,
        last_error: &str,
    ) -> anyhow::Result<()> {
        let tables = downcast(tx)?.tables();

        if let Some(row) = tables
            .outbox
            .iter_mut()
            .find(|row| row.event.event_id == event_id)
        {
            row.attempt_count += 1;
            row.next_attempt_at = next_attempt_at;
            row.last_error = Some(last_error.to_owned());
        }

        Ok(())
    }
}
