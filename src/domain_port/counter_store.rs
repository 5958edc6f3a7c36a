use crate::domain_model::*;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ApplyOutcome {
    Applied { value: i64 },
    Duplicate { value: i64 },
}

/// Denormalized counters. Increments are atomic on the store side, never read-modify-write
/// in the caller.
#[async_trait::async_trait]
pub trait CounterStore: Send + Sync {
    /// Applies `delta` unless this `(event_id, kind, subject)` was applied before.
    async fn apply_once(
        &self,
        event_id: EventId,
        delta: CounterDelta,
    ) -> anyhow::Result<ApplyOutcome>;
    /// Absent counters read as zero.
    async fn get(&self, kind: CounterKind, subject: uuid::Uuid) -> anyhow::Result<i64>;
    async fn get_many(
        &self,
        kind: CounterKind,
        subjects: &[uuid::Uuid],
    ) -> anyhow::Result<Vec<i64>>;
}
