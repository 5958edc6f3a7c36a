use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::{DashMap, DashSet};

/// Process-local counters. Dedupe markers never expire here.
#[derive(Default)]
pub struct MemoryCounterStore {
    counters: DashMap<(CounterKind, uuid::Uuid), i64>,
    applied: DashSet<(EventId, CounterKind, uuid::Uuid)>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn value(&self, kind: CounterKind, subject: uuid::Uuid) -> i64 {
        self.counters
            .get(&(kind, subject))
            .map(|v| *v)
            .unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl CounterStore for MemoryCounterStore {
    async fn apply_once(
        &self,
        event_id: EventId,
        delta: CounterDelta,
    ) -> anyhow::Result<ApplyOutcome> {
        if !self.applied.insert((event_id, delta.kind, delta.subject)) {
            return Ok(ApplyOutcome::Duplicate {
                value: self.value(delta.kind, delta.subject),
            });
        }

        let mut counter = self.counters.entry((delta.kind, delta.subject)).or_insert(0);
        *counter += delta.delta;

        Ok(ApplyOutcome::Applied { value: *counter })
    }

    async fn get(&self, kind: CounterKind, subject: uuid::Uuid) -> anyhow::Result<i64> {
        Ok(self.value(kind, subject))
    }

    async fn get_many(
        &self,
        kind: CounterKind,
        subjects: &[uuid::Uuid],
    ) -> anyhow::Result<Vec<i64>> {
        Ok(subjects
            .iter()
            .map(|subject| self.value(kind, *subject))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn repeated_delivery_applies_once() {
        let store = MemoryCounterStore::new();
        let event_id = EventId::new_random();
        let delta = CounterDelta {
            kind: CounterKind::FriendCount,
            subject: uuid::Uuid::from_u128(1),
            delta: 1,
        };

        assert_eq!(
            store.apply_once(event_id, delta).await.unwrap(),
            ApplyOutcome::Applied { value: 1 }
        );
        assert_eq!(
            store.apply_once(event_id, delta).await.unwrap(),
            ApplyOutcome::Duplicate { value: 1 }
        );
        assert_eq!(store.get(CounterKind::FriendCount, delta.subject).await.unwrap(), 1);
        assert_eq!(
            store
                .get(CounterKind::FavoritePartyCount, delta.subject)
                .await
                .unwrap(),
            0
        );
    }
}
