use crate::domain_model::*;
use crate::domain_port::*;
use anyhow::anyhow;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};

const COUNTER_APPLY: &str = include_str!("counter_apply.lua");

pub struct RedisCounterStore {
    conn: ConnectionManager,
    prefix: String,
    dedupe_ttl_secs: u64,
    apply_script: Script,
}

impl RedisCounterStore {
    pub fn new(conn: ConnectionManager, prefix: String, dedupe_ttl_secs: u64) -> Self {
        RedisCounterStore {
            conn,
            prefix,
            dedupe_ttl_secs,
            apply_script: Script::new(COUNTER_APPLY),
        }
    }

    fn counter_key(&self, kind: CounterKind, subject: uuid::Uuid) -> String {
        format!("{}:{}:{}", self.prefix, kind.as_str(), subject)
    }

    fn dedupe_key(&self, event_id: EventId, delta: &CounterDelta) -> String {
        format!(
            "{}:applied:{}:{}:{}",
            self.prefix,
            event_id,
            delta.kind.as_str(),
            delta.subject
        )
    }
}

#[async_trait::async_trait]
impl CounterStore for RedisCounterStore {
    async fn apply_once(
        &self,
        event_id: EventId,
        delta: CounterDelta,
    ) -> anyhow::Result<ApplyOutcome> {
        let mut conn = self.conn.clone();
        let (status, value): (i64, i64) = self
            .apply_script
            .key(self.counter_key(delta.kind, delta.subject))
            .key(self.dedupe_key(event_id, &delta))
            .arg(delta.delta)
            .arg(self.dedupe_ttl_secs)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| anyhow!("apply counter delta: {e}"))?;

        match status {
            1 => Ok(ApplyOutcome::Applied { value }),
            0 => Ok(ApplyOutcome::Duplicate { value }),
            _ => Err(anyhow!("unknown script status {status}")),
        }
    }

    async fn get(&self, kind: CounterKind, subject: uuid::Uuid) -> anyhow::Result<i64> {
        let mut conn = self.conn.clone();
        let value: Option<i64> = conn
            .get(self.counter_key(kind, subject))
            .await
            .map_err(|e| anyhow!("read counter: {e}"))?;

        Ok(value.unwrap_or(0))
    }

    async fn get_many(
        &self,
        kind: CounterKind,
        subjects: &[uuid::Uuid],
    ) -> anyhow::Result<Vec<i64>> {
        if subjects.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = subjects
            .iter()
            .map(|subject| self.counter_key(kind, *subject))
            .collect();

        let mut conn = self.conn.clone();
        let values: Vec<Option<i64>> = conn
            .mget(&keys)
            .await
            .map_err(|e| anyhow!("read counters: {e}"))?;

        Ok(values.into_iter().map(|v| v.unwrap_or(0)).collect())
    }
}
