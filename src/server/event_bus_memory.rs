//! In-process stand-in for the broker: one append-only log shared by all topics, with a
//! committed position per consumer group. Records every known group has committed past are
//! trimmed, so offsets stay absolute while the retained log shrinks.

use crate::server::{
    EventConsumer, EventHandler, EventPublisher, HandleOutcome, MAX_DELIVERY_ATTEMPTS,
};
use anyhow::anyhow;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
struct BusRecord {
    topic: String,
    payload: Vec<u8>,
}

#[derive(Default)]
struct EventLog {
    /// Absolute offset of `records[0]`.
    base: usize,
    records: VecDeque<BusRecord>,
    committed: HashMap<String, usize>,
}

impl EventLog {
    fn end(&self) -> usize {
        self.base + self.records.len()
    }

    fn trim(&mut self) {
        let Some(floor) = self.committed.values().min().copied() else {
            return;
        };
        while self.base < floor && self.records.pop_front().is_some() {
            self.base += 1;
        }
    }
}

pub struct MemoryEventBus {
    log: Mutex<EventLog>,
    length: watch::Sender<usize>,
    cancellation_token: CancellationToken,
}

impl MemoryEventBus {
    pub fn new(cancellation_token: CancellationToken) -> Self {
        let (length, _) = watch::channel(0);
        Self {
            log: Mutex::new(EventLog::default()),
            length,
            cancellation_token,
        }
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, EventLog>> {
        self.log.lock().map_err(|_| anyhow!("event log poisoned"))
    }

    /// Log offset the group resumes from. A group that never consumed starts at the oldest
    /// retained record.
    pub fn committed_offset(&self, consumer_group_id: &str) -> usize {
        self.lock()
            .map(|log| {
                log.committed
                    .get(consumer_group_id)
                    .copied()
                    .unwrap_or(log.base)
            })
            .unwrap_or(0)
    }

    /// Records still held in memory.
    pub fn retained_len(&self) -> usize {
        self.lock().map(|log| log.records.len()).unwrap_or(0)
    }

    fn join(&self, consumer_group_id: &str) -> anyhow::Result<usize> {
        let mut log = self.lock()?;
        let base = log.base;
        Ok(*log
            .committed
            .entry(consumer_group_id.to_owned())
            .or_insert(base))
    }

    fn commit(&self, consumer_group_id: &str, offset: usize) -> anyhow::Result<()> {
        let mut log = self.lock()?;
        log.committed.insert(consumer_group_id.to_owned(), offset);
        log.trim();
        Ok(())
    }

    fn record_at(&self, offset: usize) -> anyhow::Result<BusRecord> {
        let log = self.lock()?;
        offset
            .checked_sub(log.base)
            .and_then(|index| log.records.get(index))
            .cloned()
            .ok_or_else(|| anyhow!("no record at offset {offset}"))
    }
}

#[async_trait::async_trait]
impl EventPublisher for MemoryEventBus {
    async fn publish(&self, topic: &str, _key: &[u8], payload: &[u8]) -> anyhow::Result<()> {
        let end = {
            let mut log = self.lock()?;
            log.records.push_back(BusRecord {
                topic: topic.to_owned(),
                payload: payload.to_vec(),
            });
            log.end()
        };
        self.length.send_replace(end);
        Ok(())
    }
}

#[async_trait::async_trait]
impl EventConsumer for MemoryEventBus {
    async fn run(
        &self,
        consumer_group_id: &str,
        topics: &[&str],
        handler: Arc<dyn EventHandler>,
    ) -> anyhow::Result<()> {
        let topics: HashSet<&str> = topics.iter().copied().collect();
        let mut position = self.join(consumer_group_id)?;
        let mut length = self.length.subscribe();
        info!(group = consumer_group_id, position, "memory consumer started");

        'consume: loop {
            let available = *length.borrow_and_update();
            let mut attempts = 0;

            while position < available {
                if self.cancellation_token.is_cancelled() {
                    break 'consume;
                }

                let record = self.record_at(position)?;
                if !topics.contains(record.topic.as_str()) {
                    position += 1;
                    continue;
                }

                let handled = match handler.handle(&record.payload).await {
                    Ok(HandleOutcome::Commit) => true,
                    Ok(HandleOutcome::Retry) => {
                        debug!(topic = %record.topic, position, "handler asked for redelivery");
                        false
                    }
                    Err(e) => {
                        error!(error = ?e, topic = %record.topic, position, "handler error");
                        false
                    }
                };

                attempts += 1;
                if !handled {
                    if attempts < MAX_DELIVERY_ATTEMPTS {
                        tokio::time::sleep(Duration::from_millis(50 * u64::from(attempts))).await;
                        continue;
                    }
                    error!(
                        topic = %record.topic,
                        position,
                        attempts,
                        "delivery attempts exhausted, message dropped"
                    );
                }

                attempts = 0;
                position += 1;
                self.commit(consumer_group_id, position)?;
            }

            tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => break,
                changed = length.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!(group = consumer_group_id, position, "memory consumer shutting down...");
        Ok(())
    }
}
