//! In-process tables behind one async mutex.
//!
//! A transaction holds the mutex for its whole lifetime, which serializes every batch and
//! gives the same isolation the row locks give on MySQL. The tables are snapshotted when a
//! transaction begins; dropping it without `commit` puts the snapshot back.

use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub(crate) struct OutboxRow {
    pub event: OutboxEvent,
    pub next_attempt_at: DateTime<Utc>,
    pub attempt_count: u32,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryTables {
    pub friend_relations: BTreeMap<(UserId, UserId), FriendEdge>,
    pub favorite_parties: BTreeMap<(UserId, PartyId), FavoriteEdge>,
    /// Secondary index for the by-party favorite listing.
    pub favorite_parties_by_party: BTreeMap<(PartyId, UserId), FavoriteEdge>,
    pub party_invites: BTreeMap<(UserId, PartyId), PartyInvite>,
    pub party_participants: BTreeMap<(PartyId, UserId), PartyParticipant>,
    /// Secondary index for the by-user participation listing.
    pub party_participants_by_user: BTreeMap<(UserId, PartyId), PartyParticipant>,
    /// Undelivered events only; delivery removes the row.
    pub outbox: Vec<OutboxRow>,
}

#[derive(Default)]
pub struct MemoryDatabase {
    tables: Mutex<MemoryTables>,
}

impl MemoryDatabase {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Pool-level access for reads outside a transaction. Never call it while the same task
    /// holds a `MemoryTx`.
    pub(crate) async fn tables(&self) -> MutexGuard<'_, MemoryTables> {
        self.tables.lock().await
    }
}

pub struct MemoryTxManager {
    db: Arc<MemoryDatabase>,
}

impl MemoryTxManager {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        MemoryTxManager { db }
    }
}

#[async_trait::async_trait]
impl TxManager for MemoryTxManager {
    async fn begin<'t>(&'t self) -> anyhow::Result<Box<dyn StorageTx<'t> + 't>> {
        let guard = self.db.tables.lock().await;
        let snapshot = guard.clone();
        Ok(Box::new(MemoryTx {
            guard,
            snapshot: Some(snapshot),
        }))
    }
}

pub struct MemoryTx<'t> {
    guard: MutexGuard<'t, MemoryTables>,
    snapshot: Option<MemoryTables>,
}

impl MemoryTx<'_> {
    pub(crate) fn tables(&mut self) -> &mut MemoryTables {
        &mut self.guard
    }
}

impl Drop for MemoryTx<'_> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.guard = snapshot;
        }
    }
}

#[async_trait::async_trait]
impl<'t> StorageTx<'t> for MemoryTx<'t> {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Memory
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        let mut this = self;
        this.snapshot = None;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }
}

pub(crate) fn downcast<'a, 't>(
    tx: &'a mut dyn StorageTx<'t>,
) -> anyhow::Result<&'a mut MemoryTx<'t>> {
    if tx.backend() != StoreBackend::Memory {
        anyhow::bail!(
            "memory repository handed a {:?} transaction",
            tx.backend()
        );
    }

    // SAFETY: `MemoryTx` is the only `StorageTx` reporting `StoreBackend::Memory`.
    unsafe {
        let p = tx as *mut dyn StorageTx<'t>;
        let p = p as *mut MemoryTx<'t>;
        Ok(&mut *p)
    }
}

/// Keyset scan over one partition of a `(partition, sort)` keyed table: rows of `partition`
/// with sort key strictly greater than `after`, ascending, at most `limit` of them.
pub(crate) fn scan_partition<P, S, V>(
    table: &BTreeMap<(P, S), V>,
    partition: P,
    after: Option<S>,
    lowest: S,
    keep: impl Fn(&V) -> bool,
    limit: u32,
) -> Vec<V>
where
    P: Ord + Copy,
    S: Ord + Copy,
    V: Clone,
{
    let start = match after {
        Some(after) => Bound::Excluded((partition, after)),
        None => Bound::Included((partition, lowest)),
    };

    table
        .range((start, Bound::Unbounded))
        .take_while(|((p, _), _)| *p == partition)
        .map(|(_, v)| v)
        .filter(|v| keep(v))
        .take(limit as usize)
        .cloned()
        .collect()
}

pub(crate) const LOWEST_USER: UserId = UserId(uuid::Uuid::nil());
pub(crate) const LOWEST_PARTY: PartyId = PartyId(uuid::Uuid::nil());

#[cfg(test)]
mod tests {
    use super::*;

    fn user(n: u128) -> UserId {
        UserId(uuid::Uuid::from_u128(n))
    }

    #[tokio::test]
    async fn dropped_transaction_leaves_no_trace() {
        let db = MemoryDatabase::new();
        let tx_manager = MemoryTxManager::new(db.clone());

        {
            let mut tx = tx_manager.begin().await.unwrap();
            let edge = FriendEdge::pending(user(1), user(2), Utc::now());
            downcast(&mut *tx)
                .unwrap()
                .tables()
                .friend_relations
                .insert((edge.owner, edge.peer), edge);
        }

        assert!(db.tables().await.friend_relations.is_empty());

        let mut tx = tx_manager.begin().await.unwrap();
        let edge = FriendEdge::pending(user(1), user(2), Utc::now());
        downcast(&mut *tx)
            .unwrap()
            .tables()
            .friend_relations
            .insert((edge.owner, edge.peer), edge);
        tx.commit().await.unwrap();

        assert_eq!(db.tables().await.friend_relations.len(), 1);
    }

    #[test]
    fn scan_stays_inside_the_partition() {
        let mut table = BTreeMap::new();
        for (p, s) in [(1, 1), (1, 2), (1, 3), (2, 1)] {
            table.insert((user(p), user(s)), (p, s));
        }

        let rows = scan_partition(&table, user(1), Some(user(1)), LOWEST_USER, |_| true, 10);
        assert_eq!(rows, vec![(1, 2), (1, 3)]);

        let rows = scan_partition(&table, user(1), None, LOWEST_USER, |_| true, 2);
        assert_eq!(rows, vec![(1, 1), (1, 2)]);
    }
}
