use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::{StorageTx, WriteOutcome};
use chrono::{DateTime, Utc};

#[async_trait::async_trait]
pub trait FriendRelationRepo: Send + Sync {
    /// Insert-if-absent on `(owner, peer)`, also rejected while the reverse edge
    /// `(peer, owner)` exists: a pair holds at most one pending request.
    async fn insert_pending_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        edge: &FriendEdge,
    ) -> Result<WriteOutcome, RelationError>;
    /// Compare-and-set `accepted: false -> true`.
    async fn accept_pending_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        owner: UserId,
        peer: UserId,
        accepted_at: DateTime<Utc>,
    ) -> Result<WriteOutcome, RelationError>;
    /// Idempotent: writing the same accepted edge twice leaves one row.
    async fn upsert_accepted_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        edge: &FriendEdge,
    ) -> Result<(), RelationError>;
    /// Removes the edge only while it is still pending.
    async fn delete_pending_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        owner: UserId,
        peer: UserId,
    ) -> Result<WriteOutcome, RelationError>;
    async fn delete_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        owner: UserId,
        peer: UserId,
    ) -> Result<WriteOutcome, RelationError>;
    async fn get(&self, owner: UserId, peer: UserId) -> Result<Option<FriendEdge>, RelationError>;
    /// Partition scan over `owner` ordered by peer id, resuming strictly after `after`.
    async fn list_by_owner(
        &self,
        owner: UserId,
        accepted: bool,
        after: Option<UserId>,
        limit: u32,
    ) -> Result<Vec<FriendEdge>, RelationError>;
}
