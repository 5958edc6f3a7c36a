use super::database::{LOWEST_USER, MemoryDatabase, downcast, scan_partition};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use std::collections::btree_map::Entry;
use std::sync::Arc;

pub struct MemoryFriendRelationRepo {
    db: Arc<MemoryDatabase>,
}

impl MemoryFriendRelationRepo {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        MemoryFriendRelationRepo { db }
    }
}

#[async_trait::async_trait]
impl FriendRelationRepo for MemoryFriendRelationRepo {
    async fn insert_pending_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        edge: &FriendEdge,
    ) -> Result<WriteOutcome, RelationError> {
        let tables = downcast(tx)?.tables();

        if tables.friend_relations.contains_key(&(edge.peer, edge.owner)) {
            return Ok(WriteOutcome::Rejected);
        }
        match tables.friend_relations.entry((edge.owner, edge.peer)) {
            Entry::Occupied(_) => Ok(WriteOutcome::Rejected),
            Entry::Vacant(slot) => {
                slot.insert(FriendEdge::pending(edge.owner, edge.peer, edge.requested_at));
                Ok(WriteOutcome::Applied)
            }
        }
    }

    async fn accept_pending_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        owner: UserId,
        peer: UserId,
        accepted_at: DateTime<Utc>,
    ) -> Result<WriteOutcome, RelationError> {
        let tables = downcast(tx)?.tables();

        match tables.friend_relations.get_mut(&(owner, peer)) {
            Some(edge) if !edge.accepted => {
                edge.accepted = true;
                edge.accepted_at = Some(accepted_at);
                Ok(WriteOutcome::Applied)
            }
            _ => Ok(WriteOutcome::Rejected),
        }
    }

    async fn upsert_accepted_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        edge: &FriendEdge,
    ) -> Result<(), RelationError> {
        let tables = downcast(tx)?.tables();

        tables
            .friend_relations
            .entry((edge.owner, edge.peer))
            .and_modify(|existing| {
                existing.accepted = true;
                existing.accepted_at = edge.accepted_at;
            })
            .or_insert_with(|| edge.clone());

        Ok(())
    }

    async fn delete_pending_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        owner: UserId,
        peer: UserId,
    ) -> Result<WriteOutcome, RelationError> {
        let tables = downcast(tx)?.tables();

        match tables.friend_relations.entry((owner, peer)) {
            Entry::Occupied(slot) if !slot.get().accepted => {
                slot.remove();
                Ok(WriteOutcome::Applied)
            }
            _ => Ok(WriteOutcome::Rejected),
        }
    }

    async fn delete_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        owner: UserId,
        peer: UserId,
    ) -> Result<WriteOutcome, RelationError> {
        let tables = downcast(tx)?.tables();

        let removed = tables.friend_relations.remove(&(owner, peer));
        Ok(WriteOutcome::from_rows_affected(removed.is_some() as u64))
    }

    async fn get(&self, owner: UserId, peer: UserId) -> Result<Option<FriendEdge>, RelationError> {
        let tables = self.db.tables().await;
        Ok(tables.friend_relations.get(&(owner, peer)).cloned())
    }

    async fn list_by_owner(
        &self,
        owner: UserId,
        accepted: bool,
        after: Option<UserId>,
        limit: u32,
    ) -> Result<Vec<FriendEdge>, RelationError> {
        let tables = self.db.tables().await;
        Ok(scan_partition(
            &tables.friend_relations,
            owner,
            after,
            LOWEST_USER,
            |edge| edge.accepted == accepted,
            limit,
        ))
    }
}
