use super::database::{LOWEST_PARTY, LOWEST_USER, MemoryDatabase, downcast, scan_partition};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;

pub struct MemoryFavoritePartyRepo {
    db: Arc<MemoryDatabase>,
}

impl MemoryFavoritePartyRepo {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        MemoryFavoritePartyRepo { db }
    }
}

#[async_trait::async_trait]
impl FavoritePartyRepo for MemoryFavoritePartyRepo {
    async fn insert_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        edge: &FavoriteEdge,
    ) -> Result<WriteOutcome, RelationError> {
        let tables = downcast(tx)?.tables();

        let key = (edge.user_id, edge.party_id);
        if tables.favorite_parties.contains_key(&key) {
            return Ok(WriteOutcome::Rejected);
        }
        tables.favorite_parties.insert(key, edge.clone());
        tables
            .favorite_parties_by_party
            .insert((edge.party_id, edge.user_id), edge.clone());

        Ok(WriteOutcome::Applied)
    }

    async fn delete_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        user_id: UserId,
        party_id: PartyId,
    ) -> Result<WriteOutcome, RelationError> {
        let tables = downcast(tx)?.tables();

        let removed = tables.favorite_parties.remove(&(user_id, party_id));
        tables.favorite_parties_by_party.remove(&(party_id, user_id));

        Ok(WriteOutcome::from_rows_affected(removed.is_some() as u64))
    }

    async fn list_by_user(
        &self,
        user_id: UserId,
        after: Option<PartyId>,
        limit: u32,
    ) -> Result<Vec<FavoriteEdge>, RelationError> {
        let tables = self.db.tables().await;
        Ok(scan_partition(
            &tables.favorite_parties,
            user_id,
            after,
            LOWEST_PARTY,
            |_| true,
            limit,
        ))
    }

    async fn list_by_party(
        &self,
        party_id: PartyId,
        after: Option<UserId>,
        limit: u32,
    ) -> Result<Vec<FavoriteEdge>, RelationError> {
        let tables = self.db.tables().await;
        Ok(scan_partition(
            &tables.favorite_parties_by_party,
            party_id,
            after,
            LOWEST_USER,
            |_| true,
            limit,
        ))
    }
}
