use super::outbox::enqueue_event;
use super::pagination::KeysetScan;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

const FAVORITES_PAGE_SIZE: u16 = 10;

pub struct RealFavoriteService {
    favorite_party_repo: Arc<dyn FavoritePartyRepo>,
    outbox_repo: Arc<dyn OutboxRepo>,
    counter_store: Arc<dyn CounterStore>,
    tx_manager: Arc<dyn TxManager>,
}

impl RealFavoriteService {
    pub fn new(
        favorite_party_repo: Arc<dyn FavoritePartyRepo>,
        outbox_repo: Arc<dyn OutboxRepo>,
        counter_store: Arc<dyn CounterStore>,
        tx_manager: Arc<dyn TxManager>,
    ) -> Self {
        Self {
            favorite_party_repo,
            outbox_repo,
            counter_store,
            tx_manager,
        }
    }
}

#[async_trait::async_trait]
impl FavoriteService for RealFavoriteService {
    async fn favor_party(
        &self,
        user_id: UserId,
        party_id: PartyId,
    ) -> Result<FavoriteEdge, RelationError> {
        let edge = FavoriteEdge {
            user_id,
            party_id,
            favorited_at: Utc::now(),
        };

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        let outcome = self
            .favorite_party_repo
            .insert_in_tx(&mut *tx, &edge)
            .await?;
        if !outcome.is_applied() {
            return Err(RelationError::AlreadyExists(format!(
                "party {party_id} is already a favorite of {user_id}"
            )));
        }

        enqueue_event(
            self.outbox_repo.as_ref(),
            &mut *tx,
            RelationEvent::PartyFavorited(FavoritePair { user_id, party_id }),
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        Ok(edge)
    }

    async fn defavor_party(&self, user_id: UserId, party_id: PartyId) -> Result<(), RelationError> {
        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        let outcome = self
            .favorite_party_repo
            .delete_in_tx(&mut *tx, user_id, party_id)
            .await?;
        if outcome.is_applied() {
            enqueue_event(
                self.outbox_repo.as_ref(),
                &mut *tx,
                RelationEvent::PartyUnfavorited(FavoritePair { user_id, party_id }),
            )
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        Ok(())
    }

    async fn get_favorite_parties_by_user(
        &self,
        user_id: UserId,
        cursor: &PageCursor,
        limit: PageSize,
    ) -> Result<Page<FavoriteEdge>, RelationError> {
        let scan = KeysetScan::<PartyId>::open(
            format!("favorites:{user_id}"),
            cursor,
            limit,
            FAVORITES_PAGE_SIZE,
        )?;

        let rows = self
            .favorite_party_repo
            .list_by_user(user_id, scan.after, scan.fetch_limit())
            .await?;

        scan.finish(rows, |edge| edge.party_id)
    }

    async fn get_favorising_users_by_party(
        &self,
        party_id: PartyId,
        cursor: &PageCursor,
        limit: PageSize,
    ) -> Result<Page<FavoriteEdge>, RelationError> {
        let scan = KeysetScan::<UserId>::open(
            format!("favorisers:{party_id}"),
            cursor,
            limit,
            FAVORITES_PAGE_SIZE,
        )?;

        let rows = self
            .favorite_party_repo
            .list_by_party(party_id, scan.after, scan.fetch_limit())
            .await?;

        scan.finish(rows, |edge| edge.user_id)
    }

    async fn get_favorite_party_count(&self, party_id: PartyId) -> Result<i64, RelationError> {
        Ok(self
            .counter_store
            .get(CounterKind::FavoritePartyCount, party_id.0)
            .await?)
    }

    async fn get_many_favorite_party_count(
        &self,
        party_ids: &[PartyId],
    ) -> Result<HashMap<PartyId, i64>, RelationError> {
        let subjects: Vec<uuid::Uuid> = party_ids.iter().map(|id| id.0).collect();
        let counts = self
            .counter_store
            .get_many(CounterKind::FavoritePartyCount, &subjects)
            .await?;

        Ok(party_ids.iter().copied().zip(counts).collect())
    }
}
