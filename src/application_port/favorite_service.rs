use crate::application_port::RelationError;
use crate::domain_model::*;
use std::collections::HashMap;

#[async_trait::async_trait]
pub trait FavoriteService: Send + Sync {
    async fn favor_party(
        &self,
        user_id: UserId,
        party_id: PartyId,
    ) -> Result<FavoriteEdge, RelationError>;
    async fn defavor_party(&self, user_id: UserId, party_id: PartyId) -> Result<(), RelationError>;
    async fn get_favorite_parties_by_user(
        &self,
        user_id: UserId,
        cursor: &PageCursor,
        limit: PageSize,
    ) -> Result<Page<FavoriteEdge>, RelationError>;
    async fn get_favorising_users_by_party(
        &self,
        party_id: PartyId,
        cursor: &PageCursor,
        limit: PageSize,
    ) -> Result<Page<FavoriteEdge>, RelationError>;
    async fn get_favorite_party_count(&self, party_id: PartyId) -> Result<i64, RelationError>;
    async fn get_many_favorite_party_count(
        &self,
        party_ids: &[PartyId],
    ) -> Result<HashMap<PartyId, i64>, RelationError>;
}
