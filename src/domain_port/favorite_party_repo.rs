use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::{StorageTx, WriteOutcome};

#[async_trait::async_trait]
pub trait FavoritePartyRepo: Send + Sync {
    async fn insert_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        edge: &FavoriteEdge,
    ) -> Result<WriteOutcome, RelationError>;
    async fn delete_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        user_id: UserId,
        party_id: PartyId,
    ) -> Result<WriteOutcome, RelationError>;
    async fn list_by_user(
        &self,
        user_id: UserId,
        after: Option<PartyId>,
        limit: u32,
    ) -> Result<Vec<FavoriteEdge>, RelationError>;
    async fn list_by_party(
        &self,
        party_id: PartyId,
        after: Option<UserId>,
        limit: u32,
    ) -> Result<Vec<FavoriteEdge>, RelationError>;
}
