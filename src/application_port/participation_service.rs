use crate::application_port::RelationError;
use crate::domain_model::*;
use std::time::Duration;

#[async_trait::async_trait]
pub trait ParticipationService: Send + Sync {
    async fn invite(
        &self,
        user_id: UserId,
        inviter_id: UserId,
        party_id: PartyId,
        valid_for: Duration,
    ) -> Result<PartyInvite, RelationError>;
    async fn decline(&self, user_id: UserId, party_id: PartyId) -> Result<(), RelationError>;
    /// Consumes a live invite and joins the party in one atomic batch.
    async fn accept(
        &self,
        user_id: UserId,
        party_id: PartyId,
    ) -> Result<PartyParticipant, RelationError>;
    async fn join(
        &self,
        user_id: UserId,
        party_id: PartyId,
    ) -> Result<PartyParticipant, RelationError>;
    async fn leave(&self, user_id: UserId, party_id: PartyId) -> Result<(), RelationError>;
    async fn get_user_invites(
        &self,
        user_id: UserId,
        cursor: &PageCursor,
        limit: PageSize,
    ) -> Result<Page<PartyInvite>, RelationError>;
    async fn get_party_participants(
        &self,
        party_id: PartyId,
        cursor: &PageCursor,
        limit: PageSize,
    ) -> Result<Page<PartyParticipant>, RelationError>;
    async fn get_user_parties(
        &self,
        user_id: UserId,
        cursor: &PageCursor,
        limit: PageSize,
    ) -> Result<Page<PartyParticipant>, RelationError>;
}
