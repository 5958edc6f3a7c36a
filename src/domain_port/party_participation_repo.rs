use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::{StorageTx, WriteOutcome};
use chrono::{DateTime, Utc};

#[async_trait::async_trait]
pub trait PartyParticipationRepo: Send + Sync {
    /// Insert-if-absent on `(user, party)`. An invite that expired before `now` counts as
    /// absent and is replaced.
    async fn insert_invite_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        invite: &PartyInvite,
        now: DateTime<Utc>,
    ) -> Result<WriteOutcome, RelationError>;
    async fn delete_invite_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        user_id: UserId,
        party_id: PartyId,
    ) -> Result<WriteOutcome, RelationError>;
    /// Deletes the invite only if it is still live at `now`.
    async fn take_live_invite_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        user_id: UserId,
        party_id: PartyId,
        now: DateTime<Utc>,
    ) -> Result<WriteOutcome, RelationError>;
    async fn insert_participant_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        participant: &PartyParticipant,
    ) -> Result<WriteOutcome, RelationError>;
    async fn delete_participant_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        party_id: PartyId,
        user_id: UserId,
    ) -> Result<WriteOutcome, RelationError>;
    async fn list_invites_by_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        after: Option<PartyId>,
        limit: u32,
    ) -> Result<Vec<PartyInvite>, RelationError>;
    async fn list_participants_by_party(
        &self,
        party_id: PartyId,
        after: Option<UserId>,
        limit: u32,
    ) -> Result<Vec<PartyParticipant>, RelationError>;
    async fn list_parties_by_user(
        &self,
        user_id: UserId,
        after: Option<PartyId>,
        limit: u32,
    ) -> Result<Vec<PartyParticipant>, RelationError>;
    /// Physically removes invites that expired before `now`. Returns how many went away.
    async fn purge_expired_invites(&self, now: DateTime<Utc>) -> Result<u64, RelationError>;
}
