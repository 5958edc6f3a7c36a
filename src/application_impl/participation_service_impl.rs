use super::pagination::KeysetScan;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const PARTICIPATION_PAGE_SIZE: u16 = 20;

pub struct RealParticipationService {
    party_participation_repo: Arc<dyn PartyParticipationRepo>,
    tx_manager: Arc<dyn TxManager>,
}

impl RealParticipationService {
    pub fn new(
        party_participation_repo: Arc<dyn PartyParticipationRepo>,
        tx_manager: Arc<dyn TxManager>,
    ) -> Self {
        Self {
            party_participation_repo,
            tx_manager,
        }
    }
}

#[async_trait::async_trait]
impl ParticipationService for RealParticipationService {
    async fn invite(
        &self,
        user_id: UserId,
        inviter_id: UserId,
        party_id: PartyId,
        valid_for: Duration,
    ) -> Result<PartyInvite, RelationError> {
        if valid_for.is_zero() {
            return Err(RelationError::InvalidArgument(
                "invite validity must be positive".to_string(),
            ));
        }
        let valid_for = chrono::Duration::from_std(valid_for)
            .map_err(|e| RelationError::InvalidArgument(format!("invite validity: {e}")))?;

        let now = Utc::now();
        let invite = PartyInvite {
            user_id,
            inviter_id,
            party_id,
            valid_until: now + valid_for,
        };

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        let outcome = self
            .party_participation_repo
            .insert_invite_in_tx(&mut *tx, &invite, now)
            .await?;
        if !outcome.is_applied() {
            return Err(RelationError::AlreadyExists(format!(
                "{user_id} already holds a live invite to party {party_id}"
            )));
        }

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        Ok(invite)
    }

    async fn decline(&self, user_id: UserId, party_id: PartyId) -> Result<(), RelationError> {
        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        self.party_participation_repo
            .delete_invite_in_tx(&mut *tx, user_id, party_id)
            .await?;

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        Ok(())
    }

    async fn accept(
        &self,
        user_id: UserId,
        party_id: PartyId,
    ) -> Result<PartyParticipant, RelationError> {
        let now = Utc::now();
        let participant = PartyParticipant {
            party_id,
            user_id,
            joined_at: now,
        };

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        let taken = self
            .party_participation_repo
            .take_live_invite_in_tx(&mut *tx, user_id, party_id, now)
            .await?;
        if !taken.is_applied() {
            return Err(RelationError::FailedPrecondition(format!(
                "{user_id} holds no live invite to party {party_id}"
            )));
        }

        let joined = self
            .party_participation_repo
            .insert_participant_in_tx(&mut *tx, &participant)
            .await?;
        if !joined.is_applied() {
            // dropping the tx puts the invite back
            debug!(%user_id, %party_id, "accept rejected: already a participant");
            return Err(RelationError::AlreadyExists(format!(
                "{user_id} already participates in party {party_id}"
            )));
        }

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        Ok(participant)
    }

    async fn join(
        &self,
        user_id: UserId,
        party_id: PartyId,
    ) -> Result<PartyParticipant, RelationError> {
        let participant = PartyParticipant {
            party_id,
            user_id,
            joined_at: Utc::now(),
        };

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        let outcome = self
            .party_participation_repo
            .insert_participant_in_tx(&mut *tx, &participant)
            .await?;
        if !outcome.is_applied() {
            return Err(RelationError::AlreadyExists(format!(
                "{user_id} already participates in party {party_id}"
            )));
        }

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        Ok(participant)
    }

    async fn leave(&self, user_id: UserId, party_id: PartyId) -> Result<(), RelationError> {
        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        self.party_participation_repo
            .delete_participant_in_tx(&mut *tx, party_id, user_id)
            .await?;

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        Ok(())
    }

    async fn get_user_invites(
        &self,
        user_id: UserId,
        cursor: &PageCursor,
        limit: PageSize,
    ) -> Result<Page<PartyInvite>, RelationError> {
        let scan = KeysetScan::<PartyId>::open(
            format!("invites:{user_id}"),
            cursor,
            limit,
            PARTICIPATION_PAGE_SIZE,
        )?;

        let rows = self
            .party_participation_repo
            .list_invites_by_user(user_id, Utc::now(), scan.after, scan.fetch_limit())
            .await?;

        scan.finish(rows, |invite| invite.party_id)
    }

    async fn get_party_participants(
        &self,
        party_id: PartyId,
        cursor: &PageCursor,
        limit: PageSize,
    ) -> Result<Page<PartyParticipant>, RelationError> {
        let scan = KeysetScan::<UserId>::open(
            format!("participants:{party_id}"),
            cursor,
            limit,
            PARTICIPATION_PAGE_SIZE,
        )?;

        let rows = self
            .party_participation_repo
            .list_participants_by_party(party_id, scan.after, scan.fetch_limit())
            .await?;

        scan.finish(rows, |participant| participant.user_id)
    }

    async fn get_user_parties(
        &self,
        user_id: UserId,
        cursor: &PageCursor,
        limit: PageSize,
    ) -> Result<Page<PartyParticipant>, RelationError> {
        let scan = KeysetScan::<PartyId>::open(
            format!("parties:{user_id}"),
            cursor,
            limit,
            PARTICIPATION_PAGE_SIZE,
        )?;

        let rows = self
            .party_participation_repo
            .list_parties_by_user(user_id, scan.after, scan.fetch_limit())
            .await?;

        scan.finish(rows, |participant| participant.party_id)
    }
}
