use super::database::{LOWEST_PARTY, LOWEST_USER, MemoryDatabase, downcast, scan_partition};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct MemoryPartyParticipationRepo {
    db: Arc<MemoryDatabase>,
}

impl MemoryPartyParticipationRepo {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        MemoryPartyParticipationRepo { db }
    }
}

#[async_trait::async_trait]
impl PartyParticipationRepo for MemoryPartyParticipationRepo {
    async fn insert_invite_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        invite: &PartyInvite,
        now: DateTime<Utc>,
    ) -> Result<WriteOutcome, RelationError> {
        let tables = downcast(tx)?.tables();

        let key = (invite.user_id, invite.party_id);
        if let Some(existing) = tables.party_invites.get(&key) {
            if existing.is_live_at(now) {
                return Ok(WriteOutcome::Rejected);
            }
        }
        tables.party_invites.insert(key, invite.clone());

        Ok(WriteOutcome::Applied)
    }

    async fn delete_invite_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        user_id: UserId,
        party_id: PartyId,
    ) -> Result<WriteOutcome, RelationError> {
        let tables = downcast(tx)?.tables();

        let removed = tables.party_invites.remove(&(user_id, party_id));
        Ok(WriteOutcome::from_rows_affected(removed.is_some() as u64))
    }

    async fn take_live_invite_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        user_id: UserId,
        party_id: PartyId,
        now: DateTime<Utc>,
    ) -> Result<WriteOutcome, RelationError> {
        let tables = downcast(tx)?.tables();

        let key = (user_id, party_id);
        match tables.party_invites.get(&key) {
            Some(invite) if invite.is_live_at(now) => {
                tables.party_invites.remove(&key);
                Ok(WriteOutcome::Applied)
            }
            _ => Ok(WriteOutcome::Rejected),
        }
    }

    async fn insert_participant_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        participant: &PartyParticipant,
    ) -> Result<WriteOutcome, RelationError> {
        let tables = downcast(tx)?.tables();

        let key = (participant.party_id, participant.user_id);
        if tables.party_participants.contains_key(&key) {
            return Ok(WriteOutcome::Rejected);
        }
        tables.party_participants.insert(key, participant.clone());
        tables
            .party_participants_by_user
            .insert((participant.user_id, participant.party_id), participant.clone());

        Ok(WriteOutcome::Applied)
    }

    async fn delete_participant_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        party_id: PartyId,
        user_id: UserId,
    ) -> Result<WriteOutcome, RelationError> {
        let tables = downcast(tx)?.tables();

        let removed = tables.party_participants.remove(&(party_id, user_id));
        tables.party_participants_by_user.remove(&(user_id, party_id));

        Ok(WriteOutcome::from_rows_affected(removed.is_some() as u64))
    }

    async fn list_invites_by_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        after: Option<PartyId>,
        limit: u32,
    ) -> Result<Vec<PartyInvite>, RelationError> {
        let tables = self.db.tables().await;
        Ok(scan_partition(
            &tables.party_invites,
            user_id,
            after,
            LOWEST_PARTY,
            |invite| invite.is_live_at(now),
            limit,
        ))
    }

    async fn list_participants_by_party(
        &self,
        party_id: PartyId,
        after: Option<UserId>,
        limit: u32,
    ) -> Result<Vec<PartyParticipant>, RelationError> {
        let tables = self.db.tables().await;
        Ok(scan_partition(
            &tables.party_participants,
            party_id,
            after,
            LOWEST_USER,
            |_| true,
            limit,
        ))
    }

    async fn list_parties_by_user(
        &self,
        user_id: UserId,
        after: Option<PartyId>,
        limit: u32,
    ) -> Result<Vec<PartyParticipant>, RelationError> {
        let tables = self.db.tables().await;
        Ok(scan_partition(
            &tables.party_participants_by_user,
            user_id,
            after,
            LOWEST_PARTY,
            |_| true,
            limit,
        ))
    }

    async fn purge_expired_invites(&self, now: DateTime<Utc>) -> Result<u64, RelationError> {
        let mut tables = self.db.tables().await;

        let before = tables.party_invites.len();
        tables.party_invites.retain(|_, invite| invite.is_live_at(now));

        Ok((before - tables.party_invites.len()) as u64)
    }
}
