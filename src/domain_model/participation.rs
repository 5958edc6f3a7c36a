use crate::domain_model::{PartyId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartyInvite {
    pub user_id: UserId,
    pub inviter_id: UserId,
    pub party_id: PartyId,
    pub valid_until: DateTime<Utc>,
}

impl PartyInvite {
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.valid_until > now
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartyParticipant {
    pub party_id: PartyId,
    pub user_id: UserId,
    pub joined_at: DateTime<Utc>,
}
