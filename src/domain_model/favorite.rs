use crate::domain_model::{PartyId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoriteEdge {
    pub user_id: UserId,
    pub party_id: PartyId,
    pub favorited_at: DateTime<Utc>,
}
