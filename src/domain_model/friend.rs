use crate::domain_model::UserId;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One direction of a friendship, stored in the owner's partition.
///
/// A pending request is a single edge owned by the recipient (`owner`) pointing at the
/// requester (`peer`). An accepted friendship is two edges, one per direction, both with
/// `accepted == true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FriendEdge {
    pub owner: UserId,
    pub peer: UserId,
    pub accepted: bool,
    pub requested_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl FriendEdge {
    pub fn pending(owner: UserId, peer: UserId, requested_at: DateTime<Utc>) -> Self {
        Self {
            owner,
            peer,
            accepted: false,
            requested_at,
            accepted_at: None,
        }
    }

    pub fn accepted(owner: UserId, peer: UserId, at: DateTime<Utc>) -> Self {
        Self {
            owner,
            peer,
            accepted: true,
            requested_at: at,
            accepted_at: Some(at),
        }
    }
}
