use crate::domain_model::{PartyId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct EventId(pub uuid::Uuid);

impl EventId {
    pub fn new_random() -> Self {
        EventId(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "relation.friend.requested")]
    FriendRequested,
    #[serde(rename = "relation.friend.accepted")]
    FriendAccepted,
    #[serde(rename = "relation.friend.removed")]
    FriendRemoved,
    #[serde(rename = "relation.party.favorited")]
    PartyFavorited,
    #[serde(rename = "relation.party.unfavorited")]
    PartyUnfavorited,
}

impl EventType {
    pub const ALL: [EventType; 5] = [
        EventType::FriendRequested,
        EventType::FriendAccepted,
        EventType::FriendRemoved,
        EventType::PartyFavorited,
        EventType::PartyUnfavorited,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::FriendRequested => "relation.friend.requested",
            EventType::FriendAccepted => "relation.friend.accepted",
            EventType::FriendRemoved => "relation.friend.removed",
            EventType::PartyFavorited => "relation.party.favorited",
            EventType::PartyUnfavorited => "relation.party.unfavorited",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown event type: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendPair {
    pub user_id: UserId,
    pub friend_id: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritePair {
    pub user_id: UserId,
    pub party_id: PartyId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum RelationEvent {
    FriendRequested(FriendPair),
    FriendAccepted(FriendPair),
    FriendRemoved(FriendPair),
    PartyFavorited(FavoritePair),
    PartyUnfavorited(FavoritePair),
}

impl RelationEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            RelationEvent::FriendRequested(_) => EventType::FriendRequested,
            RelationEvent::FriendAccepted(_) => EventType::FriendAccepted,
            RelationEvent::FriendRemoved(_) => EventType::FriendRemoved,
            RelationEvent::PartyFavorited(_) => EventType::PartyFavorited,
            RelationEvent::PartyUnfavorited(_) => EventType::PartyUnfavorited,
        }
    }

    /// Bus partition key: events about the same user (or party) stay in order relative to
    /// each other on a partitioned bus.
    pub fn partition_key(&self) -> uuid::Uuid {
        match self {
            RelationEvent::FriendRequested(p)
            | RelationEvent::FriendAccepted(p)
            | RelationEvent::FriendRemoved(p) => p.user_id.0,
            RelationEvent::PartyFavorited(p) | RelationEvent::PartyUnfavorited(p) => p.party_id.0,
        }
    }
}

/// What goes on the wire: the event plus the identity the projector deduplicates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: EventId,
    pub occurred_at: DateTime<Utc>,
    pub body: RelationEvent,
}

impl EventEnvelope {
    pub fn new(body: RelationEvent) -> Self {
        Self {
            event_id: EventId::new_random(),
            occurred_at: Utc::now(),
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_names_round_trip_through_strings() {
        for t in EventType::ALL {
            assert_eq!(t.as_str().parse::<EventType>().unwrap(), t);
        }
        assert!("relation.friend.created".parse::<EventType>().is_err());
    }

    #[test]
    fn envelope_wire_shape_is_tagged() {
        let user = UserId(uuid::Uuid::from_u128(1));
        let friend = UserId(uuid::Uuid::from_u128(2));
        let envelope = EventEnvelope::new(RelationEvent::FriendRequested(FriendPair {
            user_id: user,
            friend_id: friend,
        }));

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["body"]["type"], "friend_requested");
        assert_eq!(json["body"]["content"]["friend_id"], friend.to_string());

        let back: EventEnvelope = serde_json::from_value(json).unwrap();
        assert_eq!(back, envelope);
        assert_eq!(back.body.partition_key(), user.0);
    }
}
