use crate::domain_model::RelationEvent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CounterKind {
    FriendCount,
    FavoritePartyCount,
}

impl CounterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterKind::FriendCount => "friend_count",
            CounterKind::FavoritePartyCount => "favorite_party_count",
        }
    }
}

/// A signed change to one subject's counter, derived from one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterDelta {
    pub kind: CounterKind,
    pub subject: uuid::Uuid,
    pub delta: i64,
}

impl CounterDelta {
    /// Friend counts move on requests and removals, for both people involved.
    /// Acceptance does not change them.
    pub fn for_event(event: &RelationEvent) -> Vec<CounterDelta> {
        let friend = |p: &crate::domain_model::FriendPair, delta: i64| {
            vec![
                CounterDelta {
                    kind: CounterKind::FriendCount,
                    subject: p.user_id.0,
                    delta,
                },
                CounterDelta {
                    kind: CounterKind::FriendCount,
                    subject: p.friend_id.0,
                    delta,
                },
            ]
        };
        let favorite = |p: &crate::domain_model::FavoritePair, delta: i64| {
            vec![CounterDelta {
                kind: CounterKind::FavoritePartyCount,
                subject: p.party_id.0,
                delta,
            }]
        };

        match event {
            RelationEvent::FriendRequested(p) => friend(p, 1),
            RelationEvent::FriendRemoved(p) => friend(p, -1),
            RelationEvent::FriendAccepted(_) => Vec::new(),
            RelationEvent::PartyFavorited(p) => favorite(p, 1),
            RelationEvent::PartyUnfavorited(p) => favorite(p, -1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::{FavoritePair, FriendPair, PartyId, UserId};

    fn pair() -> FriendPair {
        FriendPair {
            user_id: UserId(uuid::Uuid::from_u128(1)),
            friend_id: UserId(uuid::Uuid::from_u128(2)),
        }
    }

    #[test]
    fn friend_lifecycle_touches_both_users() {
        let up = CounterDelta::for_event(&RelationEvent::FriendRequested(pair()));
        assert_eq!(up.len(), 2);
        assert!(up.iter().all(|d| d.delta == 1 && d.kind == CounterKind::FriendCount));

        let down = CounterDelta::for_event(&RelationEvent::FriendRemoved(pair()));
        assert!(down.iter().all(|d| d.delta == -1));

        assert!(CounterDelta::for_event(&RelationEvent::FriendAccepted(pair())).is_empty());
    }

    #[test]
    fn favorites_touch_the_party_only() {
        let p = FavoritePair {
            user_id: UserId(uuid::Uuid::from_u128(1)),
            party_id: PartyId(uuid::Uuid::from_u128(9)),
        };
        let deltas = CounterDelta::for_event(&RelationEvent::PartyUnfavorited(p));
        assert_eq!(
            deltas,
            vec![CounterDelta {
                kind: CounterKind::FavoritePartyCount,
                subject: p.party_id.0,
                delta: -1,
            }]
        );
    }
}
