use crate::application_port::RelationError;
use crate::domain_model::*;
use std::collections::HashMap;

#[async_trait::async_trait]
pub trait FriendService: Send + Sync {
    /// Stores a pending edge in the target's partition (`owner = target, peer = requester`).
    async fn create_friend_request(
        &self,
        requester: UserId,
        target: UserId,
    ) -> Result<FriendEdge, RelationError>;
    /// `owner` is the recipient of the pending request from `peer`.
    async fn accept_friend_request(&self, owner: UserId, peer: UserId)
    -> Result<(), RelationError>;
    async fn decline_friend_request(
        &self,
        owner: UserId,
        peer: UserId,
    ) -> Result<(), RelationError>;
    async fn remove_friend_relation(&self, a: UserId, b: UserId) -> Result<(), RelationError>;
    async fn get_friend_relation(&self, a: UserId, b: UserId)
    -> Result<FriendEdge, RelationError>;
    async fn get_friends_of_user(
        &self,
        owner: UserId,
        cursor: &PageCursor,
        limit: PageSize,
    ) -> Result<Page<FriendEdge>, RelationError>;
    async fn get_incoming_friend_requests(
        &self,
        owner: UserId,
        cursor: &PageCursor,
        limit: PageSize,
    ) -> Result<Page<FriendEdge>, RelationError>;
    async fn get_friend_count(&self, user_id: UserId) -> Result<i64, RelationError>;
    async fn get_many_friend_count(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, i64>, RelationError>;
}
