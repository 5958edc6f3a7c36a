use super::outbox::enqueue_event;
use super::pagination::KeysetScan;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

const FRIENDS_PAGE_SIZE: u16 = 20;

pub struct RealFriendService {
    friend_relation_repo: Arc<dyn FriendRelationRepo>,
    outbox_repo: Arc<dyn OutboxRepo>,
    counter_store: Arc<dyn CounterStore>,
    tx_manager: Arc<dyn TxManager>,
}

impl RealFriendService {
    pub fn new(
        friend_relation_repo: Arc<dyn FriendRelationRepo>,
        outbox_repo: Arc<dyn OutboxRepo>,
        counter_store: Arc<dyn CounterStore>,
        tx_manager: Arc<dyn TxManager>,
    ) -> Self {
        Self {
            friend_relation_repo,
            outbox_repo,
            counter_store,
            tx_manager,
        }
    }

    async fn list_edges(
        &self,
        owner: UserId,
        accepted: bool,
        cursor: &PageCursor,
        limit: PageSize,
    ) -> Result<Page<FriendEdge>, RelationError> {
        let scope = if accepted {
            format!("friends:{owner}")
        } else {
            format!("requests:{owner}")
        };
        let scan = KeysetScan::<UserId>::open(scope, cursor, limit, FRIENDS_PAGE_SIZE)?;

        let rows = self
            .friend_relation_repo
            .list_by_owner(owner, accepted, scan.after, scan.fetch_limit())
            .await?;

        scan.finish(rows, |edge| edge.peer)
    }
}

#[async_trait::async_trait]
impl FriendService for RealFriendService {
    async fn create_friend_request(
        &self,
        requester: UserId,
        target: UserId,
    ) -> Result<FriendEdge, RelationError> {
        if requester == target {
            return Err(RelationError::InvalidArgument(
                "cannot send a friend request to yourself".to_string(),
            ));
        }

        // stored from the recipient's side so incoming requests are a plain partition scan
        let edge = FriendEdge::pending(target, requester, Utc::now());

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        let outcome = self
            .friend_relation_repo
            .insert_pending_in_tx(&mut *tx, &edge)
            .await?;
        if !outcome.is_applied() {
            return Err(RelationError::AlreadyExists(format!(
                "friend relation between {requester} and {target}"
            )));
        }

        enqueue_event(
            self.outbox_repo.as_ref(),
            &mut *tx,
            RelationEvent::FriendRequested(FriendPair {
                user_id: requester,
                friend_id: target,
            }),
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        Ok(edge)
    }

    async fn accept_friend_request(
        &self,
        owner: UserId,
        peer: UserId,
    ) -> Result<(), RelationError> {
        let now = Utc::now();

        // cas, mirror and event share one tx: a rejected cas drops it and nothing lands
        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        let outcome = self
            .friend_relation_repo
            .accept_pending_in_tx(&mut *tx, owner, peer, now)
            .await?;
        if !outcome.is_applied() {
            debug!(%owner, %peer, "accept rejected: no pending request");
            return Err(RelationError::FailedPrecondition(format!(
                "no pending friend request {owner} <- {peer}"
            )));
        }

        self.friend_relation_repo
            .upsert_accepted_in_tx(&mut *tx, &FriendEdge::accepted(peer, owner, now))
            .await?;

        enqueue_event(
            self.outbox_repo.as_ref(),
            &mut *tx,
            RelationEvent::FriendAccepted(FriendPair {
                user_id: owner,
                friend_id: peer,
            }),
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        Ok(())
    }

    async fn decline_friend_request(
        &self,
        owner: UserId,
        peer: UserId,
    ) -> Result<(), RelationError> {
        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        let outcome = self
            .friend_relation_repo
            .delete_pending_in_tx(&mut *tx, owner, peer)
            .await?;
        if outcome.is_applied() {
            enqueue_event(
                self.outbox_repo.as_ref(),
                &mut *tx,
                RelationEvent::FriendRemoved(FriendPair {
                    user_id: owner,
                    friend_id: peer,
                }),
            )
            .await?;
        } else {
            debug!(%owner, %peer, "decline: no pending request, nothing to do");
        }

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        Ok(())
    }

    async fn remove_friend_relation(&self, a: UserId, b: UserId) -> Result<(), RelationError> {
        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        let forward = self
            .friend_relation_repo
            .delete_in_tx(&mut *tx, a, b)
            .await?;
        let backward = self
            .friend_relation_repo
            .delete_in_tx(&mut *tx, b, a)
            .await?;

        if forward.is_applied() || backward.is_applied() {
            enqueue_event(
                self.outbox_repo.as_ref(),
                &mut *tx,
                RelationEvent::FriendRemoved(FriendPair {
                    user_id: a,
                    friend_id: b,
                }),
            )
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        Ok(())
    }

    async fn get_friend_relation(&self, a: UserId, b: UserId) -> Result<FriendEdge, RelationError> {
        // edges are directional and the caller may not know who asked first: probe both
        if let Some(edge) = self.friend_relation_repo.get(a, b).await? {
            return Ok(edge);
        }
        if let Some(edge) = self.friend_relation_repo.get(b, a).await? {
            return Ok(edge);
        }

        Err(RelationError::NotFound(format!(
            "friend relation between {a} and {b}"
        )))
    }

    async fn get_friends_of_user(
        &self,
        owner: UserId,
        cursor: &PageCursor,
        limit: PageSize,
    ) -> Result<Page<FriendEdge>, RelationError> {
        self.list_edges(owner, true, cursor, limit).await
    }

    async fn get_incoming_friend_requests(
        &self,
        owner: UserId,
        cursor: &PageCursor,
        limit: PageSize,
    ) -> Result<Page<FriendEdge>, RelationError> {
        self.list_edges(owner, false, cursor, limit).await
    }

    async fn get_friend_count(&self, user_id: UserId) -> Result<i64, RelationError> {
        Ok(self
            .counter_store
            .get(CounterKind::FriendCount, user_id.0)
            .await?)
    }

    async fn get_many_friend_count(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, i64>, RelationError> {
        let subjects: Vec<uuid::Uuid> = user_ids.iter().map(|id| id.0).collect();
        let counts = self
            .counter_store
            .get_many(CounterKind::FriendCount, &subjects)
            .await?;

        Ok(user_ids.iter().copied().zip(counts).collect())
    }
}
