use super::util::{downcast, is_dup_key};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlFriendRelationRepo {
    pool: MySqlPool,
}

impl MySqlFriendRelationRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlFriendRelationRepo { pool }
    }

    fn row_to_edge(r: &MySqlRow) -> Result<FriendEdge, sqlx::Error> {
        Ok(FriendEdge {
            owner: r.try_get("owner_id")?,
            peer: r.try_get("peer_id")?,
            accepted: r.try_get("accepted")?,
            requested_at: r.try_get("requested_at")?,
            accepted_at: r.try_get("accepted_at")?,
        })
    }
}

#[async_trait::async_trait]
impl FriendRelationRepo for MySqlFriendRelationRepo {
    async fn insert_pending_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        edge: &FriendEdge,
    ) -> Result<WriteOutcome, RelationError> {
        let tx = downcast(tx)?;

        let result = sqlx::query(
            r#"
INSERT INTO friend_relation (owner_id, peer_id, accepted, requested_at, accepted_at)
SELECT ?, ?, FALSE, ?, NULL FROM DUAL
WHERE NOT EXISTS (
    SELECT 1 FROM friend_relation WHERE owner_id = ? AND peer_id = ?
)
"#,
        )
        .bind(edge.owner)
        .bind(edge.peer)
        .bind(edge.requested_at)
        .bind(edge.peer)
        .bind(edge.owner)
        .execute(tx.conn())
        .await;

        // zero rows: the reverse request is already there
        match result {
            Ok(r) => Ok(WriteOutcome::from_rows_affected(r.rows_affected())),
            Err(e) if is_dup_key(&e) => Ok(WriteOutcome::Rejected),
            Err(e) => Err(RelationError::Store(format!("insert friend request: {e}"))),
        }
    }

    async fn accept_pending_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        owner: UserId,
        peer: UserId,
        accepted_at: DateTime<Utc>,
    ) -> Result<WriteOutcome, RelationError> {
        let tx = downcast(tx)?;

        let result = sqlx::query(
            r#"
UPDATE friend_relation
SET accepted = TRUE, accepted_at = ?
WHERE owner_id = ? AND peer_id = ? AND accepted = FALSE
"#,
        )
        .bind(accepted_at)
        .bind(owner)
        .bind(peer)
        .execute(tx.conn())
        .await
        .map_err(|e| RelationError::Store(format!("accept friend request: {e}")))?;

        Ok(WriteOutcome::from_rows_affected(result.rows_affected()))
    }

    async fn upsert_accepted_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        edge: &FriendEdge,
    ) -> Result<(), RelationError> {
        let tx = downcast(tx)?;

        sqlx::query(
            r#"
INSERT INTO friend_relation (owner_id, peer_id, accepted, requested_at, accepted_at)
VALUES (?, ?, TRUE, ?, ?)
ON DUPLICATE KEY UPDATE accepted = TRUE, accepted_at = VALUES(accepted_at)
"#,
        )
        .bind(edge.owner)
        .bind(edge.peer)
        .bind(edge.requested_at)
        .bind(edge.accepted_at)
        .execute(tx.conn())
        .await
        .map_err(|e| RelationError::Store(format!("upsert mirror edge: {e}")))?;

        Ok(())
    }

    async fn delete_pending_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        owner: UserId,
        peer: UserId,
    ) -> Result<WriteOutcome, RelationError> {
        let tx = downcast(tx)?;

        let result = sqlx::query(
            "DELETE FROM friend_relation WHERE owner_id = ? AND peer_id = ? AND accepted = FALSE",
        )
        .bind(owner)
        .bind(peer)
        .execute(tx.conn())
        .await
        .map_err(|e| RelationError::Store(format!("delete friend request: {e}")))?;

        Ok(WriteOutcome::from_rows_affected(result.rows_affected()))
    }

    async fn delete_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        owner: UserId,
        peer: UserId,
    ) -> Result<WriteOutcome, RelationError> {
        let tx = downcast(tx)?;

        let result = sqlx::query("DELETE FROM friend_relation WHERE owner_id = ? AND peer_id = ?")
            .bind(owner)
            .bind(peer)
            .execute(tx.conn())
            .await
            .map_err(|e| RelationError::Store(format!("delete friend relation: {e}")))?;

        Ok(WriteOutcome::from_rows_affected(result.rows_affected()))
    }

    async fn get(&self, owner: UserId, peer: UserId) -> Result<Option<FriendEdge>, RelationError> {
        let row = sqlx::query(
            r#"
SELECT owner_id, peer_id, accepted, requested_at, accepted_at
FROM friend_relation
WHERE owner_id = ? AND peer_id = ?
"#,
        )
        .bind(owner)
        .bind(peer)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RelationError::Store(format!("query friend relation: {e}")))?;

        row.as_ref()
            .map(Self::row_to_edge)
            .transpose()
            .map_err(|e| RelationError::Store(format!("decode friend relation: {e}")))
    }

    async fn list_by_owner(
        &self,
        owner: UserId,
        accepted: bool,
        after: Option<UserId>,
        limit: u32,
    ) -> Result<Vec<FriendEdge>, RelationError> {
        let rows = sqlx::query(
            r#"
SELECT owner_id, peer_id, accepted, requested_at, accepted_at
FROM friend_relation
WHERE owner_id = ?
  AND accepted = ?
  AND (? IS NULL OR peer_id > ?)
ORDER BY peer_id ASC
LIMIT ?
"#,
        )
        .bind(owner)
        .bind(accepted)
        .bind(after)
        .bind(after)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RelationError::Store(format!("list friend relations: {e}")))?;

        rows.iter()
            .map(Self::row_to_edge)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RelationError::Store(format!("decode friend relation: {e}")))
    }
}
