use super::util::{downcast, is_dup_key};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlFavoritePartyRepo {
    pool: MySqlPool,
}

impl MySqlFavoritePartyRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlFavoritePartyRepo { pool }
    }

    fn row_to_edge(r: &MySqlRow) -> Result<FavoriteEdge, sqlx::Error> {
        Ok(FavoriteEdge {
            user_id: r.try_get("user_id")?,
            party_id: r.try_get("party_id")?,
            favorited_at: r.try_get("favorited_at")?,
        })
    }

    fn decode_all(rows: &[MySqlRow]) -> Result<Vec<FavoriteEdge>, RelationError> {
        rows.iter()
            .map(Self::row_to_edge)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RelationError::Store(format!("decode favorite: {e}")))
    }
}

#[async_trait::async_trait]
impl FavoritePartyRepo for MySqlFavoritePartyRepo {
    async fn insert_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        edge: &FavoriteEdge,
    ) -> Result<WriteOutcome, RelationError> {
        let tx = downcast(tx)?;

        let result = sqlx::query(
            "INSERT INTO favorite_party (user_id, party_id, favorited_at) VALUES (?, ?, ?)",
        )
        .bind(edge.user_id)
        .bind(edge.party_id)
        .bind(edge.favorited_at)
        .execute(tx.conn())
        .await;

        match result {
            Ok(_) => Ok(WriteOutcome::Applied),
            Err(e) if is_dup_key(&e) => Ok(WriteOutcome::Rejected),
            Err(e) => Err(RelationError::Store(format!("insert favorite: {e}"))),
        }
    }

    async fn delete_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        user_id: UserId,
        party_id: PartyId,
    ) -> Result<WriteOutcome, RelationError> {
        let tx = downcast(tx)?;

        let result = sqlx::query("DELETE FROM favorite_party WHERE user_id = ? AND party_id = ?")
            .bind(user_id)
            .bind(party_id)
            .execute(tx.conn())
            .await
            .map_err(|e| RelationError::Store(format!("delete favorite: {e}")))?;

        Ok(WriteOutcome::from_rows_affected(result.rows_affected()))
    }

    async fn list_by_user(
        &self,
        user_id: UserId,
        after: Option<PartyId>,
        limit: u32,
    ) -> Result<Vec<FavoriteEdge>, RelationError> {
        let rows = sqlx::query(
            r#"
SELECT user_id, party_id, favorited_at
FROM favorite_party
WHERE user_id = ?
  AND (? IS NULL OR party_id > ?)
ORDER BY party_id ASC
LIMIT ?
"#,
        )
        .bind(user_id)
        .bind(after)
        .bind(after)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RelationError::Store(format!("list favorites by user: {e}")))?;

        Self::decode_all(&rows)
    }

    async fn list_by_party(
        &self,
        party_id: PartyId,
        after: Option<UserId>,
        limit: u32,
    ) -> Result<Vec<FavoriteEdge>, RelationError> {
        // served by idx_favorite_party_party (party_id, user_id)
        let rows = sqlx::query(
            r#"
SELECT user_id, party_id, favorited_at
FROM favorite_party
WHERE party_id = ?
  AND (? IS NULL OR user_id > ?)
ORDER BY user_id ASC
LIMIT ?
"#,
        )
        .bind(party_id)
        .bind(after)
        .bind(after)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RelationError::Store(format!("list favorites by party: {e}")))?;

        Self::decode_all(&rows)
    }
}
