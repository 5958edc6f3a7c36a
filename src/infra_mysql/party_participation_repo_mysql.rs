use super::util::{downcast, is_dup_key};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlPartyParticipationRepo {
    pool: MySqlPool,
}

impl MySqlPartyParticipationRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlPartyParticipationRepo { pool }
    }

    fn row_to_invite(r: &MySqlRow) -> Result<PartyInvite, sqlx::Error> {
        Ok(PartyInvite {
            user_id: r.try_get("user_id")?,
            inviter_id: r.try_get("inviter_id")?,
            party_id: r.try_get("party_id")?,
            valid_until: r.try_get("valid_until")?,
        })
    }

    fn row_to_participant(r: &MySqlRow) -> Result<PartyParticipant, sqlx::Error> {
        Ok(PartyParticipant {
            party_id: r.try_get("party_id")?,
            user_id: r.try_get("user_id")?,
            joined_at: r.try_get("joined_at")?,
        })
    }

    fn decode_participants(rows: &[MySqlRow]) -> Result<Vec<PartyParticipant>, RelationError> {
        rows.iter()
            .map(Self::row_to_participant)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RelationError::Store(format!("decode participant: {e}")))
    }
}

#[async_trait::async_trait]
impl PartyParticipationRepo for MySqlPartyParticipationRepo {
    async fn insert_invite_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        invite: &PartyInvite,
        now: DateTime<Utc>,
    ) -> Result<WriteOutcome, RelationError> {
        let tx = downcast(tx)?;

        // an expired invite is logically absent; clear it so the insert below can land
        sqlx::query(
            "DELETE FROM party_invite WHERE user_id = ? AND party_id = ? AND valid_until <= ?",
        )
        .bind(invite.user_id)
        .bind(invite.party_id)
        .bind(now)
        .execute(tx.conn())
        .await
        .map_err(|e| RelationError::Store(format!("clear expired invite: {e}")))?;

        let result = sqlx::query(
            r#"
INSERT INTO party_invite (user_id, party_id, inviter_id, valid_until)
VALUES (?, ?, ?, ?)
"#,
        )
        .bind(invite.user_id)
        .bind(invite.party_id)
        .bind(invite.inviter_id)
        .bind(invite.valid_until)
        .execute(tx.conn())
        .await;

        match result {
            Ok(_) => Ok(WriteOutcome::Applied),
            Err(e) if is_dup_key(&e) => Ok(WriteOutcome::Rejected),
            Err(e) => Err(RelationError::Store(format!("insert invite: {e}"))),
        }
    }

    async fn delete_invite_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        user_id: UserId,
        party_id: PartyId,
    ) -> Result<WriteOutcome, RelationError> {
        let tx = downcast(tx)?;

        let result = sqlx::query("DELETE FROM party_invite WHERE user_id = ? AND party_id = ?")
            .bind(user_id)
            .bind(party_id)
            .execute(tx.conn())
            .await
            .map_err(|e| RelationError::Store(format!("delete invite: {e}")))?;

        Ok(WriteOutcome::from_rows_affected(result.rows_affected()))
    }

    async fn take_live_invite_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        user_id: UserId,
        party_id: PartyId,
        now: DateTime<Utc>,
    ) -> Result<WriteOutcome, RelationError> {
        let tx = downcast(tx)?;

        let result = sqlx::query(
            "DELETE FROM party_invite WHERE user_id = ? AND party_id = ? AND valid_until > ?",
        )
        .bind(user_id)
        .bind(party_id)
        .bind(now)
        .execute(tx.conn())
        .await
        .map_err(|e| RelationError::Store(format!("take invite: {e}")))?;

        Ok(WriteOutcome::from_rows_affected(result.rows_affected()))
    }

    async fn insert_participant_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        participant: &PartyParticipant,
    ) -> Result<WriteOutcome, RelationError> {
        let tx = downcast(tx)?;

        let result = sqlx::query(
            "INSERT INTO party_participant (party_id, user_id, joined_at) VALUES (?, ?, ?)",
        )
        .bind(participant.party_id)
        .bind(participant.user_id)
        .bind(participant.joined_at)
        .execute(tx.conn())
        .await;

        match result {
            Ok(_) => Ok(WriteOutcome::Applied),
            Err(e) if is_dup_key(&e) => Ok(WriteOutcome::Rejected),
            Err(e) => Err(RelationError::Store(format!("insert participant: {e}"))),
        }
    }

    async fn delete_participant_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        party_id: PartyId,
        user_id: UserId,
    ) -> Result<WriteOutcome, RelationError> {
        let tx = downcast(tx)?;

        let result =
            sqlx::query("DELETE FROM party_participant WHERE party_id = ? AND user_id = ?")
                .bind(party_id)
                .bind(user_id)
                .execute(tx.conn())
                .await
                .map_err(|e| RelationError::Store(format!("delete participant: {e}")))?;

        Ok(WriteOutcome::from_rows_affected(result.rows_affected()))
    }

    async fn list_invites_by_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        after: Option<PartyId>,
        limit: u32,
    ) -> Result<Vec<PartyInvite>, RelationError> {
        let rows = sqlx::query(
            r#"
SELECT user_id, party_id, inviter_id, valid_until
FROM party_invite
WHERE user_id = ?
  AND valid_until > ?
  AND (? IS NULL OR party_id > ?)
ORDER BY party_id ASC
LIMIT ?
"#,
        )
        .bind(user_id)
        .bind(now)
        .bind(after)
        .bind(after)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RelationError::Store(format!("list invites: {e}")))?;

        rows.iter()
            .map(Self::row_to_invite)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RelationError::Store(format!("decode invite: {e}")))
    }

    async fn list_participants_by_party(
        &self,
        party_id: PartyId,
        after: Option<UserId>,
        limit: u32,
    ) -> Result<Vec<PartyParticipant>, RelationError> {
        let rows = sqlx::query(
            r#"
SELECT party_id, user_id, joined_at
FROM party_participant
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
        .map_err(|e| RelationError::Store(format!("list participants: {e}")))?;

        Self::decode_participants(&rows)
    }

    async fn list_parties_by_user(
        &self,
        user_id: UserId,
        after: Option<PartyId>,
        limit: u32,
    ) -> Result<Vec<PartyParticipant>, RelationError> {
        let rows = sqlx::query(
            r#"
SELECT party_id, user_id, joined_at
FROM party_participant
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
        .map_err(|e| RelationError::Store(format!("list parties of user: {e}")))?;

        Self::decode_participants(&rows)
    }

    async fn purge_expired_invites(&self, now: DateTime<Utc>) -> Result<u64, RelationError> {
        let result = sqlx::query("DELETE FROM party_invite WHERE valid_until <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| RelationError::Store(format!("purge expired invites: {e}")))?;

        Ok(result.rows_affected())
    }
}
