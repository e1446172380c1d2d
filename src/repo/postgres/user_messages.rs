//! `user_messages` table: remembers which chat message shows which meeting
//! side, so later edits/deletes target the right message (spec.md §3).

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::meeting::MeetingMessageKey;
use crate::error::RepoError;
use crate::repo::UserMessageRepo;

pub struct PgUserMessageRepo {
    pool: PgPool,
}

impl PgUserMessageRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserMessageRepo for PgUserMessageRepo {
    async fn upsert(&self, meeting_id: i64, ext_id: i64, key: MeetingMessageKey, message_id: i64) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO user_messages (meeting_id, telegram_id, key, message_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (meeting_id, telegram_id, key) DO UPDATE SET message_id = EXCLUDED.message_id
            "#,
        )
        .bind(meeting_id)
        .bind(ext_id)
        .bind(key.as_str())
        .bind(message_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, meeting_id: i64, ext_id: i64, key: MeetingMessageKey) -> Result<Option<i64>, RepoError> {
        let row = sqlx::query("SELECT message_id FROM user_messages WHERE meeting_id = $1 AND telegram_id = $2 AND key = $3")
            .bind(meeting_id)
            .bind(ext_id)
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| r.try_get::<i64, _>("message_id")).transpose().map_err(RepoError::from)
    }
}
