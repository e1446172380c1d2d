//! `feedback` table. Grounded in `original_source/internal/repository/postgres/feedback.go`.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::RepoError;
use crate::feedback::FeedbackRepo;

pub struct PgFeedbackRepo {
    pool: PgPool,
}

impl PgFeedbackRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedbackRepo for PgFeedbackRepo {
    async fn save(&self, ext_id: i64, text: &str) -> Result<(), RepoError> {
        sqlx::query("INSERT INTO feedback (telegram_id, text) VALUES ($1, $2)")
            .bind(ext_id)
            .bind(text)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
