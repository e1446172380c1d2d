//! Free-text feedback submissions (supplemented feature, SPEC_FULL.md;
//! grounded in `original_source/internal/domain/feedback.go` and
//! `internal/repository/postgres/feedback.go`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::RepoError;

#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub id: i64,
    pub ext_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait FeedbackRepo: Send + Sync {
    async fn save(&self, ext_id: i64, text: &str) -> Result<(), RepoError>;
}
