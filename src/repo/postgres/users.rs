//! `users` table. Grounded in `original_source/internal/repository/postgres/user.go`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::participant::{Participant, RegistrationState, Sex};
use crate::error::RepoError;
use crate::repo::UserRepo;

pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_participant(row: &sqlx::postgres::PgRow) -> Result<Participant, RepoError> {
    let sex: Option<String> = row.try_get("sex")?;
    let state: String = row.try_get("state")?;
    Ok(Participant {
        ext_id: row.try_get("ext_id")?,
        display_name: row.try_get("display_name")?,
        handle: row.try_get("handle")?,
        sex: sex.and_then(|s| Sex::parse(&s)),
        about: row.try_get("about")?,
        avail: row.try_get("avail")?,
        state: RegistrationState::parse(&state).unwrap_or(RegistrationState::Start),
        is_admin: row.try_get("is_admin")?,
        opted_out: row.try_get("opted_out")?,
        registration_notified: row.try_get("registration_notified")?,
        invite_notified: row.try_get("invite_notified")?,
        referral_code: row.try_get("referral_code")?,
        referrer_ext_id: row.try_get("referrer_ext_id")?,
        created_at: row.try_get("created_at")?,
    })
}

const SELECT_COLUMNS: &str = "ext_id, display_name, handle, sex, about, avail, state, is_admin, \
     opted_out, registration_notified, invite_notified, referral_code, referrer_ext_id, created_at";

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn save(&self, user: &Participant) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO users (ext_id, display_name, handle, sex, about, avail, state, is_admin,
                opted_out, registration_notified, invite_notified, referral_code, referrer_ext_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (ext_id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                handle = EXCLUDED.handle,
                sex = EXCLUDED.sex,
                about = EXCLUDED.about,
                avail = EXCLUDED.avail,
                state = EXCLUDED.state,
                is_admin = EXCLUDED.is_admin,
                opted_out = EXCLUDED.opted_out,
                registration_notified = EXCLUDED.registration_notified,
                invite_notified = EXCLUDED.invite_notified,
                referral_code = EXCLUDED.referral_code,
                referrer_ext_id = EXCLUDED.referrer_ext_id
            "#,
        )
        .bind(user.ext_id)
        .bind(&user.display_name)
        .bind(&user.handle)
        .bind(user.sex.map(|s| s.as_str()))
        .bind(&user.about)
        .bind(&user.avail)
        .bind(user.state.as_str())
        .bind(user.is_admin)
        .bind(user.opted_out)
        .bind(user.registration_notified)
        .bind(user.invite_notified)
        .bind(&user.referral_code)
        .bind(user.referrer_ext_id)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_ext_id(&self, ext_id: i64) -> Result<Option<Participant>, RepoError> {
        let row = sqlx::query(&format!("SELECT {SELECT_COLUMNS} FROM users WHERE ext_id = $1"))
            .bind(ext_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_participant).transpose()
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Option<Participant>, RepoError> {
        let row = sqlx::query(&format!("SELECT {SELECT_COLUMNS} FROM users WHERE lower(handle) = lower($1)"))
            .bind(handle)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_participant).transpose()
    }

    async fn find_by_referral_code(&self, code: &str) -> Result<Option<Participant>, RepoError> {
        let row = sqlx::query(&format!("SELECT {SELECT_COLUMNS} FROM users WHERE referral_code = $1"))
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_participant).transpose()
    }

    async fn set_state(&self, ext_id: i64, state: RegistrationState) -> Result<(), RepoError> {
        sqlx::query("UPDATE users SET state = $1 WHERE ext_id = $2")
            .bind(state.as_str())
            .bind(ext_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_verified(&self) -> Result<Vec<Participant>, RepoError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE state = 'completed' AND opted_out = FALSE ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_participant).collect()
    }

    async fn list_admins(&self) -> Result<Vec<Participant>, RepoError> {
        let rows = sqlx::query(&format!("SELECT {SELECT_COLUMNS} FROM users WHERE is_admin = TRUE"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_participant).collect()
    }

    async fn mark_registration_notified(&self, ext_id: i64) -> Result<(), RepoError> {
        sqlx::query("UPDATE users SET registration_notified = TRUE WHERE ext_id = $1")
            .bind(ext_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_invite_notified(&self, ext_id: i64) -> Result<(), RepoError> {
        sqlx::query("UPDATE users SET invite_notified = TRUE WHERE ext_id = $1")
            .bind(ext_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_registered_in_interval(&self, since: DateTime<Utc>, until: DateTime<Utc>) -> Result<i64, RepoError> {
        let row = sqlx::query("SELECT count(*) AS n FROM users WHERE created_at >= $1 AND created_at < $2")
            .bind(since)
            .bind(until)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<i64, _>("n")?)
    }

    async fn list_unnotified_registrations_older_than(&self, cutoff: DateTime<Utc>) -> Result<Vec<Participant>, RepoError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE registration_notified = FALSE AND state != 'completed' AND created_at < $1"
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_participant).collect()
    }

    async fn list_pending_invite_reminders(&self, cutoff: DateTime<Utc>) -> Result<Vec<Participant>, RepoError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE invite_notified = FALSE AND is_admin = FALSE AND created_at < $1"
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_participant).collect()
    }
}
