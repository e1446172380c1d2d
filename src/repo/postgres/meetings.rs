//! `meetings` table. Grounded in `original_source/internal/repository/postgres/meeting.go`,
//! with per-meeting row locking added for concurrent state transitions
//! (spec.md §5 "distinct meetings never block each other").

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};

use crate::domain::meeting::{ConfirmationState, Meeting};
use crate::error::RepoError;
use crate::repo::MeetingRepo;

/// Whether a state transition to `requested` is legal given the side's
/// `current` state, re-checked against the row locked by `FOR UPDATE` so a
/// stale pre-lock read can never win a race against a concurrent writer
/// (spec.md §5: concurrent confirm/cancel events produce a linear history).
fn should_apply_state(current: ConfirmationState, requested: ConfirmationState) -> bool {
    if current.is_terminal() {
        return false;
    }
    if requested == ConfirmationState::Arrived && current != ConfirmationState::Confirmed {
        return false;
    }
    true
}

#[derive(FromRow)]
struct MeetingRow {
    id: i64,
    dill_id: i64,
    doe_id: i64,
    pair_score: f64,
    is_fullmatch: bool,
    place_id: Option<i64>,
    time: Option<DateTime<Utc>>,
    dill_state: String,
    doe_state: String,
    users_notified: bool,
    dill_cant_find: bool,
    doe_cant_find: bool,
}

impl From<MeetingRow> for Meeting {
    fn from(row: MeetingRow) -> Self {
        Meeting {
            id: row.id,
            dill_ext_id: row.dill_id,
            doe_ext_id: row.doe_id,
            pair_score: row.pair_score,
            is_fullmatch: row.is_fullmatch,
            place_id: row.place_id,
            time: row.time,
            dill_state: ConfirmationState::parse(&row.dill_state).unwrap_or(ConfirmationState::NotConfirmed),
            doe_state: ConfirmationState::parse(&row.doe_state).unwrap_or(ConfirmationState::NotConfirmed),
            users_notified: row.users_notified,
            dill_cant_find: row.dill_cant_find,
            doe_cant_find: row.doe_cant_find,
        }
    }
}

const SELECT_COLUMNS: &str = "id, dill_id, doe_id, pair_score, is_fullmatch, place_id, time, \
     dill_state, doe_state, users_notified, dill_cant_find, doe_cant_find";

pub struct PgMeetingRepo {
    pool: PgPool,
}

impl PgMeetingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MeetingRepo for PgMeetingRepo {
    async fn save(&self, meeting: &Meeting) -> Result<Meeting, RepoError> {
        let row: MeetingRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO meetings (dill_id, doe_id, pair_score, is_fullmatch, place_id, time,
                dill_state, doe_state, users_notified, dill_cant_find, doe_cant_find)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(meeting.dill_ext_id)
        .bind(meeting.doe_ext_id)
        .bind(meeting.pair_score)
        .bind(meeting.is_fullmatch)
        .bind(meeting.place_id)
        .bind(meeting.time)
        .bind(meeting.dill_state.as_str())
        .bind(meeting.doe_state.as_str())
        .bind(meeting.users_notified)
        .bind(meeting.dill_cant_find)
        .bind(meeting.doe_cant_find)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Meeting>, RepoError> {
        let row: Option<MeetingRow> =
            sqlx::query_as(&format!("SELECT {SELECT_COLUMNS} FROM meetings WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Meeting::from))
    }

    async fn find_by_participant(&self, ext_id: i64) -> Result<Option<Meeting>, RepoError> {
        let row: Option<MeetingRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM meetings WHERE dill_id = $1 OR doe_id = $1 ORDER BY id DESC LIMIT 1"
        ))
        .bind(ext_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Meeting::from))
    }

    async fn list_by_fullmatch(&self, is_fullmatch: bool) -> Result<Vec<Meeting>, RepoError> {
        let rows: Vec<MeetingRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM meetings WHERE is_fullmatch = $1 ORDER BY id"
        ))
        .bind(is_fullmatch)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Meeting::from).collect())
    }

    async fn assign_place_and_time(&self, meeting_id: i64, place_id: i64, time: DateTime<Utc>) -> Result<(), RepoError> {
        sqlx::query("UPDATE meetings SET place_id = $1, time = $2 WHERE id = $3")
            .bind(place_id)
            .bind(time)
            .bind(meeting_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_state(&self, meeting_id: i64, is_dill: bool, state: ConfirmationState) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query("SELECT dill_state, doe_state FROM meetings WHERE id = $1 FOR UPDATE")
            .bind(meeting_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            tx.commit().await?;
            return Ok(());
        };

        let dill_state: String = row.try_get("dill_state")?;
        let doe_state: String = row.try_get("doe_state")?;
        let current = ConfirmationState::parse(if is_dill { &dill_state } else { &doe_state })
            .unwrap_or(ConfirmationState::NotConfirmed);

        if !should_apply_state(current, state) {
            tx.commit().await?;
            return Ok(());
        }

        let column = if is_dill { "dill_state" } else { "doe_state" };
        sqlx::query(&format!("UPDATE meetings SET {column} = $1 WHERE id = $2"))
            .bind(state.as_str())
            .bind(meeting_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn set_cant_find(&self, meeting_id: i64, is_dill: bool, value: bool) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query("SELECT dill_cant_find, doe_cant_find FROM meetings WHERE id = $1 FOR UPDATE")
            .bind(meeting_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            tx.commit().await?;
            return Ok(());
        };

        let dill_cant_find: bool = row.try_get("dill_cant_find")?;
        let doe_cant_find: bool = row.try_get("doe_cant_find")?;
        let current = if is_dill { dill_cant_find } else { doe_cant_find };

        if current == value {
            tx.commit().await?;
            return Ok(());
        }

        let column = if is_dill { "dill_cant_find" } else { "doe_cant_find" };
        sqlx::query(&format!("UPDATE meetings SET {column} = $1 WHERE id = $2"))
            .bind(value)
            .bind(meeting_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn mark_users_notified(&self, meeting_id: i64) -> Result<(), RepoError> {
        sqlx::query("UPDATE meetings SET users_notified = TRUE WHERE id = $1")
            .bind(meeting_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), RepoError> {
        sqlx::query("TRUNCATE meetings, user_messages").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_starting_in_interval(&self, since: DateTime<Utc>, until: DateTime<Utc>) -> Result<Vec<Meeting>, RepoError> {
        let rows: Vec<MeetingRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM meetings WHERE is_fullmatch = FALSE AND time >= $1 AND time < $2 ORDER BY id"
        ))
        .bind(since)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Meeting::from).collect())
    }

    async fn find_arrived_by_participant(&self, ext_id: i64) -> Result<Option<Meeting>, RepoError> {
        let row: Option<MeetingRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM meetings WHERE (dill_id = $1 OR doe_id = $1) AND \
             (dill_state = 'arrived' OR doe_state = 'arrived') ORDER BY id DESC LIMIT 1"
        ))
        .bind(ext_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Meeting::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_is_terminal_and_rejects_any_further_transition() {
        assert!(!should_apply_state(ConfirmationState::Cancelled, ConfirmationState::Confirmed));
        assert!(!should_apply_state(ConfirmationState::Cancelled, ConfirmationState::Cancelled));
        assert!(!should_apply_state(ConfirmationState::Cancelled, ConfirmationState::Arrived));
    }

    #[test]
    fn arrived_is_only_legal_from_confirmed() {
        assert!(should_apply_state(ConfirmationState::Confirmed, ConfirmationState::Arrived));
        assert!(!should_apply_state(ConfirmationState::NotConfirmed, ConfirmationState::Arrived));
    }

    #[test]
    fn confirm_and_cancel_are_legal_from_not_confirmed() {
        assert!(should_apply_state(ConfirmationState::NotConfirmed, ConfirmationState::Confirmed));
        assert!(should_apply_state(ConfirmationState::NotConfirmed, ConfirmationState::Cancelled));
    }

    /// The race the locked re-check defends against: side A cancels and
    /// commits first, side B's concurrent confirm must not win once it
    /// re-reads the row under its own lock.
    #[test]
    fn a_losing_writer_sees_the_winners_commit_under_the_lock() {
        let winner = ConfirmationState::Cancelled;
        assert!(!should_apply_state(winner, ConfirmationState::Confirmed));
    }
}
