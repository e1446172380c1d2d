//! Repository contracts (spec.md §6). The core depends only on these
//! traits; `postgres` supplies the production implementation.

pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::meeting::{ConfirmationState, Meeting, MeetingMessageKey};
use crate::domain::participant::{Participant, RegistrationState};
use crate::domain::place::Place;
use crate::error::RepoError;

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn save(&self, user: &Participant) -> Result<(), RepoError>;
    async fn find_by_ext_id(&self, ext_id: i64) -> Result<Option<Participant>, RepoError>;
    async fn find_by_handle(&self, handle: &str) -> Result<Option<Participant>, RepoError>;
    async fn find_by_referral_code(&self, code: &str) -> Result<Option<Participant>, RepoError>;
    async fn set_state(&self, ext_id: i64, state: RegistrationState) -> Result<(), RepoError>;
    /// Completed and not opted out, in creation order.
    async fn list_verified(&self) -> Result<Vec<Participant>, RepoError>;
    async fn list_admins(&self) -> Result<Vec<Participant>, RepoError>;
    async fn mark_registration_notified(&self, ext_id: i64) -> Result<(), RepoError>;
    async fn mark_invite_notified(&self, ext_id: i64) -> Result<(), RepoError>;
    /// Participants who registered inside `[since, until)`, used by the
    /// registration-reminder job.
    async fn count_registered_in_interval(&self, since: DateTime<Utc>, until: DateTime<Utc>) -> Result<i64, RepoError>;
    async fn list_unnotified_registrations_older_than(&self, cutoff: DateTime<Utc>) -> Result<Vec<Participant>, RepoError>;
    /// Non-admin participants created before `cutoff` with `invite_notified
    /// = false`, used by the invite-reminder job.
    async fn list_pending_invite_reminders(&self, cutoff: DateTime<Utc>) -> Result<Vec<Participant>, RepoError>;
}

#[async_trait]
pub trait PlaceRepo: Send + Sync {
    /// Ordered by `quality` descending.
    async fn list_all(&self) -> Result<Vec<Place>, RepoError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Place>, RepoError>;
}

#[async_trait]
pub trait MeetingRepo: Send + Sync {
    async fn save(&self, meeting: &Meeting) -> Result<Meeting, RepoError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Meeting>, RepoError>;
    async fn find_by_participant(&self, ext_id: i64) -> Result<Option<Meeting>, RepoError>;
    async fn list_by_fullmatch(&self, is_fullmatch: bool) -> Result<Vec<Meeting>, RepoError>;
    async fn assign_place_and_time(&self, meeting_id: i64, place_id: i64, time: DateTime<Utc>) -> Result<(), RepoError>;
    async fn set_state(&self, meeting_id: i64, is_dill: bool, state: ConfirmationState) -> Result<(), RepoError>;
    async fn set_cant_find(&self, meeting_id: i64, is_dill: bool, value: bool) -> Result<(), RepoError>;
    async fn mark_users_notified(&self, meeting_id: i64) -> Result<(), RepoError>;
    /// Wipes every meeting, at the start of a new matching cycle.
    async fn clear_all(&self) -> Result<(), RepoError>;
    /// Regular meetings whose `time` falls in `[since, until)`.
    async fn list_starting_in_interval(&self, since: DateTime<Utc>, until: DateTime<Utc>) -> Result<Vec<Meeting>, RepoError>;
    async fn find_arrived_by_participant(&self, ext_id: i64) -> Result<Option<Meeting>, RepoError>;
}

#[async_trait]
pub trait UserMessageRepo: Send + Sync {
    async fn upsert(&self, meeting_id: i64, ext_id: i64, key: MeetingMessageKey, message_id: i64) -> Result<(), RepoError>;
    async fn find(&self, meeting_id: i64, ext_id: i64, key: MeetingMessageKey) -> Result<Option<i64>, RepoError>;
}

#[async_trait]
pub trait SettingsRepo: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, RepoError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), RepoError>;
}
