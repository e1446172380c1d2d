//! Error types for each subsystem boundary.

/// Failures from the pair-solver pipeline (embedding fetch + Hungarian assignment).
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("need at least 2 verified participants, got {0}")]
    NotEnoughUsers(usize),
    #[error("embedding service unavailable: {0}")]
    EmbeddingUnavailable(#[from] EmbeddingError),
}

/// Failures from the embedding gateway.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("embedding service returned status {status}: {body}")]
    BadStatus { status: u16, body: String },
}

/// Failures from creating meetings out of solved pairs (scheduling phase).
#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("no pairs to schedule")]
    NoPairs,
    #[error("{0} regular meetings need a place but none are configured")]
    NoPlaces(usize),
    #[error(transparent)]
    Storage(#[from] RepoError),
}

/// Failures from meeting-lifecycle events (confirm/cancel/arrive/cant-find).
#[derive(Debug, thiserror::Error)]
pub enum MeetingError {
    #[error("meeting {meeting_id} has no participant with ext id {ext_id}")]
    NotAParticipant { meeting_id: i64, ext_id: i64 },
    #[error("meeting {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    Storage(#[from] RepoError),
}

/// Wraps any repository-layer failure.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Outbound chat/blob transport failures. Logged and skipped in broadcast loops,
/// never propagated as fatal (spec.md §7).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("chat transport error: {0}")]
    Chat(String),
    #[error("blob store error: {0}")]
    Blob(String),
}

/// Umbrella error surfaced to the admin-facing caller (CLI, admin command handler).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
    #[error(transparent)]
    Meeting(#[from] MeetingError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Config(#[from] anyhow::Error),
}
