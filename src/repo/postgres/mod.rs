//! Postgres-backed repository implementations, built on `sqlx::PgPool`.
//!
//! Queries are built at runtime with `sqlx::query`/`sqlx::query_as` rather
//! than the `query!`/`query_as!` macros, which require a live database at
//! compile time to check against.

pub mod feedback;
pub mod meetings;
pub mod places;
pub mod settings;
pub mod user_messages;
pub mod users;

pub use feedback::PgFeedbackRepo;
pub use meetings::PgMeetingRepo;
pub use places::PgPlaceRepo;
pub use settings::PgSettingsRepo;
pub use user_messages::PgUserMessageRepo;
pub use users::PgUserRepo;
