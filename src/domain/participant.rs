//! Participant and registration state (spec.md §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Self-reported sex, used for the opposite-sex pairing constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Sex::Male),
            "female" => Some(Sex::Female),
            _ => None,
        }
    }
}

/// Registration state (spec.md §3). Linear onboarding, with
/// `awaiting_support`/`awaiting_appearance`/`awaiting_feedback` as
/// side-transitions that return to `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationState {
    Start,
    AwaitingSex,
    AwaitingAbout,
    AwaitingTime,
    AwaitingSupport,
    AwaitingAppearance,
    AwaitingFeedback,
    Completed,
}

impl RegistrationState {
    pub fn as_str(self) -> &'static str {
        match self {
            RegistrationState::Start => "start",
            RegistrationState::AwaitingSex => "awaiting_sex",
            RegistrationState::AwaitingAbout => "awaiting_about",
            RegistrationState::AwaitingTime => "awaiting_time",
            RegistrationState::AwaitingSupport => "awaiting_support",
            RegistrationState::AwaitingAppearance => "awaiting_appearance",
            RegistrationState::AwaitingFeedback => "awaiting_feedback",
            RegistrationState::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "start" => RegistrationState::Start,
            "awaiting_sex" => RegistrationState::AwaitingSex,
            "awaiting_about" => RegistrationState::AwaitingAbout,
            "awaiting_time" => RegistrationState::AwaitingTime,
            "awaiting_support" => RegistrationState::AwaitingSupport,
            "awaiting_appearance" => RegistrationState::AwaitingAppearance,
            "awaiting_feedback" => RegistrationState::AwaitingFeedback,
            "completed" => RegistrationState::Completed,
            _ => return None,
        })
    }
}

/// A registered participant, identified by an external chat identifier.
///
/// Invariant: `sex`, `about`, `avail` are all populated iff `state ==
/// Completed`; `referrer_ext_id != Some(ext_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub ext_id: i64,
    pub display_name: Option<String>,
    pub handle: Option<String>,
    pub sex: Option<Sex>,
    pub about: String,
    /// 6-bit availability bitstring, see [`crate::time_slot`].
    pub avail: String,
    pub state: RegistrationState,
    pub is_admin: bool,
    pub opted_out: bool,
    pub registration_notified: bool,
    pub invite_notified: bool,
    pub referral_code: Option<String>,
    pub referrer_ext_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Participant {
    /// A participant eligible for matching: fully onboarded and not opted out.
    pub fn is_verified(&self) -> bool {
        self.state == RegistrationState::Completed && !self.opted_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_state_round_trips() {
        for state in [
            RegistrationState::Start,
            RegistrationState::AwaitingSex,
            RegistrationState::AwaitingAbout,
            RegistrationState::AwaitingTime,
            RegistrationState::AwaitingSupport,
            RegistrationState::AwaitingAppearance,
            RegistrationState::AwaitingFeedback,
            RegistrationState::Completed,
        ] {
            assert_eq!(RegistrationState::parse(state.as_str()), Some(state));
        }
    }

    #[test]
    fn sex_round_trips() {
        assert_eq!(Sex::parse(Sex::Male.as_str()), Some(Sex::Male));
        assert_eq!(Sex::parse(Sex::Female.as_str()), Some(Sex::Female));
        assert_eq!(Sex::parse("other"), None);
    }
}
