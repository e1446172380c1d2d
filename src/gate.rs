//! Registration gate (spec.md §4.9): when registration is closed, only
//! admins and participants already deep in the flow may proceed.

use crate::domain::participant::{Participant, RegistrationState};

const REGISTRATION_CLOSED_KEY: &str = "registration_closed";

/// True if `participant` should be admitted given `registration_closed`.
pub fn admits(registration_closed: bool, participant: &Participant) -> bool {
    if !registration_closed {
        return true;
    }
    participant.is_admin
        || matches!(
            participant.state,
            RegistrationState::Completed | RegistrationState::AwaitingAppearance | RegistrationState::AwaitingSupport
        )
}

pub fn setting_key() -> &'static str {
    REGISTRATION_CLOSED_KEY
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn participant(state: RegistrationState, is_admin: bool) -> Participant {
        Participant {
            ext_id: 1,
            display_name: None,
            handle: None,
            sex: None,
            about: String::new(),
            avail: "000000".to_owned(),
            state,
            is_admin,
            opted_out: false,
            registration_notified: false,
            invite_notified: false,
            referral_code: None,
            referrer_ext_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn open_gate_admits_everyone() {
        let p = participant(RegistrationState::Start, false);
        assert!(admits(false, &p));
    }

    #[test]
    fn closed_gate_admits_admins_and_late_stage_states() {
        assert!(admits(true, &participant(RegistrationState::Completed, false)));
        assert!(admits(true, &participant(RegistrationState::AwaitingAppearance, false)));
        assert!(admits(true, &participant(RegistrationState::AwaitingSupport, false)));
        assert!(admits(true, &participant(RegistrationState::Start, true)));
    }

    #[test]
    fn closed_gate_rejects_early_stage_non_admins() {
        assert!(!admits(true, &participant(RegistrationState::Start, false)));
        assert!(!admits(true, &participant(RegistrationState::AwaitingAbout, false)));
    }
}
