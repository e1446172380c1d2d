//! Meetings and their per-side confirmation state (spec.md §3, §4.7).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-side confirmation state. Monotone only in that `Cancelled` is
/// terminal; `Arrived` may only follow `Confirmed` (spec.md invariant 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationState {
    NotConfirmed,
    Confirmed,
    Cancelled,
    Arrived,
}

impl ConfirmationState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfirmationState::NotConfirmed => "not_confirmed",
            ConfirmationState::Confirmed => "confirmed",
            ConfirmationState::Cancelled => "cancelled",
            ConfirmationState::Arrived => "arrived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "not_confirmed" => ConfirmationState::NotConfirmed,
            "confirmed" => ConfirmationState::Confirmed,
            "cancelled" => ConfirmationState::Cancelled,
            "arrived" => ConfirmationState::Arrived,
            _ => return None,
        })
    }

    /// True once this side can no longer transition (spec.md invariant 4).
    pub fn is_terminal(self) -> bool {
        matches!(self, ConfirmationState::Cancelled)
    }
}

/// A matched pair, by convention `dill` male and `doe` female (spec.md §3,
/// enforced at the pair solver's write boundary per spec.md §9).
///
/// Invariants:
/// - `is_fullmatch == true` implies `place_id` and `time` are always `None`.
/// - `is_fullmatch == false` implies both are set once scheduling completes,
///   and never mutated thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: i64,
    pub dill_ext_id: i64,
    pub doe_ext_id: i64,
    pub pair_score: f64,
    pub is_fullmatch: bool,
    pub place_id: Option<i64>,
    pub time: Option<DateTime<Utc>>,
    pub dill_state: ConfirmationState,
    pub doe_state: ConfirmationState,
    pub users_notified: bool,
    pub dill_cant_find: bool,
    pub doe_cant_find: bool,
}

impl Meeting {
    /// The side (`true` = dill) that `ext_id` occupies, or `None` if they are
    /// not a participant in this meeting.
    pub fn side_of(&self, ext_id: i64) -> Option<bool> {
        if ext_id == self.dill_ext_id {
            Some(true)
        } else if ext_id == self.doe_ext_id {
            Some(false)
        } else {
            None
        }
    }

    /// The opposite participant's ext id, given one side's ext id.
    pub fn partner_of(&self, ext_id: i64) -> Option<i64> {
        match self.side_of(ext_id)? {
            true => Some(self.doe_ext_id),
            false => Some(self.dill_ext_id),
        }
    }

    pub fn state_of(&self, is_dill: bool) -> ConfirmationState {
        if is_dill {
            self.dill_state
        } else {
            self.doe_state
        }
    }

    pub fn cant_find_of(&self, is_dill: bool) -> bool {
        if is_dill {
            self.dill_cant_find
        } else {
            self.doe_cant_find
        }
    }

    pub fn both_confirmed(&self) -> bool {
        self.dill_state == ConfirmationState::Confirmed && self.doe_state == ConfirmationState::Confirmed
    }

    pub fn both_cant_find(&self) -> bool {
        self.dill_cant_find && self.doe_cant_find
    }
}

/// Key distinguishing the two kinds of chat messages tracked per meeting
/// side, so later transitions can edit/delete the right one (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingMessageKey {
    OriginalMsg,
    PartnerMsg,
}

impl MeetingMessageKey {
    pub fn as_str(self) -> &'static str {
        match self {
            MeetingMessageKey::OriginalMsg => "original_msg",
            MeetingMessageKey::PartnerMsg => "partner_msg",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meeting() -> Meeting {
        Meeting {
            id: 1,
            dill_ext_id: 10,
            doe_ext_id: 20,
            pair_score: 0.5,
            is_fullmatch: false,
            place_id: None,
            time: None,
            dill_state: ConfirmationState::NotConfirmed,
            doe_state: ConfirmationState::NotConfirmed,
            users_notified: false,
            dill_cant_find: false,
            doe_cant_find: false,
        }
    }

    #[test]
    fn side_and_partner_resolution() {
        let m = meeting();
        assert_eq!(m.side_of(10), Some(true));
        assert_eq!(m.side_of(20), Some(false));
        assert_eq!(m.side_of(99), None);
        assert_eq!(m.partner_of(10), Some(20));
        assert_eq!(m.partner_of(20), Some(10));
        assert_eq!(m.partner_of(99), None);
    }

    #[test]
    fn confirmation_state_round_trips() {
        for state in [
            ConfirmationState::NotConfirmed,
            ConfirmationState::Confirmed,
            ConfirmationState::Cancelled,
            ConfirmationState::Arrived,
        ] {
            assert_eq!(ConfirmationState::parse(state.as_str()), Some(state));
        }
        assert!(ConfirmationState::Cancelled.is_terminal());
        assert!(!ConfirmationState::Confirmed.is_terminal());
    }
}
