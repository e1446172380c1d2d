//! Individual notifier jobs, each polling persistent state for participants
//! or meetings due a one-time reminder.

use std::time::Duration;

use chrono::Utc;
use tracing::warn;

use crate::chat::{ChatAdapter, Keyboard, KeyboardButton};
use crate::error::RepoError;
use crate::repo::{MeetingRepo, UserRepo};

const MEETING_SOON_MESSAGE: &str = "Your meeting is coming up soon.";
const REGISTRATION_REMINDER_MESSAGE: &str = "You started registering but haven't finished yet.";
const INVITE_REMINDER_MESSAGE: &str = "Invite a friend with your referral link.";

fn arrived_keyboard(meeting_id: i64) -> Keyboard {
    Keyboard {
        rows: vec![vec![
            KeyboardButton {
                label: "Arrived".to_owned(),
                callback_data: format!("arrived:{meeting_id}"),
            },
            KeyboardButton {
                label: "Can't find partner".to_owned(),
                callback_data: format!("cant_find:{meeting_id}"),
            },
        ]],
    }
}

/// Meetings starting within `date_upcoming_in` with both sides confirmed
/// and not yet notified: send the "meeting soon" message to both sides,
/// then flip `users_notified` regardless of per-side send outcome (at-most-
/// once semantics; spec.md §4.8 — the flag write is not transactional with
/// the sends).
pub async fn meeting_reminder(
    meetings: &dyn MeetingRepo,
    chat: &dyn ChatAdapter,
    date_upcoming_in: Duration,
) -> Result<(), RepoError> {
    let now = Utc::now();
    let until = now + date_upcoming_in;
    let due = meetings.list_starting_in_interval(now, until).await?;

    for meeting in due {
        if meeting.users_notified || !meeting.both_confirmed() {
            continue;
        }
        if meeting.place_id.is_none() || meeting.time.is_none() {
            continue;
        }

        let keyboard = arrived_keyboard(meeting.id);
        if let Err(e) = chat.send(meeting.dill_ext_id, MEETING_SOON_MESSAGE, Some(&keyboard)).await {
            warn!(error = %e, meeting_id = meeting.id, ext_id = meeting.dill_ext_id, "meeting reminder send to dill failed");
        }
        if let Err(e) = chat.send(meeting.doe_ext_id, MEETING_SOON_MESSAGE, Some(&keyboard)).await {
            warn!(error = %e, meeting_id = meeting.id, ext_id = meeting.doe_ext_id, "meeting reminder send to doe failed");
        }

        meetings.mark_users_notified(meeting.id).await?;
    }

    Ok(())
}

/// Participants stalled mid-registration for longer than
/// `registration_reminder_in`: nudge them once.
pub async fn register_reminder(
    users: &dyn UserRepo,
    chat: &dyn ChatAdapter,
    registration_reminder_in: Duration,
) -> Result<(), RepoError> {
    let cutoff = Utc::now() - registration_reminder_in;
    let due = users.list_unnotified_registrations_older_than(cutoff).await?;

    for participant in due {
        if let Err(e) = chat.send(participant.ext_id, REGISTRATION_REMINDER_MESSAGE, None).await {
            warn!(error = %e, ext_id = participant.ext_id, "register reminder send failed");
        }
        users.mark_registration_notified(participant.ext_id).await?;
    }

    Ok(())
}

/// Non-admin participants older than `invite_reminder_in` who haven't been
/// nudged to invite a friend yet.
pub async fn invite_reminder(
    users: &dyn UserRepo,
    chat: &dyn ChatAdapter,
    invite_reminder_in: Duration,
) -> Result<(), RepoError> {
    let cutoff = Utc::now() - invite_reminder_in;
    let due = users.list_pending_invite_reminders(cutoff).await?;

    for participant in due {
        if let Err(e) = chat.send(participant.ext_id, INVITE_REMINDER_MESSAGE, None).await {
            warn!(error = %e, ext_id = participant.ext_id, "invite reminder send failed");
        }
        users.mark_invite_notified(participant.ext_id).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::domain::meeting::{ConfirmationState, Meeting};
    use crate::error::TransportError;

    struct FakeChat {
        sent: Mutex<Vec<i64>>,
    }

    #[async_trait]
    impl ChatAdapter for FakeChat {
        async fn send(&self, ext_id: i64, _content: &str, _keyboard: Option<&Keyboard>) -> Result<i64, TransportError> {
            self.sent.lock().unwrap().push(ext_id);
            Ok(1)
        }
        async fn edit(&self, _message: crate::chat::MessageRef, _content: &str, _keyboard: Option<&Keyboard>) -> Result<(), TransportError> {
            unimplemented!()
        }
        async fn delete(&self, _message: crate::chat::MessageRef) -> Result<(), TransportError> {
            unimplemented!()
        }
        async fn respond_inline(&self, _callback_id: &str, _text: Option<&str>) -> Result<(), TransportError> {
            unimplemented!()
        }
    }

    struct FakeMeetingRepo {
        meeting: Mutex<Meeting>,
        notified: AtomicBool,
    }

    #[async_trait]
    impl MeetingRepo for FakeMeetingRepo {
        async fn save(&self, _meeting: &Meeting) -> Result<Meeting, RepoError> {
            unimplemented!()
        }
        async fn find_by_id(&self, _id: i64) -> Result<Option<Meeting>, RepoError> {
            unimplemented!()
        }
        async fn find_by_participant(&self, _ext_id: i64) -> Result<Option<Meeting>, RepoError> {
            unimplemented!()
        }
        async fn list_by_fullmatch(&self, _is_fullmatch: bool) -> Result<Vec<Meeting>, RepoError> {
            unimplemented!()
        }
        async fn assign_place_and_time(&self, _meeting_id: i64, _place_id: i64, _time: DateTime<Utc>) -> Result<(), RepoError> {
            unimplemented!()
        }
        async fn set_state(&self, _meeting_id: i64, _is_dill: bool, _state: ConfirmationState) -> Result<(), RepoError> {
            unimplemented!()
        }
        async fn set_cant_find(&self, _meeting_id: i64, _is_dill: bool, _value: bool) -> Result<(), RepoError> {
            unimplemented!()
        }
        async fn mark_users_notified(&self, _meeting_id: i64) -> Result<(), RepoError> {
            self.notified.store(true, Ordering::SeqCst);
            Ok(())
        }
        async fn clear_all(&self) -> Result<(), RepoError> {
            unimplemented!()
        }
        async fn list_starting_in_interval(&self, _since: DateTime<Utc>, _until: DateTime<Utc>) -> Result<Vec<Meeting>, RepoError> {
            Ok(vec![self.meeting.lock().unwrap().clone()])
        }
        async fn find_arrived_by_participant(&self, _ext_id: i64) -> Result<Option<Meeting>, RepoError> {
            unimplemented!()
        }
    }

    fn confirmed_meeting() -> Meeting {
        Meeting {
            id: 1,
            dill_ext_id: 10,
            doe_ext_id: 20,
            pair_score: 0.9,
            is_fullmatch: false,
            place_id: Some(1),
            time: Some(NaiveDate::from_ymd_opt(2000, 2, 14).unwrap().and_hms_opt(18, 0, 0).unwrap().and_utc()),
            dill_state: ConfirmationState::Confirmed,
            doe_state: ConfirmationState::Confirmed,
            users_notified: false,
            dill_cant_find: false,
            doe_cant_find: false,
        }
    }

    #[tokio::test]
    async fn meeting_reminder_notifies_both_sides_once() {
        let repo = FakeMeetingRepo {
            meeting: Mutex::new(confirmed_meeting()),
            notified: AtomicBool::new(false),
        };
        let chat = FakeChat { sent: Mutex::new(Vec::new()) };
        meeting_reminder(&repo, &chat, Duration::from_secs(3600 * 24 * 365 * 50)).await.unwrap();
        assert_eq!(*chat.sent.lock().unwrap(), vec![10, 20]);
        assert!(repo.notified.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn meeting_reminder_skips_already_notified() {
        let mut meeting = confirmed_meeting();
        meeting.users_notified = true;
        let repo = FakeMeetingRepo { meeting: Mutex::new(meeting), notified: AtomicBool::new(false) };
        let chat = FakeChat { sent: Mutex::new(Vec::new()) };
        meeting_reminder(&repo, &chat, Duration::from_secs(3600 * 24 * 365 * 50)).await.unwrap();
        assert!(chat.sent.lock().unwrap().is_empty());
        assert!(!repo.notified.load(Ordering::SeqCst));
    }
}
