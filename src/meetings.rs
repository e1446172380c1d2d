//! Meeting lifecycle state machine (spec.md §4.7).
//!
//! Confirm/cancel are grounded in `original_source/internal/usecase/meeting.go`;
//! arrived/cant-find have no Go counterpart in the retrieved pack and are
//! built directly from spec.md §4.7/§8.

use std::sync::Arc;

use crate::domain::meeting::{ConfirmationState, Meeting};
use crate::error::MeetingError;
use crate::repo::MeetingRepo;

pub struct MeetingService {
    meetings: Arc<dyn MeetingRepo>,
}

impl MeetingService {
    pub fn new(meetings: Arc<dyn MeetingRepo>) -> Self {
        Self { meetings }
    }

    async fn load(&self, meeting_id: i64) -> Result<Meeting, MeetingError> {
        self.meetings
            .find_by_id(meeting_id)
            .await?
            .ok_or(MeetingError::NotFound(meeting_id))
    }

    fn side_of(meeting: &Meeting, ext_id: i64) -> Result<bool, MeetingError> {
        meeting.side_of(ext_id).ok_or(MeetingError::NotAParticipant {
            meeting_id: meeting.id,
            ext_id,
        })
    }

    /// Mark `ext_id`'s side confirmed. A no-op if that side is already
    /// terminal (`cancelled`).
    pub async fn confirm(&self, meeting_id: i64, ext_id: i64) -> Result<Meeting, MeetingError> {
        let meeting = self.load(meeting_id).await?;
        let is_dill = Self::side_of(&meeting, ext_id)?;
        if meeting.state_of(is_dill).is_terminal() {
            return Ok(meeting);
        }
        self.meetings.set_state(meeting_id, is_dill, ConfirmationState::Confirmed).await?;
        self.load(meeting_id).await
    }

    /// Mark `ext_id`'s side cancelled. Idempotent and permanent (spec.md
    /// invariant 4: once `cancelled`, no further transitions occur).
    pub async fn cancel(&self, meeting_id: i64, ext_id: i64) -> Result<Meeting, MeetingError> {
        let meeting = self.load(meeting_id).await?;
        let is_dill = Self::side_of(&meeting, ext_id)?;
        if meeting.state_of(is_dill).is_terminal() {
            return Ok(meeting);
        }
        self.meetings.set_state(meeting_id, is_dill, ConfirmationState::Cancelled).await?;
        self.load(meeting_id).await
    }

    /// Mark `ext_id`'s side arrived. Only a valid transition from
    /// `confirmed` (spec.md invariant 4); any other current state is a
    /// no-op, including an already-`arrived` side.
    pub async fn set_arrived(&self, meeting_id: i64, ext_id: i64) -> Result<Meeting, MeetingError> {
        let meeting = self.load(meeting_id).await?;
        let is_dill = Self::side_of(&meeting, ext_id)?;
        if meeting.state_of(is_dill) != ConfirmationState::Confirmed {
            return Ok(meeting);
        }
        self.meetings.set_state(meeting_id, is_dill, ConfirmationState::Arrived).await?;
        self.load(meeting_id).await
    }

    /// Flag that `ext_id` could not find their partner at the venue.
    /// Idempotent.
    pub async fn set_cant_find(&self, meeting_id: i64, ext_id: i64) -> Result<Meeting, MeetingError> {
        let meeting = self.load(meeting_id).await?;
        let is_dill = Self::side_of(&meeting, ext_id)?;
        if meeting.cant_find_of(is_dill) {
            return Ok(meeting);
        }
        self.meetings.set_cant_find(meeting_id, is_dill, true).await?;
        self.load(meeting_id).await
    }

    /// The other participant's external id, or `NotAParticipant` if
    /// `ext_id` isn't in this meeting.
    pub async fn partner_of(&self, meeting_id: i64, ext_id: i64) -> Result<i64, MeetingError> {
        let meeting = self.load(meeting_id).await?;
        meeting.partner_of(ext_id).ok_or(MeetingError::NotAParticipant {
            meeting_id,
            ext_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;

    use crate::error::RepoError;

    struct FakeMeetingRepo {
        meeting: Mutex<Meeting>,
    }

    fn base_meeting() -> Meeting {
        Meeting {
            id: 1,
            dill_ext_id: 10,
            doe_ext_id: 20,
            pair_score: 0.9,
            is_fullmatch: false,
            place_id: Some(1),
            time: Some(Utc::now()),
            dill_state: ConfirmationState::NotConfirmed,
            doe_state: ConfirmationState::NotConfirmed,
            users_notified: false,
            dill_cant_find: false,
            doe_cant_find: false,
        }
    }

    #[async_trait]
    impl MeetingRepo for FakeMeetingRepo {
        async fn save(&self, _meeting: &Meeting) -> Result<Meeting, RepoError> {
            unimplemented!()
        }
        async fn find_by_id(&self, id: i64) -> Result<Option<Meeting>, RepoError> {
            let m = self.meeting.lock().unwrap();
            Ok((m.id == id).then(|| m.clone()))
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
        async fn set_state(&self, meeting_id: i64, is_dill: bool, state: ConfirmationState) -> Result<(), RepoError> {
            let mut m = self.meeting.lock().unwrap();
            assert_eq!(m.id, meeting_id);
            if is_dill {
                m.dill_state = state;
            } else {
                m.doe_state = state;
            }
            Ok(())
        }
        async fn set_cant_find(&self, meeting_id: i64, is_dill: bool, value: bool) -> Result<(), RepoError> {
            let mut m = self.meeting.lock().unwrap();
            assert_eq!(m.id, meeting_id);
            if is_dill {
                m.dill_cant_find = value;
            } else {
                m.doe_cant_find = value;
            }
            Ok(())
        }
        async fn mark_users_notified(&self, _meeting_id: i64) -> Result<(), RepoError> {
            unimplemented!()
        }
        async fn clear_all(&self) -> Result<(), RepoError> {
            unimplemented!()
        }
        async fn list_starting_in_interval(&self, _since: DateTime<Utc>, _until: DateTime<Utc>) -> Result<Vec<Meeting>, RepoError> {
            unimplemented!()
        }
        async fn find_arrived_by_participant(&self, _ext_id: i64) -> Result<Option<Meeting>, RepoError> {
            unimplemented!()
        }
    }

    fn service() -> MeetingService {
        MeetingService::new(Arc::new(FakeMeetingRepo {
            meeting: Mutex::new(base_meeting()),
        }))
    }

    #[tokio::test]
    async fn confirm_then_confirm_then_arrive_both_sides() {
        let svc = service();
        svc.confirm(1, 10).await.unwrap();
        svc.confirm(1, 20).await.unwrap();
        svc.set_arrived(1, 10).await.unwrap();
        let m = svc.set_arrived(1, 20).await.unwrap();
        assert_eq!(m.dill_state, ConfirmationState::Arrived);
        assert_eq!(m.doe_state, ConfirmationState::Arrived);
    }

    #[tokio::test]
    async fn cancel_then_confirm_partner_never_reaches_both_confirmed() {
        let svc = service();
        svc.cancel(1, 10).await.unwrap();
        let m = svc.confirm(1, 20).await.unwrap();
        assert_eq!(m.dill_state, ConfirmationState::Cancelled);
        assert_eq!(m.doe_state, ConfirmationState::Confirmed);
        assert!(!m.both_confirmed());
    }

    #[tokio::test]
    async fn arriving_without_confirming_first_is_a_no_op() {
        let svc = service();
        let m = svc.set_arrived(1, 10).await.unwrap();
        assert_eq!(m.dill_state, ConfirmationState::NotConfirmed);
    }

    #[tokio::test]
    async fn non_participant_is_rejected() {
        let svc = service();
        let result = svc.confirm(1, 999).await;
        assert!(matches!(result, Err(MeetingError::NotAParticipant { meeting_id: 1, ext_id: 999 })));
    }

    #[tokio::test]
    async fn cancel_is_terminal_and_idempotent() {
        let svc = service();
        svc.cancel(1, 10).await.unwrap();
        let m = svc.confirm(1, 10).await.unwrap();
        assert_eq!(m.dill_state, ConfirmationState::Cancelled);
    }
}
