//! Matching cycle use case (spec.md §4: "admin → pair solver → meeting
//! scheduler → meeting store"). Grounded in
//! `original_source/internal/usecase/matching.go`'s `RunMatch` and
//! `internal/usecase/meeting.go`'s `CreateMeetings`: solve pairs over every
//! verified participant, wipe the previous cycle's meetings, persist the
//! new pairs/full-matches as rows, then schedule a venue and time for every
//! regular (non-fullmatch) meeting.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::meeting::{ConfirmationState, Meeting};
use crate::embedding::EmbeddingGateway;
use crate::error::CoreError;
use crate::matching;
use crate::rand_source::RandomSource;
use crate::repo::{MeetingRepo, PlaceRepo, UserRepo};
use crate::scheduling::{self, MeetingToSchedule};

/// Counts from one completed matching cycle, for an admin-facing summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchingCycleSummary {
    pub pairs_created: usize,
    pub full_matches_created: usize,
    pub unmatched: usize,
    pub scheduled: usize,
    pub fallback_scheduled: usize,
}

fn new_meeting(dill_ext_id: i64, doe_ext_id: i64, pair_score: f64, is_fullmatch: bool) -> Meeting {
    Meeting {
        id: 0,
        dill_ext_id,
        doe_ext_id,
        pair_score,
        is_fullmatch,
        place_id: None,
        time: None,
        dill_state: ConfirmationState::NotConfirmed,
        doe_state: ConfirmationState::NotConfirmed,
        users_notified: false,
        dill_cant_find: false,
        doe_cant_find: false,
    }
}

pub struct MatchingCycle {
    users: Arc<dyn UserRepo>,
    places: Arc<dyn PlaceRepo>,
    meetings: Arc<dyn MeetingRepo>,
    embedder: Arc<dyn EmbeddingGateway>,
}

impl MatchingCycle {
    pub fn new(
        users: Arc<dyn UserRepo>,
        places: Arc<dyn PlaceRepo>,
        meetings: Arc<dyn MeetingRepo>,
        embedder: Arc<dyn EmbeddingGateway>,
    ) -> Self {
        Self {
            users,
            places,
            meetings,
            embedder,
        }
    }

    /// Run one full matching cycle. Admin-triggered, one-shot (spec.md §4.4,
    /// §9: "admin-triggered matching is a one-shot task spawned inline").
    pub async fn run(&self, meeting_date: NaiveDate, rng: &dyn RandomSource) -> Result<MatchingCycleSummary, CoreError> {
        let participants = self.users.list_verified().await?;
        let result = matching::solve(&participants, self.embedder.as_ref()).await?;

        self.meetings.clear_all().await?;

        let avail_by_ext_id: HashMap<i64, String> =
            participants.iter().map(|p| (p.ext_id, p.avail.clone())).collect();

        let mut to_schedule = Vec::with_capacity(result.pairs.len());
        for pair in &result.pairs {
            let meeting = new_meeting(pair.dill_ext_id, pair.doe_ext_id, pair.score, false);
            let saved = self.meetings.save(&meeting).await?;
            to_schedule.push(MeetingToSchedule {
                meeting_id: saved.id,
                dill_avail: avail_by_ext_id.get(&pair.dill_ext_id).cloned().unwrap_or_default(),
                doe_avail: avail_by_ext_id.get(&pair.doe_ext_id).cloned().unwrap_or_default(),
            });
        }

        for full_match in &result.full_matches {
            let meeting = new_meeting(full_match.dill_ext_id, full_match.doe_ext_id, full_match.score, true);
            self.meetings.save(&meeting).await?;
        }

        let mut scheduled = 0;
        let mut fallback_scheduled = 0;
        if !to_schedule.is_empty() {
            let places = self.places.list_all().await?;
            let assignments = scheduling::schedule(&to_schedule, &places, meeting_date, rng)?;
            for assignment in &assignments {
                self.meetings
                    .assign_place_and_time(assignment.meeting_id, assignment.place_id, assignment.time)
                    .await?;
                scheduled += 1;
                if assignment.fallback {
                    fallback_scheduled += 1;
                }
            }
        }

        Ok(MatchingCycleSummary {
            pairs_created: result.pairs.len(),
            full_matches_created: result.full_matches.len(),
            unmatched: result.unmatched.len(),
            scheduled,
            fallback_scheduled,
        })
    }
}
