//! Place scheduler (spec.md §4.6): assigns each regular meeting a venue and
//! a time slot, avoiding double-booking a place within a 45-minute buffer.
//!
//! No direct counterpart in `original_source` (which picks a place uniformly
//! at random with no collision avoidance); the buffer-collision logic here
//! is grounded directly in spec.md §4.6/§9.

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Europe::Samara;
use tracing::warn;

use crate::domain::place::Place;
use crate::error::SchedulingError;
use crate::rand_source::RandomSource;
use crate::time_slot;

const MAX_ATTEMPTS: u32 = 50;
const EARLY_BIASED_ATTEMPTS: u32 = 30;
const BUFFER_MINUTES: i64 = 45;

/// Minimal view of a regular meeting the scheduler needs: its id and the
/// two sides' availability bitstrings.
pub struct MeetingToSchedule {
    pub meeting_id: i64,
    pub dill_avail: String,
    pub doe_avail: String,
}

pub struct Assignment {
    pub meeting_id: i64,
    pub place_id: i64,
    pub time: DateTime<Utc>,
    /// True if this assignment used the unbuffered fallback path.
    pub fallback: bool,
}

fn parse_civil_time(date: NaiveDate, time_str: &str) -> Option<DateTime<Utc>> {
    let time = NaiveTime::parse_from_str(time_str, "%H:%M").ok()?;
    let naive = date.and_time(time);
    Samara.from_local_datetime(&naive).earliest().map(|dt| dt.with_timezone(&Utc))
}

fn within_buffer(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    (a - b).abs() < ChronoDuration::minutes(BUFFER_MINUTES)
}

/// Schedule every meeting in `meetings` against `places`. `places` need not
/// be pre-sorted; this sorts by quality descending internally.
pub fn schedule(
    meetings: &[MeetingToSchedule],
    places: &[Place],
    meeting_date: NaiveDate,
    rng: &dyn RandomSource,
) -> Result<Vec<Assignment>, SchedulingError> {
    if meetings.is_empty() {
        return Err(SchedulingError::NoPairs);
    }
    if places.is_empty() {
        return Err(SchedulingError::NoPlaces(meetings.len()));
    }

    let mut sorted_places: Vec<&Place> = places.iter().collect();
    sorted_places.sort_by(|a, b| b.quality.cmp(&a.quality));

    let mut bookings: Vec<(i64, DateTime<Utc>)> = Vec::new();
    let mut assignments = Vec::with_capacity(meetings.len());

    'meeting: for meeting in meetings {
        let intersection = time_slot::intersect(&meeting.dill_avail, &meeting.doe_avail);
        let preferred = time_slot::early_biased(&intersection);

        for attempt in 0..MAX_ATTEMPTS {
            let src = if attempt < EARLY_BIASED_ATTEMPTS { &preferred } else { &intersection };
            let time_str = time_slot::pick_random_time(src, rng);
            let Some(t) = parse_civil_time(meeting_date, &time_str) else {
                continue;
            };

            for place in &sorted_places {
                let collides = bookings
                    .iter()
                    .any(|&(booked_place, booked_time)| booked_place == place.id && within_buffer(t, booked_time));
                if collides {
                    continue;
                }

                bookings.push((place.id, t));
                assignments.push(Assignment {
                    meeting_id: meeting.meeting_id,
                    place_id: place.id,
                    time: t,
                    fallback: false,
                });
                continue 'meeting;
            }
        }

        warn!(meeting_id = meeting.meeting_id, "place scheduler exhausted 50 attempts, falling back to unbuffered assignment");
        let time_str = time_slot::pick_random_time(&intersection, rng);
        let Some(t) = parse_civil_time(meeting_date, &time_str) else {
            return Err(SchedulingError::NoPlaces(1));
        };
        let place = sorted_places[rng.gen_range(sorted_places.len())];
        bookings.push((place.id, t));
        assignments.push(Assignment {
            meeting_id: meeting.meeting_id,
            place_id: place.id,
            time: t,
            fallback: true,
        });
    }

    Ok(assignments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rand_source::SeededRandom;

    fn place(id: i64, quality: i32) -> Place {
        Place {
            id,
            description: format!("place {id}"),
            route: None,
            photo_key: None,
            quality,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2000, 2, 14).unwrap()
    }

    #[test]
    fn no_meetings_is_an_error() {
        let rng = SeededRandom::new(1);
        let result = schedule(&[], &[place(1, 1)], date(), &rng);
        assert!(matches!(result, Err(SchedulingError::NoPairs)));
    }

    #[test]
    fn no_places_with_regular_meetings_is_an_error() {
        let rng = SeededRandom::new(1);
        let meetings = [MeetingToSchedule {
            meeting_id: 1,
            dill_avail: "111111".to_owned(),
            doe_avail: "111111".to_owned(),
        }];
        let result = schedule(&meetings, &[], date(), &rng);
        assert!(matches!(result, Err(SchedulingError::NoPlaces(1))));
    }

    #[test]
    fn assigns_every_meeting_a_place_and_time() {
        let rng = SeededRandom::new(7);
        let meetings = [
            MeetingToSchedule { meeting_id: 1, dill_avail: "111111".to_owned(), doe_avail: "111111".to_owned() },
            MeetingToSchedule { meeting_id: 2, dill_avail: "111111".to_owned(), doe_avail: "111111".to_owned() },
        ];
        let places = [place(1, 10), place(2, 5)];
        let assignments = schedule(&meetings, &places, date(), &rng).unwrap();
        assert_eq!(assignments.len(), 2);
        for a in &assignments {
            assert!(places.iter().any(|p| p.id == a.place_id));
        }
    }

    #[test]
    fn avoids_double_booking_a_single_place_within_the_buffer() {
        let rng = SeededRandom::new(3);
        let meetings: Vec<_> = (0..5)
            .map(|i| MeetingToSchedule { meeting_id: i, dill_avail: "100000".to_owned(), doe_avail: "100000".to_owned() })
            .collect();
        let places = [place(1, 10)];
        let assignments = schedule(&meetings, &places, date(), &rng).unwrap();
        assert_eq!(assignments.len(), 5);
        let non_fallback: Vec<_> = assignments.iter().filter(|a| !a.fallback).collect();
        for i in 0..non_fallback.len() {
            for j in (i + 1)..non_fallback.len() {
                assert!(!within_buffer(non_fallback[i].time, non_fallback[j].time));
            }
        }
    }
}
