//! Pair solver (spec.md §4.5): greedy mutual-preference pass, then Hungarian
//! assignment on the opposite-sex residual.
//!
//! Grounded in `original_source/internal/matcher/matcher.go`'s `Match`.

use serde::Serialize;

use crate::domain::participant::{Participant, Sex};
use crate::embedding::EmbeddingGateway;
use crate::error::MatchError;
use crate::hungarian;
use crate::preference::mentions;
use crate::similarity::similarity_matrix;
use crate::time_slot;

const MENTION_BONUS: f64 = 0.3;
const FORBIDDEN: f64 = -1e9;

/// A regular pair: mutual sex constraint satisfied, availability overlaps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pair {
    pub dill_ext_id: i64,
    pub doe_ext_id: i64,
    pub score: f64,
    pub time_intersection: String,
}

/// A mutually-interested pair with no availability overlap; never scheduled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullMatch {
    pub dill_ext_id: i64,
    pub doe_ext_id: i64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub pairs: Vec<Pair>,
    pub full_matches: Vec<FullMatch>,
    pub unmatched: Vec<i64>,
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Enforce the `dill` = male, `doe` = female convention at the write
/// boundary (spec.md §9, §3).
fn order_by_sex(a: &Participant, b: &Participant) -> (i64, i64) {
    if a.sex == Some(Sex::Male) {
        (a.ext_id, b.ext_id)
    } else {
        (b.ext_id, a.ext_id)
    }
}

/// Run the pair solver over `participants`, in input order.
///
/// `participants` must already be filtered to verified (completed,
/// not-opted-out) entries; every element must have `sex`, `about`, and
/// `avail` populated.
pub async fn solve(
    participants: &[Participant],
    embedder: &dyn EmbeddingGateway,
) -> Result<MatchResult, MatchError> {
    if participants.len() < 2 {
        return Err(MatchError::NotEnoughUsers(participants.len()));
    }

    let abouts: Vec<String> = participants.iter().map(|p| p.about.clone()).collect();
    let vectors = embedder.embed(&abouts).await?;
    let sim = similarity_matrix(&vectors);

    let n = participants.len();
    let mut used = vec![false; n];
    let mut pairs = Vec::new();
    let mut full_matches = Vec::new();

    for i in 0..n {
        if used[i] {
            continue;
        }
        for j in (i + 1)..n {
            if used[j] {
                continue;
            }
            let (a, b) = (&participants[i], &participants[j]);
            if a.sex == b.sex {
                continue;
            }

            let a_handle = a.handle.as_deref().unwrap_or("");
            let b_handle = b.handle.as_deref().unwrap_or("");
            let a_wants_b = mentions(&a.about, b_handle) && !b_handle.is_empty();
            let b_wants_a = mentions(&b.about, a_handle) && !a_handle.is_empty();

            if a_wants_b && b_wants_a {
                let score = round3(sim[i][j]);
                let (dill, doe) = order_by_sex(a, b);
                let (dill_avail, doe_avail) = if dill == a.ext_id { (&a.avail, &b.avail) } else { (&b.avail, &a.avail) };
                let intersection = time_slot::intersect(dill_avail, doe_avail);

                if time_slot::has_overlap(&intersection) {
                    pairs.push(Pair {
                        dill_ext_id: dill,
                        doe_ext_id: doe,
                        score,
                        time_intersection: intersection,
                    });
                } else {
                    full_matches.push(FullMatch {
                        dill_ext_id: dill,
                        doe_ext_id: doe,
                        score,
                    });
                }

                used[i] = true;
                used[j] = true;
                break;
            }
        }
    }

    let mut males = Vec::new();
    let mut females = Vec::new();
    for i in 0..n {
        if used[i] {
            continue;
        }
        match participants[i].sex {
            Some(Sex::Male) => males.push(i),
            Some(Sex::Female) => females.push(i),
            None => {}
        }
    }

    let size = males.len().max(females.len());
    if size > 0 {
        let mut score_matrix = vec![vec![FORBIDDEN; size]; size];
        for i in 0..size {
            for j in 0..size {
                if i >= males.len() || j >= females.len() {
                    continue;
                }
                let (mi, fj) = (males[i], females[j]);
                let intersection = time_slot::intersect(&participants[mi].avail, &participants[fj].avail);
                if !time_slot::has_overlap(&intersection) {
                    continue;
                }

                let m = &participants[mi];
                let f = &participants[fj];
                let m_handle = m.handle.as_deref().unwrap_or("");
                let f_handle = f.handle.as_deref().unwrap_or("");
                let mut score = sim[mi][fj];
                let m_wants_f = !f_handle.is_empty() && mentions(&m.about, f_handle);
                let f_wants_m = !m_handle.is_empty() && mentions(&f.about, m_handle);
                if m_wants_f || f_wants_m {
                    score += MENTION_BONUS;
                }
                score_matrix[i][j] = score;
            }
        }

        let assignment = hungarian::solve(&score_matrix);
        for (i, &j) in assignment.iter().enumerate() {
            if i >= males.len() || j >= females.len() {
                continue;
            }
            if score_matrix[i][j] <= FORBIDDEN {
                continue;
            }
            let (mi, fj) = (males[i], females[j]);
            let intersection = time_slot::intersect(&participants[mi].avail, &participants[fj].avail);
            pairs.push(Pair {
                dill_ext_id: participants[mi].ext_id,
                doe_ext_id: participants[fj].ext_id,
                score: round3(score_matrix[i][j]),
                time_intersection: intersection,
            });
            used[mi] = true;
            used[fj] = true;
        }
    }

    let unmatched = (0..n)
        .filter(|&i| !used[i])
        .map(|i| participants[i].ext_id)
        .collect();

    Ok(MatchResult {
        pairs,
        full_matches,
        unmatched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EmbeddingError;
    use async_trait::async_trait;
    use chrono::Utc;
    use crate::domain::participant::RegistrationState;

    struct FakeEmbedder;

    #[async_trait]
    impl EmbeddingGateway for FakeEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, EmbeddingError> {
            Ok(texts.iter().map(|t| vec![t.len() as f64, 1.0]).collect())
        }
    }

    fn participant(ext_id: i64, sex: Sex, about: &str, avail: &str, handle: &str) -> Participant {
        Participant {
            ext_id,
            display_name: None,
            handle: Some(handle.to_owned()),
            sex: Some(sex),
            about: about.to_owned(),
            avail: avail.to_owned(),
            state: RegistrationState::Completed,
            is_admin: false,
            opted_out: false,
            registration_notified: false,
            invite_notified: false,
            referral_code: None,
            referrer_ext_id: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn too_few_participants_is_an_error() {
        let result = solve(&[], &FakeEmbedder).await;
        assert!(matches!(result, Err(MatchError::NotEnoughUsers(0))));
    }

    #[tokio::test]
    async fn same_sex_pair_remains_unmatched() {
        let a = participant(1, Sex::Male, "no mentions", "111111", "a");
        let b = participant(2, Sex::Male, "no mentions", "111111", "b");
        let result = solve(&[a, b], &FakeEmbedder).await.unwrap();
        assert!(result.pairs.is_empty());
        assert!(result.full_matches.is_empty());
        assert_eq!(result.unmatched.len(), 2);
    }

    #[tokio::test]
    async fn mutual_mentions_with_overlap_form_a_regular_pair() {
        let a = participant(1, Sex::Male, "@bob seems cool", "111000", "alice");
        let b = participant(2, Sex::Female, "@alice too", "110000", "bob");
        let result = solve(&[a, b], &FakeEmbedder).await.unwrap();
        assert_eq!(result.pairs.len(), 1);
        assert_eq!(result.pairs[0].dill_ext_id, 1);
        assert_eq!(result.pairs[0].doe_ext_id, 2);
        assert!(result.full_matches.is_empty());
        assert!(result.unmatched.is_empty());
    }

    #[tokio::test]
    async fn mutual_mentions_without_overlap_form_a_fullmatch() {
        let a = participant(1, Sex::Male, "@bob", "111000", "alice");
        let b = participant(2, Sex::Female, "@alice", "000111", "bob");
        let result = solve(&[a, b], &FakeEmbedder).await.unwrap();
        assert!(result.pairs.is_empty());
        assert_eq!(result.full_matches.len(), 1);
        assert_eq!(result.full_matches[0].dill_ext_id, 1);
        assert_eq!(result.full_matches[0].doe_ext_id, 2);
    }

    #[tokio::test]
    async fn residual_opposite_sex_pairs_via_hungarian() {
        let a = participant(1, Sex::Male, "no mentions", "111111", "a");
        let b = participant(2, Sex::Female, "no mentions", "111111", "b");
        let result = solve(&[a, b], &FakeEmbedder).await.unwrap();
        assert_eq!(result.pairs.len(), 1);
        assert_eq!(result.pairs[0].dill_ext_id, 1);
        assert_eq!(result.pairs[0].doe_ext_id, 2);
    }

    #[tokio::test]
    async fn residual_with_no_overlap_stays_unmatched() {
        let a = participant(1, Sex::Male, "x", "111000", "a");
        let b = participant(2, Sex::Female, "y", "000111", "b");
        let result = solve(&[a, b], &FakeEmbedder).await.unwrap();
        assert!(result.pairs.is_empty());
        assert_eq!(result.unmatched.len(), 2);
    }
}
