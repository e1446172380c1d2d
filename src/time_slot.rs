//! Weekly availability bitstrings (spec.md §4.1).
//!
//! A length-6 string over `{0,1}`, one bit per 2-hour slot starting at
//! 10:00 in the fixed `Europe/Samara` timezone. Grounded in
//! `original_source/internal/domain/timerange.go`.

use crate::rand_source::RandomSource;

pub const SLOT_COUNT: usize = 6;

/// Start hours (24h clock) of each slot, matching
/// `original_source`'s `TimeRanges` table.
const SLOT_START_HOURS: [u32; SLOT_COUNT] = [10, 12, 14, 16, 18, 20];

fn is_valid(s: &str) -> bool {
    s.len() == SLOT_COUNT && s.bytes().all(|b| b == b'0' || b == b'1')
}

/// Bitwise AND of two availability strings. Returns `"000000"` if either
/// input is malformed (wrong length or non-binary character).
pub fn intersect(a: &str, b: &str) -> String {
    if !is_valid(a) || !is_valid(b) {
        return "0".repeat(SLOT_COUNT);
    }
    a.bytes()
        .zip(b.bytes())
        .map(|(x, y)| if x == b'1' && y == b'1' { '1' } else { '0' })
        .collect()
}

/// True if any bit is set.
pub fn has_overlap(s: &str) -> bool {
    s.bytes().any(|b| b == b'1')
}

/// Uniformly choose a set bit and return `HH:MM`, `MM` a uniform multiple of
/// 5 in `[0, 55]`. Returns `"12:00"` deterministically if no bit is set.
pub fn pick_random_time(s: &str, rng: &dyn RandomSource) -> String {
    let indices: Vec<usize> = s
        .bytes()
        .enumerate()
        .filter(|&(_, b)| b == b'1')
        .map(|(i, _)| i)
        .collect();

    if indices.is_empty() {
        return "12:00".to_owned();
    }
    let idx = indices[rng.gen_range(indices.len())];

    let hour = SLOT_START_HOURS[idx];
    let minute = rng.gen_range(12) * 5;
    format!("{hour:02}:{minute:02}")
}

/// Mask bits 4..6 to `0` if any of bits 0..4 is set, biasing toward earlier
/// slots. Used for the first 30 place-assignment attempts (spec.md §4.1).
pub fn early_biased(s: &str) -> String {
    if !is_valid(s) {
        return "0".repeat(SLOT_COUNT);
    }
    let early_set = s.as_bytes()[0..4].contains(&b'1');
    if !early_set {
        return s.to_owned();
    }
    let mut out = s.as_bytes().to_vec();
    for b in &mut out[4..6] {
        *b = b'0';
    }
    String::from_utf8(out).expect("ascii bitstring")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rand_source::SeededRandom;

    #[test]
    fn intersect_is_commutative_and_identity_with_all_ones() {
        let a = "111000";
        let b = "110100";
        assert_eq!(intersect(a, b), intersect(b, a));
        assert_eq!(intersect(a, "111111"), a);
    }

    #[test]
    fn intersect_malformed_input_is_all_zero() {
        assert_eq!(intersect("11", "111111"), "000000");
        assert_eq!(intersect("11111x", "111111"), "000000");
    }

    #[test]
    fn has_overlap_detects_any_set_bit() {
        assert!(has_overlap("000010"));
        assert!(!has_overlap("000000"));
    }

    #[test]
    fn pick_random_time_falls_back_to_noon_when_empty() {
        let rng = SeededRandom::new(1);
        assert_eq!(pick_random_time("000000", &rng), "12:00");
    }

    #[test]
    fn pick_random_time_respects_slot_bounds() {
        let rng = SeededRandom::new(42);
        for _ in 0..50 {
            let t = pick_random_time("100000", &rng);
            assert!(t.starts_with("10:"));
            let minute: u32 = t[3..5].parse().unwrap();
            assert_eq!(minute % 5, 0);
            assert!(minute <= 55);
        }
    }

    #[test]
    fn early_biased_masks_late_slots_when_early_available() {
        assert_eq!(early_biased("101010"), "101000");
        assert_eq!(early_biased("000010"), "000010");
        assert_eq!(early_biased("000000"), "000000");
    }
}
