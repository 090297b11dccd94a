//! Note duration quantization
//!
//! Snaps a played duration to the nearest musically expressible length:
//! a power-of-two note value, a dotted note, or a triplet. The snapped
//! length never exceeds the gap to the next note's onset.

use num_rational::Ratio;

/// Quantize a tick duration to a musical note length.
///
/// `min_length` is the literal onset-to-offset span of the note (> 0);
/// `max_length` is the span to the next note's onset, the hard upper bound
/// for the result. `whole_note_ticks` is four times the resolution.
/// `max_dot_count` caps dotted-note candidates; -1 means unlimited.
pub fn quantize(min_length: u64, max_length: u64, whole_note_ticks: u64, max_dot_count: i32) -> u64 {
    debug_assert!(min_length > 0, "zero-length notes must be dropped before quantization");

    // Factor whole notes out so the search stays inside one whole-note span.
    let whole_count = (min_length - 1) / whole_note_ticks;
    let min_length = min_length - whole_count * whole_note_ticks;
    let max_length = max_length.saturating_sub(whole_count * whole_note_ticks);

    // Largest power-of-two divisor of the whole note with
    // near_pow2 / 2 < min_length <= near_pow2. May exceed max_length.
    let mut near_pow2 = whole_note_ticks;
    while near_pow2 / 2 >= min_length {
        near_pow2 /= 2;
    }

    let candidates = rate_candidates(near_pow2, max_dot_count);

    // min_length / near_pow2 is in (1/2, 1] by construction of near_pow2.
    let rate_lower = Ratio::new(min_length as i64, near_pow2 as i64);
    let rate_upper = Ratio::new(max_length as i64, near_pow2 as i64);

    let nearest = match candidates.binary_search(&rate_lower) {
        Ok(i) => candidates[i],
        Err(i) => {
            // Both neighbors exist: 1/2 < rate_lower < 1 and the set
            // always contains 1/2 and 1. Ties go to the upper neighbor.
            let lower = candidates[i - 1];
            let upper = candidates[i];
            if rate_lower - lower < upper - rate_lower {
                lower
            } else {
                upper
            }
        }
    };

    // Never overrun the gap to the next onset.
    let rate = nearest.min(rate_upper);

    let snapped = (Ratio::from_integer(near_pow2 as i64) * rate + Ratio::new(1, 2))
        .floor()
        .to_integer() as u64;
    snapped + whole_count * whole_note_ticks
}

/// Sorted candidate rates relative to `near_pow2`: plain halves, dotted
/// values while `near_pow2` stays divisible by `2^(dot+1)`, and the triplet.
fn rate_candidates(near_pow2: u64, max_dot_count: i32) -> Vec<Ratio<i64>> {
    let mut candidates = vec![Ratio::new(1, 2), Ratio::from_integer(1)];

    let max_dots = if max_dot_count < 0 { i32::MAX } else { max_dot_count };
    let mut dotted = Ratio::new(1, 2);
    let mut dot = 1;
    while dot <= max_dots {
        let divisor = 2i64 << dot;
        if near_pow2 as i64 % divisor != 0 {
            break;
        }
        dotted += Ratio::new(1, 1i64 << (dot + 1));
        candidates.push(dotted); // 3/4, 7/8, 15/16, ...
        dot += 1;
    }

    candidates.push(Ratio::new(2, 3)); // triplet
    candidates.sort_unstable();
    candidates.dedup();
    candidates
}
