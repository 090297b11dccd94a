//! Note length decomposition and textual note naming
//!
//! Maps tick lengths to MML length codes (`4` = quarter, `4.` = dotted
//! quarter, `12` = eighth triplet) and note numbers to pitch names. A
//! length with no single code is rendered as tied primitives.

use super::symbols::MmlSymbols;

/// Length/pitch codec for one conversion run.
///
/// The primitive table is fixed by the resolution, the dot limit, and the
/// triplet preference, all immutable for the lifetime of the converter.
#[derive(Debug)]
pub struct NoteConverter {
    whole_note_ticks: u64,
    /// Preferred primitives, descending: power-of-two values, their dotted
    /// extensions up to the dot limit, and (with the triplet preference)
    /// their two-thirds values. Paired with the dot count for tie-breaking.
    primitives: Vec<(u64, u32)>,
    /// Every divisor of the whole note, descending. Exact-sum fallback for
    /// spans the preferred table cannot reach.
    divisors: Vec<u64>,
    symbols: MmlSymbols,
}

impl NoteConverter {
    pub fn new(resolution: u16, max_dot_count: i32, use_triplet: bool, symbols: MmlSymbols) -> Self {
        let whole_note_ticks = resolution as u64 * 4;
        let primitives = build_primitives(whole_note_ticks, max_dot_count, use_triplet);
        let mut divisors: Vec<u64> =
            (1..=whole_note_ticks).filter(|d| whole_note_ticks % d == 0).collect();
        divisors.reverse();
        NoteConverter { whole_note_ticks, primitives, divisors, symbols }
    }

    pub fn symbols(&self) -> &MmlSymbols {
        &self.symbols
    }

    /// Decompose `ticks` into primitive lengths summing exactly to `ticks`,
    /// preferring the fewest and most natural values.
    ///
    /// Spans of two whole notes or more start with plain whole notes; the
    /// remainder is solved over the primitive table (fewest tokens, then
    /// fewest dots, then larger values first). Whole-note divisors serve as
    /// an exact-sum fallback for remainders the table cannot reach.
    pub fn primitive_lengths(&self, ticks: u64) -> Vec<u64> {
        let whole = self.whole_note_ticks;
        let mut lengths = Vec::new();
        let mut remaining = ticks;

        while remaining >= whole * 2 {
            lengths.push(whole);
            remaining -= whole;
        }
        if remaining == 0 {
            return lengths;
        }
        if self.has_single_code(remaining) {
            lengths.push(remaining);
            return lengths;
        }
        match self.decompose(remaining) {
            Some(parts) => lengths.extend(parts),
            None => self.decompose_divisors(remaining, &mut lengths),
        }
        lengths
    }

    /// Render `ticks` of the given note (or a rest, for `None`) as MML text.
    pub fn note_text(&self, ticks: u64, key: Option<u8>) -> String {
        let lengths = self.primitive_lengths(ticks);
        let mut text = String::new();
        for (i, &length) in lengths.iter().enumerate() {
            match key {
                Some(key) => {
                    if i == 0 {
                        text.push_str(&self.symbols.notes[(key % 12) as usize]);
                    } else {
                        // Continuation of the same pitch: tie plus length code.
                        text.push_str(&self.symbols.tie);
                    }
                }
                None => text.push_str(&self.symbols.rest),
            }
            text.push_str(&self.length_code(length));
        }
        text
    }

    /// True if `length` renders as one length code (a whole-note divisor or
    /// a dotted value within the dot limit).
    fn has_single_code(&self, length: u64) -> bool {
        self.whole_note_ticks % length == 0
            || self.primitives.iter().any(|&(p, dots)| p == length && dots > 0)
    }

    /// Fewest-token decomposition over the primitive table; ties prefer
    /// fewer total dots, then larger leading values. `None` if the table
    /// cannot sum to `remaining`.
    fn decompose(&self, remaining: u64) -> Option<Vec<u64>> {
        let n = remaining as usize;
        // (token count, total dots) per reachable sub-length, plus the
        // primitive chosen there.
        let mut best: Vec<Option<(u32, u32, u64)>> = vec![None; n + 1];
        best[0] = Some((0, 0, 0));
        for t in 1..=n {
            for &(p, dots) in &self.primitives {
                let p_usize = p as usize;
                if p_usize > t {
                    continue;
                }
                if let Some((count, total_dots, _)) = best[t - p_usize] {
                    let candidate = (count + 1, total_dots + dots, p);
                    let better = match best[t] {
                        None => true,
                        Some((c, d, _)) => (candidate.0, candidate.1) < (c, d),
                    };
                    if better {
                        best[t] = Some(candidate);
                    }
                }
            }
        }

        let mut parts = Vec::new();
        let mut t = n;
        while t > 0 {
            let (_, _, p) = best[t]?;
            parts.push(p);
            t -= p as usize;
        }
        Some(parts)
    }

    /// Greedy exact-sum fallback over all whole-note divisors.
    fn decompose_divisors(&self, mut remaining: u64, lengths: &mut Vec<u64>) {
        log::debug!(
            "length of {} ticks is not expressible with preferred primitives",
            remaining
        );
        while remaining > 0 {
            // Divisor 1 always matches, so this terminates.
            let p = *self
                .divisors
                .iter()
                .find(|&&d| d <= remaining)
                .unwrap_or(&remaining);
            lengths.push(p);
            remaining -= p;
        }
    }

    /// MML length code for a primitive: `whole / length`, with dots for
    /// dotted values. Falls back to a raw tick count.
    fn length_code(&self, length: u64) -> String {
        // Plain and triplet codes: any divisor of the whole note.
        if length > 0 && self.whole_note_ticks % length == 0 {
            return format!("{}", self.whole_note_ticks / length);
        }

        // Dotted codes: walk the power-of-two chain and add dots.
        let mut base = self.whole_note_ticks;
        loop {
            let mut acc = base;
            let mut half = base;
            let mut dots = 0;
            while half % 2 == 0 && acc < length {
                half /= 2;
                acc += half;
                dots += 1;
            }
            if acc == length && dots > 0 {
                let mut code = format!("{}", self.whole_note_ticks / base);
                for _ in 0..dots {
                    code.push('.');
                }
                return code;
            }
            if base % 2 != 0 || base == 0 {
                break;
            }
            base /= 2;
        }

        format!("{}{}", self.symbols.raw_ticks, length)
    }
}

/// Primitive (length, dot count) pairs, descending by length.
fn build_primitives(whole_note_ticks: u64, max_dot_count: i32, use_triplet: bool) -> Vec<(u64, u32)> {
    let mut lengths = Vec::new();
    let mut base = whole_note_ticks;
    loop {
        lengths.push((base, 0));

        let mut dotted = base;
        let mut half = base;
        let mut dot: u32 = 1;
        while (max_dot_count < 0 || dot as i32 <= max_dot_count) && half % 2 == 0 {
            half /= 2;
            dotted += half;
            lengths.push((dotted, dot));
            dot += 1;
        }

        if use_triplet {
            let doubled = base * 2;
            if doubled % 3 == 0 && whole_note_ticks % (doubled / 3) == 0 {
                lengths.push((doubled / 3, 0));
            }
        }

        if base % 2 != 0 {
            break;
        }
        base /= 2;
        if base == 0 {
            break;
        }
    }
    lengths.sort_unstable_by(|a, b| b.cmp(a));
    lengths.dedup_by_key(|entry| entry.0);
    lengths
}
