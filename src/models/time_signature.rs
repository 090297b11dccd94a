//! Time signature spans and measure lookup
//!
//! A span records the signature and the measure index where it takes
//! effect. Spans are contiguous: each one is active until the next span's
//! `start_measure`, the last forever.

/// A time signature active from `start_measure` onwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    pub numerator: u32,
    /// Denominator as a power-of-two exponent, as stored in the SMF meta
    /// payload (2 = quarter, 3 = eighth).
    pub denominator: u32,
    pub start_measure: usize,
}

impl TimeSignature {
    pub fn new(numerator: u32, denominator: u32, start_measure: usize) -> Self {
        TimeSignature { numerator, denominator, start_measure }
    }

    /// Measure length in ticks under this signature.
    pub fn measure_ticks(&self, resolution: u16) -> u64 {
        let whole = resolution as u64 * 4;
        (whole * self.numerator as u64)
            .checked_shr(self.denominator)
            .unwrap_or(0)
    }
}

impl Default for TimeSignature {
    /// 4/4 from measure 0.
    fn default() -> Self {
        TimeSignature::new(4, 2, 0)
    }
}

/// Measure index that `tick` falls in, given the ordered span list.
///
/// Walks the spans accumulating their tick extents; the last span is
/// open-ended. An empty list behaves as a single default 4/4 span.
pub fn measure_of_tick(tick: u64, signatures: &[TimeSignature], resolution: u16) -> usize {
    let default = [TimeSignature::default()];
    let signatures = if signatures.is_empty() { &default } else { signatures };

    let mut span_start_tick = 0u64;
    for (i, sig) in signatures.iter().enumerate() {
        let measure_len = sig.measure_ticks(resolution).max(1);
        match signatures.get(i + 1) {
            Some(next) => {
                let span_measures = (next.start_measure - sig.start_measure) as u64;
                let span_ticks = span_measures * measure_len;
                if tick < span_start_tick + span_ticks {
                    return sig.start_measure + ((tick - span_start_tick) / measure_len) as usize;
                }
                span_start_tick += span_ticks;
            }
            None => {
                return sig.start_measure + ((tick - span_start_tick) / measure_len) as usize;
            }
        }
    }
    unreachable!("span list is never empty")
}
