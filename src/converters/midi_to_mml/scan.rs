//! Pre-pass scanners: time signatures and note onsets
//!
//! Both run once over the full event set before the dispatch loop and
//! produce read-only data for the rest of the conversion.

use super::{MmlError, Result};
use crate::models::event::META_TIME_SIGNATURE;
use crate::models::{EventKind, Note, Sequence, TimeSignature, Track};

/// Scan every track for time-signature meta events and build the ordered
/// span list.
///
/// Signature events are validated against the measure grid of the
/// previously active signature: each must carry exactly four data bytes,
/// land exactly on a measure boundary, be the only signature of its
/// measure, and the first one must start at measure 0. A sequence without
/// signature events gets a single default 4/4 span.
pub fn scan_time_signatures(seq: &Sequence) -> Result<Vec<TimeSignature>> {
    // Merge all tracks' signature events into absolute-tick order; track
    // order breaks ties at the same tick, as the dispatcher does.
    let mut events: Vec<(u64, &[u8])> = Vec::new();
    for track in &seq.tracks {
        for event in &track.events {
            if let EventKind::Meta { meta_type: META_TIME_SIGNATURE, data } = &event.kind {
                events.push((event.tick, data.as_slice()));
            }
        }
    }
    events.sort_by_key(|&(tick, _)| tick);

    let mut signatures: Vec<TimeSignature> = Vec::new();
    let default = TimeSignature::default();
    let mut measure_length = default.measure_ticks(seq.resolution);
    let mut next_measure_tick = measure_length;
    let mut measure = 0usize;
    let mut measure_of_last_signature: Option<usize> = None;

    for (tick, data) in events {
        if data.len() != 4 {
            return Err(MmlError::Malformed(format!(
                "time signature event must carry 4 data bytes, got {}",
                data.len()
            )));
        }

        // Walk the measure counter up to this event's tick.
        while next_measure_tick <= tick {
            next_measure_tick += measure_length;
            measure += 1;
        }
        if next_measure_tick - measure_length != tick {
            return Err(MmlError::Malformed(format!(
                "time signature event at tick {} is not on a measure boundary",
                tick
            )));
        }
        if measure_of_last_signature == Some(measure) {
            return Err(MmlError::Malformed(format!(
                "two time signature events at measure {}",
                measure
            )));
        }
        if signatures.is_empty() && measure != 0 {
            return Err(MmlError::Malformed(
                "first time signature is not at the first measure".into(),
            ));
        }

        let signature = TimeSignature::new(data[0] as u32, data[1] as u32, measure);
        let new_measure_length = signature.measure_ticks(seq.resolution);
        if new_measure_length == 0 {
            return Err(MmlError::Malformed(format!(
                "time signature {}/2^{} produces an empty measure",
                signature.numerator, signature.denominator
            )));
        }
        log::debug!(
            "time signature {}/{} from measure {}",
            signature.numerator,
            1u32 << signature.denominator,
            measure
        );

        next_measure_tick = (next_measure_tick - measure_length) + new_measure_length;
        measure_length = new_measure_length;
        measure_of_last_signature = Some(measure);
        signatures.push(signature);
    }

    if signatures.is_empty() {
        signatures.push(default);
    }
    Ok(signatures)
}

/// Ordered note onsets for one track, with the track's final event tick as
/// the bound past the last note.
#[derive(Debug)]
pub struct NoteOnsetIndex {
    notes: Vec<Note>,
    end_tick: u64,
}

impl NoteOnsetIndex {
    /// Pair every note-on with the first note-off of the same number,
    /// oldest open note first, so overlapping equal pitches close in
    /// onset order.
    pub fn scan(track: &Track) -> Result<Self> {
        let mut notes: Vec<Note> = Vec::new();
        for event in &track.events {
            match event.kind {
                EventKind::NoteOn { channel, key, vel } if vel > 0 => {
                    notes.push(Note {
                        channel,
                        onset_tick: event.tick,
                        duration: None,
                        key,
                        velocity: vel,
                    });
                }
                EventKind::NoteOff { key, .. } | EventKind::NoteOn { key, .. } => {
                    if let Some(open) = notes.iter_mut().find(|n| n.is_open() && n.key == key) {
                        open.duration = Some(event.tick - open.onset_tick);
                    }
                }
                _ => {}
            }
        }

        for note in &notes {
            match note.duration {
                Some(duration) if duration > 0 => {
                    log::trace!(
                        "[ch{}/{}] note {} len={} vel={}",
                        note.channel,
                        note.onset_tick,
                        note.key,
                        duration,
                        note.velocity
                    );
                }
                _ => {
                    return Err(MmlError::Malformed(format!(
                        "unfinished or zero-length note {} at tick {}",
                        note.key, note.onset_tick
                    )));
                }
            }
        }

        Ok(NoteOnsetIndex { notes, end_tick: track.end_tick() })
    }

    pub fn get(&self, index: usize) -> Option<&Note> {
        self.notes.get(index)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Onset tick of the note after `index`, or the track's final event
    /// tick when no note remains. Outer bound when quantizing the note at
    /// `index`.
    pub fn next_onset_after(&self, index: usize) -> u64 {
        self.notes
            .get(index + 1)
            .map(|note| note.onset_tick)
            .unwrap_or(self.end_tick)
    }
}
