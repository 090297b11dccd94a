//! Tick-synchronized multi-track dispatcher
//!
//! Advances one global tick counter and, at each tick, dispatches every
//! track's events stamped at that tick, mutating that track's state and
//! appending output tokens. A single shared timeline is required because
//! measure boundaries from the time-signature scan apply to all tracks at
//! once; reading tracks one by one could not line them up.

use super::note_codec::NoteConverter;
use super::quantize::quantize;
use super::scan::{scan_time_signatures, NoteOnsetIndex};
use super::track_state::{Token, TrackState};
use super::{Midi2MmlOptions, MmlError, Result};
use crate::models::event::META_TEMPO;
use crate::models::time_signature::measure_of_tick;
use crate::models::{Event, EventKind, Sequence, TimeSignature};

/// Convert every track of a preprocessed sequence to its token buffer.
///
/// The sequence must already be one-channel-per-track and at the target
/// resolution.
pub fn convert(
    seq: &Sequence,
    options: &Midi2MmlOptions,
    converter: &NoteConverter,
) -> Result<Vec<Vec<Token>>> {
    let resolution = seq.resolution;
    let whole_note_ticks = resolution as u64 * 4;

    let signatures = scan_time_signatures(seq)?;
    let onsets: Vec<NoteOnsetIndex> = seq
        .tracks
        .iter()
        .map(NoteOnsetIndex::scan)
        .collect::<Result<_>>()?;
    let mut states: Vec<TrackState> = seq.tracks.iter().map(|_| TrackState::new()).collect();

    let mut tick: u64 = 0;
    loop {
        for (track_index, state) in states.iter_mut().enumerate() {
            let track = &seq.tracks[track_index];
            let index = &onsets[track_index];

            while !state.is_finished() {
                // Stop once every event has been dispatched.
                if state.event_index() >= track.events.len() {
                    state.finish();
                    break;
                }
                let event = &track.events[state.event_index()];
                if event.tick != tick {
                    break;
                }
                state.advance_event_index();
                log::trace!("event: track={} tick={} {:?}", track_index, tick, event.kind);

                dispatch_event(
                    state,
                    event,
                    index,
                    track.events.len(),
                    tick,
                    whole_note_ticks,
                    &signatures,
                    resolution,
                    options,
                    converter,
                )?;
            }
        }

        if states.iter().all(|state| state.is_finished()) {
            break;
        }
        tick += 1;
    }

    Ok(states.into_iter().map(TrackState::into_tokens).collect())
}

/// Dispatch one event: update the track state, then flush the tick gap it
/// opened (if any) as note/rest tokens, then append the event's own tokens.
#[allow(clippy::too_many_arguments)]
fn dispatch_event(
    state: &mut TrackState,
    event: &Event,
    index: &NoteOnsetIndex,
    event_count: usize,
    tick: u64,
    whole_note_ticks: u64,
    signatures: &[TimeSignature],
    resolution: u16,
    options: &Midi2MmlOptions,
    converter: &NoteConverter,
) -> Result<()> {
    let last_tick = state.tick();
    let last_note = state.note();
    // A sustained pitch that outlives this event ties into its next token.
    let mut keep_current_note = last_note.is_some();
    let mut pending: Vec<Token> = Vec::new();

    match event.kind {
        EventKind::NoteOn { key, vel, .. } if vel > 0 => {
            let note_octave = key / 12;
            if state.is_first_note() {
                state.set_octave(note_octave);
                state.clear_first_note();
                pending.push(Token::Octave(note_octave));
            }
            state.set_tick(tick);
            state.set_note(key);
            keep_current_note = false;
            state.begin_next_note();
        }
        EventKind::NoteOff { key, .. } | EventKind::NoteOn { key, .. } => {
            if state.note() == Some(key) && tick > last_tick {
                let min_length = tick - last_tick;
                let max_length = index
                    .next_onset_after(state.curr_note_index())
                    .saturating_sub(last_tick);
                let length = quantize(min_length, max_length, whole_note_ticks, options.max_dot_count);
                log::trace!(
                    "note off: tick={} last={} min={} max={} -> {}",
                    tick,
                    last_tick,
                    min_length,
                    max_length,
                    length
                );
                state.set_tick(last_tick + length);
                state.clear_note();
                keep_current_note = false;
            }
            // A note-off at its own onset tick drops the note silently.
        }
        _ => {
            let tokens = convert_other_event(&event.kind)?;
            if !tokens.is_empty() {
                pending.extend(tokens);
                if tick >= last_tick {
                    state.set_tick(tick);
                }
            }
        }
    }

    // After the last event, pull the cursor up to the final tick so the
    // trailing note or rest is flushed before the track finishes.
    if state.event_index() == event_count && !state.is_empty() && state.tick() < tick {
        state.set_tick(tick);
    }

    if state.tick() != last_tick {
        flush_gap(
            state,
            last_tick,
            last_note,
            keep_current_note,
            signatures,
            resolution,
            options,
            converter,
        );
    }

    state.extend(pending);
    Ok(())
}

/// Render the span between the previous committed tick and the new cursor.
#[allow(clippy::too_many_arguments)]
fn flush_gap(
    state: &mut TrackState,
    last_tick: u64,
    last_note: Option<u8>,
    keep_current_note: bool,
    signatures: &[TimeSignature],
    resolution: u16,
    options: &Midi2MmlOptions,
    converter: &NoteConverter,
) {
    let gap = state.tick() - last_tick;

    match last_note {
        None => {
            // The gap was silence: one rest per primitive length, breaking
            // the line at every measure crossing.
            let mut total = 0u64;
            let mut prev_measure = measure_of_tick(last_tick, signatures, resolution);
            for length in converter.primitive_lengths(gap) {
                total += length;
                state.push(Token::Rest { ticks: length });
                let current_measure = measure_of_tick(last_tick + total, signatures, resolution);
                if current_measure != prev_measure {
                    state.push(Token::LineBreak);
                    state.set_measure(current_measure);
                    prev_measure = current_measure;
                }
            }
        }
        Some(key) => {
            // The gap was a sustained note: walk the octave to the note's,
            // emit it whole, and tie it if the pitch keeps sounding.
            let note_octave = key / 12;
            let mut octave = state.octave();
            while octave < note_octave {
                state.push(octave_step(true, options.octave_reversed));
                octave += 1;
            }
            while octave > note_octave {
                state.push(octave_step(false, options.octave_reversed));
                octave -= 1;
            }
            state.set_octave(note_octave);

            state.push(Token::Note { ticks: gap, key });
            if keep_current_note {
                state.push(Token::Tie);
            }

            let last_measure = measure_of_tick(last_tick, signatures, resolution);
            let current_measure = measure_of_tick(state.tick(), signatures, resolution);
            if current_measure != last_measure {
                state.push(Token::LineBreak);
                state.set_measure(current_measure);
            }
        }
    }
}

fn octave_step(up: bool, reversed: bool) -> Token {
    if up != reversed {
        Token::OctaveUp
    } else {
        Token::OctaveDown
    }
}

/// Tokens for channel/meta events other than note-on/off. Only tempo
/// events produce output; program changes and the rest are ignored.
fn convert_other_event(kind: &EventKind) -> Result<Vec<Token>> {
    match kind {
        EventKind::Meta { meta_type: META_TEMPO, data } => {
            if data.len() != 3 {
                return Err(MmlError::Malformed(format!(
                    "tempo event must carry 3 data bytes, got {}",
                    data.len()
                )));
            }
            let us_per_quarter =
                ((data[0] as u32) << 16) | ((data[1] as u32) << 8) | data[2] as u32;
            let bpm = (60_000_000.0 / us_per_quarter as f64).round() as u32;
            Ok(vec![Token::Tempo(bpm)])
        }
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::META_END_OF_TRACK;
    use crate::models::Track;

    fn on(tick: u64, key: u8) -> Event {
        Event { tick, kind: EventKind::NoteOn { channel: 0, key, vel: 100 } }
    }

    fn off(tick: u64, key: u8) -> Event {
        Event { tick, kind: EventKind::NoteOff { channel: 0, key, vel: 0 } }
    }

    fn eot(tick: u64) -> Event {
        Event { tick, kind: EventKind::Meta { meta_type: META_END_OF_TRACK, data: vec![] } }
    }

    fn tempo(tick: u64, us_per_quarter: u32) -> Event {
        Event {
            tick,
            kind: EventKind::Meta {
                meta_type: META_TEMPO,
                data: vec![
                    (us_per_quarter >> 16) as u8,
                    (us_per_quarter >> 8) as u8,
                    us_per_quarter as u8,
                ],
            },
        }
    }

    fn convert_with(seq: &Sequence, options: &Midi2MmlOptions) -> Result<Vec<Vec<Token>>> {
        let converter = NoteConverter::new(
            seq.resolution,
            options.max_dot_count,
            options.use_triplet,
            options.symbols.clone(),
        );
        convert(seq, options, &converter)
    }

    fn convert_single(events: Vec<Event>) -> Vec<Token> {
        let seq = Sequence { resolution: 24, tracks: vec![Track { events }] };
        convert_with(&seq, &Midi2MmlOptions::default())
            .unwrap()
            .remove(0)
    }

    #[test]
    fn test_two_quarter_notes() {
        let tokens = convert_single(vec![on(0, 60), off(24, 60), on(24, 62), off(48, 62), eot(48)]);
        assert_eq!(
            tokens,
            vec![
                Token::Octave(5),
                Token::Note { ticks: 24, key: 60 },
                Token::Note { ticks: 24, key: 62 },
            ]
        );
    }

    #[test]
    fn test_octave_shift_up() {
        let tokens = convert_single(vec![on(0, 60), off(24, 60), on(24, 72), off(48, 72), eot(48)]);
        assert_eq!(
            tokens,
            vec![
                Token::Octave(5),
                Token::Note { ticks: 24, key: 60 },
                Token::OctaveUp,
                Token::Note { ticks: 24, key: 72 },
            ]
        );
    }

    #[test]
    fn test_octave_shift_reversed() {
        let seq = Sequence {
            resolution: 24,
            tracks: vec![Track {
                events: vec![on(0, 60), off(24, 60), on(24, 72), off(48, 72), eot(48)],
            }],
        };
        let options = Midi2MmlOptions { octave_reversed: true, ..Default::default() };
        let tokens = convert_with(&seq, &options).unwrap().remove(0);
        assert!(tokens.contains(&Token::OctaveDown));
        assert!(!tokens.contains(&Token::OctaveUp));
    }

    #[test]
    fn test_leading_rest_is_flushed_before_first_note() {
        let tokens = convert_single(vec![on(96, 60), off(120, 60), eot(120)]);
        assert_eq!(
            tokens,
            vec![
                Token::Rest { ticks: 96 },
                Token::LineBreak,
                Token::Octave(5),
                Token::Note { ticks: 24, key: 60 },
            ]
        );
    }

    #[test]
    fn test_measure_crossing_inserts_line_break() {
        // One whole note exactly fills measure 0.
        let tokens = convert_single(vec![on(0, 60), off(96, 60), eot(96)]);
        assert_eq!(
            tokens,
            vec![
                Token::Octave(5),
                Token::Note { ticks: 96, key: 60 },
                Token::LineBreak,
            ]
        );
    }

    #[test]
    fn test_tempo_event_mid_note_ties() {
        let tokens = convert_single(vec![on(0, 60), tempo(12, 500_000), off(24, 60), eot(24)]);
        assert_eq!(
            tokens,
            vec![
                Token::Octave(5),
                Token::Note { ticks: 12, key: 60 },
                Token::Tie,
                Token::Tempo(120),
                Token::Note { ticks: 12, key: 60 },
            ]
        );
    }

    #[test]
    fn test_tempo_rounded_to_nearest_integer() {
        // 550000 us per quarter = 109.09 bpm.
        let tokens = convert_single(vec![tempo(0, 550_000), eot(0)]);
        assert_eq!(tokens, vec![Token::Tempo(109)]);
    }

    #[test]
    fn test_malformed_tempo_payload() {
        let seq = Sequence {
            resolution: 24,
            tracks: vec![Track {
                events: vec![Event {
                    tick: 0,
                    kind: EventKind::Meta { meta_type: META_TEMPO, data: vec![0x07, 0xA1] },
                }],
            }],
        };
        assert!(matches!(
            convert_with(&seq, &Midi2MmlOptions::default()),
            Err(MmlError::Malformed(_))
        ));
    }

    #[test]
    fn test_gap_to_next_onset_becomes_rest() {
        // Note ends at tick 24 but the next starts at 48: quantization
        // keeps the note a quarter and the silence becomes a rest.
        let tokens =
            convert_single(vec![on(0, 60), off(24, 60), on(48, 62), off(72, 62), eot(72)]);
        assert_eq!(
            tokens,
            vec![
                Token::Octave(5),
                Token::Note { ticks: 24, key: 60 },
                Token::Rest { ticks: 24 },
                Token::Note { ticks: 24, key: 62 },
            ]
        );
    }

    #[test]
    fn test_trailing_rest_flushed_at_track_end() {
        // The 72-tick silence to the end-of-track renders as one dotted
        // half rest, and the line breaks at the measure boundary it ends on.
        let tokens = convert_single(vec![on(0, 60), off(24, 60), eot(96)]);
        assert_eq!(
            tokens,
            vec![
                Token::Octave(5),
                Token::Note { ticks: 24, key: 60 },
                Token::Rest { ticks: 72 },
                Token::LineBreak,
            ]
        );
    }

    #[test]
    fn test_sloppy_duration_snaps_to_quarter() {
        // Played 20 of 24 ticks; next onset at 24 caps the snap at 21,
        // the double-dotted eighth.
        let tokens = convert_single(vec![on(0, 60), off(20, 60), on(24, 62), off(48, 62), eot(48)]);
        assert_eq!(tokens[1], Token::Note { ticks: 21, key: 60 });
    }

    #[test]
    fn test_empty_track_produces_no_tokens() {
        let seq = Sequence {
            resolution: 24,
            tracks: vec![Track::default(), Track { events: vec![on(0, 60), off(24, 60), eot(24)] }],
        };
        let tracks = convert_with(&seq, &Midi2MmlOptions::default()).unwrap();
        assert!(tracks[0].is_empty());
        assert!(!tracks[1].is_empty());
    }
}
