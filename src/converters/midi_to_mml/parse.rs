//! SMF container parsing
//!
//! Thin midly front-end: delta times become absolute ticks and the meta
//! events the conversion cares about are re-encoded with their raw payload
//! bytes, so the scanners validate lengths themselves.

use super::{MmlError, Result};
use crate::models::event::{META_END_OF_TRACK, META_TEMPO, META_TIME_SIGNATURE};
use crate::models::{Event, EventKind, Sequence, Track};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};

/// Parse SMF bytes into the absolute-tick sequence model.
///
/// Only tick-based (metrical) timing is supported; SMPTE timing is
/// rejected. Events the conversion never looks at (sysex, most meta) are
/// dropped, except end-of-track which bounds every track.
pub fn parse_smf(bytes: &[u8]) -> Result<Sequence> {
    let smf = Smf::parse(bytes).map_err(|e| MmlError::Midi(format!("failed to parse SMF: {}", e)))?;

    let resolution = match smf.header.timing {
        Timing::Metrical(tpq) => tpq.as_int(),
        Timing::Timecode(..) => {
            return Err(MmlError::Unsupported("SMPTE timing is not supported".into()))
        }
    };

    let mut tracks = Vec::with_capacity(smf.tracks.len());
    for midly_track in &smf.tracks {
        let mut events = Vec::new();
        let mut tick = 0u64;
        for midly_event in midly_track {
            tick += midly_event.delta.as_int() as u64;
            if let Some(kind) = convert_event_kind(&midly_event.kind) {
                events.push(Event { tick, kind });
            }
        }
        tracks.push(Track { events });
    }

    log::debug!("parsed SMF: {} tracks at resolution {}", tracks.len(), resolution);
    Ok(Sequence { resolution, tracks })
}

fn convert_event_kind(kind: &TrackEventKind) -> Option<EventKind> {
    match kind {
        TrackEventKind::Midi { channel, message } => {
            let channel = channel.as_int();
            match message {
                MidiMessage::NoteOn { key, vel } => Some(EventKind::NoteOn {
                    channel,
                    key: key.as_int(),
                    vel: vel.as_int(),
                }),
                MidiMessage::NoteOff { key, vel } => Some(EventKind::NoteOff {
                    channel,
                    key: key.as_int(),
                    vel: vel.as_int(),
                }),
                MidiMessage::ProgramChange { program } => Some(EventKind::ProgramChange {
                    channel,
                    program: program.as_int(),
                }),
                MidiMessage::Controller { controller, value } => Some(EventKind::Controller {
                    channel,
                    controller: controller.as_int(),
                    value: value.as_int(),
                }),
                _ => None,
            }
        }
        TrackEventKind::Meta(meta) => match meta {
            MetaMessage::Tempo(us_per_quarter) => {
                let us = us_per_quarter.as_int();
                Some(EventKind::Meta {
                    meta_type: META_TEMPO,
                    data: vec![(us >> 16) as u8, (us >> 8) as u8, us as u8],
                })
            }
            MetaMessage::TimeSignature(numerator, denominator, clocks, notated) => {
                Some(EventKind::Meta {
                    meta_type: META_TIME_SIGNATURE,
                    data: vec![*numerator, *denominator, *clocks, *notated],
                })
            }
            MetaMessage::EndOfTrack => {
                Some(EventKind::Meta { meta_type: META_END_OF_TRACK, data: vec![] })
            }
            _ => None,
        },
        TrackEventKind::SysEx(_) | TrackEventKind::Escape(_) => None,
    }
}
