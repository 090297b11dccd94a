//! Sequence preprocessing
//!
//! The conversion core assumes one channel per track and the target tick
//! resolution. These passes normalize an arbitrary sequence into that
//! shape before the dispatch loop runs.

use crate::models::event::META_END_OF_TRACK;
use crate::models::{Event, EventKind, Sequence, Track};

/// Split every track that carries voice events for more than one channel
/// into one track per channel, in channel order.
///
/// Non-channel events (meta) stay with the first split track. Each split
/// track gets an end-of-track meta at its own final tick if the split left
/// it without one.
pub fn separate_mixed_channels(seq: Sequence) -> Sequence {
    let mut tracks = Vec::new();
    for track in seq.tracks {
        let mut channels: Vec<u8> =
            track.events.iter().filter_map(|e| e.kind.channel()).collect();
        channels.sort_unstable();
        channels.dedup();

        if channels.len() <= 1 {
            tracks.push(track);
            continue;
        }
        log::debug!("splitting track across {} channels", channels.len());

        for (i, &channel) in channels.iter().enumerate() {
            let mut events: Vec<Event> = track
                .events
                .iter()
                .filter(|e| match e.kind.channel() {
                    Some(c) => c == channel,
                    None => i == 0,
                })
                .cloned()
                .collect();

            let has_end = events.iter().any(
                |e| matches!(&e.kind, EventKind::Meta { meta_type: META_END_OF_TRACK, .. }),
            );
            if !has_end {
                let tick = events.last().map(|e| e.tick).unwrap_or(0);
                events.push(Event {
                    tick,
                    kind: EventKind::Meta { meta_type: META_END_OF_TRACK, data: vec![] },
                });
            }
            tracks.push(Track { events });
        }
    }
    Sequence { resolution: seq.resolution, tracks }
}

/// Rescale every tick value to the target resolution, rounding to the
/// nearest tick.
pub fn change_resolution(seq: Sequence, resolution: u16) -> Sequence {
    if seq.resolution == resolution || seq.resolution == 0 {
        return Sequence { resolution, ..seq };
    }

    let old = seq.resolution as u64;
    let new = resolution as u64;
    let tracks = seq
        .tracks
        .into_iter()
        .map(|track| Track {
            events: track
                .events
                .into_iter()
                .map(|event| Event {
                    tick: (event.tick * new + old / 2) / old,
                    kind: event.kind,
                })
                .collect(),
        })
        .collect();
    Sequence { resolution, tracks }
}
