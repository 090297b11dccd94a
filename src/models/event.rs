//! In-memory MIDI sequence model
//!
//! Absolute-tick event lists, one per track. Meta events keep their raw
//! payload bytes so the conversion core can validate lengths itself.

/// Meta event type byte for a tempo change (microseconds per quarter note).
pub const META_TEMPO: u8 = 0x51;

/// Meta event type byte for a time signature.
pub const META_TIME_SIGNATURE: u8 = 0x58;

/// Meta event type byte for end of track.
pub const META_END_OF_TRACK: u8 = 0x2F;

/// A complete tick-based MIDI performance.
#[derive(Debug, Clone)]
pub struct Sequence {
    /// Ticks per quarter note.
    pub resolution: u16,
    pub tracks: Vec<Track>,
}

/// One track: events ordered by absolute tick.
#[derive(Debug, Clone, Default)]
pub struct Track {
    pub events: Vec<Event>,
}

impl Track {
    /// Tick of the final event (usually the end-of-track meta).
    pub fn end_tick(&self) -> u64 {
        self.events.last().map(|e| e.tick).unwrap_or(0)
    }
}

/// A single timestamped event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Absolute tick from the start of the sequence.
    pub tick: u64,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    NoteOn { channel: u8, key: u8, vel: u8 },
    NoteOff { channel: u8, key: u8, vel: u8 },
    ProgramChange { channel: u8, program: u8 },
    Controller { channel: u8, controller: u8, value: u8 },
    /// Raw meta event; `data` is the payload after the length field.
    Meta { meta_type: u8, data: Vec<u8> },
}

impl EventKind {
    /// Channel of a voice event, `None` for meta events.
    pub fn channel(&self) -> Option<u8> {
        match self {
            EventKind::NoteOn { channel, .. }
            | EventKind::NoteOff { channel, .. }
            | EventKind::ProgramChange { channel, .. }
            | EventKind::Controller { channel, .. } => Some(*channel),
            EventKind::Meta { .. } => None,
        }
    }
}
