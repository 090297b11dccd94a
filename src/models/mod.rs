//! Shared data types for MIDI-to-MML conversion

pub mod event;
pub mod note;
pub mod time_signature;

pub use event::{Event, EventKind, Sequence, Track};
pub use note::Note;
pub use time_signature::{measure_of_tick, TimeSignature};
