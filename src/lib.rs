//! MIDI to MML converter
//!
//! Converts tick-based Standard MIDI Files into compact Music Macro
//! Language scores: per-track note/octave/length notation with
//! measure-aligned line breaks, as used by retro music trackers.
//!
//! ```no_run
//! use midi2mml::{midi_to_mml, Midi2MmlOptions};
//!
//! let bytes = std::fs::read("song.mid").unwrap();
//! let mml = midi_to_mml(&bytes, &Midi2MmlOptions::default()).unwrap();
//! println!("{}", mml);
//! ```

pub mod converters;
pub mod models;

pub use converters::midi_to_mml::{
    midi_to_mml, sequence_to_mml, Midi2MmlOptions, MmlError, MmlSymbols, Result, Token,
};
