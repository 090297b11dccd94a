//! MIDI to MML conversion
//!
//! Turns a tick-based MIDI performance into a textual Music Macro Language
//! score: note/octave/length tokens per track, with measure-aligned line
//! breaks. The pipeline is parse → preprocess (channel separation,
//! resolution rescale) → tick-synchronized dispatch → serialization.

mod dispatch;
mod note_codec;
mod options;
mod parse;
mod preprocess;
mod quantize;
mod scan;
mod symbols;
mod track_state;
mod write;

pub use note_codec::NoteConverter;
pub use options::{Midi2MmlOptions, DEFAULT_MAX_DOT_COUNT, DEFAULT_RESOLUTION};
pub use parse::parse_smf;
pub use preprocess::{change_resolution, separate_mixed_channels};
pub use quantize::quantize;
pub use scan::{scan_time_signatures, NoteOnsetIndex};
pub use symbols::MmlSymbols;
pub use track_state::{Token, TrackState};
pub use write::write_mml;

use crate::models::Sequence;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MmlError {
    /// Input uses a timing model the converter cannot express.
    #[error("unsupported midi input: {0}")]
    Unsupported(String),
    /// Input is structurally broken; the conversion is aborted.
    #[error("malformed midi input: {0}")]
    Malformed(String),
    /// The SMF container could not be parsed.
    #[error("midi parse error: {0}")]
    Midi(String),
    /// Conversion options failed validation.
    #[error("invalid option: {0}")]
    InvalidOptions(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MmlError>;

/// Convert SMF bytes to an MML score.
pub fn midi_to_mml(smf: &[u8], options: &Midi2MmlOptions) -> Result<String> {
    let seq = parse::parse_smf(smf)?;
    sequence_to_mml(seq, options)
}

/// Convert an already-parsed sequence to an MML score.
pub fn sequence_to_mml(seq: Sequence, options: &Midi2MmlOptions) -> Result<String> {
    options.validate()?;

    let seq = preprocess::separate_mixed_channels(seq);
    let seq = preprocess::change_resolution(seq, options.effective_resolution());

    let converter = NoteConverter::new(
        seq.resolution,
        options.max_dot_count,
        options.use_triplet,
        options.symbols.clone(),
    );
    let tracks = dispatch::convert(&seq, options, &converter)?;

    let mut out = Vec::new();
    write::write_mml(&tracks, &converter, &mut out)?;
    Ok(String::from_utf8(out).expect("mml output is always valid utf-8"))
}
