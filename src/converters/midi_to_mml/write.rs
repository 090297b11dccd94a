//! Token serialization
//!
//! Renders each track's token buffer as MML text, inserting the track
//! separator between non-empty tracks and flushing once at the end.

use super::note_codec::NoteConverter;
use super::track_state::Token;
use super::Result;
use std::io::Write;

/// Serialize every track's tokens to `out`.
pub fn write_mml<W: Write>(tracks: &[Vec<Token>], converter: &NoteConverter, out: &mut W) -> Result<()> {
    let symbols = converter.symbols();
    let mut first = true;
    for tokens in tracks {
        if tokens.is_empty() {
            continue;
        }
        if first {
            first = false;
        } else {
            write!(out, "{}", symbols.track_end)?;
            writeln!(out)?;
        }
        for token in tokens {
            match token {
                Token::Note { ticks, key } => {
                    write!(out, "{}", converter.note_text(*ticks, Some(*key)))?
                }
                Token::Rest { ticks } => write!(out, "{}", converter.note_text(*ticks, None))?,
                Token::Octave(octave) => write!(out, "{}{}", symbols.octave, octave)?,
                Token::OctaveUp => write!(out, "{}", symbols.octave_up)?,
                Token::OctaveDown => write!(out, "{}", symbols.octave_down)?,
                Token::Tie => write!(out, "{}", symbols.tie)?,
                Token::Tempo(bpm) => write!(out, "{}{}", symbols.tempo, bpm)?,
                Token::LineBreak => writeln!(out)?,
            }
        }
    }
    out.flush()?;
    Ok(())
}
