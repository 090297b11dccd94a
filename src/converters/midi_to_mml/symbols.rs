//! MML output symbol table

use serde::{Deserialize, Serialize};

/// Textual symbols used when serializing tokens.
///
/// The defaults follow the common tracker dialect: `o5` absolute octave,
/// `>`/`<` octave steps, `^` tie, `t` tempo, `;` between tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MmlSymbols {
    /// Note names indexed by `note_number % 12`, starting at C.
    pub notes: [String; 12],
    pub rest: String,
    /// Absolute octave prefix, followed by the octave number.
    pub octave: String,
    pub octave_up: String,
    pub octave_down: String,
    pub tie: String,
    /// Tempo prefix, followed by the BPM as an integer.
    pub tempo: String,
    /// Separator written between non-empty tracks.
    pub track_end: String,
    /// Prefix for a raw tick count, used when a length has no note code.
    pub raw_ticks: String,
}

impl Default for MmlSymbols {
    fn default() -> Self {
        MmlSymbols {
            notes: [
                "c".into(),
                "c+".into(),
                "d".into(),
                "d+".into(),
                "e".into(),
                "f".into(),
                "f+".into(),
                "g".into(),
                "g+".into(),
                "a".into(),
                "a+".into(),
                "b".into(),
            ],
            rest: "r".into(),
            octave: "o".into(),
            octave_up: ">".into(),
            octave_down: "<".into(),
            tie: "^".into(),
            tempo: "t".into(),
            track_end: ";".into(),
            raw_ticks: "%".into(),
        }
    }
}
