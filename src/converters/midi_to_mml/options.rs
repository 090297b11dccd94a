//! Conversion options

use super::symbols::MmlSymbols;
use super::{MmlError, Result};
use serde::{Deserialize, Serialize};

/// Default ticks per quarter note of the target MML.
pub const DEFAULT_RESOLUTION: u16 = 24;

/// Default maximum dot count for dotted notes (-1 = unlimited).
pub const DEFAULT_MAX_DOT_COUNT: i32 = -1;

/// Options controlling the MIDI-to-MML conversion.
///
/// Validated once at the start of a conversion and never mutated by it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Midi2MmlOptions {
    /// Target ticks per quarter note; 0 means [`DEFAULT_RESOLUTION`].
    /// Must be a positive multiple of 4.
    pub resolution: u16,
    /// Maximum dots allowed on a dotted note; -1 means unlimited.
    pub max_dot_count: i32,
    /// Swap the meaning of the octave-up and octave-down symbols.
    pub octave_reversed: bool,
    /// Allow triplet lengths when decomposing rests and tied notes.
    pub use_triplet: bool,
    /// Output symbol table.
    pub symbols: MmlSymbols,
}

impl Default for Midi2MmlOptions {
    fn default() -> Self {
        Midi2MmlOptions {
            resolution: DEFAULT_RESOLUTION,
            max_dot_count: DEFAULT_MAX_DOT_COUNT,
            octave_reversed: false,
            use_triplet: false,
            symbols: MmlSymbols::default(),
        }
    }
}

impl Midi2MmlOptions {
    /// Resolution with the "0 means default" rule applied.
    pub fn effective_resolution(&self) -> u16 {
        if self.resolution == 0 {
            DEFAULT_RESOLUTION
        } else {
            self.resolution
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.effective_resolution() % 4 != 0 {
            return Err(MmlError::InvalidOptions(format!(
                "resolution must be a multiple of 4, got {}",
                self.resolution
            )));
        }
        if self.max_dot_count < -1 {
            return Err(MmlError::InvalidOptions(format!(
                "max dot count must be -1 (unlimited) or non-negative, got {}",
                self.max_dot_count
            )));
        }
        Ok(())
    }
}
