//! Note record produced by the onset-index pre-pass

/// One played note, assembled from a note-on/note-off pair.
///
/// `duration` stays `None` until the matching note-off is found; after the
/// pre-pass every note must be closed with a positive duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub channel: u8,
    pub onset_tick: u64,
    pub duration: Option<u64>,
    /// MIDI note number 0-127.
    pub key: u8,
    pub velocity: u8,
}

impl Note {
    pub fn is_open(&self) -> bool {
        self.duration.is_none()
    }
}
