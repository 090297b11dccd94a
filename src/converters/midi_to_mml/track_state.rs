//! Per-track conversion state
//!
//! One `TrackState` per MIDI track, owned and mutated exclusively by the
//! dispatcher. Once `finish` is called the state only gives up its tokens.

/// One unit of MML output. Tokens are append-only; a track's score is the
/// ordered concatenation of every token it received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Note { ticks: u64, key: u8 },
    Rest { ticks: u64 },
    /// Absolute octave, emitted once before a track's first note.
    Octave(u8),
    OctaveUp,
    OctaveDown,
    Tie,
    /// Tempo in beats per minute, rounded to an integer.
    Tempo(u32),
    LineBreak,
}

/// Conversion cursor and output buffer for one track.
#[derive(Debug, Default)]
pub struct TrackState {
    /// Tick up to which output has been committed.
    tick: u64,
    /// Sustained note number; `None` while resting.
    note: Option<u8>,
    octave: u8,
    measure: usize,
    event_index: usize,
    /// Index of the next note in the onset index.
    note_index: usize,
    /// Index of the currently (or most recently) sounding note.
    curr_note_index: usize,
    first_note: bool,
    finished: bool,
    tokens: Vec<Token>,
}

impl TrackState {
    pub fn new() -> Self {
        TrackState { first_note: true, ..Default::default() }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn set_tick(&mut self, tick: u64) {
        self.tick = tick;
    }

    pub fn note(&self) -> Option<u8> {
        self.note
    }

    pub fn set_note(&mut self, key: u8) {
        self.note = Some(key);
    }

    /// Back to the rest state.
    pub fn clear_note(&mut self) {
        self.note = None;
    }

    pub fn octave(&self) -> u8 {
        self.octave
    }

    pub fn set_octave(&mut self, octave: u8) {
        self.octave = octave;
    }

    pub fn measure(&self) -> usize {
        self.measure
    }

    pub fn set_measure(&mut self, measure: usize) {
        self.measure = measure;
    }

    pub fn event_index(&self) -> usize {
        self.event_index
    }

    pub fn advance_event_index(&mut self) {
        self.event_index += 1;
    }

    pub fn is_first_note(&self) -> bool {
        self.first_note
    }

    pub fn clear_first_note(&mut self) {
        self.first_note = false;
    }

    /// Make the note at the head of the onset queue the sounding one.
    pub fn begin_next_note(&mut self) {
        self.curr_note_index = self.note_index;
        self.note_index += 1;
    }

    pub fn curr_note_index(&self) -> usize {
        self.curr_note_index
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn finish(&mut self) {
        self.finished = true;
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn push(&mut self, token: Token) {
        debug_assert!(!self.finished, "finished tracks are immutable");
        self.tokens.push(token);
    }

    pub fn extend(&mut self, tokens: impl IntoIterator<Item = Token>) {
        debug_assert!(!self.finished, "finished tracks are immutable");
        self.tokens.extend(tokens);
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }
}
