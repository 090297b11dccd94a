// End-to-end conversion tests: in-memory sequences through the full
// pipeline to MML text.

use midi2mml::models::event::{META_END_OF_TRACK, META_TEMPO, META_TIME_SIGNATURE};
use midi2mml::models::{Event, EventKind, Sequence, Track};
use midi2mml::{sequence_to_mml, Midi2MmlOptions, MmlError};

fn on(tick: u64, key: u8) -> Event {
    Event { tick, kind: EventKind::NoteOn { channel: 0, key, vel: 100 } }
}

fn off(tick: u64, key: u8) -> Event {
    Event { tick, kind: EventKind::NoteOff { channel: 0, key, vel: 0 } }
}

fn meta(tick: u64, meta_type: u8, data: Vec<u8>) -> Event {
    Event { tick, kind: EventKind::Meta { meta_type, data } }
}

fn eot(tick: u64) -> Event {
    meta(tick, META_END_OF_TRACK, vec![])
}

fn single_track(events: Vec<Event>) -> Sequence {
    Sequence { resolution: 24, tracks: vec![Track { events }] }
}

#[test]
fn test_two_quarter_notes() {
    let seq = single_track(vec![on(0, 60), off(24, 60), on(24, 62), off(48, 62), eot(48)]);
    let mml = sequence_to_mml(seq, &Midi2MmlOptions::default()).unwrap();
    assert_eq!(mml, "o5c4d4");
}

#[test]
fn test_octave_shift_between_notes() {
    // MIDI 60 is octave 5, MIDI 72 octave 6: exactly one shift token.
    let seq = single_track(vec![on(0, 60), off(24, 60), on(24, 72), off(48, 72), eot(48)]);
    let mml = sequence_to_mml(seq, &Midi2MmlOptions::default()).unwrap();
    assert_eq!(mml, "o5c4>c4");
}

#[test]
fn test_octave_shift_reversed() {
    let seq = single_track(vec![on(0, 60), off(24, 60), on(24, 72), off(48, 72), eot(48)]);
    let options = Midi2MmlOptions { octave_reversed: true, ..Default::default() };
    let mml = sequence_to_mml(seq, &options).unwrap();
    assert_eq!(mml, "o5c4<c4");
}

#[test]
fn test_whole_note_breaks_line_at_measure_boundary() {
    let seq = single_track(vec![on(0, 60), off(96, 60), on(96, 62), off(192, 62), eot(192)]);
    let mml = sequence_to_mml(seq, &Midi2MmlOptions::default()).unwrap();
    assert_eq!(mml, "o5c1\nd1\n");
}

#[test]
fn test_leading_rest() {
    let seq = single_track(vec![on(96, 60), off(120, 60), eot(120)]);
    let mml = sequence_to_mml(seq, &Midi2MmlOptions::default()).unwrap();
    assert_eq!(mml, "r1\no5c4");
}

#[test]
fn test_tempo_command() {
    // 500000 microseconds per quarter note = 120 bpm.
    let seq = single_track(vec![
        meta(0, META_TEMPO, vec![0x07, 0xA1, 0x20]),
        on(0, 60),
        off(24, 60),
        eot(24),
    ]);
    let mml = sequence_to_mml(seq, &Midi2MmlOptions::default()).unwrap();
    assert_eq!(mml, "t120o5c4");
}

#[test]
fn test_tempo_change_mid_note_ties() {
    let seq = single_track(vec![
        on(0, 60),
        meta(12, META_TEMPO, vec![0x07, 0xA1, 0x20]),
        off(24, 60),
        eot(24),
    ]);
    let mml = sequence_to_mml(seq, &Midi2MmlOptions::default()).unwrap();
    assert_eq!(mml, "o5c8^t120c8");
}

#[test]
fn test_track_separator_between_tracks() {
    let seq = Sequence {
        resolution: 24,
        tracks: vec![
            Track { events: vec![on(0, 60), off(24, 60), eot(24)] },
            Track { events: vec![on(0, 48), off(24, 48), eot(24)] },
        ],
    };
    let mml = sequence_to_mml(seq, &Midi2MmlOptions::default()).unwrap();
    assert_eq!(mml, "o5c4;\no4c4");
}

#[test]
fn test_mixed_channel_track_is_split() {
    let seq = single_track(vec![
        on(0, 60),
        Event { tick: 0, kind: EventKind::NoteOn { channel: 1, key: 48, vel: 100 } },
        off(24, 60),
        Event { tick: 24, kind: EventKind::NoteOff { channel: 1, key: 48, vel: 0 } },
        eot(24),
    ]);
    let mml = sequence_to_mml(seq, &Midi2MmlOptions::default()).unwrap();
    assert_eq!(mml, "o5c4;\no4c4");
}

#[test]
fn test_resolution_rescaling() {
    // Same song at resolution 480 converts identically after rescaling.
    let seq = Sequence {
        resolution: 480,
        tracks: vec![Track {
            events: vec![on(0, 60), off(480, 60), on(480, 62), off(960, 62), eot(960)],
        }],
    };
    let mml = sequence_to_mml(seq, &Midi2MmlOptions::default()).unwrap();
    assert_eq!(mml, "o5c4d4");
}

#[test]
fn test_time_signature_changes_measure_breaks() {
    // 3/4 from measure 0: a line break after every 72 ticks.
    let seq = single_track(vec![
        meta(0, META_TIME_SIGNATURE, vec![3, 2, 24, 8]),
        on(0, 60),
        off(72, 60),
        on(72, 62),
        off(144, 62),
        eot(144),
    ]);
    let mml = sequence_to_mml(seq, &Midi2MmlOptions::default()).unwrap();
    assert_eq!(mml, "o5c2.\nd2.\n");
}

#[test]
fn test_conversion_is_deterministic() {
    let make = || {
        single_track(vec![
            meta(0, META_TEMPO, vec![0x07, 0xA1, 0x20]),
            on(0, 60),
            off(20, 60),
            on(24, 64),
            off(48, 64),
            on(48, 67),
            off(96, 67),
            eot(96),
        ])
    };
    let options = Midi2MmlOptions::default();
    let first = sequence_to_mml(make(), &options).unwrap();
    let second = sequence_to_mml(make(), &options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_malformed_time_signature_aborts() {
    let seq = single_track(vec![
        meta(0, META_TIME_SIGNATURE, vec![4, 2, 24]),
        on(0, 60),
        off(24, 60),
        eot(24),
    ]);
    assert!(matches!(
        sequence_to_mml(seq, &Midi2MmlOptions::default()),
        Err(MmlError::Malformed(_))
    ));
}

#[test]
fn test_unfinished_note_aborts() {
    let seq = single_track(vec![on(0, 60), eot(96)]);
    assert!(matches!(
        sequence_to_mml(seq, &Midi2MmlOptions::default()),
        Err(MmlError::Malformed(_))
    ));
}

#[test]
fn test_invalid_resolution_rejected() {
    let seq = single_track(vec![on(0, 60), off(24, 60), eot(24)]);
    let options = Midi2MmlOptions { resolution: 10, ..Default::default() };
    assert!(matches!(
        sequence_to_mml(seq, &options),
        Err(MmlError::InvalidOptions(_))
    ));
}
