//! Format conversion pipelines

pub mod midi_to_mml;
