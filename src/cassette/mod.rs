//! Record/replay of provider calls for deterministic offline runs.

pub mod config;
pub mod format;
pub mod recorder;
pub mod replayer;
