//! Common test infrastructure
//!
//! Fixtures build a workspace with a small catalog; the fakes stand in for the
//! video platform, ffmpeg and the two models so every stage runs in-process.

#[allow(dead_code)]
mod fakes;
#[allow(dead_code)]
mod fixtures;

#[allow(unused_imports)]
pub use fakes::{FakeConverter, FakeDetector, FakeFetcher, FakeTranscriber, FakeVideo};
#[allow(unused_imports)]
pub use fixtures::*;
