//! GiantMIDI-Piano curation pipeline library
//!
//! Builds a dataset of piano performances: catalog ingestion, video matching,
//! audio download, piano-solo detection, split assignment, transcription.

pub mod catalog;
pub mod collaborators;
pub mod config;
pub mod matching;
pub mod meta_table;
pub mod pipeline;
pub mod split;

// Re-export commonly used types for convenience
pub use collaborators::{AudioConverter, MediaFetcher, PianoSoloDetector, PianoTranscriber};
pub use meta_table::{Table, TableError};
pub use pipeline::{PipelineContext, RowRange, Snapshot, StageReport};
