//! Pipeline stages over a workspace directory.
//!
//! Each stage reads one snapshot (or file set) from the workspace and writes the
//! next one. Stages are independent and can be re-run; collaborators are passed
//! in by the caller.

mod detect;
mod download;
mod ingest;
mod paths;
mod progress;
mod retry_policy;
mod search;
mod similarity;
mod split;
mod stats;
mod subset;
mod transcribe;

pub use detect::detect_piano_solo;
pub use download::{download_mp3s, download_piano_solo_mp3s};
pub use ingest::ingest_catalog;
pub use paths::{bare_name, Snapshot, MINI_DATA_PREFIX};
pub use retry_policy::RateLimitPolicy;
pub use search::{search_youtube, MINI_DATA_ROWS};
pub use similarity::calculate_similarities;
pub use split::split_dataset;
pub use stats::{compute_stats, DatasetStats};
pub use subset::create_surname_checked_subset;
pub use transcribe::transcribe_midis;

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Where a stage runs and which snapshot family it works on.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    workspace: PathBuf,
    mini_data: bool,
    rate_limit: RateLimitPolicy,
}

impl PipelineContext {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
            mini_data: false,
            rate_limit: RateLimitPolicy::default(),
        }
    }

    pub fn with_mini_data(mut self, mini_data: bool) -> Self {
        self.mini_data = mini_data;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimitPolicy) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn mini_data(&self) -> bool {
        self.mini_data
    }

    pub fn rate_limit(&self) -> &RateLimitPolicy {
        &self.rate_limit
    }
}

/// Half-open row selection for the batch stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowRange {
    pub begin: usize,
    pub end: Option<usize>,
}

impl RowRange {
    pub fn new(begin: Option<usize>, end: Option<usize>) -> Self {
        Self {
            begin: begin.unwrap_or(0),
            end,
        }
    }

    /// Clamp to a table of `len` rows. An inverted range selects nothing.
    pub fn resolve(&self, len: usize) -> Range<usize> {
        let end = self.end.unwrap_or(len).min(len);
        let begin = self.begin.min(end);
        begin..end
    }
}

/// Outcome of one stage run.
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    /// Snapshot or directory the stage wrote to.
    pub output: PathBuf,
    /// Rows the stage tried to process.
    pub attempted: usize,
    /// Rows that produced a result.
    pub processed: usize,
}

impl StageReport {
    fn finish(self, stage: &str, started: Instant) -> Self {
        info!(
            "{}: {} out of {} rows processed, output {:?}, time {:.3} s",
            stage,
            self.processed,
            self.attempted,
            self.output,
            started.elapsed().as_secs_f64()
        );
        self
    }
}
