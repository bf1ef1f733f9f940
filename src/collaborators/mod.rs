//! External collaborators: the video platform client, ffmpeg, and the two models.
//!
//! The pipeline only sees the traits below. The subprocess implementations live
//! in the submodules; tests substitute in-memory fakes.

mod converter;
mod fetcher;
mod models;
mod process;

pub use converter::FfmpegConverter;
pub use fetcher::{YtDlpFetcher, RATE_LIMIT_MARKER};
pub use models::{CommandDetector, CommandTranscriber};

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top search result for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub video_id: String,
}

/// Decoded mono audio.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSignal {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioSignal {
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Samples as little-endian f32 bytes, the format the model programs read.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }
}

/// Errors that can occur when talking to the video platform.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Too many requests")]
    RateLimited,

    #[error("Fetch failed: {0}")]
    Failed(String),

    #[error("No audio file was produced for {0}")]
    NoOutput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during audio conversion.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("ffmpeg failed: {0}")]
    ConversionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid output: {0}")]
    InvalidOutput(String),
}

/// Errors raised by the detector or the transcriber.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model failed: {0}")]
    Failed(String),

    #[error("Invalid model output: {0}")]
    InvalidOutput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Search the platform and return the top result, if any.
    async fn search(&self, query: &str) -> Result<Option<SearchHit>, FetchError>;

    /// Download the best audio stream of `video_id` as `{dest_dir}/{bare_name}.{ext}`
    /// and return the path of the downloaded file.
    async fn download_audio(
        &self,
        video_id: &str,
        dest_dir: &Path,
        bare_name: &str,
    ) -> Result<PathBuf, FetchError>;
}

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait AudioConverter: Send + Sync {
    /// Re-encode `src` to `dest` with the given channel count and sample rate.
    async fn transcode(
        &self,
        src: &Path,
        dest: &Path,
        channels: u32,
        sample_rate: u32,
    ) -> Result<(), ConversionError>;

    /// Decode `path` to mono samples at `sample_rate`.
    async fn load_mono(&self, path: &Path, sample_rate: u32)
        -> Result<AudioSignal, ConversionError>;
}

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait PianoSoloDetector: Send + Sync {
    /// Per-frame piano-solo scores in [0, 1].
    async fn predict(&self, signal: &AudioSignal) -> Result<Vec<f32>, ModelError>;
}

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait PianoTranscriber: Send + Sync {
    /// Transcribe `signal` and write the notes to `midi_path`.
    async fn transcribe(&self, signal: &AudioSignal, midi_path: &Path) -> Result<(), ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_duration() {
        let signal = AudioSignal {
            samples: vec![0.0; 48000],
            sample_rate: 16000,
        };
        assert_eq!(signal.duration_secs(), 3.0);
    }

    #[test]
    fn test_signal_le_bytes() {
        let signal = AudioSignal {
            samples: vec![1.0, -0.5],
            sample_rate: 16000,
        };
        let bytes = signal.to_le_bytes();
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[4..8], &(-0.5f32).to_le_bytes());
    }
}
