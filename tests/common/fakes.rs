//! In-memory collaborators.
//!
//! Downloaded "audio" files contain the video id. The converter looks the id up
//! to produce a constant signal whose value is the video's piano-solo score, and
//! the detector reports one frame per second of that signal.

use async_trait::async_trait;
use giantmidi_piano::collaborators::{
    AudioConverter, AudioSignal, ConversionError, FetchError, MediaFetcher, ModelError,
    PianoSoloDetector, PianoTranscriber, SearchHit,
};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct FakeVideo {
    pub query: String,
    pub title: String,
    pub id: String,
    pub score: f32,
    pub seconds: usize,
}

#[derive(Default)]
pub struct FakeFetcher {
    hits: HashMap<String, SearchHit>,
    failing_ids: HashSet<String>,
    rate_limited_searches: AtomicU32,
    pub searches: Mutex<Vec<String>>,
    pub downloads: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new(videos: &[FakeVideo]) -> Self {
        Self {
            hits: videos
                .iter()
                .map(|v| {
                    (
                        v.query.clone(),
                        SearchHit {
                            title: v.title.clone(),
                            video_id: v.id.clone(),
                        },
                    )
                })
                .collect(),
            ..Default::default()
        }
    }

    /// The first `count` searches report rate limiting.
    pub fn rate_limit_first_searches(self, count: u32) -> Self {
        self.rate_limited_searches.store(count, Ordering::SeqCst);
        self
    }

    pub fn fail_download(mut self, video_id: &str) -> Self {
        self.failing_ids.insert(video_id.to_string());
        self
    }

    pub fn search_count(&self) -> usize {
        self.searches.lock().unwrap().len()
    }
}

#[async_trait]
impl MediaFetcher for FakeFetcher {
    async fn search(&self, query: &str) -> Result<Option<SearchHit>, FetchError> {
        self.searches.lock().unwrap().push(query.to_string());
        let throttled = self
            .rate_limited_searches
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if throttled {
            return Err(FetchError::RateLimited);
        }
        Ok(self.hits.get(query).cloned())
    }

    async fn download_audio(
        &self,
        video_id: &str,
        dest_dir: &Path,
        bare_name: &str,
    ) -> Result<PathBuf, FetchError> {
        self.downloads.lock().unwrap().push(video_id.to_string());
        if self.failing_ids.contains(video_id) {
            return Err(FetchError::Failed("Video unavailable".to_string()));
        }
        let path = dest_dir.join(format!("{}.webm", bare_name));
        std::fs::write(&path, video_id)?;
        Ok(path)
    }
}

pub struct FakeConverter {
    videos: HashMap<String, FakeVideo>,
    failing_transcodes: bool,
}

impl FakeConverter {
    pub fn new(videos: &[FakeVideo]) -> Self {
        Self {
            videos: videos.iter().map(|v| (v.id.clone(), v.clone())).collect(),
            failing_transcodes: false,
        }
    }

    /// Every transcode writes a truncated file and then fails.
    pub fn fail_transcodes(mut self) -> Self {
        self.failing_transcodes = true;
        self
    }
}

#[async_trait]
impl AudioConverter for FakeConverter {
    async fn transcode(
        &self,
        src: &Path,
        dest: &Path,
        channels: u32,
        sample_rate: u32,
    ) -> Result<(), ConversionError> {
        assert_eq!((channels, sample_rate), (1, 32000));
        if self.failing_transcodes {
            std::fs::write(dest, "PARTIAL")?;
            return Err(ConversionError::ConversionFailed("Invalid data found".to_string()));
        }
        std::fs::copy(src, dest)?;
        Ok(())
    }

    async fn load_mono(
        &self,
        path: &Path,
        sample_rate: u32,
    ) -> Result<AudioSignal, ConversionError> {
        let id = std::fs::read_to_string(path)?;
        let video = self
            .videos
            .get(id.trim())
            .ok_or_else(|| ConversionError::InvalidOutput(format!("not audio: {:?}", path)))?;
        Ok(AudioSignal {
            samples: vec![video.score; video.seconds * sample_rate as usize],
            sample_rate,
        })
    }
}

#[derive(Default)]
pub struct FakeDetector {
    pub broken: bool,
}

#[async_trait]
impl PianoSoloDetector for FakeDetector {
    async fn predict(&self, signal: &AudioSignal) -> Result<Vec<f32>, ModelError> {
        if self.broken {
            return Err(ModelError::Failed("out of memory".to_string()));
        }
        Ok(signal
            .samples
            .chunks(signal.sample_rate as usize)
            .map(|frame| frame[0])
            .collect())
    }
}

/// Failing items leave a truncated MIDI file behind.
#[derive(Default)]
pub struct FakeTranscriber {
    pub calls: Mutex<Vec<PathBuf>>,
    pub failing: Mutex<HashSet<String>>,
}

#[async_trait]
impl PianoTranscriber for FakeTranscriber {
    async fn transcribe(&self, signal: &AudioSignal, midi_path: &Path) -> Result<(), ModelError> {
        self.calls.lock().unwrap().push(midi_path.to_path_buf());
        let name = midi_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if self.failing.lock().unwrap().contains(&name) {
            std::fs::write(midi_path, "MThd")?;
            return Err(ModelError::Failed("transcription diverged".to_string()));
        }
        std::fs::write(midi_path, format!("MThd {}", signal.samples.len()))?;
        Ok(())
    }
}
