//! Snapshot and directory names inside the workspace.

use super::PipelineContext;
use std::path::PathBuf;

pub const MINI_DATA_PREFIX: &str = "minidata_";

const MP3S_DIR: &str = "mp3s";
const PIANO_SOLO_MP3S_DIR: &str = "mp3s_piano_solo";
const MIDIS_DIR: &str = "midis";
const SURNAME_CHECKED_MIDIS_DIR: &str = "surname_checked_midis";

/// The persisted tables, one per table-producing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Snapshot {
    Ingest,
    Search,
    Similarity,
    Detect,
    Split,
}

impl Snapshot {
    pub fn file_name(&self) -> &'static str {
        match self {
            Snapshot::Ingest => "full_music_pieces.csv",
            Snapshot::Search => "full_music_pieces_youtube.csv",
            Snapshot::Similarity => "full_music_pieces_youtube_similarity.csv",
            Snapshot::Detect => "full_music_pieces_youtube_similarity_pianosoloprob.csv",
            Snapshot::Split => "full_music_pieces_youtube_similarity_pianosoloprob_split.csv",
        }
    }
}

impl PipelineContext {
    /// Path of `snapshot`. The ingest snapshot is shared by both data modes;
    /// every later snapshot carries the mini-data prefix when it is enabled.
    pub fn snapshot_path(&self, snapshot: Snapshot) -> PathBuf {
        let prefix = if self.mini_data() && snapshot != Snapshot::Ingest {
            MINI_DATA_PREFIX
        } else {
            ""
        };
        self.workspace()
            .join(format!("{}{}", prefix, snapshot.file_name()))
    }

    pub fn mp3s_dir(&self) -> PathBuf {
        self.workspace().join(MP3S_DIR)
    }

    pub fn piano_solo_mp3s_dir(&self) -> PathBuf {
        self.workspace().join(PIANO_SOLO_MP3S_DIR)
    }

    pub fn default_midis_dir(&self) -> PathBuf {
        self.workspace().join(MIDIS_DIR)
    }

    pub fn surname_checked_midis_dir(&self) -> PathBuf {
        self.workspace().join(SURNAME_CHECKED_MIDIS_DIR)
    }
}

/// File stem shared by a record's audio and MIDI files.
pub fn bare_name(surname: &str, firstname: &str, music: &str, youtube_id: &str) -> String {
    format!("{}, {}, {}, {}", surname, firstname, music, youtube_id).replace('/', "_")
}
