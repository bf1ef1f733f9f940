//! Video platform access through a youtube-dl compatible program.

use super::process;
use super::{FetchError, MediaFetcher, SearchHit};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;
use walkdir::WalkDir;

/// Text the platform client prints when the platform throttles us.
pub const RATE_LIMIT_MARKER: &str = "HTTP Error 429: Too Many Requests";

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// `yt-dlp` (or `youtube-dl`) driven as a subprocess.
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    program: String,
}

impl YtDlpFetcher {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

fn is_rate_limited(stderr: &str) -> bool {
    stderr.contains(RATE_LIMIT_MARKER)
}

/// `--get-title --get-id` prints the title then the id. Anything other than
/// exactly those two lines means there was no usable result.
fn parse_search_output(stdout: &str) -> Option<SearchHit> {
    let lines: Vec<&str> = stdout.lines().filter(|l| !l.trim().is_empty()).collect();
    match lines.as_slice() {
        [title, video_id] => Some(SearchHit {
            title: title.trim().to_string(),
            video_id: video_id.trim().to_string(),
        }),
        _ => None,
    }
}

/// Output template for the download. `%` starts a template field, so literal
/// percent signs in the name are doubled.
fn output_template(dest_dir: &Path, bare_name: &str) -> String {
    format!(
        "{}/{}.%(ext)s",
        dest_dir.display(),
        bare_name.replace('%', "%%")
    )
}

/// Locate `{bare_name}.{ext}` in `dest_dir`, ignoring partial downloads.
///
/// A freshly downloaded container wins over an `.mp3` left by an earlier run.
fn find_downloaded(dest_dir: &Path, bare_name: &str) -> Option<PathBuf> {
    let prefix = format!("{}.", bare_name);
    let mut candidates: Vec<PathBuf> = WalkDir::new(dest_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            name.starts_with(&prefix)
                && !name[prefix.len()..].contains('.')
                && !name.ends_with(".part")
                && !name.ends_with(".ytdl")
        })
        .map(|e| e.into_path())
        .collect();
    candidates.sort();
    candidates
        .iter()
        .find(|p| p.extension().map_or(true, |ext| ext != "mp3"))
        .or_else(|| candidates.first())
        .cloned()
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn search(&self, query: &str) -> Result<Option<SearchHit>, FetchError> {
        let mut command = Command::new(&self.program);
        command
            .args(["--get-title", "--get-id"])
            .arg(format!("ytsearch1:{}", query));
        let output = process::run(command).await?;
        let stderr = String::from_utf8_lossy(&output.stderr);

        if is_rate_limited(&stderr) {
            return Err(FetchError::RateLimited);
        }

        let hit = parse_search_output(&String::from_utf8_lossy(&output.stdout));
        if hit.is_none() && !output.status.success() {
            return Err(FetchError::Failed(stderr.trim().to_string()));
        }
        debug!("Search '{}' -> {:?}", query, hit);
        Ok(hit)
    }

    async fn download_audio(
        &self,
        video_id: &str,
        dest_dir: &Path,
        bare_name: &str,
    ) -> Result<PathBuf, FetchError> {
        tokio::fs::create_dir_all(dest_dir).await?;

        let mut command = Command::new(&self.program);
        command
            .args(["-f", "bestaudio", "-o"])
            .arg(output_template(dest_dir, bare_name))
            .arg(format!("{}{}", WATCH_URL, video_id));
        let output = process::run(command).await?;
        let stderr = String::from_utf8_lossy(&output.stderr);

        if is_rate_limited(&stderr) {
            return Err(FetchError::RateLimited);
        }
        if !output.status.success() {
            return Err(FetchError::Failed(stderr.trim().to_string()));
        }

        find_downloaded(dest_dir, bare_name)
            .ok_or_else(|| FetchError::NoOutput(bare_name.to_string()))
    }
}
