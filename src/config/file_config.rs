use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub workspace: Option<String>,
    pub rate_limit_backoff_secs: Option<u64>,

    // Collaborator settings
    pub tools: Option<ToolsConfig>,
    pub models: Option<ModelsConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ToolsConfig {
    /// Video platform client, e.g. "yt-dlp" or "youtube-dl".
    pub youtube_dl_program: Option<String>,
    pub ffmpeg_program: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ModelsConfig {
    pub detector_command: Option<String>,
    pub detector_sample_rate: Option<u32>,
    pub transcriber_command: Option<String>,
    pub transcriber_sample_rate: Option<u32>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: FileConfig = toml::from_str(
            r#"
            workspace = "/data/giantmidi"
            rate_limit_backoff_secs = 600

            [tools]
            youtube_dl_program = "youtube-dl"

            [models]
            detector_command = "python detect.py --checkpoint model.pth"
            detector_sample_rate = 32000
            "#,
        )
        .unwrap();

        assert_eq!(config.workspace.as_deref(), Some("/data/giantmidi"));
        assert_eq!(config.rate_limit_backoff_secs, Some(600));
        let tools = config.tools.unwrap();
        assert_eq!(tools.youtube_dl_program.as_deref(), Some("youtube-dl"));
        assert!(tools.ffmpeg_program.is_none());
        let models = config.models.unwrap();
        assert_eq!(models.detector_sample_rate, Some(32000));
        assert!(models.transcriber_command.is_none());
    }

    #[test]
    fn test_parse_empty_config() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert!(config.workspace.is_none());
        assert!(config.tools.is_none());
    }
}
