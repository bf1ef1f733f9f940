mod file_config;

pub use file_config::{FileConfig, ModelsConfig, ToolsConfig};

use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_YOUTUBE_DL_PROGRAM: &str = "yt-dlp";
pub const DEFAULT_FFMPEG_PROGRAM: &str = "ffmpeg";
pub const DEFAULT_MODEL_SAMPLE_RATE: u32 = 16000;
pub const DEFAULT_RATE_LIMIT_BACKOFF_SECS: u64 = 3600;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub workspace: Option<PathBuf>,
    pub youtube_dl_program: Option<String>,
    pub ffmpeg_program: Option<String>,
    pub detector_command: Option<String>,
    pub transcriber_command: Option<String>,
    pub detector_sample_rate: Option<u32>,
    pub transcriber_sample_rate: Option<u32>,
    pub rate_limit_backoff_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub workspace: PathBuf,
    pub youtube_dl_program: String,
    pub ffmpeg_program: String,
    pub detector: ModelSettings,
    pub transcriber: ModelSettings,
    pub rate_limit_backoff: Duration,
}

/// An external model program and the rate of the signal it expects.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub command: Option<String>,
    pub sample_rate: u32,
}

impl ModelSettings {
    /// The configured command, or an error naming the missing setting.
    pub fn require_command(&self, setting: &str) -> Result<&str> {
        self.command.as_deref().ok_or_else(|| {
            anyhow!(
                "{} must be specified via --{} or in the [models] section of the config file",
                setting.replace('-', "_"),
                setting
            )
        })
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let workspace = file
            .workspace
            .map(PathBuf::from)
            .or_else(|| cli.workspace.clone())
            .ok_or_else(|| {
                anyhow!("workspace must be specified via --workspace or in config file")
            })?;

        if !workspace.exists() {
            bail!("Workspace directory does not exist: {:?}", workspace);
        }
        if !workspace.is_dir() {
            bail!("workspace is not a directory: {:?}", workspace);
        }

        let tools = file.tools.unwrap_or_default();
        let youtube_dl_program = tools
            .youtube_dl_program
            .or_else(|| cli.youtube_dl_program.clone())
            .unwrap_or_else(|| DEFAULT_YOUTUBE_DL_PROGRAM.to_string());
        let ffmpeg_program = tools
            .ffmpeg_program
            .or_else(|| cli.ffmpeg_program.clone())
            .unwrap_or_else(|| DEFAULT_FFMPEG_PROGRAM.to_string());

        let models = file.models.unwrap_or_default();
        let detector = ModelSettings {
            command: models
                .detector_command
                .or_else(|| cli.detector_command.clone()),
            sample_rate: models
                .detector_sample_rate
                .or(cli.detector_sample_rate)
                .unwrap_or(DEFAULT_MODEL_SAMPLE_RATE),
        };
        let transcriber = ModelSettings {
            command: models
                .transcriber_command
                .or_else(|| cli.transcriber_command.clone()),
            sample_rate: models
                .transcriber_sample_rate
                .or(cli.transcriber_sample_rate)
                .unwrap_or(DEFAULT_MODEL_SAMPLE_RATE),
        };
        if detector.sample_rate == 0 || transcriber.sample_rate == 0 {
            bail!("Model sample rates must be greater than zero");
        }

        let rate_limit_backoff_secs = file
            .rate_limit_backoff_secs
            .or(cli.rate_limit_backoff_secs)
            .unwrap_or(DEFAULT_RATE_LIMIT_BACKOFF_SECS);

        Ok(Self {
            workspace,
            youtube_dl_program,
            ffmpeg_program,
            detector,
            transcriber,
            rate_limit_backoff: Duration::from_secs(rate_limit_backoff_secs),
        })
    }
}
