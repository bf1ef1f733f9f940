use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use giantmidi_piano::collaborators::{
    CommandDetector, CommandTranscriber, FfmpegConverter, YtDlpFetcher,
};
use giantmidi_piano::config::{AppConfig, CliConfig, FileConfig};
use giantmidi_piano::pipeline::{
    calculate_similarities, compute_stats, create_surname_checked_subset, detect_piano_solo,
    download_mp3s, download_piano_solo_mp3s, ingest_catalog, search_youtube, split_dataset,
    transcribe_midis, PipelineContext, RateLimitPolicy, RowRange,
};
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(name = "giantmidi")]
#[command(about = "Build and curate the GiantMIDI-Piano dataset")]
struct CliArgs {
    /// Path to a TOML config file. Values in the file take precedence over flags.
    #[clap(long, global = true, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
struct WorkspaceArgs {
    /// Directory holding the snapshots and the audio/MIDI folders.
    #[clap(long, value_parser = parse_path)]
    pub workspace: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RangeArgs {
    /// First row to process.
    #[clap(long)]
    pub begin_index: Option<usize>,

    /// Row after the last one to process. Defaults to the end of the table.
    #[clap(long)]
    pub end_index: Option<usize>,
}

impl RangeArgs {
    fn range(&self) -> RowRange {
        RowRange::new(self.begin_index, self.end_index)
    }
}

#[derive(Args, Debug)]
struct ToolArgs {
    /// youtube-dl compatible program used for search and download.
    #[clap(long)]
    pub youtube_dl_program: Option<String>,

    /// ffmpeg program used for transcoding and decoding.
    #[clap(long)]
    pub ffmpeg_program: Option<String>,

    /// Seconds to sleep when the video platform rate-limits us.
    #[clap(long)]
    pub rate_limit_backoff_secs: Option<u64>,
}

#[derive(Args, Debug)]
struct DetectorArgs {
    /// Command line of the piano-solo detector program.
    #[clap(long)]
    pub detector_command: Option<String>,

    /// Sample rate the detector expects.
    #[clap(long)]
    pub detector_sample_rate: Option<u32>,
}

#[derive(Args, Debug)]
struct TranscriberArgs {
    /// Command line of the transcription program.
    #[clap(long)]
    pub transcriber_command: Option<String>,

    /// Sample rate the transcriber expects.
    #[clap(long)]
    pub transcriber_sample_rate: Option<u32>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build full_music_pieces.csv from a catalog of composer pages.
    Ingest {
        #[command(flatten)]
        workspace: WorkspaceArgs,
        /// Catalog JSON file.
        #[clap(long, value_parser = parse_path)]
        catalog: PathBuf,
    },

    /// Search a candidate video for every music piece.
    Search {
        #[command(flatten)]
        workspace: WorkspaceArgs,
        /// Only search the first rows of the catalog.
        #[clap(long, default_value_t = false)]
        mini_data: bool,
        #[command(flatten)]
        tools: ToolArgs,
    },

    /// Score candidate titles against the catalog.
    Similarity {
        #[command(flatten)]
        workspace: WorkspaceArgs,
        #[clap(long, default_value_t = false)]
        mini_data: bool,
    },

    /// Download the audio of well matched videos into mp3s/.
    Download {
        #[command(flatten)]
        workspace: WorkspaceArgs,
        #[clap(long, default_value_t = false)]
        mini_data: bool,
        #[command(flatten)]
        range: RangeArgs,
        #[command(flatten)]
        tools: ToolArgs,
    },

    /// Run the piano-solo detector over the downloaded audio.
    Detect {
        #[command(flatten)]
        workspace: WorkspaceArgs,
        #[clap(long, default_value_t = false)]
        mini_data: bool,
        /// Directory with the downloaded MP3s. Defaults to <workspace>/mp3s.
        #[clap(long, value_parser = parse_path)]
        mp3s_dir: Option<PathBuf>,
        #[command(flatten)]
        tools: ToolArgs,
        #[command(flatten)]
        detector: DetectorArgs,
    },

    /// Assign accepted recordings to validation, test and train.
    Split {
        #[command(flatten)]
        workspace: WorkspaceArgs,
        #[clap(long, default_value_t = false)]
        mini_data: bool,
    },

    /// Download the audio of accepted recordings into mp3s_piano_solo/.
    DownloadPianoSolo {
        #[command(flatten)]
        workspace: WorkspaceArgs,
        #[clap(long, default_value_t = false)]
        mini_data: bool,
        #[command(flatten)]
        range: RangeArgs,
        #[command(flatten)]
        tools: ToolArgs,
    },

    /// Transcribe accepted recordings to MIDI.
    Transcribe {
        #[command(flatten)]
        workspace: WorkspaceArgs,
        #[clap(long, default_value_t = false)]
        mini_data: bool,
        #[command(flatten)]
        range: RangeArgs,
        /// Directory with the MP3s to transcribe. Defaults to <workspace>/mp3s.
        #[clap(long, value_parser = parse_path)]
        mp3s_dir: Option<PathBuf>,
        /// Output directory. Defaults to <workspace>/midis.
        #[clap(long, value_parser = parse_path)]
        midis_dir: Option<PathBuf>,
        #[command(flatten)]
        tools: ToolArgs,
        #[command(flatten)]
        transcriber: TranscriberArgs,
    },

    /// Copy MIDI files whose video title names the composer to surname_checked_midis/.
    Subset {
        #[command(flatten)]
        workspace: WorkspaceArgs,
        #[clap(long, default_value_t = false)]
        mini_data: bool,
        /// Directory with the transcribed MIDI files. Defaults to <workspace>/midis.
        #[clap(long, value_parser = parse_path)]
        midis_dir: Option<PathBuf>,
    },

    /// Print a summary of the split snapshot.
    Stats {
        #[command(flatten)]
        workspace: WorkspaceArgs,
        #[clap(long, default_value_t = false)]
        mini_data: bool,
    },
}

impl Command {
    fn cli_config(&self) -> CliConfig {
        let mut cli = CliConfig::default();
        match self {
            Command::Ingest { workspace, .. }
            | Command::Search { workspace, .. }
            | Command::Similarity { workspace, .. }
            | Command::Download { workspace, .. }
            | Command::Detect { workspace, .. }
            | Command::Split { workspace, .. }
            | Command::DownloadPianoSolo { workspace, .. }
            | Command::Transcribe { workspace, .. }
            | Command::Subset { workspace, .. }
            | Command::Stats { workspace, .. } => cli.workspace = workspace.workspace.clone(),
        }
        match self {
            Command::Search { tools, .. }
            | Command::Download { tools, .. }
            | Command::Detect { tools, .. }
            | Command::DownloadPianoSolo { tools, .. }
            | Command::Transcribe { tools, .. } => {
                cli.youtube_dl_program = tools.youtube_dl_program.clone();
                cli.ffmpeg_program = tools.ffmpeg_program.clone();
                cli.rate_limit_backoff_secs = tools.rate_limit_backoff_secs;
            }
            _ => {}
        }
        if let Command::Detect { detector, .. } = self {
            cli.detector_command = detector.detector_command.clone();
            cli.detector_sample_rate = detector.detector_sample_rate;
        }
        if let Command::Transcribe { transcriber, .. } = self {
            cli.transcriber_command = transcriber.transcriber_command.clone();
            cli.transcriber_sample_rate = transcriber.transcriber_sample_rate;
        }
        cli
    }

    fn mini_data(&self) -> bool {
        match self {
            Command::Ingest { .. } => false,
            Command::Search { mini_data, .. }
            | Command::Similarity { mini_data, .. }
            | Command::Download { mini_data, .. }
            | Command::Detect { mini_data, .. }
            | Command::Split { mini_data, .. }
            | Command::DownloadPianoSolo { mini_data, .. }
            | Command::Transcribe { mini_data, .. }
            | Command::Subset { mini_data, .. }
            | Command::Stats { mini_data, .. } => *mini_data,
        }
    }
}

async fn ffmpeg(config: &AppConfig) -> Result<FfmpegConverter> {
    let converter = FfmpegConverter::new(&config.ffmpeg_program);
    converter
        .check_available()
        .await
        .with_context(|| format!("Cannot run {:?}", config.ffmpeg_program))?;
    Ok(converter)
}

async fn run(cli_args: CliArgs) -> Result<()> {
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.command.cli_config(), file_config)?;
    info!("Workspace: {:?}", config.workspace);

    let ctx = PipelineContext::new(&config.workspace)
        .with_mini_data(cli_args.command.mini_data())
        .with_rate_limit(RateLimitPolicy::new(config.rate_limit_backoff));
    let fetcher = YtDlpFetcher::new(&config.youtube_dl_program);

    match cli_args.command {
        Command::Ingest { catalog, .. } => {
            ingest_catalog(&ctx, &catalog)?;
        }
        Command::Search { .. } => {
            search_youtube(&ctx, &fetcher).await?;
        }
        Command::Similarity { .. } => {
            calculate_similarities(&ctx)?;
        }
        Command::Download { range, .. } => {
            let converter = ffmpeg(&config).await?;
            download_mp3s(&ctx, range.range(), &fetcher, &converter).await?;
        }
        Command::Detect { mp3s_dir, .. } => {
            let detector = CommandDetector::new(
                config.detector.require_command("detector-command")?,
            );
            let converter = ffmpeg(&config).await?;
            let mp3s_dir = mp3s_dir.unwrap_or_else(|| ctx.mp3s_dir());
            detect_piano_solo(
                &ctx,
                &mp3s_dir,
                config.detector.sample_rate,
                &converter,
                &detector,
            )
            .await?;
        }
        Command::Split { .. } => {
            split_dataset(&ctx)?;
        }
        Command::DownloadPianoSolo { range, .. } => {
            let converter = ffmpeg(&config).await?;
            download_piano_solo_mp3s(&ctx, range.range(), &fetcher, &converter).await?;
        }
        Command::Transcribe {
            range,
            mp3s_dir,
            midis_dir,
            ..
        } => {
            let transcriber = CommandTranscriber::new(
                config.transcriber.require_command("transcriber-command")?,
            );
            let converter = ffmpeg(&config).await?;
            let mp3s_dir = mp3s_dir.unwrap_or_else(|| ctx.mp3s_dir());
            let midis_dir = midis_dir.unwrap_or_else(|| ctx.default_midis_dir());
            transcribe_midis(
                &ctx,
                range.range(),
                &mp3s_dir,
                &midis_dir,
                config.transcriber.sample_rate,
                &converter,
                &transcriber,
            )
            .await?;
        }
        Command::Subset { midis_dir, .. } => {
            let midis_dir = midis_dir.unwrap_or_else(|| ctx.default_midis_dir());
            create_surname_checked_subset(&ctx, &midis_dir)?;
        }
        Command::Stats { .. } => {
            let stats = compute_stats(&ctx)?;
            println!("{}", stats);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    run(cli_args).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_args_are_consistent() {
        use clap::CommandFactory;
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_transcribe_args() {
        let args = CliArgs::parse_from([
            "giantmidi",
            "transcribe",
            "--workspace",
            "/data/ws",
            "--mini-data",
            "--begin-index",
            "5",
            "--transcriber-command",
            "python transcribe.py",
            "--config",
            "/etc/giantmidi.toml",
        ]);

        assert_eq!(args.config, Some(PathBuf::from("/etc/giantmidi.toml")));
        assert!(args.command.mini_data());
        let cli = args.command.cli_config();
        assert_eq!(cli.workspace, Some(PathBuf::from("/data/ws")));
        assert_eq!(cli.transcriber_command.as_deref(), Some("python transcribe.py"));
        assert_eq!(cli.detector_command, None);
        match args.command {
            Command::Transcribe { range, .. } => {
                assert_eq!(range.range(), RowRange::new(Some(5), None));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_ingest_ignores_mini_data() {
        let args = CliArgs::parse_from(["giantmidi", "ingest", "--catalog", "/tmp/catalog.json"]);
        assert!(!args.command.mini_data());
        assert_eq!(args.command.cli_config().workspace, None);
    }
}
