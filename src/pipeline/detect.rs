use super::progress::row_progress;
use super::{bare_name, PipelineContext, Snapshot, StageReport};
use crate::collaborators::{AudioConverter, PianoSoloDetector};
use crate::meta_table::{
    format_float, Table, AUDIO_DURATION, AUDIO_NAME, FIRSTNAME, MUSIC, PIANO_SOLO_PROB, SURNAME,
    YOUTUBE_ID,
};
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Mean of the frame scores; a prediction without frames scores 0.
fn mean_score(scores: &[f32]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().map(|&s| s as f64).sum::<f64>() / scores.len() as f64
}

/// Score every downloaded recording with the piano-solo detector.
///
/// Appends `piano_solo_prob`, `audio_name` and `audio_duration`. Rows without a
/// readable MP3 in `mp3s_dir` keep empty placeholders; a failed prediction
/// scores 0.
pub async fn detect_piano_solo(
    ctx: &PipelineContext,
    mp3s_dir: &Path,
    sample_rate: u32,
    converter: &dyn AudioConverter,
    detector: &dyn PianoSoloDetector,
) -> Result<StageReport> {
    let started = Instant::now();
    let input = ctx.snapshot_path(Snapshot::Similarity);
    let mut table =
        Table::read(&input).with_context(|| format!("Failed to read {:?}", input))?;

    let mut probs = Vec::with_capacity(table.len());
    let mut names = Vec::with_capacity(table.len());
    let mut durations = Vec::with_capacity(table.len());
    let mut scored = 0;
    {
        let surnames = table.column(SURNAME)?;
        let firstnames = table.column(FIRSTNAME)?;
        let musics = table.column(MUSIC)?;
        let ids = table.column(YOUTUBE_ID)?;

        let pb = row_progress(table.len(), "Detecting");
        for row in 0..table.len() {
            pb.inc(1);
            let bare = bare_name(&surnames[row], &firstnames[row], &musics[row], &ids[row]);
            let mp3_path = mp3s_dir.join(format!("{}.mp3", bare));

            let signal = if mp3_path.exists() {
                match converter.load_mono(&mp3_path, sample_rate).await {
                    Ok(signal) => Some(signal),
                    Err(e) => {
                        warn!("Could not decode {:?}: {}", mp3_path, e);
                        None
                    }
                }
            } else {
                None
            };

            let Some(signal) = signal else {
                probs.push(String::new());
                names.push(String::new());
                durations.push(String::new());
                continue;
            };

            let prob = match detector.predict(&signal).await {
                Ok(scores) => mean_score(&scores),
                Err(e) => {
                    warn!("Piano solo detection failed for {:?}: {}", mp3_path, e);
                    0.0
                }
            };
            info!("{} {:?} {}", row, mp3_path, prob);

            scored += 1;
            probs.push(format_float(prob));
            names.push(bare);
            durations.push(format_float(signal.duration_secs()));
        }
        pb.finish_and_clear();
    }

    table.add_column(PIANO_SOLO_PROB, probs)?;
    table.add_column(AUDIO_NAME, names)?;
    table.add_column(AUDIO_DURATION, durations)?;

    let output = ctx.snapshot_path(Snapshot::Detect);
    table
        .write(&output)
        .with_context(|| format!("Failed to write {:?}", output))?;

    Ok(StageReport {
        output,
        attempted: table.len(),
        processed: scored,
    }
    .finish("detect", started))
}
