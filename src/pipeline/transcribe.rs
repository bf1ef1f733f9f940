use super::progress::row_progress;
use super::{PipelineContext, RowRange, Snapshot, StageReport};
use crate::collaborators::{AudioConverter, PianoTranscriber};
use crate::meta_table::{parse_flag, Table, AUDIO_NAME, GIANT_MIDI_PIANO};
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Transcribe the accepted recordings in `range` to `{midis_dir}/{audio_name}.mid`.
///
/// MIDI files that already exist are kept. A recording that cannot be decoded
/// or transcribed is logged and skipped, and any partial MIDI it left is removed.
pub async fn transcribe_midis(
    ctx: &PipelineContext,
    range: RowRange,
    mp3s_dir: &Path,
    midis_dir: &Path,
    sample_rate: u32,
    converter: &dyn AudioConverter,
    transcriber: &dyn PianoTranscriber,
) -> Result<StageReport> {
    let started = Instant::now();
    let input = ctx.snapshot_path(Snapshot::Split);
    let table = Table::read(&input).with_context(|| format!("Failed to read {:?}", input))?;
    tokio::fs::create_dir_all(midis_dir)
        .await
        .with_context(|| format!("Failed to create {:?}", midis_dir))?;

    let accepted = table.column(GIANT_MIDI_PIANO)?;
    let audio_names = table.column(AUDIO_NAME)?;
    let rows: Vec<usize> = range
        .resolve(table.len())
        .filter(|&row| parse_flag(&accepted[row]))
        .collect();

    let mut transcribed = 0;
    let pb = row_progress(rows.len(), "Transcribing");
    for &row in &rows {
        pb.inc(1);
        let audio_name = &audio_names[row];
        if audio_name.is_empty() {
            warn!("Row {} is accepted but has no audio name", row);
            continue;
        }

        let mp3_path = mp3s_dir.join(format!("{}.mp3", audio_name));
        let midi_path = midis_dir.join(format!("{}.mid", audio_name));
        info!("{} {:?}", row, mp3_path);

        if midi_path.exists() {
            debug!("Already transcribed: {:?}", midi_path);
            transcribed += 1;
            continue;
        }

        let signal = match converter.load_mono(&mp3_path, sample_rate).await {
            Ok(signal) => signal,
            Err(e) => {
                warn!("Could not decode {:?}: {}", mp3_path, e);
                continue;
            }
        };
        match transcriber.transcribe(&signal, &midi_path).await {
            Ok(()) => transcribed += 1,
            Err(e) => {
                warn!("Transcription failed for {:?}: {}", mp3_path, e);
                // A partial MIDI would be taken as done by the next run.
                if midi_path.exists() {
                    if let Err(e) = tokio::fs::remove_file(&midi_path).await {
                        warn!("Could not remove partial {:?}: {}", midi_path, e);
                    }
                }
            }
        }
    }
    pb.finish_and_clear();

    Ok(StageReport {
        output: midis_dir.to_path_buf(),
        attempted: rows.len(),
        processed: transcribed,
    }
    .finish("transcribe", started))
}
