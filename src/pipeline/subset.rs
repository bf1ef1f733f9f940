use super::{PipelineContext, Snapshot, StageReport};
use crate::meta_table::{parse_flag, Table, AUDIO_NAME, GIANT_MIDI_PIANO, SURNAME_IN_YOUTUBE_TITLE};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::warn;

/// Copy the MIDI files of accepted rows whose video title names the composer
/// into `surname_checked_midis/`.
pub fn create_surname_checked_subset(ctx: &PipelineContext, midis_dir: &Path) -> Result<StageReport> {
    let started = Instant::now();
    let input = ctx.snapshot_path(Snapshot::Split);
    let table = Table::read(&input).with_context(|| format!("Failed to read {:?}", input))?;

    let dest_dir = ctx.surname_checked_midis_dir();
    fs::create_dir_all(&dest_dir).with_context(|| format!("Failed to create {:?}", dest_dir))?;

    let accepted = table.column(GIANT_MIDI_PIANO)?;
    let surname_checked = table.column(SURNAME_IN_YOUTUBE_TITLE)?;
    let audio_names = table.column(AUDIO_NAME)?;

    let mut attempted = 0;
    let mut copied = 0;
    for row in 0..table.len() {
        if !(parse_flag(&accepted[row]) && parse_flag(&surname_checked[row])) {
            continue;
        }
        attempted += 1;

        let midi_name = format!("{}.mid", audio_names[row]);
        let src = midis_dir.join(&midi_name);
        match fs::copy(&src, dest_dir.join(&midi_name)) {
            Ok(_) => copied += 1,
            Err(e) => warn!("Could not copy {:?}: {}", src, e),
        }
    }

    Ok(StageReport {
        output: dest_dir,
        attempted,
        processed: copied,
    }
    .finish("subset", started))
}
