use super::{PipelineContext, Snapshot, StageReport};
use crate::meta_table::{Table, FIRSTNAME, GIANT_MIDI_PIANO, PIANO_SOLO_PROB, SPLIT, SURNAME};
use crate::split::{assign_splits, classify, ComposerKey, Label, Split};
use anyhow::{Context, Result};
use std::time::Instant;
use tracing::info;

/// Classify every row and assign accepted rows to validation, test or train.
pub fn split_dataset(ctx: &PipelineContext) -> Result<StageReport> {
    let started = Instant::now();
    let input = ctx.snapshot_path(Snapshot::Detect);
    let mut table =
        Table::read(&input).with_context(|| format!("Failed to read {:?}", input))?;

    let (flags, splits): (Vec<&'static str>, Vec<Split>) = {
        let surnames = table.column(SURNAME)?;
        let firstnames = table.column(FIRSTNAME)?;
        let probs = table.column(PIANO_SOLO_PROB)?;

        let mut records = Vec::with_capacity(table.len());
        for row in 0..table.len() {
            let label = classify(&probs[row]).with_context(|| format!("Row {}", row))?;
            records.push((ComposerKey::new(&surnames[row], &firstnames[row]), label));
        }
        let splits = assign_splits(&records)?;
        let flags = records.iter().map(|(_, label)| label.as_flag()).collect();
        (flags, splits)
    };

    let accepted = flags.iter().filter(|f| **f == Label::Accept.as_flag()).count();
    let count = |split: Split| splits.iter().filter(|s| **s == split).count();
    info!(
        "Accepted {} of {} rows: validation {}, test {}, train {}",
        accepted,
        table.len(),
        count(Split::Validation),
        count(Split::Test),
        count(Split::Train)
    );

    table.add_column(GIANT_MIDI_PIANO, flags)?;
    table.add_column(SPLIT, splits.iter().map(Split::as_str).collect::<Vec<_>>())?;

    let output = ctx.snapshot_path(Snapshot::Split);
    table
        .write(&output)
        .with_context(|| format!("Failed to write {:?}", output))?;

    Ok(StageReport {
        output,
        attempted: table.len(),
        processed: accepted,
    }
    .finish("split", started))
}
