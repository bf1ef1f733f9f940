use super::{PipelineContext, Snapshot, StageReport};
use crate::matching::{similarity, surname_match};
use crate::meta_table::{
    format_flag, format_float, Table, MUSIC, SIMILARITY, SURNAME, SURNAME_IN_YOUTUBE_TITLE,
    YOUTUBE_TITLE,
};
use anyhow::{Context, Result};
use std::time::Instant;

/// Score every candidate title against its catalog entry.
pub fn calculate_similarities(ctx: &PipelineContext) -> Result<StageReport> {
    let started = Instant::now();
    let input = ctx.snapshot_path(Snapshot::Search);
    let mut table =
        Table::read(&input).with_context(|| format!("Failed to read {:?}", input))?;

    let (similarities, surname_flags): (Vec<String>, Vec<String>) = {
        let surnames = table.column(SURNAME)?;
        let musics = table.column(MUSIC)?;
        let titles = table.column(YOUTUBE_TITLE)?;
        surnames
            .iter()
            .zip(musics)
            .zip(titles)
            .map(|((surname, music), title)| {
                (
                    format_float(similarity(surname, music, title)),
                    format_flag(surname_match(surname, title)),
                )
            })
            .unzip()
    };
    let matched = surname_flags.iter().filter(|f| *f == "1").count();

    table.add_column(SIMILARITY, similarities)?;
    table.add_column(SURNAME_IN_YOUTUBE_TITLE, surname_flags)?;

    let output = ctx.snapshot_path(Snapshot::Similarity);
    table
        .write(&output)
        .with_context(|| format!("Failed to write {:?}", output))?;

    Ok(StageReport {
        output,
        attempted: table.len(),
        processed: matched,
    }
    .finish("similarity", started))
}
