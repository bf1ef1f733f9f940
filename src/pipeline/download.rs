//! Audio download stages: fetch a candidate video's audio and store it as a
//! mono 32 kHz MP3 named after the record.

use super::progress::row_progress;
use super::{bare_name, PipelineContext, RowRange, Snapshot, StageReport};
use crate::collaborators::{AudioConverter, MediaFetcher};
use crate::matching::DOWNLOAD_SIMILARITY_THRESHOLD;
use crate::meta_table::{
    Table, FIRSTNAME, MUSIC, PIANO_SOLO_PROB, SIMILARITY, SURNAME, YOUTUBE_ID, YOUTUBE_TITLE,
};
use crate::split::{classify, Label};
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

const MP3_CHANNELS: u32 = 1;
const MP3_SAMPLE_RATE: u32 = 32000;

/// Download every row in `range` whose title similarity is above the threshold
/// into `mp3s/`.
pub async fn download_mp3s(
    ctx: &PipelineContext,
    range: RowRange,
    fetcher: &dyn MediaFetcher,
    converter: &dyn AudioConverter,
) -> Result<StageReport> {
    let started = Instant::now();
    let input = ctx.snapshot_path(Snapshot::Similarity);
    let table = Table::read(&input).with_context(|| format!("Failed to read {:?}", input))?;

    let similarities = table.column(SIMILARITY)?;
    let mut rows = Vec::new();
    for row in range.resolve(table.len()) {
        let value: f64 = similarities[row]
            .trim()
            .parse()
            .map_err(|_| anyhow!("Row {}: invalid similarity {:?}", row, similarities[row]))?;
        if value > DOWNLOAD_SIMILARITY_THRESHOLD {
            rows.push(row);
        }
    }

    let report = fetch_rows(ctx, &table, &rows, &ctx.mp3s_dir(), fetcher, converter).await?;
    Ok(report.finish("download", started))
}

/// Download the rows in `range` classified as piano solo into `mp3s_piano_solo/`.
pub async fn download_piano_solo_mp3s(
    ctx: &PipelineContext,
    range: RowRange,
    fetcher: &dyn MediaFetcher,
    converter: &dyn AudioConverter,
) -> Result<StageReport> {
    let started = Instant::now();
    let input = ctx.snapshot_path(Snapshot::Detect);
    let table = Table::read(&input).with_context(|| format!("Failed to read {:?}", input))?;

    let probs = table.column(PIANO_SOLO_PROB)?;
    let mut rows = Vec::new();
    for row in range.resolve(table.len()) {
        let label = classify(&probs[row]).with_context(|| format!("Row {}", row))?;
        if label == Label::Accept {
            rows.push(row);
        }
    }

    let dest_dir = ctx.piano_solo_mp3s_dir();
    let report = fetch_rows(ctx, &table, &rows, &dest_dir, fetcher, converter).await?;
    Ok(report.finish("download piano solo", started))
}

async fn fetch_rows(
    ctx: &PipelineContext,
    table: &Table,
    rows: &[usize],
    dest_dir: &Path,
    fetcher: &dyn MediaFetcher,
    converter: &dyn AudioConverter,
) -> Result<StageReport> {
    tokio::fs::create_dir_all(dest_dir)
        .await
        .with_context(|| format!("Failed to create {:?}", dest_dir))?;

    let surnames = table.column(SURNAME)?;
    let firstnames = table.column(FIRSTNAME)?;
    let musics = table.column(MUSIC)?;
    let titles = table.column(YOUTUBE_TITLE)?;
    let ids = table.column(YOUTUBE_ID)?;

    info!("{} rows selected for download", rows.len());

    let mut downloaded = 0;
    let pb = row_progress(rows.len(), "Downloading");
    for &row in rows {
        info!(
            "{}; {} {}; {}; {}",
            row, firstnames[row], surnames[row], musics[row], titles[row]
        );
        pb.inc(1);

        if ids[row].is_empty() {
            warn!("Row {} has no video id, skipping", row);
            continue;
        }
        let bare = bare_name(&surnames[row], &firstnames[row], &musics[row], &ids[row]);
        if dest_dir.join(format!("{}.mp3", bare)).exists() {
            debug!("Already downloaded: {}", bare);
            downloaded += 1;
            continue;
        }

        match fetch_one(ctx, &ids[row], dest_dir, &bare, fetcher, converter).await {
            Ok(()) => downloaded += 1,
            Err(e) => warn!("Download failed for row {}: {:#}", row, e),
        }
    }
    pb.finish_and_clear();

    Ok(StageReport {
        output: dest_dir.to_path_buf(),
        attempted: rows.len(),
        processed: downloaded,
    })
}

async fn fetch_one(
    ctx: &PipelineContext,
    video_id: &str,
    dest_dir: &Path,
    bare: &str,
    fetcher: &dyn MediaFetcher,
    converter: &dyn AudioConverter,
) -> Result<()> {
    let downloaded = ctx
        .rate_limit()
        .run(|| fetcher.download_audio(video_id, dest_dir, bare))
        .await?;

    let mp3_path = dest_dir.join(format!("{}.mp3", bare));
    // `{bare}.mp3` only ever appears complete; later runs skip it.
    let staged = dest_dir.join(format!("{}.tmp.mp3", bare));

    let result = converter
        .transcode(&downloaded, &staged, MP3_CHANNELS, MP3_SAMPLE_RATE)
        .await
        .with_context(|| format!("Failed to transcode {:?}", downloaded));
    if let Err(e) = tokio::fs::remove_file(&downloaded).await {
        debug!("Could not remove {:?}: {}", downloaded, e);
    }
    if let Err(e) = result {
        if let Err(remove_err) = tokio::fs::remove_file(&staged).await {
            debug!("Could not remove {:?}: {}", staged, remove_err);
        }
        return Err(e);
    }

    tokio::fs::rename(&staged, &mp3_path)
        .await
        .with_context(|| format!("Failed to move {:?} into place", staged))
}
