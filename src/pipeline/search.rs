use super::progress::row_progress;
use super::{PipelineContext, Snapshot, StageReport};
use crate::catalog::sanitize_cell;
use crate::collaborators::MediaFetcher;
use crate::meta_table::{Table, FIRSTNAME, MUSIC, SURNAME, YOUTUBE_ID, YOUTUBE_TITLE};
use anyhow::{Context, Result};
use std::time::Instant;
use tracing::{info, warn};

/// Rows kept by a `--mini-data` search.
pub const MINI_DATA_ROWS: usize = 10;

/// Look up a candidate video for every piece and record its title and id.
///
/// Rows without a result keep empty placeholders. When the platform throttles
/// us the stage sleeps and retries the same row.
pub async fn search_youtube(ctx: &PipelineContext, fetcher: &dyn MediaFetcher) -> Result<StageReport> {
    let started = Instant::now();
    let input = ctx.snapshot_path(Snapshot::Ingest);
    let mut table =
        Table::read(&input).with_context(|| format!("Failed to read {:?}", input))?;
    if ctx.mini_data() {
        table.truncate(MINI_DATA_ROWS);
    }

    let mut titles = Vec::with_capacity(table.len());
    let mut ids = Vec::with_capacity(table.len());
    let mut found = 0;
    {
        let surnames = table.column(SURNAME)?;
        let firstnames = table.column(FIRSTNAME)?;
        let musics = table.column(MUSIC)?;

        let pb = row_progress(table.len(), "Searching");
        for row in 0..table.len() {
            let query = format!("{} {}, {}", firstnames[row], surnames[row], musics[row]);
            info!("{}; {}", row, query);

            match ctx.rate_limit().run(|| fetcher.search(&query)).await {
                Ok(Some(hit)) => {
                    found += 1;
                    titles.push(sanitize_cell(&hit.title));
                    ids.push(sanitize_cell(&hit.video_id));
                }
                Ok(None) => {
                    titles.push(String::new());
                    ids.push(String::new());
                }
                Err(e) => {
                    warn!("Search failed for row {}: {}", row, e);
                    titles.push(String::new());
                    ids.push(String::new());
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();
    }

    table.add_column(YOUTUBE_TITLE, titles)?;
    table.add_column(YOUTUBE_ID, ids)?;

    let output = ctx.snapshot_path(Snapshot::Search);
    table
        .write(&output)
        .with_context(|| format!("Failed to write {:?}", output))?;

    Ok(StageReport {
        output,
        attempted: table.len(),
        processed: found,
    }
    .finish("search", started))
}
