use super::{PipelineContext, Snapshot, StageReport};
use crate::catalog::{build_meta_table, load_catalog};
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;

/// Build the ingest snapshot from a catalog JSON file.
pub fn ingest_catalog(ctx: &PipelineContext, catalog_path: &Path) -> Result<StageReport> {
    let started = Instant::now();
    let catalog = load_catalog(catalog_path)?;
    let table = build_meta_table(&catalog)?;

    let output = ctx.snapshot_path(Snapshot::Ingest);
    table
        .write(&output)
        .with_context(|| format!("Failed to write {:?}", output))?;

    Ok(StageReport {
        output,
        attempted: table.len(),
        processed: table.len(),
    }
    .finish("ingest", started))
}
