//! Catalog loading: pre-scraped composer pages to the ingest snapshot.

use super::composer::{sanitize_cell, remove_composer_suffix, ComposerName};
use crate::meta_table::{self, Table, UNKNOWN};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Composer pages collected from the encyclopedic sources.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    pub composers: Vec<ComposerEntry>,
}

/// One composer page: the name as listed by the catalog, biography fields when
/// a biography page exists, and every piece title found on the page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposerEntry {
    pub name: String,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub birth: Option<String>,
    #[serde(default)]
    pub death: Option<String>,
    #[serde(default)]
    pub pieces: Vec<String>,
}

pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file: {:?}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse catalog file: {:?}", path))
}

#[derive(Default)]
struct Biography {
    nationality: Option<String>,
    birth: Option<String>,
    death: Option<String>,
}

fn known(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(sanitize_cell)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != UNKNOWN)
}

/// Build the ingest table: one row per (composer, piece).
///
/// Composers are ordered by `"Surname, Firstname"` and pages sharing a name are
/// merged, so each composer's rows are contiguous. Piece order within a
/// composer follows the catalog.
pub fn build_meta_table(catalog: &Catalog) -> Result<Table> {
    let mut composers: BTreeMap<String, (ComposerName, Biography, Vec<String>)> = BTreeMap::new();

    for entry in &catalog.composers {
        let name = ComposerName::parse(&entry.name);
        if name.surname.is_empty() {
            debug!("Skipping composer entry without a name");
            continue;
        }
        let (_, bio, pieces) = composers
            .entry(name.to_string())
            .or_insert_with(|| (name.clone(), Biography::default(), Vec::new()));

        bio.nationality = bio.nationality.take().or_else(|| known(&entry.nationality));
        bio.birth = bio.birth.take().or_else(|| known(&entry.birth));
        bio.death = bio.death.take().or_else(|| known(&entry.death));

        pieces.extend(
            entry
                .pieces
                .iter()
                .map(|title| remove_composer_suffix(&sanitize_cell(title), &name))
                .map(|title| title.trim().to_string())
                .filter(|title| !title.is_empty()),
        );
    }

    let mut columns: Vec<Vec<String>> = vec![Vec::new(); meta_table::INGEST_FIELDS.len()];
    for (name, bio, pieces) in composers.values() {
        for music in pieces {
            let values = [
                name.surname.clone(),
                name.firstname.clone(),
                music.clone(),
                bio.nationality.clone().unwrap_or_else(|| UNKNOWN.to_string()),
                bio.birth.clone().unwrap_or_else(|| UNKNOWN.to_string()),
                bio.death.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            ];
            for (column, value) in columns.iter_mut().zip(values) {
                column.push(value);
            }
        }
    }

    let mut table = Table::new();
    for (field, values) in meta_table::INGEST_FIELDS.iter().zip(columns) {
        table.add_column(field, values)?;
    }

    info!(
        "Built catalog table: {} composers, {} music pieces",
        composers.len(),
        table.len()
    );
    Ok(table)
}
