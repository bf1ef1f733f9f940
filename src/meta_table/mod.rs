//! Tab-delimited meta table shared by every pipeline stage.
//!
//! A table is an ordered set of named fields, each holding one value per record.
//! Stages read one snapshot, append fields, and write a wider snapshot next to it.

mod fields;
mod table;

pub use fields::*;
pub use table::Table;

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, shaping or writing a meta table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed table: {0}")]
    Format(String),

    #[error("Field {field:?} has {found} values but the table has {expected} rows")]
    Shape {
        field: String,
        expected: usize,
        found: usize,
    },

    #[error("Missing field: {0}")]
    MissingField(String),
}

impl TableError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TableError::Io {
            path: path.into(),
            source,
        }
    }
}
