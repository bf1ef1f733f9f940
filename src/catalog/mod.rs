mod composer;
mod load;

pub use composer::{sanitize_cell, remove_composer_suffix, ComposerName};
pub use load::{build_meta_table, load_catalog, Catalog, ComposerEntry};
