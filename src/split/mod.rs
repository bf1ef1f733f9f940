//! Piano-solo acceptance and the composer-balanced train/validation/test split.

mod assigner;
mod classify;

pub use assigner::{assign_splits, ComposerKey, Split, SplitError, ROTATION_PERIOD};
pub use classify::{classify, ClassifyError, Label, PIANO_SOLO_THRESHOLD};
