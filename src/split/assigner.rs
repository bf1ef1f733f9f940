use super::Label;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Accepted records per composer cycle through this many slots:
/// one validation, one test, the rest train.
pub const ROTATION_PERIOD: usize = 10;

/// Identity of a composer group. Both names take part in the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComposerKey<'a> {
    pub surname: &'a str,
    pub firstname: &'a str,
}

impl<'a> ComposerKey<'a> {
    pub fn new(surname: &'a str, firstname: &'a str) -> Self {
        Self { surname, firstname }
    }
}

impl fmt::Display for ComposerKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.surname, self.firstname)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Validation,
    Test,
    Train,
    /// Record is not part of the corpus.
    None,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Validation => "validation",
            Split::Test => "test",
            Split::Train => "train",
            Split::None => "",
        }
    }

    fn for_slot(slot: usize) -> Self {
        match slot {
            0 => Split::Validation,
            1 => Split::Test,
            _ => Split::Train,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SplitError {
    #[error("Composer {composer:?} reappears at row {row} after another composer; records must be grouped by composer")]
    ComposerNotContiguous { composer: String, row: usize },
}

/// Rotation state threaded through the records in row order.
struct Rotation<'a> {
    composer: Option<ComposerKey<'a>>,
    slot: usize,
    finished: HashSet<ComposerKey<'a>>,
}

impl<'a> Rotation<'a> {
    fn new() -> Self {
        Self {
            composer: None,
            slot: 0,
            finished: HashSet::new(),
        }
    }

    fn enter(&mut self, key: ComposerKey<'a>, row: usize) -> Result<(), SplitError> {
        if self.composer == Some(key) {
            return Ok(());
        }
        if !self.finished.insert(key) {
            return Err(SplitError::ComposerNotContiguous {
                composer: key.to_string(),
                row,
            });
        }
        self.composer = Some(key);
        self.slot = 0;
        Ok(())
    }

    fn assign(&mut self, label: Label) -> Split {
        match label {
            Label::Accept => {
                let split = Split::for_slot(self.slot);
                self.slot = (self.slot + 1) % ROTATION_PERIOD;
                split
            }
            Label::Reject | Label::Unknown => Split::None,
        }
    }
}

/// Assign a split to every record, in row order.
///
/// Records must be grouped contiguously by composer. Within a group, accepted
/// records receive validation, test, then train eight times, and the pattern
/// repeats every [`ROTATION_PERIOD`] accepted records. The rotation restarts
/// at each new composer even if the previous period was incomplete, so a
/// composer with a single accepted record contributes only to validation.
pub fn assign_splits(records: &[(ComposerKey<'_>, Label)]) -> Result<Vec<Split>, SplitError> {
    let mut rotation = Rotation::new();
    let mut splits = Vec::with_capacity(records.len());
    for (row, (key, label)) in records.iter().enumerate() {
        rotation.enter(*key, row)?;
        splits.push(rotation.assign(*label));
    }
    Ok(splits)
}
