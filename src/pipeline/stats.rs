use super::{PipelineContext, Snapshot};
use crate::meta_table::{
    parse_flag, Table, AUDIO_DURATION, AUDIO_NAME, FIRSTNAME, GIANT_MIDI_PIANO, SPLIT, SURNAME,
    SURNAME_IN_YOUTUBE_TITLE,
};
use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;
use std::fmt;
use tracing::info;

/// Counts over the final snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetStats {
    pub music_pieces: usize,
    pub composers: usize,
    pub downloaded: usize,
    pub accepted: usize,
    pub accepted_composers: usize,
    pub validation: usize,
    pub test: usize,
    pub train: usize,
    pub surname_checked: usize,
    pub accepted_hours: f64,
}

impl fmt::Display for DatasetStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Music pieces:            {}", self.music_pieces)?;
        writeln!(f, "Composers:               {}", self.composers)?;
        writeln!(f, "Downloaded recordings:   {}", self.downloaded)?;
        writeln!(
            f,
            "Piano solo (accepted):   {} by {} composers, {:.1} h",
            self.accepted, self.accepted_composers, self.accepted_hours
        )?;
        writeln!(
            f,
            "Splits:                  validation {}, test {}, train {}",
            self.validation, self.test, self.train
        )?;
        write!(f, "Surname checked:         {}", self.surname_checked)
    }
}

/// Summarise the split snapshot.
pub fn compute_stats(ctx: &PipelineContext) -> Result<DatasetStats> {
    let input = ctx.snapshot_path(Snapshot::Split);
    let table = Table::read(&input).with_context(|| format!("Failed to read {:?}", input))?;

    let surnames = table.column(SURNAME)?;
    let firstnames = table.column(FIRSTNAME)?;
    let audio_names = table.column(AUDIO_NAME)?;
    let durations = table.column(AUDIO_DURATION)?;
    let accepted = table.column(GIANT_MIDI_PIANO)?;
    let surname_checked = table.column(SURNAME_IN_YOUTUBE_TITLE)?;
    let splits = table.column(SPLIT)?;

    let mut stats = DatasetStats {
        music_pieces: table.len(),
        ..Default::default()
    };
    let mut composers = HashSet::new();
    let mut accepted_composers = HashSet::new();
    let mut accepted_secs = 0.0;

    for row in 0..table.len() {
        let composer = (surnames[row].as_str(), firstnames[row].as_str());
        composers.insert(composer);
        if !audio_names[row].is_empty() {
            stats.downloaded += 1;
        }
        if !parse_flag(&accepted[row]) {
            continue;
        }

        stats.accepted += 1;
        accepted_composers.insert(composer);
        if parse_flag(&surname_checked[row]) {
            stats.surname_checked += 1;
        }
        match splits[row].as_str() {
            "validation" => stats.validation += 1,
            "test" => stats.test += 1,
            "train" => stats.train += 1,
            other => return Err(anyhow!("Row {}: accepted row has split {:?}", row, other)),
        }
        accepted_secs += durations[row]
            .trim()
            .parse::<f64>()
            .map_err(|_| anyhow!("Row {}: invalid audio duration {:?}", row, durations[row]))?;
    }

    stats.composers = composers.len();
    stats.accepted_composers = accepted_composers.len();
    stats.accepted_hours = accepted_secs / 3600.0;

    info!(
        "{} music pieces, {} accepted, {:.1} h",
        stats.music_pieces, stats.accepted, stats.accepted_hours
    );
    Ok(stats)
}
