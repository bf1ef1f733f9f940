use thiserror::Error;

/// Mean piano-solo score at or above which a recording joins the corpus.
pub const PIANO_SOLO_THRESHOLD: f64 = 0.5;

/// Outcome of thresholding a record's piano-solo probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Accept,
    Reject,
    /// No audio was ever scored for the record.
    Unknown,
}

impl Label {
    /// Value stored in the `giant_midi_piano` column.
    pub fn as_flag(&self) -> &'static str {
        match self {
            Label::Accept => "1",
            Label::Reject => "0",
            Label::Unknown => "",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ClassifyError {
    #[error("Invalid piano solo probability: {0:?}")]
    InvalidProbability(String),
}

/// Classify a `piano_solo_prob` cell. An empty cell means the audio is missing.
pub fn classify(prob: &str) -> Result<Label, ClassifyError> {
    let prob = prob.trim();
    if prob.is_empty() {
        return Ok(Label::Unknown);
    }
    let value: f64 = prob
        .parse()
        .map_err(|_| ClassifyError::InvalidProbability(prob.to_string()))?;
    if value.is_nan() {
        return Err(ClassifyError::InvalidProbability(prob.to_string()));
    }

    if value >= PIANO_SOLO_THRESHOLD {
        Ok(Label::Accept)
    } else {
        Ok(Label::Reject)
    }
}
