//! Field names in arrival order, plus value formatting shared by the stages.

pub const SURNAME: &str = "surname";
pub const FIRSTNAME: &str = "firstname";
pub const MUSIC: &str = "music";
pub const NATIONALITY: &str = "nationality";
pub const BIRTH: &str = "birth";
pub const DEATH: &str = "death";
pub const YOUTUBE_TITLE: &str = "youtube_title";
pub const YOUTUBE_ID: &str = "youtube_id";
pub const SIMILARITY: &str = "similarity";
pub const SURNAME_IN_YOUTUBE_TITLE: &str = "surname_in_youtube_title";
pub const PIANO_SOLO_PROB: &str = "piano_solo_prob";
pub const AUDIO_NAME: &str = "audio_name";
pub const AUDIO_DURATION: &str = "audio_duration";
pub const GIANT_MIDI_PIANO: &str = "giant_midi_piano";
pub const SPLIT: &str = "split";

/// Fields written by the ingest stage.
pub const INGEST_FIELDS: [&str; 6] = [SURNAME, FIRSTNAME, MUSIC, NATIONALITY, BIRTH, DEATH];

/// Value used for biography fields that could not be resolved.
pub const UNKNOWN: &str = "unknown";

/// Formats a float in its shortest round-trip form, keeping a `.0` on integral
/// values so snapshots read back as floats (`1.0`, `0.25`, `0.6666666666666666`).
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Formats a boolean flag the way the snapshots store it.
pub fn format_flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

/// Reads a flag column value; anything but `1` is false.
pub fn parse_flag(value: &str) -> bool {
    value.trim() == "1"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(0.25), "0.25");
        assert_eq!(format_float(2.0 / 3.0), "0.6666666666666666");
        assert_eq!(format_float(183.5), "183.5");
    }

    #[test]
    fn test_flags() {
        assert_eq!(format_flag(true), "1");
        assert_eq!(format_flag(false), "0");
        assert!(parse_flag("1"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }
}
