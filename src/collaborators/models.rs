//! The piano-solo detector and the transcriber, run as external programs.
//!
//! Both programs receive the mono signal on stdin as little-endian f32 samples
//! and find its sample rate in `GIANTMIDI_SAMPLE_RATE`. The detector prints a
//! JSON array of frame scores; the transcriber is given the MIDI path as its
//! last argument and must create that file.

use super::process;
use super::{AudioSignal, ModelError, PianoSoloDetector, PianoTranscriber};
use async_trait::async_trait;
use std::path::Path;

const SAMPLE_RATE_ENV: &str = "GIANTMIDI_SAMPLE_RATE";

#[derive(Debug, Clone)]
pub struct CommandDetector {
    command_line: String,
}

impl CommandDetector {
    pub fn new(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
        }
    }
}

fn parse_frame_scores(stdout: &[u8]) -> Result<Vec<f32>, ModelError> {
    let scores: Vec<f32> = serde_json::from_slice(stdout)
        .map_err(|e| ModelError::InvalidOutput(format!("JSON parse error: {}", e)))?;
    if let Some(bad) = scores.iter().find(|s| !s.is_finite()) {
        return Err(ModelError::InvalidOutput(format!(
            "Frame score {} is not finite",
            bad
        )));
    }
    Ok(scores)
}

#[async_trait]
impl PianoSoloDetector for CommandDetector {
    async fn predict(&self, signal: &AudioSignal) -> Result<Vec<f32>, ModelError> {
        let mut command = process::command_from_line(&self.command_line)?;
        command.env(SAMPLE_RATE_ENV, signal.sample_rate.to_string());
        let output = process::run_with_input(command, signal.to_le_bytes()).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ModelError::Failed(stderr.trim().to_string()));
        }
        parse_frame_scores(&output.stdout)
    }
}

#[derive(Debug, Clone)]
pub struct CommandTranscriber {
    command_line: String,
}

impl CommandTranscriber {
    pub fn new(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
        }
    }
}

#[async_trait]
impl PianoTranscriber for CommandTranscriber {
    async fn transcribe(&self, signal: &AudioSignal, midi_path: &Path) -> Result<(), ModelError> {
        if let Some(parent) = midi_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut command = process::command_from_line(&self.command_line)?;
        command
            .env(SAMPLE_RATE_ENV, signal.sample_rate.to_string())
            .arg(midi_path);
        let output = process::run_with_input(command, signal.to_le_bytes()).await?;

        if !output.status.success() {
            if midi_path.exists() {
                tokio::fs::remove_file(midi_path).await?;
            }
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ModelError::Failed(stderr.trim().to_string()));
        }
        if !midi_path.exists() {
            return Err(ModelError::InvalidOutput(format!(
                "Transcriber did not write {:?}",
                midi_path
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal() -> AudioSignal {
        AudioSignal {
            samples: vec![0.0; 160],
            sample_rate: 16000,
        }
    }

    #[test]
    fn test_parse_frame_scores() {
        assert_eq!(parse_frame_scores(b"[0.5, 1, 0.0]").unwrap(), vec![0.5, 1.0, 0.0]);
        assert!(parse_frame_scores(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_frame_scores_rejects_garbage() {
        assert!(matches!(
            parse_frame_scores(b"not json"),
            Err(ModelError::InvalidOutput(_))
        ));
        assert!(matches!(
            parse_frame_scores(b"{\"scores\": []}"),
            Err(ModelError::InvalidOutput(_))
        ));
    }

    #[tokio::test]
    async fn test_detector_with_empty_command_line() {
        let detector = CommandDetector::new("");
        assert!(matches!(
            detector.predict(&signal()).await,
            Err(ModelError::Io(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_detector_reads_program_stdout() {
        let detector = CommandDetector::new("sh -c 'cat > /dev/null; echo [0.25,0.75]'");
        let scores = detector.predict(&signal()).await.unwrap();
        assert_eq!(scores, vec![0.25, 0.75]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_detector_failure_reports_stderr() {
        let detector = CommandDetector::new("sh -c 'echo model crashed >&2; exit 3'");
        match detector.predict(&signal()).await {
            Err(ModelError::Failed(message)) => assert_eq!(message, "model crashed"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_transcriber_passes_midi_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let midi_path = dir.path().join("midis").join("Satie, Erik, Gymnopédie No.1, abc.mid");
        let transcriber = CommandTranscriber::new("sh -c 'cat > /dev/null; touch \"$0\"'");

        transcriber.transcribe(&signal(), &midi_path).await.unwrap();
        assert!(midi_path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_transcriber_failure_removes_partial_midi() {
        let dir = tempfile::TempDir::new().unwrap();
        let midi_path = dir.path().join("partial.mid");
        let transcriber =
            CommandTranscriber::new("sh -c 'cat > /dev/null; echo MThd > \"$0\"; exit 1'");

        let result = transcriber.transcribe(&signal(), &midi_path).await;

        assert!(matches!(result, Err(ModelError::Failed(_))));
        assert!(!midi_path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_transcriber_without_output_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let transcriber = CommandTranscriber::new("true");
        let result = transcriber
            .transcribe(&signal(), &dir.path().join("x.mid"))
            .await;
        assert!(matches!(result, Err(ModelError::InvalidOutput(_))));
    }
}
