//! Audio conversion and decoding using ffmpeg.

use super::process;
use super::{AudioConverter, AudioSignal, ConversionError};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

/// Drives an ffmpeg binary for transcoding and for decoding to raw samples.
#[derive(Debug, Clone)]
pub struct FfmpegConverter {
    program: String,
}

impl FfmpegConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check that the ffmpeg binary can be run.
    pub async fn check_available(&self) -> Result<(), ConversionError> {
        let mut command = Command::new(&self.program);
        command.arg("-version");
        match process::run(command).await {
            Ok(output) if output.status.success() => Ok(()),
            _ => Err(ConversionError::ConversionFailed(format!(
                "{} not found or not working",
                self.program
            ))),
        }
    }
}

/// Interpret ffmpeg's `f32le` output as samples.
fn decode_f32le(bytes: &[u8]) -> Result<Vec<f32>, ConversionError> {
    if bytes.len() % 4 != 0 {
        return Err(ConversionError::InvalidOutput(format!(
            "{} bytes is not a whole number of f32 samples",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

#[async_trait]
impl AudioConverter for FfmpegConverter {
    async fn transcode(
        &self,
        src: &Path,
        dest: &Path,
        channels: u32,
        sample_rate: u32,
    ) -> Result<(), ConversionError> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut command = Command::new(&self.program);
        command
            .arg("-i")
            .arg(src)
            .args(["-loglevel", "panic", "-y"])
            .args(["-ac", &channels.to_string()])
            .args(["-ar", &sample_rate.to_string()])
            .arg(dest);
        let output = process::run(command).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConversionError::ConversionFailed(stderr.to_string()));
        }
        if !dest.exists() {
            return Err(ConversionError::InvalidOutput(format!(
                "ffmpeg did not write {:?}",
                dest
            )));
        }

        Ok(())
    }

    async fn load_mono(
        &self,
        path: &Path,
        sample_rate: u32,
    ) -> Result<AudioSignal, ConversionError> {
        let mut command = Command::new(&self.program);
        command
            .args(["-loglevel", "error"])
            .arg("-i")
            .arg(path)
            .args(["-f", "f32le", "-ac", "1"])
            .args(["-ar", &sample_rate.to_string()])
            .arg("-");
        let output = process::run(command).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConversionError::ConversionFailed(stderr.to_string()));
        }

        Ok(AudioSignal {
            samples: decode_f32le(&output.stdout)?,
            sample_rate,
        })
    }
}
