use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};

use crate::providers::DurationProbe;

/// Duration probe backed by the local ffprobe binary.
pub struct FfprobeProbe;

impl DurationProbe for FfprobeProbe {
    fn probe(&self, path: &Path) -> Result<f64> {
        let output = Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .output()
            .context("failed to run ffprobe")?;

        anyhow::ensure!(
            output.status.success(),
            "ffprobe exited with {} for '{}'",
            output.status,
            path.display()
        );

        parse_duration(&String::from_utf8_lossy(&output.stdout))
            .with_context(|| format!("ffprobe reported no duration for '{}'", path.display()))
    }
}

fn parse_duration(stdout: &str) -> Result<f64> {
    let trimmed = stdout.trim();
    anyhow::ensure!(!trimmed.is_empty(), "empty ffprobe output");
    trimmed
        .parse::<f64>()
        .with_context(|| format!("unparseable ffprobe output '{trimmed}'"))
}

/// Durations are stored with two-decimal precision.
pub fn round_duration(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_float_output() {
        assert_eq!(parse_duration("5.000000\n").unwrap(), 5.0);
        assert_eq!(parse_duration("  212.493000  ").unwrap(), 212.493);
    }

    #[test]
    fn rejects_empty_and_garbage_output() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("\n").is_err());
        assert!(parse_duration("N/A").is_err());
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round_duration(212.493), 212.49);
        assert_eq!(round_duration(212.496), 212.5);
        assert_eq!(round_duration(5.0), 5.0);
    }
}
