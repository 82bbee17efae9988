use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::Result;

/// Any HTTP response from this host, including 4xx, proves connectivity.
const CONNECTIVITY_PROBE_URL: &str = "https://api.spotify.com/v1/";
const CONNECTIVITY_TIMEOUT: Duration = Duration::from_secs(10);

/// Verifies the external tools this run needs are invocable. ffprobe backs
/// the duration probe in every mode; spotdl is only needed online.
pub fn check_tools(offline: bool) -> Result<()> {
    let mut required: Vec<(&str, &str)> = vec![("ffprobe", "-version")];
    if !offline {
        required.push(("spotdl", "--version"));
    }

    let mut missing = Vec::new();
    for (tool, version_flag) in required {
        if tool_responds(tool, version_flag) {
            log::debug!("{tool} found");
        } else {
            log::error!("{tool} not found");
            missing.push(tool);
        }
    }

    anyhow::ensure!(
        missing.is_empty(),
        "missing dependencies: {}. Install with: pip install spotdl && apt install ffmpeg",
        missing.join(", ")
    );
    Ok(())
}

fn tool_responds(tool: &str, version_flag: &str) -> bool {
    Command::new(tool)
        .arg(version_flag)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Aborts early when the network is unreachable so a long run does not fail
/// one lookup at a time.
pub fn check_connectivity() -> Result<()> {
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(5))
        .timeout(CONNECTIVITY_TIMEOUT)
        .build();

    match agent.head(CONNECTIVITY_PROBE_URL).call() {
        Ok(_) | Err(ureq::Error::Status(..)) => Ok(()),
        Err(error) => anyhow::bail!(
            "no network connectivity detected ({error}); re-run with --offline to skip metadata and cover downloads"
        ),
    }
}
