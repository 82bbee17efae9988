use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde_json::Value;

use crate::providers::MetadataProvider;

/// Metadata lookup backed by the spotdl CLI. A lookup writes its result to
/// a temp save-file which is parsed and discarded.
pub struct SpotdlClient {
    timeout: Duration,
}

impl SpotdlClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl MetadataProvider for SpotdlClient {
    fn resolve(&self, query: &str) -> Result<Option<Value>> {
        let save_file = tempfile::Builder::new()
            .prefix("songdata-")
            .suffix(".spotdl")
            .tempfile()
            .context("failed to create temp save-file for spotdl")?;

        let mut command = Command::new("spotdl");
        command
            .arg("save")
            .arg(query)
            .arg("--save-file")
            .arg(save_file.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let status = match run_with_timeout(command, self.timeout)? {
            Some(status) => status,
            None => {
                log::warn!("Timeout getting metadata for: {query}");
                return Ok(None);
            }
        };

        if !status.success() {
            log::warn!("spotdl exited with {status} for: {query}");
            return Ok(None);
        }

        let raw = std::fs::read(save_file.path())
            .with_context(|| format!("failed to read spotdl save-file for '{query}'"))?;
        parse_records(&raw, query)
    }
}

/// The save-file holds a JSON array of records. A single-song query must
/// yield exactly zero or one; more than one is escalated to the caller.
fn parse_records(raw: &[u8], query: &str) -> Result<Option<Value>> {
    let records: Vec<Value> = serde_json::from_slice(raw)
        .with_context(|| format!("unparseable spotdl save-file for '{query}'"))?;

    match records.len() {
        0 | 1 => Ok(records.into_iter().next()),
        count => anyhow::bail!(
            "metadata lookup for '{query}' returned {count} records where at most one was expected"
        ),
    }
}

/// Runs the command to completion or kills it at the deadline. `None` means
/// the deadline fired.
fn run_with_timeout(mut command: Command, timeout: Duration) -> Result<Option<ExitStatus>> {
    let mut child = command.spawn().context("failed to run spotdl")?;
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(status) = child.try_wait().context("failed to wait for spotdl")? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        std::thread::sleep(Duration::from_millis(100));
    }
}
