use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::cli::CliArgs;

#[derive(Debug, Clone)]
pub struct Config {
    pub videos_dir: PathBuf,
    pub covers_dir: PathBuf,
    pub catalog_path: PathBuf,
    pub archive_path: PathBuf,
    pub offline: bool,
    pub force: bool,
    pub timeout: Duration,
    pub verbose: bool,
}

impl Config {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let videos_dir = absolutize(&args.videos_dir)?;
        ensure_directory(&videos_dir)?;

        Ok(Self {
            videos_dir,
            covers_dir: absolutize(&args.covers_dir)?,
            catalog_path: absolutize(&args.catalog)?,
            archive_path: absolutize(&args.archive)?,
            offline: args.offline,
            force: args.force,
            timeout: Duration::from_secs(args.timeout_secs),
            verbose: args.verbose,
        })
    }
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let cwd = std::env::current_dir().context("could not resolve current working directory")?;
        Ok(cwd.join(path))
    }
}

fn ensure_directory(path: &Path) -> Result<()> {
    anyhow::ensure!(
        path.is_dir(),
        "Videos directory '{}' not found.",
        path.display()
    );
    Ok(())
}
