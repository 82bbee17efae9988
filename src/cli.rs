use std::path::PathBuf;

use clap::Parser;

/// Command-line options for songdataupdater.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Update the karaoke catalog from the videos directory, fetching song metadata and covers."
)]
pub struct CliArgs {
    /// Directory containing the karaoke video files.
    #[arg(long, default_value = "videos")]
    pub videos_dir: PathBuf,

    /// Directory where cover images are stored; created on demand.
    #[arg(long, default_value = "covers")]
    pub covers_dir: PathBuf,

    /// Catalog file to create or update.
    #[arg(long, default_value = "videos.json")]
    pub catalog: PathBuf,

    /// Raw metadata archive file to create or update.
    #[arg(long, default_value = "metadata.json")]
    pub archive: PathBuf,

    /// Skip all network-dependent work; durations are still backfilled.
    #[arg(long, default_value_t = false)]
    pub offline: bool,

    /// Re-resolve metadata and re-download covers even for complete entries.
    #[arg(long, default_value_t = false)]
    pub force: bool,

    /// Timeout in seconds for each metadata lookup and cover download.
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Raise log verbosity to debug.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl CliArgs {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
