use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use image::ImageFormat;

use crate::providers::{CoverArt, CoverProvider};

/// Cover extensions recognized when checking whether a cover already exists.
pub const COVER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Caps a single cover download.
const MAX_COVER_BYTES: u64 = 20 * 1024 * 1024;

/// The on-disk cover collection, one image per base name.
pub struct CoverStore {
    covers_dir: PathBuf,
}

impl CoverStore {
    pub fn new(covers_dir: &Path) -> Self {
        Self {
            covers_dir: covers_dir.to_path_buf(),
        }
    }

    /// Returns the file name of an existing cover for the base name, trying
    /// every supported extension.
    pub fn existing(&self, base_name: &str) -> Option<String> {
        for ext in COVER_EXTENSIONS {
            let candidate = format!("{base_name}.{ext}");
            if self.covers_dir.join(&candidate).is_file() {
                return Some(candidate);
            }
        }
        None
    }

    /// Stores fetched cover art and returns the stored file name.
    ///
    /// JPEG bytes are written verbatim; PNG and WEBP are decoded and
    /// re-encoded as JPEG so every fetched cover lands at `<base>.jpg`.
    /// Other formats are rejected.
    pub fn save(&self, base_name: &str, art: &CoverArt) -> Result<String> {
        fs::create_dir_all(&self.covers_dir).with_context(|| {
            format!(
                "failed to create covers directory '{}'",
                self.covers_dir.display()
            )
        })?;

        let file_name = format!("{base_name}.jpg");
        let target = self.covers_dir.join(&file_name);

        match art.format {
            ImageFormat::Jpeg => {
                fs::write(&target, &art.bytes)
                    .with_context(|| format!("failed to write cover '{}'", target.display()))?;
            }
            ImageFormat::Png | ImageFormat::WebP => {
                let decoded = image::load_from_memory(&art.bytes)
                    .with_context(|| format!("failed to decode {:?} cover data", art.format))?;
                decoded
                    .save_with_format(&target, ImageFormat::Jpeg)
                    .with_context(|| format!("failed to write cover '{}'", target.display()))?;
            }
            other => anyhow::bail!("unsupported cover format {other:?}"),
        }

        Ok(file_name)
    }
}

/// Downloads cover art over HTTP and detects the format from the bytes.
pub struct HttpCoverProvider {
    agent: ureq::Agent,
}

impl HttpCoverProvider {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();
        Self { agent }
    }
}

impl CoverProvider for HttpCoverProvider {
    fn fetch(&self, reference: &str) -> Result<CoverArt> {
        let response = self
            .agent
            .get(reference)
            .call()
            .with_context(|| format!("cover request failed for '{reference}'"))?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_COVER_BYTES)
            .read_to_end(&mut bytes)
            .with_context(|| format!("failed to read cover body from '{reference}'"))?;

        let format = image::guess_format(&bytes)
            .with_context(|| format!("unrecognized image data from '{reference}'"))?;

        Ok(CoverArt { bytes, format })
    }
}
