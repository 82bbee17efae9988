use std::path::Path;

use anyhow::Result;
use image::ImageFormat;
use serde_json::Value;

/// Resolves a search query to at most one raw metadata record.
///
/// `Ok(None)` covers both "nothing found" and a timed-out lookup; the caller
/// retries on a future run. `Err` is reserved for escalated failures, most
/// importantly a lookup that returns more than one record for a single-song
/// query.
pub trait MetadataProvider {
    fn resolve(&self, query: &str) -> Result<Option<Value>>;
}

/// Reports a video file's duration in seconds.
pub trait DurationProbe {
    fn probe(&self, path: &Path) -> Result<f64>;
}

/// Cover-art bytes with the format detected from the content itself, not
/// from the request.
#[derive(Debug, Clone)]
pub struct CoverArt {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

/// Retrieves cover art for a reference taken from a metadata record.
pub trait CoverProvider {
    fn fetch(&self, reference: &str) -> Result<CoverArt>;
}
