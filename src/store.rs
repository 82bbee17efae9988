use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::catalog::{Catalog, MetadataArchive, VideoEntry};

/// Load/save for the two persisted documents: the catalog (a JSON array of
/// entries) and the raw-metadata archive (a JSON object keyed by base name).
pub struct CatalogStore {
    catalog_path: PathBuf,
    archive_path: PathBuf,
}

impl CatalogStore {
    pub fn new(catalog_path: &Path, archive_path: &Path) -> Self {
        Self {
            catalog_path: catalog_path.to_path_buf(),
            archive_path: archive_path.to_path_buf(),
        }
    }

    /// Missing file means an empty catalog; an unreadable or malformed file
    /// is fatal rather than silently starting over.
    pub fn load_catalog(&self) -> Result<Catalog> {
        if !self.catalog_path.exists() {
            return Ok(Catalog::default());
        }
        let raw = fs::read_to_string(&self.catalog_path)
            .with_context(|| format!("failed to read catalog '{}'", self.catalog_path.display()))?;
        let entries: Vec<VideoEntry> = serde_json::from_str(&raw)
            .with_context(|| format!("malformed catalog '{}'", self.catalog_path.display()))?;
        Catalog::from_entries(entries)
            .with_context(|| format!("malformed catalog '{}'", self.catalog_path.display()))
    }

    pub fn load_archive(&self) -> Result<MetadataArchive> {
        if !self.archive_path.exists() {
            return Ok(MetadataArchive::default());
        }
        let raw = fs::read_to_string(&self.archive_path).with_context(|| {
            format!(
                "failed to read metadata archive '{}'",
                self.archive_path.display()
            )
        })?;
        serde_json::from_str(&raw).with_context(|| {
            format!(
                "malformed metadata archive '{}'",
                self.archive_path.display()
            )
        })
    }

    /// Writes both documents. Each goes to a sibling temp file first and is
    /// renamed over the target so a crash mid-write cannot corrupt
    /// previously-good data.
    pub fn save(&self, catalog: &Catalog, archive: &MetadataArchive) -> Result<()> {
        write_pretty_json(&self.catalog_path, &catalog.entries())?;
        write_pretty_json(&self.archive_path, archive)?;
        Ok(())
    }
}

fn write_pretty_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directories for '{}'", path.display()))?;
    }

    let temp_path = temp_path_for(path);
    {
        let file = File::create(&temp_path)
            .with_context(|| format!("failed to create '{}'", temp_path.display()))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, value)
            .with_context(|| format!("failed to write JSON to '{}'", temp_path.display()))?;
    }
    fs::rename(&temp_path, path)
        .with_context(|| format!("failed to move '{}' into place", temp_path.display()))?;
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
