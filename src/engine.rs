use std::collections::HashMap;

use anyhow::Result;
use chrono::{SecondsFormat, Utc};

use crate::catalog::{Catalog, MetadataArchive, VideoEntry};
use crate::covers::CoverStore;
use crate::ffprobe::round_duration;
use crate::metadata::{self, SongInfo};
use crate::providers::{CoverProvider, DurationProbe, MetadataProvider};
use crate::report::Report;
use crate::scanner::VideoFile;
use crate::store::CatalogStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    New,
    Stale,
    UpToDate,
}

/// The work a single file needs, decided up front from the entry state, the
/// on-disk cover, and the run flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkPlan {
    pub classification: Classification,
    pub lookup_metadata: bool,
    pub fetch_cover: bool,
    pub probe_duration: bool,
}

impl WorkPlan {
    fn is_noop(&self) -> bool {
        !self.lookup_metadata && !self.fetch_cover && !self.probe_duration
    }
}

/// The per-file decision table.
///
/// Partial metadata (one of artist/title present) deliberately does not
/// trigger a new lookup; only an entry missing both fields is re-queried.
/// The duration probe is local and runs whenever the duration is missing,
/// in every mode.
pub fn classify(
    entry: Option<&VideoEntry>,
    cover_present: bool,
    offline: bool,
    force: bool,
) -> WorkPlan {
    let Some(entry) = entry else {
        return WorkPlan {
            classification: Classification::New,
            lookup_metadata: !offline,
            fetch_cover: !offline && !cover_present,
            probe_duration: true,
        };
    };

    let duration_missing = entry.duration_seconds.is_none();

    if offline {
        return WorkPlan {
            classification: Classification::UpToDate,
            lookup_metadata: false,
            fetch_cover: false,
            probe_duration: duration_missing,
        };
    }

    if force {
        return WorkPlan {
            classification: Classification::Stale,
            lookup_metadata: true,
            fetch_cover: true,
            probe_duration: true,
        };
    }

    if entry.has_metadata() && cover_present {
        WorkPlan {
            classification: Classification::UpToDate,
            lookup_metadata: false,
            fetch_cover: false,
            probe_duration: duration_missing,
        }
    } else {
        WorkPlan {
            classification: Classification::Stale,
            lookup_metadata: entry.artist.is_none() && entry.title.is_none(),
            fetch_cover: !cover_present,
            probe_duration: duration_missing,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    pub offline: bool,
    pub force: bool,
}

/// The reconciliation engine: scan results in, enriched catalog out, with
/// both documents committed to disk after every file.
pub struct Engine<'a, M, P, C> {
    metadata_provider: &'a M,
    probe: &'a P,
    cover_provider: &'a C,
    covers: CoverStore,
    store: CatalogStore,
    offline: bool,
    force: bool,
    report: Report,
}

impl<'a, M, P, C> Engine<'a, M, P, C>
where
    M: MetadataProvider,
    P: DurationProbe,
    C: CoverProvider,
{
    pub fn new(
        metadata_provider: &'a M,
        probe: &'a P,
        cover_provider: &'a C,
        covers: CoverStore,
        store: CatalogStore,
        options: EngineOptions,
    ) -> Self {
        Self {
            metadata_provider,
            probe,
            cover_provider,
            covers,
            store,
            offline: options.offline,
            force: options.force,
            report: Report::default(),
        }
    }

    /// Processes every scanned file in order. A per-file failure is logged
    /// and counted, never fatal; only the duplicate-base-name invariant,
    /// malformed persisted state, and persistence failures abort the run.
    pub fn run(mut self, files: &[VideoFile]) -> Result<Report> {
        ensure_unique_base_names(files)?;

        let mut catalog = self.store.load_catalog()?;
        let mut archive = self.store.load_archive()?;

        for file in files {
            self.report.record_scan();
            let outcome = self.process_file(file, &mut catalog, &mut archive);
            // The resumability contract: both documents hit disk after every
            // file, including files that just failed.
            self.store.save(&catalog, &archive)?;
            if let Err(error) = outcome {
                self.report.record_failure();
                log::error!("Failed to process '{}': {error:#}", file.file_name);
            }
        }

        // A zero-file run still materializes both documents.
        self.store.save(&catalog, &archive)?;
        Ok(self.report)
    }

    fn process_file(
        &mut self,
        file: &VideoFile,
        catalog: &mut Catalog,
        archive: &mut MetadataArchive,
    ) -> Result<()> {
        let base = file.base_name.as_str();
        let existing_cover = self.covers.existing(base);
        let plan = classify(
            catalog.get(base),
            existing_cover.is_some(),
            self.offline,
            self.force,
        );

        if plan.classification == Classification::New {
            log::info!("Processing: {}", file.file_name);
            self.report.record_new();
        }

        // A brand-new entry counts as changed so it gets stamped even when
        // every enrichment step comes up empty.
        let mut changed = plan.classification == Classification::New;

        let entry = catalog.get_or_insert(base);
        sync_file_fields(entry, file, existing_cover.as_deref(), &mut changed);

        if plan.is_noop() && !changed {
            self.report.record_up_to_date();
            log::debug!("Entry for '{}' is complete; skipping", file.file_name);
            return Ok(());
        }

        if plan.classification == Classification::Stale {
            log::info!("Updating: {}", file.file_name);
        }

        let entry = catalog.get_or_insert(base);
        let result = self.apply_plan(file, &plan, entry, archive, &mut changed);

        if changed {
            let entry = catalog.get_or_insert(base);
            entry.processed_at = Some(now_utc());
            if plan.classification != Classification::New {
                self.report.record_update();
            }
        } else if plan.classification == Classification::UpToDate {
            self.report.record_up_to_date();
        }

        result
    }

    fn apply_plan(
        &mut self,
        file: &VideoFile,
        plan: &WorkPlan,
        entry: &mut VideoEntry,
        archive: &mut MetadataArchive,
        changed: &mut bool,
    ) -> Result<()> {
        if plan.probe_duration {
            self.backfill_duration(file, entry, changed);
        }
        if plan.lookup_metadata {
            self.resolve_metadata(file, entry, archive, changed)?;
        }
        if plan.fetch_cover {
            self.download_cover(file, entry, archive, changed);
        }
        Ok(())
    }

    /// Local enrichment; a failed probe leaves the field absent and is
    /// retried on the next run.
    fn backfill_duration(&mut self, file: &VideoFile, entry: &mut VideoEntry, changed: &mut bool) {
        match self.probe.probe(&file.path) {
            Ok(seconds) if seconds > 0.0 => {
                let rounded = round_duration(seconds);
                if entry.duration_seconds != Some(rounded) {
                    entry.duration_seconds = Some(rounded);
                    *changed = true;
                }
            }
            Ok(_) => log::warn!(
                "Zero-length duration reported for '{}'; leaving it unset",
                file.file_name
            ),
            Err(error) => log::warn!(
                "Could not get duration for '{}': {error:#}",
                file.file_name
            ),
        }
    }

    /// An archived record is reused instead of hitting the provider again;
    /// only `--force` re-fetches. Provider errors (the one-result invariant)
    /// escalate to the caller as this file's failure.
    fn resolve_metadata(
        &mut self,
        file: &VideoFile,
        entry: &mut VideoEntry,
        archive: &mut MetadataArchive,
        changed: &mut bool,
    ) -> Result<()> {
        let base = file.base_name.as_str();

        let record = match archive.get(base) {
            Some(record) if !self.force => record.clone(),
            _ => {
                log::info!("Getting metadata for: {base}");
                match self.metadata_provider.resolve(base)? {
                    Some(record) => {
                        archive.insert(base.to_string(), record.clone());
                        self.report.record_metadata_resolved();
                        *changed = true;
                        record
                    }
                    None => {
                        log::warn!("No metadata found for: {base}");
                        return Ok(());
                    }
                }
            }
        };

        apply_song_info(entry, metadata::extract_song_info(&record), self.force, changed);
        Ok(())
    }

    fn download_cover(
        &mut self,
        file: &VideoFile,
        entry: &mut VideoEntry,
        archive: &MetadataArchive,
        changed: &mut bool,
    ) {
        let base = file.base_name.as_str();
        let Some(reference) = archive.get(base).and_then(metadata::cover_reference) else {
            log::debug!("No cover reference available for: {base}");
            return;
        };

        log::info!("Downloading cover for: {base}");
        let stored = self
            .cover_provider
            .fetch(&reference)
            .and_then(|art| self.covers.save(base, &art));

        match stored {
            Ok(file_name) => {
                self.report.record_cover_download();
                *changed = true;
                let default_name = format!("{base}.jpg");
                entry.cover_filename = (file_name != default_name).then_some(file_name);
            }
            Err(error) => log::warn!("Failed to download cover for '{base}': {error:#}"),
        }
    }
}

/// Two distinct files collapsing to one catalog key is a configuration
/// error, caught before any state is touched.
fn ensure_unique_base_names(files: &[VideoFile]) -> Result<()> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for file in files {
        if let Some(previous) = seen.insert(file.base_name.as_str(), file.file_name.as_str()) {
            anyhow::bail!(
                "base name '{}' is claimed by both '{}' and '{}'; rename one of them",
                file.base_name,
                previous,
                file.file_name
            );
        }
    }
    Ok(())
}

/// Reconciles the filename-deviation fields against the disk. Local only.
fn sync_file_fields(
    entry: &mut VideoEntry,
    file: &VideoFile,
    existing_cover: Option<&str>,
    changed: &mut bool,
) {
    let expected_video = (file.file_name != format!("{}.mp4", file.base_name))
        .then(|| file.file_name.clone());
    if entry.video_filename != expected_video {
        entry.video_filename = expected_video;
        *changed = true;
    }

    let expected_cover = match existing_cover {
        Some(cover) if cover != format!("{}.jpg", file.base_name) => Some(cover.to_string()),
        _ => None,
    };
    if entry.cover_filename != expected_cover {
        entry.cover_filename = expected_cover;
        *changed = true;
    }
}

fn apply_song_info(entry: &mut VideoEntry, info: SongInfo, force: bool, changed: &mut bool) {
    apply_field(&mut entry.artist, info.artist, force, changed);
    apply_field(&mut entry.title, info.title, force, changed);
    apply_field(&mut entry.genre, info.genre, force, changed);
}

/// Fills an absent field; never clears an existing value, and only `--force`
/// overwrites one.
fn apply_field(slot: &mut Option<String>, value: Option<String>, force: bool, changed: &mut bool) {
    let Some(value) = value else { return };
    if (force || slot.is_none()) && slot.as_deref() != Some(value.as_str()) {
        *slot = Some(value);
        *changed = true;
    }
}

fn now_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
