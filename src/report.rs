use log::{info, warn};

/// Per-run counters, reported at the end. Observability only.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub scanned: usize,
    pub new_entries: usize,
    pub updated: usize,
    pub up_to_date: usize,
    pub metadata_resolved: usize,
    pub covers_downloaded: usize,
    pub failures: usize,
}

impl Report {
    pub fn record_scan(&mut self) {
        self.scanned += 1;
    }

    pub fn record_new(&mut self) {
        self.new_entries += 1;
    }

    pub fn record_update(&mut self) {
        self.updated += 1;
    }

    pub fn record_up_to_date(&mut self) {
        self.up_to_date += 1;
    }

    pub fn record_metadata_resolved(&mut self) {
        self.metadata_resolved += 1;
    }

    pub fn record_cover_download(&mut self) {
        self.covers_downloaded += 1;
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    pub fn emit_summary(&self) {
        info!(
            "Processed {scanned} video files -- {new} new, {updated} updated, {complete} already complete",
            scanned = self.scanned,
            new = self.new_entries,
            updated = self.updated,
            complete = self.up_to_date,
        );
        info!(
            "Metadata records resolved: {resolved}, covers downloaded: {covers}",
            resolved = self.metadata_resolved,
            covers = self.covers_downloaded,
        );

        if self.failures > 0 {
            warn!(
                "{count} files failed to process and will be retried on the next run.",
                count = self.failures
            );
        }
    }
}
