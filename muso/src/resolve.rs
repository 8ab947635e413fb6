//! Resolution orchestration
//!
//! Drives each file through search → match → confirm, with fallback to
//! manual identifier entry, and hands resolved records to the tag layer.
//! Three resolution modes cover the ways a batch can arrive: plain
//! search-driven identification, album-driven enumeration, and
//! manifest-seeded lookups that bypass search entirely.

use std::path::Path;

use muso_common::Mbid;
use tracing::{debug, info, warn};

use crate::catalog::{CatalogClient, HydrateOptions};
use crate::manifest::ManifestEntry;
use crate::matcher;
use crate::prompt::Prompter;
use crate::record::MetadataRecord;
use crate::scanner::{FileScanner, ScanError};
use crate::tags;

/// How a batch's recordings are identified.
#[derive(Debug, Clone)]
pub enum ResolutionMode {
    /// Free-text search on the file stem, operator-confirmed
    Search,
    /// Enumerate one release's tracks and match titles, no interaction
    Album(Mbid),
    /// Identifiers and genres supplied up front
    Manifest(ManifestSeed),
}

/// Pre-seeded identification for one file.
#[derive(Debug, Clone)]
pub struct ManifestSeed {
    pub release_id: Mbid,
    pub recording_id: Mbid,
    pub genre: Option<String>,
    pub subgenres: Vec<String>,
}

impl From<&ManifestEntry> for ManifestSeed {
    fn from(entry: &ManifestEntry) -> Self {
        Self {
            release_id: entry.release_id,
            recording_id: entry.recording_id,
            genre: entry.genre.clone(),
            subgenres: entry.subgenres.clone(),
        }
    }
}

/// Terminal result for one file.
#[derive(Debug)]
pub enum FileOutcome {
    Resolved(MetadataRecord),
    Skipped,
}

/// Batch counters reported back to the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentifySummary {
    pub resolved: usize,
    pub skipped: usize,
}

/// Per-file resolution driver.
pub struct Resolver<'a, P: Prompter> {
    catalog: &'a CatalogClient,
    prompter: &'a P,
}

impl<'a, P: Prompter> Resolver<'a, P> {
    pub fn new(catalog: &'a CatalogClient, prompter: &'a P) -> Self {
        Self { catalog, prompter }
    }

    /// Resolve one file under the given mode.
    pub async fn resolve_file(&self, file: &Path, mode: &ResolutionMode) -> FileOutcome {
        match mode {
            ResolutionMode::Search => self.resolve_by_search(file).await,
            ResolutionMode::Album(release_id) => self.resolve_from_album(file, release_id).await,
            ResolutionMode::Manifest(seed) => self.resolve_from_seed(seed).await,
        }
    }

    /// Identify and tag every audio file directly under `dir`.
    ///
    /// Files are processed strictly one after another; a failure on one
    /// file is logged and never aborts the rest of the batch.
    pub async fn identify_directory(
        &self,
        dir: &Path,
        mode: &ResolutionMode,
    ) -> Result<IdentifySummary, ScanError> {
        let files = FileScanner::flat().scan(dir)?;
        info!(dir = %dir.display(), files = files.len(), "starting identification batch");

        let mut summary = IdentifySummary::default();
        for file in &files {
            info!(file = %file.display(), "processing file");
            self.finish_file(file, self.resolve_file(file, mode).await, &mut summary);
        }
        Ok(summary)
    }

    /// Identify files from a pre-seeded manifest, pairing manifest rows
    /// with the directory's audio files in scan order.
    pub async fn identify_from_manifest(
        &self,
        dir: &Path,
        entries: &[ManifestEntry],
    ) -> Result<IdentifySummary, ScanError> {
        let files = FileScanner::flat().scan(dir)?;
        if files.len() != entries.len() {
            warn!(
                files = files.len(),
                entries = entries.len(),
                "manifest row count does not match file count; pairing in order"
            );
        }

        let mut summary = IdentifySummary::default();
        for (file, entry) in files.iter().zip(entries) {
            info!(file = %file.display(), recording = %entry.recording_id, "processing manifest entry");
            let seed = ManifestSeed::from(entry);
            self.finish_file(file, self.resolve_from_seed(&seed).await, &mut summary);
        }
        Ok(summary)
    }

    /// Embed a resolved record, or log the skip. Embedding failures count
    /// the file as skipped; the original stays untouched.
    fn finish_file(&self, file: &Path, outcome: FileOutcome, summary: &mut IdentifySummary) {
        match outcome {
            FileOutcome::Resolved(mut record) => {
                record.path = Some(file.to_path_buf());
                match tags::write_tags(file, &record.to_tag_map()) {
                    Ok(()) => {
                        info!(file = %file.display(), title = %record.title, "embedded metadata");
                        summary.resolved += 1;
                    }
                    Err(err) => {
                        warn!(file = %file.display(), error = %err, "failed to embed metadata");
                        summary.skipped += 1;
                    }
                }
            }
            FileOutcome::Skipped => {
                warn!(file = %file.display(), "no metadata resolved, file left untouched");
                summary.skipped += 1;
            }
        }
    }

    /// START → SEARCHED → MATCHED → CONFIRMED, falling through to manual
    /// entry when search errors, matching fails, or the operator says no.
    async fn resolve_by_search(&self, file: &Path) -> FileOutcome {
        let stem = file_stem(file);
        let artist_hint = self.prompter.artist_hint(&stem);

        match self
            .catalog
            .search_recordings(&stem, artist_hint.as_deref())
            .await
        {
            Ok(candidates) => {
                debug!(file = %file.display(), candidates = candidates.len(), "search returned");
                if let Some(recording_id) = matcher::choose_best(&candidates, &stem) {
                    if let Some(record) = self
                        .catalog
                        .recording_metadata(&recording_id, &HydrateOptions::default(), self.prompter)
                        .await
                    {
                        if self.prompter.confirm_match(&record.artist, &record.title) {
                            return FileOutcome::Resolved(record);
                        }
                        info!(file = %file.display(), "operator rejected match");
                    }
                }
            }
            Err(err) => {
                warn!(file = %file.display(), error = %err, "catalog search failed");
            }
        }

        self.manual_entry(file).await
    }

    /// MANUAL_ENTRY → CONFIRMED | SKIPPED. The prompter validates the
    /// identifier shape and re-prompts; a skip sentinel ends the file.
    async fn manual_entry(&self, file: &Path) -> FileOutcome {
        let name = file_name(file);
        match self.prompter.manual_recording_id(&name) {
            Some(recording_id) => {
                match self
                    .catalog
                    .recording_metadata(&recording_id, &HydrateOptions::default(), self.prompter)
                    .await
                {
                    Some(record) => FileOutcome::Resolved(record),
                    None => FileOutcome::Skipped,
                }
            }
            None => FileOutcome::Skipped,
        }
    }

    /// Album-assisted: hydrate every track on the release and keep the
    /// one whose title is most similar to the file stem. No interaction;
    /// the release context anchors the match.
    async fn resolve_from_album(&self, file: &Path, release_id: &Mbid) -> FileOutcome {
        let stem = file_stem(file);

        let recording_ids = match self.catalog.release_recording_ids(release_id).await {
            Ok(ids) => ids,
            Err(err) => {
                warn!(release = %release_id, error = %err, "cannot enumerate release tracks");
                return FileOutcome::Skipped;
            }
        };

        let opts = HydrateOptions {
            release: Some(*release_id),
            ..Default::default()
        };

        let mut best: Option<(f64, MetadataRecord)> = None;
        for recording_id in recording_ids {
            let Some(record) = self
                .catalog
                .recording_metadata(&recording_id, &opts, self.prompter)
                .await
            else {
                continue;
            };

            let score = matcher::lcs_ratio(&record.title, &stem);
            debug!(recording = %recording_id, title = %record.title, score, "album track scored");
            if best.as_ref().map(|(s, _)| score > *s).unwrap_or(true) {
                best = Some((score, record));
            }
        }

        match best {
            Some((score, record)) => {
                info!(file = %file.display(), title = %record.title, score, "album match selected");
                FileOutcome::Resolved(record)
            }
            None => {
                warn!(file = %file.display(), release = %release_id, "no album track hydrated");
                FileOutcome::Skipped
            }
        }
    }

    /// Manifest-seeded: identifiers and genre already known, nothing to
    /// search or confirm.
    async fn resolve_from_seed(&self, seed: &ManifestSeed) -> FileOutcome {
        let opts = HydrateOptions {
            release: Some(seed.release_id),
            genre: seed.genre.clone(),
            subgenres: if seed.subgenres.is_empty() {
                None
            } else {
                Some(seed.subgenres.clone())
            },
        };

        match self
            .catalog
            .recording_metadata(&seed.recording_id, &opts, self.prompter)
            .await
        {
            Some(record) => FileOutcome::Resolved(record),
            None => FileOutcome::Skipped,
        }
    }
}

fn file_stem(file: &Path) -> String {
    file.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string())
}

fn file_name(file: &Path) -> String {
    file.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_seed_from_entry() {
        let entry = crate::manifest::parse_str(
            "url,release,recording,reserved,genre,subgenres\n\
             https://x,11111111-1111-1111-1111-111111111111,22222222-2222-2222-2222-222222222222,,Rock,Indie;Shoegaze\n",
        )
        .unwrap()
        .remove(0);

        let seed = ManifestSeed::from(&entry);
        assert_eq!(seed.release_id, entry.release_id);
        assert_eq!(seed.recording_id, entry.recording_id);
        assert_eq!(seed.genre.as_deref(), Some("Rock"));
        assert_eq!(seed.subgenres, vec!["Indie", "Shoegaze"]);
    }

    #[test]
    fn file_stem_strips_extension() {
        assert_eq!(file_stem(Path::new("/music/Amazing Grace.flac")), "Amazing Grace");
        assert_eq!(file_name(Path::new("/music/Amazing Grace.flac")), "Amazing Grace.flac");
    }
}
