//! Library organization
//!
//! Computes canonical destination paths from the tags already embedded in
//! each file and moves files into a genre/album layout. Placement is a
//! pure function of (tags, file, root), so organizing can run as a
//! separate pass long after identification, and re-running over an
//! already-organized tree is a no-op.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::scanner::{FileScanner, ScanError};
use crate::tags::{self, TagField, TagMap};

/// Subdirectory for fully resolved files
pub const SORTED_DIR: &str = "SORTED";

/// Subdirectory for files whose tags are missing or unparsable
pub const MISSING_DIR: &str = "_MISSING METADATA";

/// A computed destination for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Fully resolved: `root/SORTED/<genre>/<album>/<name>`
    Sorted(PathBuf),
    /// Needs attention: `root/_MISSING METADATA/<original name>`
    Missing(PathBuf),
}

impl Placement {
    pub fn path(&self) -> &Path {
        match self {
            Placement::Sorted(path) | Placement::Missing(path) => path,
        }
    }
}

/// What happened to one file during organization.
#[derive(Debug)]
pub enum OrganizeOutcome {
    Moved(Placement),
    /// File is already at its computed destination
    AlreadyInPlace,
}

/// Batch counters for one organization run.
#[derive(Debug, Default, Clone, Copy)]
pub struct OrganizeSummary {
    pub sorted: usize,
    pub missing: usize,
    pub unchanged: usize,
    pub failed: usize,
}

/// Compute where a file belongs under `root` given its embedded tags.
///
/// Requires title, artist, album, genre and a parsable track number;
/// anything missing routes the file to the needs-attention directory
/// under its original name. The genre directory is the first ';'-token
/// of the genre tag; a disc prefix appears only for multi-disc tags.
pub fn plan_placement(tag_map: &TagMap, file: &Path, root: &Path) -> Placement {
    match sorted_destination(tag_map, file, root) {
        Some(path) => Placement::Sorted(path),
        None => {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unnamed".to_string());
            Placement::Missing(root.join(MISSING_DIR).join(name))
        }
    }
}

fn sorted_destination(tag_map: &TagMap, file: &Path, root: &Path) -> Option<PathBuf> {
    let title = required(tag_map, TagField::Title)?;
    let artist = required(tag_map, TagField::Artist)?;
    let album = required(tag_map, TagField::Album)?;
    let genre = required(tag_map, TagField::Genre)?;
    let track = parse_number(tag_map.get(&TagField::TrackNumber)?)?;

    let genre_dir = genre.split(';').next()?.trim();
    if genre_dir.is_empty() {
        return None;
    }

    let disc = tag_map.get(&TagField::DiscNumber).and_then(|s| parse_number(s));
    let number = match disc {
        Some(disc) if disc >= 2 => format!("{:02}-{:02}", disc, track),
        _ => format!("{:02}", track),
    };

    let extension = file
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let file_name = format!(
        "{} - {} - {}{}",
        number,
        sanitize_component(&artist),
        sanitize_component(&title),
        extension
    );

    Some(
        root.join(SORTED_DIR)
            .join(sanitize_component(genre_dir))
            .join(sanitize_component(&album))
            .join(file_name),
    )
}

fn required(tag_map: &TagMap, field: TagField) -> Option<String> {
    tag_map
        .get(&field)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parse a track/disc number tag, tolerating `N/total` forms.
fn parse_number(value: &str) -> Option<u32> {
    value.trim().split('/').next()?.trim().parse().ok()
}

/// Path components must not introduce separators or drive-ish colons.
fn sanitize_component(text: &str) -> String {
    text.replace('/', "-").replace(':', "_")
}

/// Moves files to their computed destinations under a library root.
pub struct Organizer {
    root: PathBuf,
}

impl Organizer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Organize one file. Tags are re-read from the file itself; an
    /// unreadable container counts as missing metadata.
    pub fn organize_file(&self, file: &Path) -> muso_common::Result<OrganizeOutcome> {
        let tag_map = match tags::read_tags(file) {
            Ok(map) => map,
            Err(err) => {
                warn!(file = %file.display(), error = %err, "cannot read tags, treating as missing metadata");
                TagMap::new()
            }
        };

        let placement = plan_placement(&tag_map, file, &self.root);
        let dest = placement.path();

        if is_same_location(file, dest) {
            debug!(file = %file.display(), "already at computed destination");
            return Ok(OrganizeOutcome::AlreadyInPlace);
        }
        if dest.exists() {
            return Err(muso_common::Error::InvalidInput(format!(
                "destination already occupied: {}",
                dest.display()
            )));
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(file, dest)?;

        info!(from = %file.display(), to = %dest.display(), "moved file");
        Ok(OrganizeOutcome::Moved(placement))
    }

    /// Organize every audio file under `dir`. Per-file failures are
    /// logged and counted; the batch always runs to completion.
    pub fn organize_directory(
        &self,
        dir: &Path,
        recursive: bool,
    ) -> Result<OrganizeSummary, ScanError> {
        let scanner = if recursive {
            FileScanner::recursive()
        } else {
            FileScanner::flat()
        };
        let files = scanner.scan(dir)?;
        info!(dir = %dir.display(), files = files.len(), "organizing");

        let mut summary = OrganizeSummary::default();
        for file in &files {
            match self.organize_file(file) {
                Ok(OrganizeOutcome::Moved(Placement::Sorted(_))) => summary.sorted += 1,
                Ok(OrganizeOutcome::Moved(Placement::Missing(_))) => summary.missing += 1,
                Ok(OrganizeOutcome::AlreadyInPlace) => summary.unchanged += 1,
                Err(err) => {
                    warn!(file = %file.display(), error = %err, "failed to organize file");
                    summary.failed += 1;
                }
            }
        }
        Ok(summary)
    }
}

/// Both paths resolve to the same existing file.
fn is_same_location(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
