//! Batch download manifest parsing
//!
//! A manifest pre-seeds release and genre information for a batch so
//! identification can bypass search and matching entirely. Plain
//! comma-delimited text, header row skipped, columns in order:
//! URL, release id, recording id, reserved, genre, ';'-joined subgenres.
//! No quoting; a mis-shaped row fails with its line number.

use std::path::Path;

use muso_common::Mbid;
use thiserror::Error;

/// Manifest parsing errors
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("cannot read manifest {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("manifest line {line}: {reason}")]
    Line { line: usize, reason: String },
}

/// One manifest row
#[derive(Debug, Clone)]
pub struct ManifestEntry {
    /// Source URL; consumed by the external downloader, carried through
    /// untouched here
    pub url: String,
    pub release_id: Mbid,
    pub recording_id: Mbid,
    pub genre: Option<String>,
    pub subgenres: Vec<String>,
}

/// Parse a manifest file.
pub fn parse_manifest(path: &Path) -> Result<Vec<ManifestEntry>, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_str(&content)
}

/// Parse manifest text. The first line is a header and is skipped.
pub fn parse_str(content: &str) -> Result<Vec<ManifestEntry>, ManifestError> {
    let mut entries = Vec::new();

    for (index, raw_line) in content.lines().enumerate() {
        if index == 0 {
            continue;
        }
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let line_number = index + 1;
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < 3 {
            return Err(ManifestError::Line {
                line: line_number,
                reason: format!("expected at least 3 columns, found {}", fields.len()),
            });
        }

        let release_id = Mbid::parse(fields[1]).map_err(|reason| ManifestError::Line {
            line: line_number,
            reason: format!("release id: {}", reason),
        })?;
        let recording_id = Mbid::parse(fields[2]).map_err(|reason| ManifestError::Line {
            line: line_number,
            reason: format!("recording id: {}", reason),
        })?;

        let genre = fields
            .get(4)
            .map(|s| s.to_string())
            .filter(|s| !s.is_empty());
        let subgenres = fields
            .get(5)
            .map(|s| {
                s.split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        entries.push(ManifestEntry {
            url: fields[0].to_string(),
            release_id,
            recording_id,
            genre,
            subgenres,
        });
    }

    Ok(entries)
}
