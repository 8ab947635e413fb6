//! Audio file discovery
//!
//! Walks a directory for files matching the supported audio extensions.
//! Hidden entries and common system droppings are skipped. Results come
//! back sorted so batch runs process files in a stable order.

use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Extensions this tool treats as audio, lowercase, without the dot.
pub const AUDIO_EXTENSIONS: &[&str] =
    &["mp3", "wav", "flac", "m4a", "ogg", "wma", "aiff", "opus"];

/// File discovery errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// General I/O error during traversal
    #[error("I/O error: {0}")]
    Io(String),
}

/// Audio file scanner
#[derive(Debug, Clone)]
pub struct FileScanner {
    recursive: bool,
}

impl FileScanner {
    /// Scanner that descends into subdirectories.
    pub fn recursive() -> Self {
        Self { recursive: true }
    }

    /// Scanner that looks at the top level only.
    pub fn flat() -> Self {
        Self { recursive: false }
    }

    /// List audio files under `dir`, sorted by path.
    pub fn scan(&self, dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
        if !dir.exists() {
            return Err(ScanError::PathNotFound(dir.to_path_buf()));
        }
        if !dir.is_dir() {
            return Err(ScanError::NotADirectory(dir.to_path_buf()));
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files = Vec::new();
        for entry in WalkDir::new(dir)
            .max_depth(max_depth)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
        {
            let entry = entry.map_err(|e| ScanError::Io(e.to_string()))?;
            if entry.file_type().is_file() && is_audio_file(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::recursive()
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

/// Does the extension mark this as one of the supported audio formats?
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
