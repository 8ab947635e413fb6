//! Audio tag read/write wrapper backed by `lofty`
//!
//! Thin layer between the curation logic and the on-disk tag containers.
//! Reads produce a flat field → text map; writes take the same map and
//! skip (with a warning) any field the container format cannot carry.

use std::collections::BTreeMap;
use std::path::Path;

use lofty::config::{ParseOptions, ParsingMode, WriteOptions};
use lofty::file::{FileType, TaggedFile, TaggedFileExt};
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag, TagType};
use thiserror::Error;
use tracing::warn;

/// Tag layer errors
#[derive(Debug, Error)]
pub enum TagError {
    /// File could not be opened or probed
    #[error("cannot open {path}: {reason}")]
    Open { path: String, reason: String },

    /// Container parsed but tags could not be read
    #[error("cannot read tags from {path}: {reason}")]
    Read { path: String, reason: String },

    /// Tag write-back failed
    #[error("cannot write tags to {path}: {reason}")]
    Write { path: String, reason: String },
}

/// The tag vocabulary this tool reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TagField {
    Title,
    Artist,
    Album,
    AlbumArtist,
    Genre,
    TrackNumber,
    DiscNumber,
    Date,
    Comment,
    Length,
}

/// All fields, in a stable order.
pub const ALL_FIELDS: &[TagField] = &[
    TagField::Title,
    TagField::Artist,
    TagField::Album,
    TagField::AlbumArtist,
    TagField::Genre,
    TagField::TrackNumber,
    TagField::DiscNumber,
    TagField::Date,
    TagField::Comment,
    TagField::Length,
];

impl TagField {
    /// Canonical lowercase field name (matches common Vorbis comment keys).
    pub fn as_str(&self) -> &'static str {
        match self {
            TagField::Title => "title",
            TagField::Artist => "artist",
            TagField::Album => "album",
            TagField::AlbumArtist => "albumartist",
            TagField::Genre => "genre",
            TagField::TrackNumber => "tracknumber",
            TagField::DiscNumber => "discnumber",
            TagField::Date => "date",
            TagField::Comment => "comment",
            TagField::Length => "length",
        }
    }

    /// Primary `ItemKey` for generic tag reads/writes.
    fn item_key(&self) -> ItemKey {
        match self {
            TagField::Title => ItemKey::TrackTitle,
            TagField::Artist => ItemKey::TrackArtist,
            TagField::Album => ItemKey::AlbumTitle,
            TagField::AlbumArtist => ItemKey::AlbumArtist,
            TagField::Genre => ItemKey::Genre,
            TagField::TrackNumber => ItemKey::TrackNumber,
            TagField::DiscNumber => ItemKey::DiscNumber,
            TagField::Date => ItemKey::RecordingDate,
            TagField::Comment => ItemKey::Comment,
            TagField::Length => ItemKey::Length,
        }
    }

    /// Secondary key tried on read for fields with split representations.
    fn fallback_key(&self) -> Option<ItemKey> {
        match self {
            TagField::Date => Some(ItemKey::Year),
            _ => None,
        }
    }
}

impl std::fmt::Display for TagField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat field → value mapping for one file.
pub type TagMap = BTreeMap<TagField, String>;

fn open_tagged(path: &Path) -> Result<TaggedFile, TagError> {
    Probe::open(path)
        .map_err(|e| TagError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?
        .options(ParseOptions::new().parsing_mode(ParsingMode::Relaxed))
        .read()
        .map_err(|e| TagError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

/// Tag layer to write for a container. WAV is dual-layer (RIFF INFO +
/// ID3v2); the ID3v2 layer carries the full field set, so it is targeted
/// explicitly.
fn preferred_tag_type(tagged_file: &TaggedFile) -> TagType {
    match tagged_file.file_type() {
        FileType::Wav => TagType::Id3v2,
        other => other.primary_tag_type(),
    }
}

/// Read all supported tag fields from a file.
///
/// Absent fields are simply missing from the map; an unreadable or
/// untagged file yields an empty map only if the container itself parsed.
pub fn read_tags(path: &Path) -> Result<TagMap, TagError> {
    let tagged_file = open_tagged(path)?;

    let mut map = TagMap::new();
    let Some(tag) = tagged_file
        .tag(preferred_tag_type(&tagged_file))
        .or_else(|| tagged_file.primary_tag())
        .or_else(|| tagged_file.first_tag())
    else {
        return Ok(map);
    };

    for field in ALL_FIELDS {
        let value = tag
            .get_string(&field.item_key())
            .or_else(|| field.fallback_key().and_then(|k| tag.get_string(&k)));
        if let Some(value) = value {
            map.insert(*field, value.to_string());
        }
    }

    Ok(map)
}

/// Write a tag map into a file, creating the container's primary tag if
/// the file has none yet.
///
/// Fields the container rejects are logged and skipped; a failed save is
/// an error.
pub fn write_tags(path: &Path, values: &TagMap) -> Result<(), TagError> {
    let mut tagged_file = open_tagged(path)?;
    let tag_type = preferred_tag_type(&tagged_file);

    if tagged_file.tag(tag_type).is_none() {
        tagged_file.insert_tag(Tag::new(tag_type));
    }

    // insert_tag above guarantees a tag of this type exists
    let tag = tagged_file.tag_mut(tag_type).ok_or_else(|| TagError::Write {
        path: path.display().to_string(),
        reason: format!("container does not support {:?} tags", tag_type),
    })?;

    for (field, value) in values {
        if !tag.insert_text(field.item_key(), value.clone()) {
            warn!(file = %path.display(), field = %field, "tag field not supported by container, skipping");
        }
    }

    tag.save_to_path(path, WriteOptions::default())
        .map_err(|e| TagError::Write {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

/// Remove one field from a file's tags. A file without the field (or
/// without any tags) is left untouched.
pub fn clear_field(path: &Path, field: TagField) -> Result<(), TagError> {
    let mut tagged_file = open_tagged(path)?;
    let tag_type = preferred_tag_type(&tagged_file);

    let Some(tag) = tagged_file.tag_mut(tag_type) else {
        return Ok(());
    };

    if tag.get_string(&field.item_key()).is_none() {
        return Ok(());
    }

    tag.remove_key(&field.item_key());
    if let Some(fallback) = field.fallback_key() {
        tag.remove_key(&fallback);
    }

    tag.save_to_path(path, WriteOptions::default())
        .map_err(|e| TagError::Write {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}
