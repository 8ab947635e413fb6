//! Canonical track metadata
//!
//! `MetadataRecord` is the composed result of a catalog lookup: recording
//! fields merged with the chosen release's fields and the normalized
//! genres. It is owned by the resolution step that created it until the
//! tag layer persists it into the file.

use std::path::PathBuf;

use muso_common::Mbid;
use serde::Serialize;

use crate::tags::{TagField, TagMap};

/// Sentinel release date when the catalog record carries none.
pub const UNKNOWN_RELEASE_DATE: &str = "0000-00-00";

/// Canonical metadata for one track.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataRecord {
    /// Catalog recording identifier this record was hydrated from
    pub recording_id: Mbid,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub album_artist: String,
    /// 1-based; defaults to 1 when the release lists no position
    pub track_number: u32,
    /// 1-based; defaults to 1 when the release lists no medium position
    pub disc_number: u32,
    /// ISO-like date text, or `UNKNOWN_RELEASE_DATE`
    pub release_date: String,
    /// First four characters of the release date
    pub year: String,
    pub duration_secs: f64,
    pub main_genre: String,
    pub subgenres: Vec<String>,
    /// Composed free-text comment embedding the subgenres
    pub comment: String,
    /// Local file this record belongs to, once known
    pub path: Option<PathBuf>,
}

impl MetadataRecord {
    /// Derive the 4-digit year text from a release date.
    pub fn year_of(release_date: &str) -> String {
        release_date.chars().take(4).collect()
    }

    /// Compose the comment field carrying the subgenre list.
    ///
    /// `"Subgenres: A; B | Vibe: N/A"`, or `"Subgenres: N/A | Vibe: N/A"`
    /// when there are none. The vibe slot is reserved for manual curation.
    pub fn subgenre_comment(subgenres: &[String]) -> String {
        if subgenres.is_empty() {
            "Subgenres: N/A | Vibe: N/A".to_string()
        } else {
            format!("Subgenres: {} | Vibe: N/A", subgenres.join("; "))
        }
    }

    /// The genre tag value: main genre first, subgenres after, ';'-joined.
    /// The organizer takes the first ';'-token as the directory genre.
    pub fn genre_tag(&self) -> String {
        std::iter::once(self.main_genre.as_str())
            .chain(self.subgenres.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Flatten into the tag map the tag layer persists.
    ///
    /// The sentinel release date and a zero duration are omitted, matching
    /// what a fresh rip would carry.
    pub fn to_tag_map(&self) -> TagMap {
        let mut map = TagMap::new();
        map.insert(TagField::Title, self.title.clone());
        map.insert(TagField::Artist, self.artist.clone());
        map.insert(TagField::Album, self.album.clone());
        map.insert(TagField::AlbumArtist, self.album_artist.clone());
        map.insert(TagField::Genre, self.genre_tag());
        map.insert(TagField::TrackNumber, self.track_number.to_string());
        map.insert(TagField::DiscNumber, self.disc_number.to_string());
        map.insert(TagField::Comment, self.comment.clone());
        if self.release_date != UNKNOWN_RELEASE_DATE {
            map.insert(TagField::Date, self.release_date.clone());
        }
        if self.duration_secs > 0.0 {
            map.insert(TagField::Length, (self.duration_secs.round() as u64).to_string());
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> MetadataRecord {
        MetadataRecord {
            recording_id: Mbid::parse("12345678-1234-1234-1234-123456789abc").unwrap(),
            title: "Song".to_string(),
            artist: "Art".to_string(),
            album: "Al/Bum".to_string(),
            album_artist: "Art".to_string(),
            track_number: 3,
            disc_number: 1,
            release_date: "2003-05-12".to_string(),
            year: "2003".to_string(),
            duration_secs: 215.0,
            main_genre: "Rock".to_string(),
            subgenres: vec!["Pop".to_string()],
            comment: MetadataRecord::subgenre_comment(&["Pop".to_string()]),
            path: None,
        }
    }

    #[test]
    fn year_is_leading_four_characters() {
        assert_eq!(MetadataRecord::year_of("2003-05-12"), "2003");
        assert_eq!(MetadataRecord::year_of(UNKNOWN_RELEASE_DATE), "0000");
    }

    #[test]
    fn comment_with_subgenres() {
        let comment =
            MetadataRecord::subgenre_comment(&["Hymns".to_string(), "Worship & Praise".to_string()]);
        assert_eq!(comment, "Subgenres: Hymns; Worship & Praise | Vibe: N/A");
    }

    #[test]
    fn comment_without_subgenres() {
        assert_eq!(
            MetadataRecord::subgenre_comment(&[]),
            "Subgenres: N/A | Vibe: N/A"
        );
    }

    #[test]
    fn genre_tag_puts_main_genre_first() {
        assert_eq!(sample_record().genre_tag(), "Rock;Pop");
    }

    #[test]
    fn tag_map_carries_all_populated_fields() {
        let map = sample_record().to_tag_map();
        assert_eq!(map.get(&TagField::Title).unwrap(), "Song");
        assert_eq!(map.get(&TagField::Genre).unwrap(), "Rock;Pop");
        assert_eq!(map.get(&TagField::TrackNumber).unwrap(), "3");
        assert_eq!(map.get(&TagField::Date).unwrap(), "2003-05-12");
        assert_eq!(map.get(&TagField::Length).unwrap(), "215");
    }

    #[test]
    fn tag_map_omits_sentinel_date() {
        let mut record = sample_record();
        record.release_date = UNKNOWN_RELEASE_DATE.to_string();
        let map = record.to_tag_map();
        assert!(!map.contains_key(&TagField::Date));
    }
}
