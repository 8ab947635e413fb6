//! Catalog API response types
//!
//! Serde models for the subset of the MusicBrainz WS/2 JSON responses this
//! tool reads. Unknown fields are ignored; hyphenated keys are renamed.

use muso_common::Mbid;
use serde::Deserialize;

/// A recording lookup response (`/recording/{id}`)
#[derive(Debug, Clone, Deserialize)]
pub struct Recording {
    pub id: Mbid,
    pub title: String,
    /// Duration in milliseconds
    pub length: Option<u64>,
    #[serde(rename = "artist-credit", default)]
    pub artist_credit: Vec<ArtistCredit>,
    #[serde(default)]
    pub releases: Vec<ReleaseStub>,
}

impl Recording {
    /// The primary (first-credited) artist name.
    pub fn primary_artist(&self) -> Option<&str> {
        self.artist_credit.first().map(|credit| credit.name.as_str())
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.length.unwrap_or(0) as f64 / 1000.0
    }
}

/// One artist credit entry
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistCredit {
    pub name: String,
}

/// A release as referenced from a recording lookup
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseStub {
    pub id: Mbid,
    pub title: String,
    pub date: Option<String>,
}

/// A release lookup response (`/release/{id}`)
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub id: Mbid,
    pub title: String,
    pub date: Option<String>,
    #[serde(rename = "artist-credit", default)]
    pub artist_credit: Vec<ArtistCredit>,
    #[serde(default)]
    pub media: Vec<Medium>,
    #[serde(default)]
    pub tags: Vec<TagEntry>,
}

impl Release {
    /// The release-level (album) artist, when credited.
    pub fn album_artist(&self) -> Option<&str> {
        self.artist_credit.first().map(|credit| credit.name.as_str())
    }

    /// Raw genre tag names in catalog order.
    pub fn tag_names(&self) -> Vec<String> {
        self.tags.iter().map(|tag| tag.name.clone()).collect()
    }

    /// Find `(track, disc)` positions for a recording by scanning the
    /// ordered media and track lists. First match wins; the search stops
    /// at the containing medium.
    pub fn track_position_of(&self, recording_id: &Mbid) -> Option<(u32, u32)> {
        for medium in &self.media {
            for track in &medium.tracks {
                if let Some(recording) = &track.recording {
                    if recording.id == *recording_id {
                        return Some((track.position, medium.position));
                    }
                }
            }
        }
        None
    }

    /// Every track's recording identifier, across all media, in order.
    pub fn recording_ids(&self) -> Vec<Mbid> {
        self.media
            .iter()
            .flat_map(|medium| &medium.tracks)
            .filter_map(|track| track.recording.as_ref().map(|r| r.id))
            .collect()
    }
}

/// One medium (disc) of a release
#[derive(Debug, Clone, Deserialize)]
pub struct Medium {
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// One track entry on a medium
#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub position: u32,
    pub recording: Option<RecordingRef>,
}

/// Embedded recording reference on a track
#[derive(Debug, Clone, Deserialize)]
pub struct RecordingRef {
    pub id: Mbid,
}

/// One folksonomy tag on a release
#[derive(Debug, Clone, Deserialize)]
pub struct TagEntry {
    pub name: String,
}

/// A recording search response (`/recording?query=...`)
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub recordings: Vec<SearchRecording>,
}

/// One search result row
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRecording {
    pub id: Mbid,
    pub title: String,
    #[serde(rename = "artist-credit", default)]
    pub artist_credit: Vec<ArtistCredit>,
}

impl SearchRecording {
    pub fn primary_artist(&self) -> Option<&str> {
        self.artist_credit.first().map(|credit| credit.name.as_str())
    }
}
