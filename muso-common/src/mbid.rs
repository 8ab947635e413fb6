//! MusicBrainz identifier parsing and validation
//!
//! Catalog identifiers are UUIDs, but operator-supplied values are only
//! accepted in the canonical hyphenated form (8-4-4-4-12 hex groups) so a
//! stray paste of something UUID-adjacent is rejected rather than guessed at.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A MusicBrainz identifier (recording, release, artist, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mbid(Uuid);

impl Mbid {
    /// Parse an identifier, requiring the canonical hyphenated shape.
    ///
    /// # Errors
    /// Returns `Err` with a short description when the input is not five
    /// hyphen-separated hex groups of lengths 8-4-4-4-12.
    pub fn parse(input: &str) -> Result<Self, String> {
        let trimmed = input.trim();

        if !has_canonical_shape(trimmed) {
            return Err(format!(
                "not a canonical identifier (expected 8-4-4-4-12 hex groups): {:?}",
                trimmed
            ));
        }

        let uuid = Uuid::parse_str(trimmed).map_err(|e| format!("invalid identifier: {}", e))?;
        Ok(Self(uuid))
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

/// Check the 8-4-4-4-12 hyphenated hex layout without allocating.
fn has_canonical_shape(s: &str) -> bool {
    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

    let mut parts = s.split('-');
    for expected_len in GROUPS {
        match parts.next() {
            Some(group)
                if group.len() == expected_len
                    && group.chars().all(|c| c.is_ascii_hexdigit()) => {}
            _ => return false,
        }
    }
    parts.next().is_none()
}

impl fmt::Display for Mbid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for Mbid {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for Mbid {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}
