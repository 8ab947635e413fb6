//! Genre normalization
//!
//! Maps raw catalog tag strings to a standardized (main genre, subgenres)
//! pair via a static lookup table. The table is an explicitly constructed
//! read-only object handed to the catalog client at startup, so tests can
//! substitute their own mappings.

use std::collections::HashMap;

use muso_common::config::GenreEntry;
use tracing::warn;

/// Placeholder tag some catalog editors leave on releases; never a genre.
pub const UNSPECIFIED_GENRE: &str = "Specify the genre of music";

/// Fallback main genre when the catalog supplies no mapped main tag.
pub const OTHER_GENRE: &str = "Other Genre";

/// One raw-tag mapping: the canonical label and whether it selects the
/// main (directory-level) genre.
#[derive(Debug, Clone)]
pub struct GenreMapping {
    pub label: String,
    pub main: bool,
}

/// Normalization result for one release's tag list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreAssignment {
    /// Main genre, always populated (`OTHER_GENRE` fallback)
    pub main: String,
    /// Subgenre labels, encounter order, exact-string deduplicated
    pub subgenres: Vec<String>,
}

/// Raw catalog tag → canonical genre lookup table, case-insensitive keys.
#[derive(Debug, Clone, Default)]
pub struct GenreMap {
    entries: HashMap<String, GenreMapping>,
}

impl GenreMap {
    /// Empty table; every tag will be dropped and the main genre falls
    /// back to `OTHER_GENRE`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The compiled-in mapping table.
    pub fn builtin() -> Self {
        let mut map = Self::default();
        for (raw, label, main) in BUILTIN_MAPPINGS {
            map.insert(raw, label, *main);
        }
        map
    }

    /// Builtin table with `[genres]` config entries merged over it.
    pub fn with_overrides(config_entries: &HashMap<String, GenreEntry>) -> Self {
        let mut map = Self::builtin();
        for (raw, entry) in config_entries {
            map.insert(raw, &entry.label, entry.main);
        }
        map
    }

    /// Add or replace one mapping.
    pub fn insert(&mut self, raw: &str, label: &str, main: bool) {
        self.entries.insert(
            raw.to_lowercase(),
            GenreMapping {
                label: label.to_string(),
                main,
            },
        );
    }

    /// Look up a raw tag, case-insensitively.
    pub fn get(&self, raw: &str) -> Option<&GenreMapping> {
        self.entries.get(&raw.to_lowercase())
    }

    /// Normalize a release's raw tag list into a main genre and a
    /// deduplicated subgenre list.
    ///
    /// Unmapped tags are logged and dropped; a missing mapping is an
    /// expected, recoverable condition. Main-flagged mappings overwrite
    /// the running main genre, so the last main-flagged tag wins.
    pub fn normalize(&self, raw_tags: &[String]) -> GenreAssignment {
        let mut main = OTHER_GENRE.to_string();
        let mut subgenres: Vec<String> = Vec::new();

        for raw in raw_tags {
            if raw == UNSPECIFIED_GENRE {
                continue;
            }

            let Some(mapping) = self.get(raw) else {
                warn!(tag = %raw, "no genre mapping for catalog tag, dropping");
                continue;
            };

            if mapping.main {
                main = mapping.label.clone();
            } else if !subgenres.contains(&mapping.label) {
                subgenres.push(mapping.label.clone());
            }
        }

        GenreAssignment { main, subgenres }
    }
}

/// Compiled-in raw-tag mappings: (raw tag, canonical label, main flag).
const BUILTIN_MAPPINGS: &[(&str, &str, bool)] = &[
    ("christian music", "Christian Music", true),
    ("worship", "Worship & Praise", false),
    ("praise", "Worship & Praise", false),
    ("praise & worship", "Worship & Praise", false),
    ("hymns", "Hymns", false),
    ("rock", "Rock", true),
    ("classic rock", "Classic Rock", false),
    ("hard rock", "Hard Rock", false),
    ("punk", "Punk", false),
    ("punk rock", "Punk", false),
    ("metal", "Metal", true),
    ("heavy metal", "Heavy Metal", false),
    ("pop", "Pop", true),
    ("electronic", "Electronic", true),
    ("edm", "Electronic", true),
    ("house", "House", false),
    ("techno", "Techno", false),
    ("jazz", "Jazz", true),
    ("classical", "Classical", true),
    ("symphonic", "Symphonic", false),
    ("folk", "Folk", true),
    ("hip hop", "Hip Hop", true),
    ("hip-hop", "Hip Hop", true),
    ("rap", "Rap", false),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|s| s.to_string()).collect()
    }

    fn test_map() -> GenreMap {
        let mut map = GenreMap::empty();
        map.insert("christian music", "Christian Music", true);
        map.insert("worship", "Worship & Praise", false);
        map.insert("praise", "Worship & Praise", false);
        map.insert("hymns", "Hymns", false);
        map
    }

    #[test]
    fn empty_input_falls_back_to_other_genre() {
        let assignment = test_map().normalize(&[]);
        assert_eq!(assignment.main, OTHER_GENRE);
        assert!(assignment.subgenres.is_empty());
    }

    #[test]
    fn placeholder_sentinel_is_excluded() {
        let assignment = test_map().normalize(&strings(&[UNSPECIFIED_GENRE, "worship"]));
        assert_eq!(assignment.main, OTHER_GENRE);
        assert_eq!(assignment.subgenres, vec!["Worship & Praise"]);
    }

    #[test]
    fn main_flagged_tag_sets_main_genre() {
        let assignment = test_map().normalize(&strings(&["christian music", "hymns"]));
        assert_eq!(assignment.main, "Christian Music");
        assert_eq!(assignment.subgenres, vec!["Hymns"]);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let assignment = test_map().normalize(&strings(&["Christian Music", "WORSHIP"]));
        assert_eq!(assignment.main, "Christian Music");
        assert_eq!(assignment.subgenres, vec!["Worship & Praise"]);
    }

    #[test]
    fn unmapped_tags_are_dropped() {
        let assignment = test_map().normalize(&strings(&["zydeco", "worship"]));
        assert_eq!(assignment.subgenres, vec!["Worship & Praise"]);
    }

    #[test]
    fn subgenres_deduplicate_preserving_first_seen_order() {
        let assignment = test_map().normalize(&strings(&["worship", "hymns", "praise", "worship"]));
        assert_eq!(assignment.subgenres, vec!["Worship & Praise", "Hymns"]);
    }

    #[test]
    fn deduplication_is_idempotent() {
        // Feeding an already-normalized subgenre list back through a map
        // that knows those labels yields the same sequence.
        let first = test_map().normalize(&strings(&["worship", "praise", "hymns", "worship"]));

        let mut identity = GenreMap::empty();
        identity.insert("worship & praise", "Worship & Praise", false);
        identity.insert("hymns", "Hymns", false);
        let second = identity.normalize(&first.subgenres);

        assert_eq!(second.subgenres, first.subgenres);
    }

    #[test]
    fn last_main_flagged_tag_wins() {
        let mut map = test_map();
        map.insert("rock", "Rock", true);
        let assignment = map.normalize(&strings(&["christian music", "rock"]));
        assert_eq!(assignment.main, "Rock");
    }

    #[test]
    fn config_overrides_replace_builtins() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "rock".to_string(),
            GenreEntry {
                label: "Rock & Roll".to_string(),
                main: true,
            },
        );
        let map = GenreMap::with_overrides(&overrides);
        assert_eq!(map.get("rock").unwrap().label, "Rock & Roll");
        // Untouched builtins survive the merge
        assert_eq!(map.get("jazz").unwrap().label, "Jazz");
    }
}
