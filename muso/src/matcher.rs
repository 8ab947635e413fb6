//! Candidate matching heuristics
//!
//! Ranks the catalog's free-text search results against a query (usually a
//! file stem). These are discrete short-circuit rules, not a score: a false
//! positive is acceptable because the orchestrator confirms interactively.

use muso_common::Mbid;

/// One row from a catalog free-text search. Ephemeral; discarded once a
/// choice is made.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: Mbid,
    pub title: String,
    pub artist: Option<String>,
}

/// Choose the most likely candidate for `query`.
///
/// Rules in priority order, first match wins:
/// 1. case-insensitive exact title match
/// 2. alphanumeric-normalized substring match, either direction
/// 3. first candidate (the catalog's own relevance ranking)
///
/// Ties within a rule break by input order. An empty candidate list is
/// "no match", not an error.
pub fn choose_best(candidates: &[Candidate], query: &str) -> Option<Mbid> {
    if candidates.is_empty() {
        return None;
    }

    let query_lower = query.to_lowercase();
    for candidate in candidates {
        if candidate.title.to_lowercase() == query_lower {
            return Some(candidate.id);
        }
    }

    let normalized_query = normalize_for_match(query);
    if !normalized_query.is_empty() {
        for candidate in candidates {
            let normalized_title = normalize_for_match(&candidate.title);
            if normalized_title.is_empty() {
                continue;
            }
            if normalized_title.contains(&normalized_query)
                || normalized_query.contains(&normalized_title)
            {
                return Some(candidate.id);
            }
        }
    }

    Some(candidates[0].id)
}

/// Strip everything outside `[A-Za-z0-9]` and lowercase, for fuzzy
/// containment checks.
fn normalize_for_match(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Longest-common-subsequence similarity ratio between two strings,
/// case-insensitive, in `0.0..=1.0`.
///
/// Defined as `2 * lcs(a, b) / (|a| + |b|)`; identical strings score 1.0,
/// strings with no characters in common score 0.0.
pub fn lcs_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    // Single-row DP over the shorter string
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    let mut row = vec![0usize; short.len() + 1];

    for &lc in long.iter() {
        let mut diagonal = 0;
        for (i, &sc) in short.iter().enumerate() {
            let above = row[i + 1];
            row[i + 1] = if lc == sc {
                diagonal + 1
            } else {
                above.max(row[i])
            };
            diagonal = above;
        }
    }

    let lcs = row[short.len()];
    (2.0 * lcs as f64) / ((a.len() + b.len()) as f64)
}
