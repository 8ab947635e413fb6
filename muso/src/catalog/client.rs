//! Catalog client
//!
//! Fetches recording and release records from the MusicBrainz web service
//! and composes them into a single `MetadataRecord`. Enforces the
//! service's 1 request/second policy with a token-bucket limiter; since
//! every call awaits the limiter and the curation flow never overlaps
//! requests, batch callers cannot hit the endpoint concurrently.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{Quota, RateLimiter};
use muso_common::Mbid;
use reqwest::{header, Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::genre::GenreMap;
use crate::matcher::Candidate;
use crate::prompt::{ReleaseChoice, ReleasePicker};
use crate::record::{MetadataRecord, UNKNOWN_RELEASE_DATE};

use super::retry::{with_retry, RetryPolicy};
use super::types::{Recording, Release, SearchResponse};
use super::CatalogError;

/// Default MusicBrainz API base URL
const DEFAULT_BASE_URL: &str = "https://musicbrainz.org/ws/2";

/// Total request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Connection timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum search rows requested from the catalog
const SEARCH_LIMIT: &str = "25";

/// Inputs that let a caller skip parts of hydration it already knows.
#[derive(Debug, Clone, Default)]
pub struct HydrateOptions {
    /// Use this release directly instead of resolving ambiguity
    pub release: Option<Mbid>,
    /// Replace the computed main genre
    pub genre: Option<String>,
    /// Replace the computed subgenre list (and thus the comment)
    pub subgenres: Option<Vec<String>>,
}

/// MusicBrainz WS/2 client
pub struct CatalogClient {
    http: Client,
    base_url: String,
    genre_map: GenreMap,
    retry: RetryPolicy,
    /// 1 request/second per the service's terms
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl CatalogClient {
    /// Create a client with the given User-Agent (required by the
    /// service) and genre mapping table.
    pub fn new(user_agent: &str, genre_map: GenreMap) -> Result<Self, CatalogError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(user_agent).map_err(|e| {
                CatalogError::UnexpectedResponse(format!("invalid user agent: {}", e))
            })?,
        );

        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .default_headers(headers)
            .build()?;

        let rate_limiter = RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(1).expect("1 is non-zero"),
        ));

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            genre_map,
            retry: RetryPolicy::default(),
            rate_limiter,
        })
    }

    /// Point the client at a different base URL (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replace the retry policy (tests).
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Free-text recording search, optionally narrowed by artist.
    pub async fn search_recordings(
        &self,
        title: &str,
        artist: Option<&str>,
    ) -> Result<Vec<Candidate>, CatalogError> {
        let mut query = format!("recording:\"{}\"", sanitize_query(title));
        if let Some(artist) = artist {
            query.push_str(&format!(" AND artist:\"{}\"", sanitize_query(artist)));
        }

        let url = Url::parse_with_params(
            &format!("{}/recording", self.base_url),
            &[
                ("query", query.as_str()),
                ("limit", SEARCH_LIMIT),
                ("fmt", "json"),
            ],
        )
        .map_err(|e| CatalogError::UnexpectedResponse(format!("bad search url: {}", e)))?;

        debug!(%query, "searching catalog recordings");
        let response: SearchResponse = self.get_json(url, "recording search").await?;

        Ok(response
            .recordings
            .into_iter()
            .map(|row| Candidate {
                id: row.id,
                artist: row.primary_artist().map(str::to_string),
                title: row.title,
            })
            .collect())
    }

    /// Fetch a recording with artist credits, releases and tags expanded.
    pub async fn recording_by_id(&self, id: &Mbid) -> Result<Recording, CatalogError> {
        let url = self.lookup_url("recording", id, "artist-credits+releases+tags")?;
        debug!(recording = %id, "fetching catalog recording");
        self.get_json(url, "recording lookup").await
    }

    /// Fetch a release with artist credits, media, track recordings and
    /// tags expanded.
    pub async fn release_by_id(&self, id: &Mbid) -> Result<Release, CatalogError> {
        let url = self.lookup_url("release", id, "artist-credits+media+recordings+tags")?;
        debug!(release = %id, "fetching catalog release");
        self.get_json(url, "release lookup").await
    }

    /// Every track recording identifier on a release, all media, in order.
    pub async fn release_recording_ids(&self, id: &Mbid) -> Result<Vec<Mbid>, CatalogError> {
        let release = self.release_by_id(id).await?;
        Ok(release.recording_ids())
    }

    /// Hydrate a full metadata record for a recording.
    ///
    /// The release is chosen by (in order): the caller's override, the
    /// only release, or an operator pick through `picker`. Failures are
    /// logged with the identifiers involved and surface as `None` so a
    /// batch caller can continue with its next file.
    pub async fn recording_metadata(
        &self,
        recording_id: &Mbid,
        opts: &HydrateOptions,
        picker: &dyn ReleasePicker,
    ) -> Option<MetadataRecord> {
        match self.try_recording_metadata(recording_id, opts, picker).await {
            Ok(record) => Some(record),
            Err(err) => {
                error!(
                    recording = %recording_id,
                    release_override = ?opts.release.map(|r| r.to_string()),
                    error = %err,
                    "failed to hydrate catalog metadata"
                );
                None
            }
        }
    }

    async fn try_recording_metadata(
        &self,
        recording_id: &Mbid,
        opts: &HydrateOptions,
        picker: &dyn ReleasePicker,
    ) -> Result<MetadataRecord, CatalogError> {
        let recording = self.recording_by_id(recording_id).await?;

        let release_id = match opts.release {
            Some(release_id) => release_id,
            None => match recording.releases.len() {
                0 => {
                    return Err(CatalogError::NotFound(format!(
                        "recording {} has no releases",
                        recording_id
                    )))
                }
                1 => recording.releases[0].id,
                _ => {
                    let choices: Vec<ReleaseChoice> = recording
                        .releases
                        .iter()
                        .map(|release| ReleaseChoice {
                            id: release.id,
                            title: release.title.clone(),
                            date: release.date.clone(),
                        })
                        .collect();
                    let picked = picker.pick_release(&recording.title, &choices);
                    choices[picked.min(choices.len() - 1)].id
                }
            },
        };

        let release = self.release_by_id(&release_id).await?;
        let record = compose_record(&recording, &release, &self.genre_map, opts);

        info!(
            recording = %recording_id,
            release = %release_id,
            title = %record.title,
            artist = %record.artist,
            "hydrated catalog metadata"
        );
        Ok(record)
    }

    fn lookup_url(&self, entity: &str, id: &Mbid, includes: &str) -> Result<Url, CatalogError> {
        Url::parse(&format!(
            "{}/{}/{}?inc={}&fmt=json",
            self.base_url, entity, id, includes
        ))
        .map_err(|e| CatalogError::UnexpectedResponse(format!("bad lookup url: {}", e)))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        operation: &str,
    ) -> Result<T, CatalogError> {
        with_retry(&self.retry, operation, || self.fetch_once::<T>(url.clone())).await
    }

    async fn fetch_once<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        self.rate_limiter.until_ready().await;

        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        match status.as_u16() {
            429 => Err(CatalogError::RateLimited),
            503 => Err(CatalogError::Unavailable),
            400 => {
                let body = response.text().await.unwrap_or_default();
                Err(CatalogError::BadRequest(body))
            }
            404 => Err(CatalogError::NotFound(url.to_string())),
            _ if !status.is_success() => Err(CatalogError::UnexpectedResponse(format!(
                "status {} from {}",
                status, url
            ))),
            _ => Ok(response.json::<T>().await?),
        }
    }
}

/// Strip characters that would break the search query syntax.
fn sanitize_query(text: &str) -> String {
    text.replace('"', " ")
}

/// Compose recording + release data into one metadata record.
///
/// Album artist falls back to the recording artist when the release
/// carries no credit. Track and disc positions default to 1 when the
/// recording cannot be located on the release's media.
fn compose_record(
    recording: &Recording,
    release: &Release,
    genre_map: &GenreMap,
    opts: &HydrateOptions,
) -> MetadataRecord {
    let artist = recording.primary_artist().unwrap_or("Unknown Artist").to_string();
    let album_artist = release.album_artist().unwrap_or(&artist).to_string();

    let (track_number, disc_number) = release.track_position_of(&recording.id).unwrap_or((1, 1));

    let release_date = release
        .date
        .clone()
        .unwrap_or_else(|| UNKNOWN_RELEASE_DATE.to_string());
    let year = MetadataRecord::year_of(&release_date);

    let assignment = genre_map.normalize(&release.tag_names());
    let main_genre = opts.genre.clone().unwrap_or(assignment.main);
    let subgenres = match &opts.subgenres {
        Some(subgenres) => dedup_preserving_order(subgenres),
        None => assignment.subgenres,
    };
    let comment = MetadataRecord::subgenre_comment(&subgenres);

    MetadataRecord {
        recording_id: recording.id,
        title: recording.title.clone(),
        artist,
        album: release.title.clone(),
        album_artist,
        track_number: if track_number == 0 { 1 } else { track_number },
        disc_number: if disc_number == 0 { 1 } else { disc_number },
        release_date,
        year,
        duration_secs: recording.duration_secs(),
        main_genre,
        subgenres,
        comment,
        path: None,
    }
}

fn dedup_preserving_order(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !out.contains(value) {
            out.push(value.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_recording(releases: &str) -> Recording {
        serde_json::from_str(&format!(
            r#"{{
                "id": "00000000-0000-0000-0000-0000000000aa",
                "title": "Amazing Grace",
                "length": 215000,
                "artist-credit": [{{"name": "Some Choir"}}],
                "releases": {}
            }}"#,
            releases
        ))
        .unwrap()
    }

    fn fixture_release(json: &str) -> Release {
        serde_json::from_str(json).unwrap()
    }

    fn genre_map() -> GenreMap {
        let mut map = GenreMap::empty();
        map.insert("christian music", "Christian Music", true);
        map.insert("hymns", "Hymns", false);
        map
    }

    #[test]
    fn composes_full_record() {
        let recording = fixture_recording("[]");
        let release = fixture_release(
            r#"{
                "id": "00000000-0000-0000-0000-0000000000bb",
                "title": "Hymns of Old",
                "date": "2003-05-12",
                "artist-credit": [{"name": "Various Artists"}],
                "media": [
                    {"position": 1, "tracks": [
                        {"position": 4, "recording": {"id": "00000000-0000-0000-0000-0000000000aa"}}
                    ]}
                ],
                "tags": [{"name": "christian music"}, {"name": "hymns"}]
            }"#,
        );

        let record = compose_record(&recording, &release, &genre_map(), &HydrateOptions::default());

        assert_eq!(record.title, "Amazing Grace");
        assert_eq!(record.artist, "Some Choir");
        assert_eq!(record.album, "Hymns of Old");
        assert_eq!(record.album_artist, "Various Artists");
        assert_eq!(record.track_number, 4);
        assert_eq!(record.disc_number, 1);
        assert_eq!(record.release_date, "2003-05-12");
        assert_eq!(record.year, "2003");
        assert_eq!(record.duration_secs, 215.0);
        assert_eq!(record.main_genre, "Christian Music");
        assert_eq!(record.subgenres, vec!["Hymns"]);
        assert_eq!(record.comment, "Subgenres: Hymns | Vibe: N/A");
    }

    #[test]
    fn album_artist_falls_back_to_recording_artist() {
        let recording = fixture_recording("[]");
        let release = fixture_release(
            r#"{"id": "00000000-0000-0000-0000-0000000000bb", "title": "Untitled Album"}"#,
        );

        let record = compose_record(&recording, &release, &genre_map(), &HydrateOptions::default());
        assert_eq!(record.album_artist, "Some Choir");
    }

    #[test]
    fn unknown_track_position_defaults_to_one() {
        let recording = fixture_recording("[]");
        let release = fixture_release(
            r#"{"id": "00000000-0000-0000-0000-0000000000bb", "title": "Untitled Album"}"#,
        );

        let record = compose_record(&recording, &release, &genre_map(), &HydrateOptions::default());
        assert_eq!(record.track_number, 1);
        assert_eq!(record.disc_number, 1);
    }

    #[test]
    fn missing_date_uses_sentinel() {
        let recording = fixture_recording("[]");
        let release = fixture_release(
            r#"{"id": "00000000-0000-0000-0000-0000000000bb", "title": "Untitled Album"}"#,
        );

        let record = compose_record(&recording, &release, &genre_map(), &HydrateOptions::default());
        assert_eq!(record.release_date, UNKNOWN_RELEASE_DATE);
        assert_eq!(record.year, "0000");
    }

    #[test]
    fn overrides_replace_computed_genres() {
        let recording = fixture_recording("[]");
        let release = fixture_release(
            r#"{
                "id": "00000000-0000-0000-0000-0000000000bb",
                "title": "Untitled Album",
                "tags": [{"name": "christian music"}, {"name": "hymns"}]
            }"#,
        );

        let opts = HydrateOptions {
            release: None,
            genre: Some("Rock".to_string()),
            subgenres: Some(vec![
                "Indie".to_string(),
                "Indie".to_string(),
                "Shoegaze".to_string(),
            ]),
        };

        let record = compose_record(&recording, &release, &genre_map(), &opts);
        assert_eq!(record.main_genre, "Rock");
        assert_eq!(record.subgenres, vec!["Indie", "Shoegaze"]);
        assert_eq!(record.comment, "Subgenres: Indie; Shoegaze | Vibe: N/A");
    }

    #[test]
    fn search_query_sanitizes_quotes() {
        assert_eq!(sanitize_query(r#"a "quoted" title"#), "a  quoted  title");
    }
}
