//! lrclib.net lyrics API client with rate limiting

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::error::ApiError;

const USER_AGENT: &str = concat!("lyricnote/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Lyrics client errors
#[derive(Debug, Error)]
pub enum LyricsError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Track not found: {0}")]
    TrackNotFound(i64),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<LyricsError> for ApiError {
    fn from(err: LyricsError) -> Self {
        match err {
            LyricsError::TrackNotFound(_) => ApiError::NotFound("Track".to_string()),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

/// One lrclib track record
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub track_name: String,
    #[serde(default)]
    pub artist_name: String,
    #[serde(default)]
    pub album_name: String,
    /// Seconds
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub instrumental: bool,
    pub plain_lyrics: Option<String>,
    pub synced_lyrics: Option<String>,
}

/// Which field a search query matches against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    #[default]
    All,
    Song,
    Artist,
    Album,
}

impl SearchScope {
    /// lrclib query parameter for this scope
    pub fn param(self) -> &'static str {
        match self {
            SearchScope::All => "q",
            SearchScope::Song => "track_name",
            SearchScope::Artist => "artist_name",
            SearchScope::Album => "album_name",
        }
    }
}

/// Minimum spacing between outbound requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// lrclib API client
pub struct LyricsClient {
    http_client: reqwest::Client,
    base_url: String,
    rate_limiter: Arc<RateLimiter>,
}

impl LyricsClient {
    pub fn new(base_url: impl Into<String>, rate_limit_ms: u64) -> Result<Self, LyricsError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LyricsError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limiter: Arc::new(RateLimiter::new(rate_limit_ms)),
        })
    }

    /// Search tracks; a blank query returns nothing without a request
    pub async fn search(&self, query: &str, scope: SearchScope) -> Result<Vec<Track>, LyricsError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        self.rate_limiter.wait().await;

        let url = format!("{}/search", self.base_url);
        tracing::debug!(url = %url, scope = scope.param(), query, "Searching lyrics API");

        let response = self
            .http_client
            .get(&url)
            .query(&[(scope.param(), query)])
            .send()
            .await
            .map_err(|e| LyricsError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LyricsError::ApiError(status.as_u16(), error_text));
        }

        let tracks: Vec<Track> = response
            .json()
            .await
            .map_err(|e| LyricsError::ParseError(e.to_string()))?;

        tracing::debug!(count = tracks.len(), "Lyrics search returned");
        Ok(tracks)
    }

    /// Fetch a single track by lrclib id
    pub async fn get_track(&self, id: i64) -> Result<Track, LyricsError> {
        self.rate_limiter.wait().await;

        let url = format!("{}/get/{}", self.base_url, id);
        tracing::debug!(track = id, url = %url, "Fetching track");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| LyricsError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == 404 {
            return Err(LyricsError::TrackNotFound(id));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LyricsError::ApiError(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| LyricsError::ParseError(e.to_string()))
    }

    /// Fetch tracks in order, skipping ids the API no longer knows
    pub async fn get_tracks(&self, ids: &[i64]) -> Result<Vec<Track>, LyricsError> {
        let mut tracks = Vec::with_capacity(ids.len());

        for &id in ids {
            match self.get_track(id).await {
                Ok(track) => tracks.push(track),
                Err(LyricsError::TrackNotFound(_)) => {
                    tracing::warn!(track = id, "Saved track missing from lyrics API");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(tracks)
    }
}
