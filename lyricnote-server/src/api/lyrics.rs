//! Lyrics search and track endpoints
//!
//! Tracks are decorated with whether the caller has saved them.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::identity::Caller;
use crate::services::{library, search, SearchScope, Track};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub scope: SearchScope,
}

/// Optional fuzzy filter for listings
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub q: Option<String>,
}

/// A track plus the caller's saved state
#[derive(Debug, Serialize)]
pub struct TrackView {
    #[serde(flatten)]
    pub track: Track,
    #[serde(rename = "isSaved")]
    pub is_saved: bool,
}

async fn decorate(
    state: &AppState,
    caller: Caller,
    tracks: Vec<Track>,
) -> ApiResult<Vec<TrackView>> {
    let saved = match caller.user() {
        Some(user) => {
            let ids: Vec<i64> = tracks.iter().map(|track| track.id).collect();
            library::batched_saved_ids(&state.db, user, &ids).await?
        }
        None => vec![None; tracks.len()],
    };

    Ok(tracks
        .into_iter()
        .zip(saved)
        .map(|(track, saved)| TrackView {
            track,
            is_saved: saved.is_some(),
        })
        .collect())
}

/// GET /api/lyrics/search?q=&scope=
pub async fn search_tracks(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<TrackView>>> {
    let tracks = state.lyrics.search(&query.q, query.scope).await?;
    Ok(Json(decorate(&state, caller, tracks).await?))
}

/// GET /api/lyrics/tracks/:id
pub async fn get_track(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> ApiResult<Json<TrackView>> {
    let track = state.lyrics.get_track(id).await?;
    let is_saved = match caller.user() {
        Some(user) => library::saved_id(&state.db, user, id).await?.is_some(),
        None => false,
    };

    Ok(Json(TrackView { track, is_saved }))
}

/// GET /api/lyrics/library?q=
///
/// The caller's saved songs resolved to full tracks, in save order. With a
/// non-blank `q`, only tracks matching it by name, artist or album, best first.
pub async fn library_tracks(
    State(state): State<AppState>,
    caller: Caller,
    Query(filter): Query<FilterQuery>,
) -> ApiResult<Json<Vec<TrackView>>> {
    let Some(user) = caller.user() else {
        return Ok(Json(Vec::new()));
    };

    let songs = library::library_songs(&state.db, user, false).await?;
    let mut tracks = state.lyrics.get_tracks(&songs).await?;
    if let Some(q) = filter.q.as_deref() {
        tracks = search::rank(tracks, q);
    }

    Ok(Json(
        tracks
            .into_iter()
            .map(|track| TrackView { track, is_saved: true })
            .collect(),
    ))
}
