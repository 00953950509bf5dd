//! Library endpoints
//!
//! Reads degrade for anonymous callers (empty library, nothing saved);
//! the toggle requires a signed-in user.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::identity::Caller;
use crate::services::library;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub song_id: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct LibraryQuery {
    #[serde(default)]
    pub filter_for_comments: bool,
}

#[derive(Debug, Deserialize)]
pub struct BatchedSavedRequest {
    pub song_ids: Vec<i64>,
}

/// POST /api/library/toggle
pub async fn toggle_saved_song(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<ToggleRequest>,
) -> ApiResult<StatusCode> {
    let user = caller.require()?;
    library::toggle_saved(&state.db, user, request.song_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/library
pub async fn get_library(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<LibraryQuery>,
) -> ApiResult<Json<Vec<i64>>> {
    let Some(user) = caller.user() else {
        return Ok(Json(Vec::new()));
    };

    let songs = library::library_songs(&state.db, user, query.filter_for_comments).await?;
    Ok(Json(songs))
}

/// GET /api/library/saved/:song_id
pub async fn has_saved_song(
    State(state): State<AppState>,
    caller: Caller,
    Path(song_id): Path<i64>,
) -> ApiResult<Json<Option<Uuid>>> {
    let Some(user) = caller.user() else {
        return Ok(Json(None));
    };

    Ok(Json(library::saved_id(&state.db, user, song_id).await?))
}

/// POST /api/library/saved
///
/// One entry per requested id, in request order.
pub async fn batched_has_saved_song(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<BatchedSavedRequest>,
) -> ApiResult<Json<Vec<Option<Uuid>>>> {
    let Some(user) = caller.user() else {
        return Ok(Json(vec![None; request.song_ids.len()]));
    };

    let ids = library::batched_saved_ids(&state.db, user, &request.song_ids).await?;
    Ok(Json(ids))
}
