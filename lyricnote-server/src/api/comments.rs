//! Comment and link endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use lyricnote_common::db::MergedComment;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::identity::Caller;
use crate::api::lyrics::FilterQuery;
use crate::services::comments::{self, CommentDetail};
use crate::services::search;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NewCommentRequest {
    pub song: i64,
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct LinkCommentRequest {
    pub song_id: i64,
    pub start: i64,
    pub end: i64,
}

/// Id of a newly created record
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

/// GET /api/songs/:song_id/comments
pub async fn get_song_comments(
    State(state): State<AppState>,
    caller: Caller,
    Path(song_id): Path<i64>,
) -> ApiResult<Json<Vec<MergedComment>>> {
    let user = caller.require()?;
    Ok(Json(comments::comments_for_song(&state.db, user, song_id).await?))
}

/// GET /api/comments?q=
///
/// A non-blank `q` filters by title, content and the home song's metadata.
/// If the lyrics API is unreachable the search falls back to title and
/// content only.
pub async fn get_user_comments(
    State(state): State<AppState>,
    caller: Caller,
    Query(filter): Query<FilterQuery>,
) -> ApiResult<Json<Vec<MergedComment>>> {
    let user = caller.require()?;
    let all = comments::all_comments(&state.db, user).await?;

    let Some(q) = filter.q.as_deref().filter(|q| !q.trim().is_empty()) else {
        return Ok(Json(all));
    };

    let mut songs = Vec::new();
    let mut seen = HashSet::new();
    for entry in &all {
        if seen.insert(entry.comment.song) {
            songs.push(entry.comment.song);
        }
    }

    let tracks: HashMap<i64, _> = match state.lyrics.get_tracks(&songs).await {
        Ok(tracks) => tracks.into_iter().map(|track| (track.id, track)).collect(),
        Err(e) => {
            warn!("Searching comments without song metadata: {}", e);
            HashMap::new()
        }
    };

    Ok(Json(search::rank_comments(all, &tracks, q)))
}

/// GET /api/comments/:id
pub async fn get_comment(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CommentDetail>> {
    let user = caller.require()?;
    Ok(Json(comments::comment_detail(&state.db, user, id).await?))
}

/// POST /api/comments
pub async fn new_comment(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<NewCommentRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let user = caller.require()?;
    let id = comments::create_comment(
        &state.db,
        state.colors.as_ref(),
        user,
        request.song,
        request.start,
        request.end,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// PUT /api/comments/:id
pub async fn update_comment(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCommentRequest>,
) -> ApiResult<StatusCode> {
    let user = caller.require()?;
    comments::update_comment(&state.db, user, id, &request.title, &request.content).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/comments/:id
pub async fn delete_comment(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let user = caller.require()?;
    comments::delete_comment(&state.db, user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/comments/:id/links
pub async fn link_comment(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<LinkCommentRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let user = caller.require()?;
    let link =
        comments::link_comment(&state.db, user, id, request.song_id, request.start, request.end)
            .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: link })))
}

/// DELETE /api/comments/:id/links/:song_id
pub async fn unlink_comment(
    State(state): State<AppState>,
    caller: Caller,
    Path((id, song_id)): Path<(Uuid, i64)>,
) -> ApiResult<StatusCode> {
    let user = caller.require()?;
    comments::unlink_comment(&state.db, user, id, song_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
