//! Vocabulary library endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use lyricnote_common::db::{VocabularyLibrary, VocabularyLibrarySummary};
use serde_json::Value;
use uuid::Uuid;

use super::comments::CreatedResponse;
use crate::error::ApiResult;
use crate::identity::Caller;
use crate::services::vocabulary::{self, CreateLibraryPayload};
use crate::AppState;

/// POST /api/vocabulary
///
/// Body is the `createLibrary` tool-call arguments.
pub async fn create_vocabulary_library(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<CreateLibraryPayload>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let user = caller.require()?;
    let id = vocabulary::create_library(&state.db, user, payload).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/vocabulary
pub async fn list_vocabulary_libraries(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Json<Vec<VocabularyLibrarySummary>>> {
    let Some(user) = caller.user() else {
        return Ok(Json(Vec::new()));
    };

    Ok(Json(vocabulary::list_libraries(&state.db, user).await?))
}

/// GET /api/vocabulary/:id
pub async fn get_vocabulary_library(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<VocabularyLibrary>> {
    let user = caller.require()?;
    Ok(Json(vocabulary::get_library(&state.db, user, id).await?))
}

/// GET /api/vocabulary/tool
pub async fn vocabulary_tool() -> Json<Value> {
    Json(vocabulary::tool_definition())
}
