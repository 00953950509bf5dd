//! Current user profile

use axum::{extract::State, Json};
use lyricnote_common::db::{load_user_profile, UserProfile};

use crate::error::ApiResult;
use crate::identity::Caller;
use crate::AppState;

/// GET /api/user
///
/// Anonymous callers get a profile with both fields null.
pub async fn get_user(State(state): State<AppState>, caller: Caller) -> ApiResult<Json<UserProfile>> {
    let Some(user) = caller.user() else {
        return Ok(Json(UserProfile::default()));
    };

    let profile = load_user_profile(&state.db, user).await?.unwrap_or_default();
    Ok(Json(profile))
}
