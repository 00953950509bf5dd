//! lyricnote-server library
//!
//! HTTP service for saving lrclib tracks, annotating their lyrics with
//! comments that can be linked across songs, and storing vocabulary
//! libraries proposed by the chat model.

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod identity;
pub mod palette;
pub mod services;

use identity::{IdentityResolver, SessionResolver};
use palette::{ColorSource, RandomColors};
use services::LyricsClient;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Maps bearer credentials to user ids
    pub identity: Arc<dyn IdentityResolver>,
    /// Picks the color of new comments
    pub colors: Arc<dyn ColorSource>,
    pub lyrics: Arc<LyricsClient>,
}

impl AppState {
    /// State with session-table identity and random comment colors
    pub fn new(db: SqlitePool, lyrics: LyricsClient) -> Self {
        Self {
            identity: Arc::new(SessionResolver::new(db.clone())),
            colors: Arc::new(RandomColors::from_entropy()),
            lyrics: Arc::new(lyrics),
            db,
        }
    }

    pub fn with_identity(mut self, identity: Arc<dyn IdentityResolver>) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_colors(mut self, colors: Arc<dyn ColorSource>) -> Self {
        self.colors = colors;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, post};

    let library = Router::new()
        .route("/api/library", get(api::get_library))
        .route("/api/library/toggle", post(api::toggle_saved_song))
        .route("/api/library/saved", post(api::batched_has_saved_song))
        .route("/api/library/saved/:song_id", get(api::has_saved_song));

    let comments = Router::new()
        .route("/api/songs/:song_id/comments", get(api::get_song_comments))
        .route("/api/comments", get(api::get_user_comments).post(api::new_comment))
        .route(
            "/api/comments/:id",
            get(api::get_comment)
                .put(api::update_comment)
                .delete(api::delete_comment),
        )
        .route("/api/comments/:id/links", post(api::link_comment))
        .route("/api/comments/:id/links/:song_id", delete(api::unlink_comment));

    let lyrics = Router::new()
        .route("/api/lyrics/search", get(api::search_tracks))
        .route("/api/lyrics/tracks/:id", get(api::get_track))
        .route("/api/lyrics/library", get(api::library_tracks));

    let vocabulary = Router::new()
        .route(
            "/api/vocabulary",
            get(api::list_vocabulary_libraries).post(api::create_vocabulary_library),
        )
        .route("/api/vocabulary/tool", get(api::vocabulary_tool))
        .route("/api/vocabulary/:id", get(api::get_vocabulary_library));

    let public = Router::new()
        .route("/api/user", get(api::get_user))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes());

    Router::new()
        .merge(library)
        .merge(comments)
        .merge(lyrics)
        .merge(vocabulary)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
