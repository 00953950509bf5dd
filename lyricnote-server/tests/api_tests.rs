//! Integration tests for lyricnote-server API endpoints
//!
//! Each test gets its own on-disk database in a temp dir and drives the
//! router with `oneshot`. Users and sessions are provisioned directly, the
//! way the identity provider would.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use lyricnote_common::api::{generate_session_token, store_session};
use lyricnote_common::db::{init_database, insert_user};
use lyricnote_server::error::ApiResult;
use lyricnote_server::identity::IdentityResolver;
use lyricnote_server::palette::{FixedColor, COMMENT_COLORS};
use lyricnote_server::services::LyricsClient;
use lyricnote_server::{build_router, AppState};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`
use uuid::Uuid;

struct TestApp {
    app: Router,
    pool: SqlitePool,
    _dir: TempDir,
}

/// Test helper: fresh database and router with deterministic colors
async fn setup() -> TestApp {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("lyricnote.db")).await.unwrap();

    // Nothing listens on the discard port; lyrics routes are covered elsewhere
    let lyrics = LyricsClient::new("http://127.0.0.1:9", 0).unwrap();
    let state = AppState::new(pool.clone(), lyrics).with_colors(Arc::new(FixedColor(2)));

    TestApp {
        app: build_router(state),
        pool,
        _dir: dir,
    }
}

/// Test helper: provision a user with a session, returning the bearer token
async fn sign_in(pool: &SqlitePool, name: &str) -> String {
    let user = insert_user(pool, Some(name), None).await.unwrap();
    let token = generate_session_token();
    store_session(pool, user, &token).await.unwrap();
    token
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn new_comment(app: &Router, token: &str, song: i64, start: i64, end: i64) -> String {
    let (status, body) = call(
        app,
        "POST",
        "/api/comments",
        Some(token),
        Some(json!({ "song": song, "start": start, "end": end })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn link(app: &Router, token: &str, comment: &str, song: i64, start: i64, end: i64) {
    let (status, _) = call(
        app,
        "POST",
        &format!("/api/comments/{}/links", comment),
        Some(token),
        Some(json!({ "song_id": song, "start": start, "end": end })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

async fn song_comments(app: &Router, token: &str, song: i64) -> Vec<Value> {
    let (status, body) = call(app, "GET", &format!("/api/songs/{}/comments", song), Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array().unwrap().clone()
}

async fn toggle(app: &Router, token: &str, song: i64) {
    let (status, _) = call(
        app,
        "POST",
        "/api/library/toggle",
        Some(token),
        Some(json!({ "song_id": song })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

// =============================================================================
// Public endpoints
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let t = setup().await;

    let (status, body) = call(&t.app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "lyricnote-server");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let t = setup().await;

    let (status, body) = call(&t.app, "GET", "/api/buildinfo", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

#[tokio::test]
async fn test_user_profile() {
    let t = setup().await;
    let token = sign_in(&t.pool, "Ada").await;

    let (status, body) = call(&t.app, "GET", "/api/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_name"], "Ada");
    assert_eq!(body["image_url"], Value::Null);

    let (status, body) = call(&t.app, "GET", "/api/user", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "display_name": null, "image_url": null }));
}

#[tokio::test]
async fn test_unknown_token_is_anonymous() {
    let t = setup().await;

    let (status, body) = call(&t.app, "GET", "/api/user", Some("not-a-session"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_name"], Value::Null);

    let (status, body) = call(&t.app, "GET", "/api/comments", Some("not-a-session"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
}

/// Accepts one fixed credential for one fixed user
struct StaticResolver {
    credential: &'static str,
    user: Uuid,
}

#[axum::async_trait]
impl IdentityResolver for StaticResolver {
    async fn resolve(&self, credential: &str) -> ApiResult<Option<Uuid>> {
        Ok((credential == self.credential).then_some(self.user))
    }
}

#[tokio::test]
async fn test_custom_identity_resolver() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("lyricnote.db")).await.unwrap();
    let user = insert_user(&pool, Some("Grace"), None).await.unwrap();

    let lyrics = LyricsClient::new("http://127.0.0.1:9", 0).unwrap();
    let app = build_router(AppState::new(pool.clone(), lyrics).with_identity(Arc::new(StaticResolver {
        credential: "external-token",
        user,
    })));

    let (status, body) = call(&app, "GET", "/api/user", Some("external-token"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_name"], "Grace");

    // Session tokens are not consulted once the resolver is replaced
    let session = generate_session_token();
    store_session(&pool, user, &session).await.unwrap();
    let (_, body) = call(&app, "GET", "/api/user", Some(&session), None).await;
    assert_eq!(body["display_name"], Value::Null);
}

// =============================================================================
// Library
// =============================================================================

#[tokio::test]
async fn test_anonymous_library_reads_degrade() {
    let t = setup().await;

    let (status, body) = call(&t.app, "GET", "/api/library", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = call(&t.app, "GET", "/api/library/saved/5", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let (status, body) = call(
        &t.app,
        "POST",
        "/api/library/saved",
        None,
        Some(json!({ "song_ids": [1, 2, 3] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([null, null, null]));

    let (status, _) = call(
        &t.app,
        "POST",
        "/api/library/toggle",
        None,
        Some(json!({ "song_id": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_toggle_and_lookups() {
    let t = setup().await;
    let token = sign_in(&t.pool, "Ada").await;

    toggle(&t.app, &token, 42).await;
    toggle(&t.app, &token, 7).await;

    let (_, library) = call(&t.app, "GET", "/api/library", Some(&token), None).await;
    assert_eq!(library, json!([42, 7]));

    let (_, saved) = call(&t.app, "GET", "/api/library/saved/42", Some(&token), None).await;
    assert!(saved.is_string());

    let (_, batched) = call(
        &t.app,
        "POST",
        "/api/library/saved",
        Some(&token),
        Some(json!({ "song_ids": [7, 99, 42] })),
    )
    .await;
    let batched = batched.as_array().unwrap();
    assert_eq!(batched.len(), 3);
    assert!(batched[0].is_string());
    assert!(batched[1].is_null());
    assert_eq!(batched[2], saved);

    toggle(&t.app, &token, 42).await;
    let (_, saved) = call(&t.app, "GET", "/api/library/saved/42", Some(&token), None).await;
    assert_eq!(saved, Value::Null);
}

#[tokio::test]
async fn test_library_is_per_user() {
    let t = setup().await;
    let ada = sign_in(&t.pool, "Ada").await;
    let bob = sign_in(&t.pool, "Bob").await;

    toggle(&t.app, &ada, 1).await;

    let (_, library) = call(&t.app, "GET", "/api/library", Some(&bob), None).await;
    assert_eq!(library, json!([]));
}

#[tokio::test]
async fn test_library_filter_for_comments() {
    let t = setup().await;
    let token = sign_in(&t.pool, "Ada").await;

    toggle(&t.app, &token, 1).await;
    toggle(&t.app, &token, 2).await;
    new_comment(&t.app, &token, 2, 0, 3).await;

    let (_, library) = call(
        &t.app,
        "GET",
        "/api/library?filter_for_comments=true",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(library, json!([2]));
}

// =============================================================================
// Comments
// =============================================================================

#[tokio::test]
async fn test_new_comment_appears_on_song() {
    let t = setup().await;
    let token = sign_in(&t.pool, "Ada").await;

    let id = new_comment(&t.app, &token, 100, 5, 12).await;

    let view = song_comments(&t.app, &token, 100).await;
    assert_eq!(view.len(), 1);
    assert_eq!(view[0]["id"], id);
    assert_eq!(view[0]["start"], 5);
    assert_eq!(view[0]["end"], 12);
    assert_eq!(view[0]["linked"], Value::Null);
    assert_eq!(view[0]["color"], COMMENT_COLORS[2]);
    assert_eq!(view[0]["title"], "");
    assert!(view[0]["user"].is_string());
}

#[tokio::test]
async fn test_comment_reads_require_identity() {
    let t = setup().await;

    let (status, _) = call(&t.app, "GET", "/api/songs/100/comments", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(
        &t.app,
        "POST",
        "/api/comments",
        None,
        Some(json!({ "song": 1, "start": 0, "end": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_link_shows_on_second_song_only_with_link_offsets() {
    let t = setup().await;
    let token = sign_in(&t.pool, "Ada").await;

    let id = new_comment(&t.app, &token, 100, 5, 12).await;
    link(&t.app, &token, &id, 200, 0, 7).await;

    let linked = song_comments(&t.app, &token, 200).await;
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0]["id"], id);
    assert_eq!(linked[0]["start"], 0);
    assert_eq!(linked[0]["end"], 7);
    assert_eq!(linked[0]["linked"], 100);

    let home = song_comments(&t.app, &token, 100).await;
    assert_eq!(home.len(), 1);
    assert_eq!(home[0]["start"], 5);
    assert_eq!(home[0]["linked"], Value::Null);
}

#[tokio::test]
async fn test_unlink_is_idempotent_and_scoped() {
    let t = setup().await;
    let token = sign_in(&t.pool, "Ada").await;

    let id = new_comment(&t.app, &token, 100, 5, 12).await;
    link(&t.app, &token, &id, 200, 0, 7).await;
    link(&t.app, &token, &id, 300, 1, 2).await;

    let uri = format!("/api/comments/{}/links/200", id);
    let (status, _) = call(&t.app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&t.app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert!(song_comments(&t.app, &token, 200).await.is_empty());
    assert_eq!(song_comments(&t.app, &token, 300).await.len(), 1);

    let (_, detail) = call(&t.app, "GET", &format!("/api/comments/{}", id), Some(&token), None).await;
    assert_eq!(detail["linked_songs"], json!([300]));
}

#[tokio::test]
async fn test_user_comments_sorted_by_start_then_end() {
    let t = setup().await;
    let token = sign_in(&t.pool, "Ada").await;

    new_comment(&t.app, &token, 1, 10, 20).await;
    new_comment(&t.app, &token, 2, 0, 5).await;
    let id = new_comment(&t.app, &token, 3, 10, 12).await;
    link(&t.app, &token, &id, 4, 3, 4).await;

    let (status, body) = call(&t.app, "GET", "/api/comments", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let keys: Vec<(i64, i64)> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| (c["start"].as_i64().unwrap(), c["end"].as_i64().unwrap()))
        .collect();
    assert_eq!(keys, vec![(0, 5), (3, 4), (10, 12), (10, 20)]);
}

async fn retitle(app: &Router, token: &str, comment: &str, title: &str, content: &str) {
    let (status, _) = call(
        app,
        "PUT",
        &format!("/api/comments/{}", comment),
        Some(token),
        Some(json!({ "title": title, "content": content })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

async fn search_titles(app: &Router, token: &str, query: &str) -> Vec<String> {
    let (status, body) = call(app, "GET", &format!("/api/comments?q={}", query), Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array()
        .unwrap()
        .iter()
        .map(|c| c["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_comment_search_on_text_without_lyrics_api() {
    let t = setup().await;
    let token = sign_in(&t.pool, "Ada").await;

    let chorus = new_comment(&t.app, &token, 1, 0, 5).await;
    retitle(&t.app, &token, &chorus, "Chorus repeat", "sung twice before the bridge").await;
    let piano = new_comment(&t.app, &token, 3, 2, 9).await;
    retitle(&t.app, &token, &piano, "Moonlight", "slow piano passage").await;
    link(&t.app, &token, &piano, 7, 0, 1).await;

    assert_eq!(search_titles(&t.app, &token, "chorus").await, vec!["Chorus repeat"]);
    assert_eq!(search_titles(&t.app, &token, "brige").await, vec!["Chorus repeat"]);
    assert_eq!(search_titles(&t.app, &token, "piano").await, vec!["Moonlight", "Moonlight"]);
    assert!(search_titles(&t.app, &token, "xyzzy").await.is_empty());
    assert_eq!(search_titles(&t.app, &token, "").await.len(), 3);
}

#[tokio::test]
async fn test_update_comment_text() {
    let t = setup().await;
    let token = sign_in(&t.pool, "Ada").await;
    let id = new_comment(&t.app, &token, 100, 5, 12).await;

    let (status, _) = call(
        &t.app,
        "PUT",
        &format!("/api/comments/{}", id),
        Some(&token),
        Some(json!({ "title": "Hook", "content": "Echoes the first verse" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let view = song_comments(&t.app, &token, 100).await;
    assert_eq!(view[0]["title"], "Hook");
    assert_eq!(view[0]["content"], "Echoes the first verse");
}

#[tokio::test]
async fn test_non_owner_cannot_touch_comment() {
    let t = setup().await;
    let ada = sign_in(&t.pool, "Ada").await;
    let bob = sign_in(&t.pool, "Bob").await;
    let id = new_comment(&t.app, &ada, 100, 5, 12).await;
    let uri = format!("/api/comments/{}", id);

    let (status, body) = call(
        &t.app,
        "PUT",
        &uri,
        Some(&bob),
        Some(json!({ "title": "mine now", "content": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "PERMISSION_DENIED");

    let (status, _) = call(&t.app, "DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &t.app,
        "POST",
        &format!("{}/links", uri),
        Some(&bob),
        Some(json!({ "song_id": 5, "start": 0, "end": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&t.app, "GET", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let view = song_comments(&t.app, &ada, 100).await;
    assert_eq!(view.len(), 1);
    assert_eq!(view[0]["title"], "");
}

#[tokio::test]
async fn test_missing_comment_is_not_found() {
    let t = setup().await;
    let token = sign_in(&t.pool, "Ada").await;
    let uri = format!("/api/comments/{}", uuid::Uuid::new_v4());

    let (status, body) = call(&t.app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_delete_comment_removes_links() {
    let t = setup().await;
    let token = sign_in(&t.pool, "Ada").await;

    let id = new_comment(&t.app, &token, 100, 5, 12).await;
    link(&t.app, &token, &id, 200, 0, 7).await;
    link(&t.app, &token, &id, 300, 1, 2).await;

    let (status, _) = call(&t.app, "DELETE", &format!("/api/comments/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    for song in [100, 200, 300] {
        assert!(song_comments(&t.app, &token, song).await.is_empty());
    }

    let (links,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM linked_comments")
        .fetch_one(&t.pool)
        .await
        .unwrap();
    assert_eq!(links, 0);
}

// =============================================================================
// Unsave cascade
// =============================================================================

#[tokio::test]
async fn test_unsave_home_song_deletes_comment_and_links() {
    let t = setup().await;
    let token = sign_in(&t.pool, "Ada").await;

    toggle(&t.app, &token, 100).await;
    let id = new_comment(&t.app, &token, 100, 5, 12).await;
    link(&t.app, &token, &id, 200, 0, 7).await;

    toggle(&t.app, &token, 100).await;

    assert!(song_comments(&t.app, &token, 100).await.is_empty());
    assert!(song_comments(&t.app, &token, 200).await.is_empty());

    let (status, _) = call(&t.app, "GET", &format!("/api/comments/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unsave_linked_song_only_unlinks() {
    let t = setup().await;
    let token = sign_in(&t.pool, "Ada").await;

    toggle(&t.app, &token, 200).await;
    let id = new_comment(&t.app, &token, 100, 5, 12).await;
    link(&t.app, &token, &id, 200, 0, 7).await;

    toggle(&t.app, &token, 200).await;

    assert!(song_comments(&t.app, &token, 200).await.is_empty());

    let home = song_comments(&t.app, &token, 100).await;
    assert_eq!(home.len(), 1);
    assert_eq!(home[0]["id"], id);

    let (_, detail) = call(&t.app, "GET", &format!("/api/comments/{}", id), Some(&token), None).await;
    assert_eq!(detail["linked_songs"], json!([]));
}

// =============================================================================
// Vocabulary
// =============================================================================

fn vocabulary_payload() -> Value {
    json!({
        "name": "Weather",
        "sentences": [
            {
                "definition": "It is raining today.",
                "words": [
                    { "character": "今天", "pinyin": "jīntiān" },
                    { "character": "下雨", "pinyin": "xiàyǔ" },
                    { "character": "。", "pinyin": "" }
                ]
            }
        ]
    })
}

#[tokio::test]
async fn test_vocabulary_create_list_get() {
    let t = setup().await;
    let token = sign_in(&t.pool, "Ada").await;

    let (status, created) = call(&t.app, "POST", "/api/vocabulary", Some(&token), Some(vocabulary_payload())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (_, listed) = call(&t.app, "GET", "/api/vocabulary", Some(&token), None).await;
    assert_eq!(listed[0]["id"], id.as_str());
    assert_eq!(listed[0]["sentence_count"], 1);

    let (status, library) = call(&t.app, "GET", &format!("/api/vocabulary/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(library["sentences"][0]["words"][2]["character"], "。");

    let bob = sign_in(&t.pool, "Bob").await;
    let (status, _) = call(&t.app, "GET", &format!("/api/vocabulary/{}", id), Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, listed) = call(&t.app, "GET", "/api/vocabulary", None, None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn test_vocabulary_rejects_duplicate_definitions() {
    let t = setup().await;
    let token = sign_in(&t.pool, "Ada").await;

    let mut payload = vocabulary_payload();
    let sentence = payload["sentences"][0].clone();
    payload["sentences"].as_array_mut().unwrap().push(sentence);

    let (status, body) = call(&t.app, "POST", "/api/vocabulary", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("Duplicate definition"));
}

#[tokio::test]
async fn test_vocabulary_tool_definition() {
    let t = setup().await;

    let (status, tool) = call(&t.app, "GET", "/api/vocabulary/tool", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tool["name"], "createLibrary");
}
