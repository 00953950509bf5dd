//! Library service: bookmark toggling, lookups and the unsave cascade
//!
//! Unsaving a song removes the user's annotation surface on it:
//! - comments written on the song are deleted together with their links
//! - links anchoring comments from other songs here are removed, the
//!   comments themselves stay on their home songs

use lyricnote_common::db::begin_write;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::db::{library, links};
use crate::error::ApiResult;
use crate::services::comments::{merged_for_song, remove_comment};

/// Outcome of a save toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Saved(Uuid),
    Unsaved,
}

/// Counts of what an unsave removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub deleted_comments: usize,
    pub unlinked_comments: usize,
}

/// Save `song` if absent, otherwise unsave it with its cascade
pub async fn toggle_saved(pool: &SqlitePool, user: Uuid, song: i64) -> ApiResult<ToggleOutcome> {
    let mut tx = begin_write(pool).await?;

    let outcome = match library::find_saved(&mut tx, user, song).await? {
        Some(saved_id) => {
            let report = unsave_cascade(&mut tx, user, song).await?;
            library::delete_saved(&mut tx, saved_id).await?;
            info!(
                song,
                deleted = report.deleted_comments,
                unlinked = report.unlinked_comments,
                "Removed song from library"
            );
            ToggleOutcome::Unsaved
        }
        None => match library::insert_saved(&mut tx, user, song).await? {
            Some(saved_id) => {
                info!(song, "Saved song to library");
                ToggleOutcome::Saved(saved_id)
            }
            // Absorbed by the unique index; the row already exists
            None => match library::find_saved(&mut tx, user, song).await? {
                Some(saved_id) => ToggleOutcome::Saved(saved_id),
                None => ToggleOutcome::Unsaved,
            },
        },
    };

    tx.commit().await?;
    Ok(outcome)
}

/// Clear `user`'s comments and links on `song`
async fn unsave_cascade(conn: &mut SqliteConnection, user: Uuid, song: i64) -> ApiResult<CascadeReport> {
    let mut report = CascadeReport::default();

    for entry in merged_for_song(conn, user, song).await? {
        if entry.is_linked() {
            links::delete_link(conn, user, entry.comment.id, song).await?;
            report.unlinked_comments += 1;
        } else {
            remove_comment(conn, entry.comment.id).await?;
            report.deleted_comments += 1;
        }
    }

    Ok(report)
}

/// Saved song ids in insertion order, optionally only annotated ones
pub async fn library_songs(pool: &SqlitePool, user: Uuid, filter_for_comments: bool) -> ApiResult<Vec<i64>> {
    let mut conn = pool.acquire().await?;

    if filter_for_comments {
        return Ok(library::annotated_saved_songs(&mut conn, user).await?);
    }

    Ok(library::saved_songs(&mut conn, user)
        .await?
        .into_iter()
        .map(|(_, song)| song)
        .collect())
}

pub async fn saved_id(pool: &SqlitePool, user: Uuid, song: i64) -> ApiResult<Option<Uuid>> {
    let mut conn = pool.acquire().await?;
    Ok(library::find_saved(&mut conn, user, song).await?)
}

/// One lookup result per input id, same order, `None` for unsaved songs
pub async fn batched_saved_ids(pool: &SqlitePool, user: Uuid, songs: &[i64]) -> ApiResult<Vec<Option<Uuid>>> {
    let mut conn = pool.acquire().await?;
    let saved: HashMap<i64, Uuid> = library::saved_songs(&mut conn, user)
        .await?
        .into_iter()
        .map(|(id, song)| (song, id))
        .collect();

    Ok(songs.iter().map(|song| saved.get(song).copied()).collect())
}
