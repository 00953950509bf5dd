//! Saved-song (library) records

use lyricnote_common::Result;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

/// Find the bookmark for (user, song)
pub async fn find_saved(conn: &mut SqliteConnection, user: Uuid, song: i64) -> Result<Option<Uuid>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT id FROM saved WHERE user_id = ? AND song = ?")
        .bind(user.to_string())
        .bind(song)
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some((id,)) => Ok(Some(Uuid::parse_str(&id)?)),
        None => Ok(None),
    }
}

/// Insert a bookmark for (user, song)
///
/// Returns `None` if the pair was already saved; the unique index makes a
/// concurrent duplicate a no-op.
pub async fn insert_saved(conn: &mut SqliteConnection, user: Uuid, song: i64) -> Result<Option<Uuid>> {
    let id = Uuid::new_v4();

    let result = sqlx::query(
        r#"
        INSERT INTO saved (id, user_id, song, created_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(user_id, song) DO NOTHING
        "#,
    )
    .bind(id.to_string())
    .bind(user.to_string())
    .bind(song)
    .bind(chrono::Utc::now().timestamp_millis())
    .execute(&mut *conn)
    .await?;

    Ok((result.rows_affected() == 1).then_some(id))
}

pub async fn delete_saved(conn: &mut SqliteConnection, id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM saved WHERE id = ?")
        .bind(id.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// All bookmarks of a user as (saved id, song), in insertion order
pub async fn saved_songs(conn: &mut SqliteConnection, user: Uuid) -> Result<Vec<(Uuid, i64)>> {
    let rows = sqlx::query("SELECT id, song FROM saved WHERE user_id = ? ORDER BY rowid")
        .bind(user.to_string())
        .fetch_all(&mut *conn)
        .await?;

    rows.iter()
        .map(|row| -> Result<(Uuid, i64)> {
            let id: String = row.get("id");
            Ok((Uuid::parse_str(&id)?, row.get("song")))
        })
        .collect()
}

/// Saved songs carrying at least one comment or link of the same user
pub async fn annotated_saved_songs(conn: &mut SqliteConnection, user: Uuid) -> Result<Vec<i64>> {
    let songs: Vec<(i64,)> = sqlx::query_as(
        r#"
        SELECT s.song
        FROM saved s
        WHERE s.user_id = ?
          AND (
            EXISTS (SELECT 1 FROM comments c WHERE c.user_id = s.user_id AND c.song = s.song)
            OR EXISTS (SELECT 1 FROM linked_comments l WHERE l.user_id = s.user_id AND l.song = s.song)
          )
        ORDER BY s.rowid
        "#,
    )
    .bind(user.to_string())
    .fetch_all(&mut *conn)
    .await?;

    Ok(songs.into_iter().map(|(song,)| song).collect())
}
