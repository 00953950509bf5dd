//! Linked-comment records
//!
//! A link re-anchors an existing comment on a second song. Resolved links
//! come back as [`Comment`] values carrying the link's offsets.

use lyricnote_common::db::{Comment, LinkedComment};
use lyricnote_common::Result;
use sqlx::SqliteConnection;
use uuid::Uuid;

use super::comments::comment_from_row;

/// Comment columns with the link's offsets substituted
const RESOLVED_COLUMNS: &str = "c.id AS id, c.user_id AS user_id, c.song AS song, \
     l.start_offset AS start_offset, l.end_offset AS end_offset, c.color AS color, \
     c.title AS title, c.content AS content, c.creation_time AS creation_time";

pub async fn insert_link(conn: &mut SqliteConnection, link: &LinkedComment) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO linked_comments (id, comment_id, song, start_offset, end_offset, user_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(link.id.to_string())
    .bind(link.comment.to_string())
    .bind(link.song)
    .bind(link.start)
    .bind(link.end)
    .bind(link.user.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Links of `user` anchored on `song`, resolved against their comments
pub async fn resolved_links_for_song(
    conn: &mut SqliteConnection,
    user: Uuid,
    song: i64,
) -> Result<Vec<Comment>> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM linked_comments l
        JOIN comments c ON c.id = l.comment_id
        WHERE l.song = ? AND l.user_id = ?
        ORDER BY l.rowid
        "#,
        RESOLVED_COLUMNS
    ))
    .bind(song)
    .bind(user.to_string())
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(comment_from_row).collect()
}

/// Every link of `user`, resolved against their comments
pub async fn resolved_links_for_user(conn: &mut SqliteConnection, user: Uuid) -> Result<Vec<Comment>> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM linked_comments l
        JOIN comments c ON c.id = l.comment_id
        WHERE l.user_id = ?
        ORDER BY l.rowid
        "#,
        RESOLVED_COLUMNS
    ))
    .bind(user.to_string())
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(comment_from_row).collect()
}

/// Songs a comment is linked to, in link order
pub async fn linked_songs(conn: &mut SqliteConnection, comment: Uuid) -> Result<Vec<i64>> {
    let songs: Vec<(i64,)> =
        sqlx::query_as("SELECT song FROM linked_comments WHERE comment_id = ? ORDER BY rowid")
            .bind(comment.to_string())
            .fetch_all(&mut *conn)
            .await?;

    Ok(songs.into_iter().map(|(song,)| song).collect())
}

/// Remove every link pointing at `comment`
pub async fn delete_links_for_comment(conn: &mut SqliteConnection, comment: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM linked_comments WHERE comment_id = ?")
        .bind(comment.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Remove the links of `user` tying `comment` to `song`
pub async fn delete_link(
    conn: &mut SqliteConnection,
    user: Uuid,
    comment: Uuid,
    song: i64,
) -> Result<u64> {
    let result = sqlx::query(
        "DELETE FROM linked_comments WHERE comment_id = ? AND song = ? AND user_id = ?",
    )
    .bind(comment.to_string())
    .bind(song)
    .bind(user.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}
