//! Comment records

use lyricnote_common::db::Comment;
use lyricnote_common::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

const COMMENT_COLUMNS: &str =
    "id, user_id, song, start_offset, end_offset, color, title, content, creation_time";

/// Build a [`Comment`] from a row selecting [`COMMENT_COLUMNS`] (in any order)
pub(crate) fn comment_from_row(row: &SqliteRow) -> Result<Comment> {
    let id: String = row.get("id");
    let user: String = row.get("user_id");

    Ok(Comment {
        id: Uuid::parse_str(&id)?,
        user: Uuid::parse_str(&user)?,
        song: row.get("song"),
        start: row.get("start_offset"),
        end: row.get("end_offset"),
        color: row.get("color"),
        title: row.get("title"),
        content: row.get("content"),
        creation_time: row.get("creation_time"),
    })
}

pub async fn insert_comment(conn: &mut SqliteConnection, comment: &Comment) -> Result<()> {
    sqlx::query(&format!(
        "INSERT INTO comments ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        COMMENT_COLUMNS
    ))
    .bind(comment.id.to_string())
    .bind(comment.user.to_string())
    .bind(comment.song)
    .bind(comment.start)
    .bind(comment.end)
    .bind(&comment.color)
    .bind(&comment.title)
    .bind(&comment.content)
    .bind(comment.creation_time)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn find_comment(conn: &mut SqliteConnection, id: Uuid) -> Result<Option<Comment>> {
    let row = sqlx::query(&format!("SELECT {} FROM comments WHERE id = ?", COMMENT_COLUMNS))
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(comment_from_row).transpose()
}

/// Comments written by `user`, in creation order
pub async fn comments_for_user(conn: &mut SqliteConnection, user: Uuid) -> Result<Vec<Comment>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM comments WHERE user_id = ? ORDER BY rowid",
        COMMENT_COLUMNS
    ))
    .bind(user.to_string())
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(comment_from_row).collect()
}

/// Comments written by `user` on `song`, in creation order
pub async fn comments_for_song(
    conn: &mut SqliteConnection,
    user: Uuid,
    song: i64,
) -> Result<Vec<Comment>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM comments WHERE song = ? AND user_id = ? ORDER BY rowid",
        COMMENT_COLUMNS
    ))
    .bind(song)
    .bind(user.to_string())
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(comment_from_row).collect()
}

/// Replace title and content; offsets and song never change
pub async fn update_comment_text(
    conn: &mut SqliteConnection,
    id: Uuid,
    title: &str,
    content: &str,
) -> Result<u64> {
    let result = sqlx::query("UPDATE comments SET title = ?, content = ? WHERE id = ?")
        .bind(title)
        .bind(content)
        .bind(id.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Delete the comment row only; callers remove its links first
pub async fn delete_comment(conn: &mut SqliteConnection, id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}
