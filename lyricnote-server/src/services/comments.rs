//! Comment service: merged views, ownership checks and link bookkeeping
//!
//! Every mutation runs in a single transaction, so a failed step leaves no
//! half-deleted comment or orphaned link behind.

use lyricnote_common::db::{begin_write, Comment, LinkedComment, MergedComment};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::{comments, links};
use crate::error::{ApiError, ApiResult};
use crate::palette::ColorSource;

/// A single comment with every song it appears on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentDetail {
    #[serde(flatten)]
    pub comment: Comment,
    pub linked_songs: Vec<i64>,
}

/// Merge owned comments and resolved links into one view ordered by
/// `(start, end)`
///
/// The sort is stable: on an exact tie owned comments stay ahead of links,
/// each in the order they were fetched.
pub fn merge_comments(owned: Vec<Comment>, linked: Vec<Comment>) -> Vec<MergedComment> {
    let mut merged: Vec<MergedComment> = owned
        .into_iter()
        .map(MergedComment::owned)
        .chain(linked.into_iter().map(MergedComment::via_link))
        .collect();

    merged.sort_by_key(|entry| (entry.comment.start, entry.comment.end));
    merged
}

/// Merged view of `user`'s comments on one song
pub async fn comments_for_song(pool: &SqlitePool, user: Uuid, song: i64) -> ApiResult<Vec<MergedComment>> {
    let mut tx = pool.begin().await?;
    let merged = merged_for_song(&mut tx, user, song).await?;
    tx.commit().await?;
    Ok(merged)
}

/// Merged view of all of `user`'s comments
pub async fn all_comments(pool: &SqlitePool, user: Uuid) -> ApiResult<Vec<MergedComment>> {
    let mut tx = pool.begin().await?;
    let owned = comments::comments_for_user(&mut tx, user).await?;
    let linked = links::resolved_links_for_user(&mut tx, user).await?;
    tx.commit().await?;
    Ok(merge_comments(owned, linked))
}

pub(crate) async fn merged_for_song(
    conn: &mut SqliteConnection,
    user: Uuid,
    song: i64,
) -> ApiResult<Vec<MergedComment>> {
    let owned = comments::comments_for_song(conn, user, song).await?;
    let linked = links::resolved_links_for_song(conn, user, song).await?;
    Ok(merge_comments(owned, linked))
}

/// Load a comment and check that `user` owns it
async fn owned_comment(conn: &mut SqliteConnection, user: Uuid, id: Uuid) -> ApiResult<Comment> {
    let comment = comments::find_comment(conn, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment".to_string()))?;

    if comment.user != user {
        debug!(comment = %id, caller = %user, "Rejected access to another user's comment");
        return Err(ApiError::PermissionDenied);
    }

    Ok(comment)
}

/// Create an empty comment on `song` and return its id
pub async fn create_comment(
    pool: &SqlitePool,
    colors: &dyn ColorSource,
    user: Uuid,
    song: i64,
    start: i64,
    end: i64,
) -> ApiResult<Uuid> {
    let comment = Comment {
        id: Uuid::new_v4(),
        user,
        song,
        start,
        end,
        color: colors.pick().to_string(),
        title: String::new(),
        content: String::new(),
        creation_time: chrono::Utc::now().timestamp_millis(),
    };

    let mut conn = pool.acquire().await?;
    comments::insert_comment(&mut conn, &comment).await?;

    info!(comment = %comment.id, song, start, end, "Created comment");
    Ok(comment.id)
}

/// Replace a comment's title and content (owner only)
pub async fn update_comment(
    pool: &SqlitePool,
    user: Uuid,
    id: Uuid,
    title: &str,
    content: &str,
) -> ApiResult<()> {
    let mut tx = begin_write(pool).await?;
    owned_comment(&mut tx, user, id).await?;
    comments::update_comment_text(&mut tx, id, title, content).await?;
    tx.commit().await?;
    Ok(())
}

/// Delete a comment and every link to it (owner only)
pub async fn delete_comment(pool: &SqlitePool, user: Uuid, id: Uuid) -> ApiResult<()> {
    let mut tx = begin_write(pool).await?;
    owned_comment(&mut tx, user, id).await?;
    let removed_links = remove_comment(&mut tx, id).await?;
    tx.commit().await?;

    info!(comment = %id, removed_links, "Deleted comment");
    Ok(())
}

/// Links first, then the comment itself
pub(crate) async fn remove_comment(conn: &mut SqliteConnection, id: Uuid) -> ApiResult<u64> {
    let removed_links = links::delete_links_for_comment(conn, id).await?;
    comments::delete_comment(conn, id).await?;
    Ok(removed_links)
}

/// Anchor an owned comment on another song and return the link id
///
/// The target song may equal the home song and need not be saved.
pub async fn link_comment(
    pool: &SqlitePool,
    user: Uuid,
    id: Uuid,
    song: i64,
    start: i64,
    end: i64,
) -> ApiResult<Uuid> {
    let mut tx = begin_write(pool).await?;
    let comment = owned_comment(&mut tx, user, id).await?;

    let link = LinkedComment {
        id: Uuid::new_v4(),
        comment: comment.id,
        song,
        start,
        end,
        user,
    };
    links::insert_link(&mut tx, &link).await?;
    tx.commit().await?;

    info!(comment = %id, link = %link.id, song, "Linked comment to song");
    Ok(link.id)
}

/// Remove `user`'s links of comment `id` on `song`; no-op if none
pub async fn unlink_comment(pool: &SqlitePool, user: Uuid, id: Uuid, song: i64) -> ApiResult<()> {
    let mut conn = pool.acquire().await?;
    let removed = links::delete_link(&mut conn, user, id, song).await?;
    debug!(comment = %id, song, removed, "Unlinked comment");
    Ok(())
}

/// One owned comment with the songs it is linked to
pub async fn comment_detail(pool: &SqlitePool, user: Uuid, id: Uuid) -> ApiResult<CommentDetail> {
    let mut tx = pool.begin().await?;
    let comment = owned_comment(&mut tx, user, id).await?;
    let linked_songs = links::linked_songs(&mut tx, id).await?;
    tx.commit().await?;

    Ok(CommentDetail {
        comment,
        linked_songs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{FixedColor, COMMENT_COLORS};
    use lyricnote_common::db::{init_memory_database, insert_user};

    fn at(start: i64, end: i64, song: i64) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            user: Uuid::nil(),
            song,
            start,
            end,
            color: COMMENT_COLORS[0].to_string(),
            title: String::new(),
            content: String::new(),
            creation_time: 0,
        }
    }

    #[test]
    fn test_merge_orders_by_start_then_end() {
        let owned = vec![at(10, 20, 1), at(0, 5, 1), at(10, 12, 1)];
        let linked = vec![at(3, 4, 9), at(10, 15, 9)];

        let merged = merge_comments(owned, linked);
        let keys: Vec<(i64, i64)> = merged.iter().map(|m| (m.comment.start, m.comment.end)).collect();

        assert_eq!(keys, vec![(0, 5), (3, 4), (10, 12), (10, 15), (10, 20)]);
        assert_eq!(merged[1].linked, Some(9));
        assert_eq!(merged[0].linked, None);
    }

    #[test]
    fn test_merge_ties_keep_owned_first() {
        let owned = at(1, 2, 1);
        let linked = at(1, 2, 7);

        let merged = merge_comments(vec![owned.clone()], vec![linked.clone()]);

        assert_eq!(merged[0].comment.id, owned.id);
        assert_eq!(merged[1].comment.id, linked.id);
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_comments(Vec::new(), Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn test_create_uses_color_source() {
        let pool = init_memory_database().await.unwrap();
        let user = insert_user(&pool, None, None).await.unwrap();

        let id = create_comment(&pool, &FixedColor(3), user, 100, 5, 12).await.unwrap();

        let view = comments_for_song(&pool, user, 100).await.unwrap();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].comment.id, id);
        assert_eq!(view[0].comment.color, COMMENT_COLORS[3]);
        assert_eq!(view[0].comment.title, "");
        assert_eq!(view[0].comment.content, "");
    }

    #[tokio::test]
    async fn test_missing_comment_is_not_found() {
        let pool = init_memory_database().await.unwrap();
        let user = insert_user(&pool, None, None).await.unwrap();

        let result = update_comment(&pool, user, Uuid::new_v4(), "t", "c").await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));

        let result = link_comment(&pool, user, Uuid::new_v4(), 2, 0, 1).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_detail_lists_linked_songs() {
        let pool = init_memory_database().await.unwrap();
        let user = insert_user(&pool, None, None).await.unwrap();

        let id = create_comment(&pool, &FixedColor(0), user, 100, 5, 12).await.unwrap();
        link_comment(&pool, user, id, 200, 0, 7).await.unwrap();
        link_comment(&pool, user, id, 300, 2, 4).await.unwrap();

        let detail = comment_detail(&pool, user, id).await.unwrap();
        assert_eq!(detail.comment.song, 100);
        assert_eq!(detail.linked_songs, vec![200, 300]);
    }
}
