//! Vocabulary library records
//!
//! Sentence words are stored as a JSON array in `vocabulary_sentences.words`.

use lyricnote_common::db::{Sentence, VocabularyLibrary, VocabularyLibrarySummary, Word};
use lyricnote_common::Result;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

/// Insert a library header and its sentences (caller provides the transaction)
pub async fn insert_library(conn: &mut SqliteConnection, library: &VocabularyLibrary) -> Result<()> {
    sqlx::query("INSERT INTO vocabulary_libraries (id, user_id, name, created_at) VALUES (?, ?, ?, ?)")
        .bind(library.id.to_string())
        .bind(library.user.to_string())
        .bind(&library.name)
        .bind(library.created_at)
        .execute(&mut *conn)
        .await?;

    for (position, sentence) in library.sentences.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO vocabulary_sentences (library_id, position, definition, words)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(library.id.to_string())
        .bind(position as i64)
        .bind(&sentence.definition)
        .bind(serde_json::to_string(&sentence.words)?)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Library header plus sentences, or `None` if no such library
pub async fn find_library(conn: &mut SqliteConnection, id: Uuid) -> Result<Option<VocabularyLibrary>> {
    let header = sqlx::query("SELECT id, user_id, name, created_at FROM vocabulary_libraries WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?;

    let Some(header) = header else {
        return Ok(None);
    };

    let rows = sqlx::query(
        "SELECT definition, words FROM vocabulary_sentences WHERE library_id = ? ORDER BY position",
    )
    .bind(id.to_string())
    .fetch_all(&mut *conn)
    .await?;

    let mut sentences = Vec::with_capacity(rows.len());
    for row in &rows {
        let words: String = row.get("words");
        sentences.push(Sentence {
            definition: row.get("definition"),
            words: serde_json::from_str::<Vec<Word>>(&words)?,
        });
    }

    let user: String = header.get("user_id");
    Ok(Some(VocabularyLibrary {
        id,
        user: Uuid::parse_str(&user)?,
        name: header.get("name"),
        created_at: header.get("created_at"),
        sentences,
    }))
}

/// Libraries of `user`, oldest first
pub async fn libraries_for_user(
    conn: &mut SqliteConnection,
    user: Uuid,
) -> Result<Vec<VocabularyLibrarySummary>> {
    let rows = sqlx::query(
        r#"
        SELECT v.id, v.name, v.created_at,
               (SELECT COUNT(*) FROM vocabulary_sentences s WHERE s.library_id = v.id) AS sentence_count
        FROM vocabulary_libraries v
        WHERE v.user_id = ?
        ORDER BY v.rowid
        "#,
    )
    .bind(user.to_string())
    .fetch_all(&mut *conn)
    .await?;

    rows.iter()
        .map(|row| -> Result<VocabularyLibrarySummary> {
            let id: String = row.get("id");
            Ok(VocabularyLibrarySummary {
                id: Uuid::parse_str(&id)?,
                name: row.get("name"),
                sentence_count: row.get("sentence_count"),
                created_at: row.get("created_at"),
            })
        })
        .collect()
}
