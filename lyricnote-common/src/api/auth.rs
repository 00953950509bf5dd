//! Session credential hashing and lookup
//!
//! # Architecture
//!
//! Users sign in through an external identity provider. The provider writes a
//! row into the `sessions` table for every issued bearer token:
//! - The token itself is never stored, only its SHA-256 digest (64 hex chars)
//! - Each session belongs to exactly one user
//! - A token that matches no session is treated as anonymous, not as an error
//!
//! This module contains pure hashing functions plus the two database
//! operations needed to resolve and record sessions. No HTTP framework
//! dependencies; request extraction lives in the server crate.

use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::Result;

/// Number of random bytes in a generated session token
const TOKEN_BYTES: usize = 32;

/// Hash a bearer token for storage and lookup
///
/// # Examples
///
/// ```
/// use lyricnote_common::api::auth::hash_session_token;
///
/// let hash = hash_session_token("secret-token");
/// assert_eq!(hash.len(), 64); // SHA-256 is 64 hex chars
/// assert_eq!(hash, hash_session_token("secret-token"));
/// ```
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Generate a new random bearer token (64 hex chars)
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Resolve a bearer token to the user it was issued for
///
/// Returns `Ok(None)` when no session matches.
pub async fn lookup_session_user(db: &SqlitePool, token: &str) -> Result<Option<Uuid>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT user_id FROM sessions WHERE token_hash = ?")
        .bind(hash_session_token(token))
        .fetch_optional(db)
        .await?;

    match row {
        Some((user_id,)) => Ok(Some(Uuid::parse_str(&user_id)?)),
        None => Ok(None),
    }
}

/// Record a session for `user_id`, as the identity provider does after sign-in
pub async fn store_session(db: &SqlitePool, user_id: Uuid, token: &str) -> Result<()> {
    sqlx::query("INSERT OR REPLACE INTO sessions (token_hash, user_id, created_at) VALUES (?, ?, ?)")
        .bind(hash_session_token(token))
        .bind(user_id.to_string())
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(db)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_hex_sha256() {
        let hash = hash_session_token("abc");
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_generated_tokens_differ() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_eq!(a.len(), TOKEN_BYTES * 2);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_store_and_lookup_session() {
        let pool = crate::db::init_memory_database().await.unwrap();
        let user = crate::db::insert_user(&pool, Some("Ada"), None).await.unwrap();

        store_session(&pool, user, "token-1").await.unwrap();

        assert_eq!(lookup_session_user(&pool, "token-1").await.unwrap(), Some(user));
        assert_eq!(lookup_session_user(&pool, "token-2").await.unwrap(), None);
    }
}
