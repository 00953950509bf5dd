//! User records
//!
//! Users are created by the identity provider on first sign-in; the service
//! itself only reads them. `insert_user` exists for provisioning tools and
//! tests.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::UserProfile;
use crate::Result;

/// Insert a user record and return its id
pub async fn insert_user(
    pool: &SqlitePool,
    display_name: Option<&str>,
    image_url: Option<&str>,
) -> Result<Uuid> {
    let id = Uuid::new_v4();

    sqlx::query("INSERT INTO users (id, display_name, image_url, created_at) VALUES (?, ?, ?, ?)")
        .bind(id.to_string())
        .bind(display_name)
        .bind(image_url)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(pool)
        .await?;

    Ok(id)
}

/// Load the public profile of a user, if the user exists
pub async fn load_user_profile(pool: &SqlitePool, user_id: Uuid) -> Result<Option<UserProfile>> {
    let row: Option<(Option<String>, Option<String>)> =
        sqlx::query_as("SELECT display_name, image_url FROM users WHERE id = ?")
            .bind(user_id.to_string())
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|(display_name, image_url)| UserProfile {
        display_name,
        image_url,
    }))
}
