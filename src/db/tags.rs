//! Tag-to-media mapping queries

use sqlx::{Pool, Sqlite};

use crate::error::Result;
use crate::models::Tag;

/// Register a tag. A UID maps to at most one media; re-registering an
/// existing UID re-points it (last registration wins).
pub async fn add_tag(
    pool: &Pool<Sqlite>,
    uid: &str,
    media_id: i64,
    label: Option<&str>,
) -> Result<()> {
    sqlx::query("INSERT OR REPLACE INTO tags (uid, media_id, label) VALUES (?, ?, ?)")
        .bind(uid)
        .bind(media_id)
        .bind(label)
        .execute(pool)
        .await?;
    Ok(())
}

/// Fetch a tag by UID.
pub async fn get_tag(pool: &Pool<Sqlite>, uid: &str) -> Result<Option<Tag>> {
    let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE uid = ?")
        .bind(uid)
        .fetch_optional(pool)
        .await?;
    Ok(tag)
}

/// All registered tags, newest first.
pub async fn get_all_tags(pool: &Pool<Sqlite>) -> Result<Vec<Tag>> {
    let tags = sqlx::query_as::<_, Tag>("SELECT * FROM tags ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;
    Ok(tags)
}

/// Remove a tag registration.
pub async fn delete_tag(pool: &Pool<Sqlite>, uid: &str) -> Result<()> {
    sqlx::query("DELETE FROM tags WHERE uid = ?")
        .bind(uid)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util::memory_pool;
    use crate::models::{MediaType, NewMedia};

    async fn sample_media(pool: &Pool<Sqlite>) -> i64 {
        crate::db::media::add_media(
            pool,
            &NewMedia {
                title: "Test".into(),
                filename: "test.mp3".into(),
                media_type: MediaType::Audio,
                source_url: None,
                thumbnail: None,
                duration_s: Some(60),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_add_and_get_tag() {
        let pool = memory_pool().await;
        let media_id = sample_media(&pool).await;

        add_tag(&pool, "CAFE01", media_id, Some("bunny")).await.unwrap();
        let tag = get_tag(&pool, "CAFE01").await.unwrap().unwrap();
        assert_eq!(tag.media_id, media_id);
        assert_eq!(tag.label.as_deref(), Some("bunny"));
    }

    #[tokio::test]
    async fn test_reregister_repoints_uid() {
        let pool = memory_pool().await;
        let first = sample_media(&pool).await;
        let second = sample_media(&pool).await;

        add_tag(&pool, "CAFE01", first, None).await.unwrap();
        add_tag(&pool, "CAFE01", second, Some("updated")).await.unwrap();

        let tag = get_tag(&pool, "CAFE01").await.unwrap().unwrap();
        assert_eq!(tag.media_id, second);
        assert_eq!(tag.label.as_deref(), Some("updated"));

        // Still exactly one row for the UID
        assert_eq!(get_all_tags(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_tag() {
        let pool = memory_pool().await;
        let media_id = sample_media(&pool).await;

        add_tag(&pool, "CAFE01", media_id, None).await.unwrap();
        delete_tag(&pool, "CAFE01").await.unwrap();
        assert!(get_tag(&pool, "CAFE01").await.unwrap().is_none());
    }
}
