//! Media catalog queries

use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use crate::error::Result;
use crate::models::{Media, MediaType, NewMedia};

/// Insert a new media row, returning its id.
pub async fn add_media(pool: &Pool<Sqlite>, media: &NewMedia) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO media (title, filename, media_type, source_url, thumbnail, duration_s) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&media.title)
    .bind(&media.filename)
    .bind(media.media_type.as_str())
    .bind(&media.source_url)
    .bind(&media.thumbnail)
    .bind(media.duration_s)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Fetch a media row by id.
pub async fn get_media(pool: &Pool<Sqlite>, media_id: i64) -> Result<Option<Media>> {
    let row = sqlx::query("SELECT * FROM media WHERE id = ?")
        .bind(media_id)
        .fetch_optional(pool)
        .await?;

    row.map(|r| row_to_media(&r)).transpose()
}

/// All media, newest first.
pub async fn get_all_media(pool: &Pool<Sqlite>) -> Result<Vec<Media>> {
    let rows = sqlx::query("SELECT * FROM media ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_media).collect()
}

/// Delete a media row and any tags pointing at it.
pub async fn delete_media(pool: &Pool<Sqlite>, media_id: i64) -> Result<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM tags WHERE media_id = ?")
        .bind(media_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM media WHERE id = ?")
        .bind(media_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

fn row_to_media(row: &SqliteRow) -> Result<Media> {
    let media_type: String = row.try_get("media_type")?;
    Ok(Media {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        filename: row.try_get("filename")?,
        media_type: media_type.parse::<MediaType>()?,
        source_url: row.try_get("source_url")?,
        thumbnail: row.try_get("thumbnail")?,
        duration_s: row.try_get("duration_s")?,
        created_at: row.try_get("created_at")?,
    })
}
