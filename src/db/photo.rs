use uuid::Uuid;

use crate::{models::Photo, PGPool};

pub async fn list_by_user(user_id: i32, pool: &PGPool) -> Result<Vec<Photo>, sqlx::Error> {
    sqlx::query_as::<_, Photo>("SELECT * FROM photos WHERE user_id = $1 ORDER BY created_at DESC")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn create(
    user_id: i32,
    image_url: String,
    caption: Option<String>,
    event_id: Option<Uuid>,
    pool: &PGPool,
) -> Result<Photo, sqlx::Error> {
    sqlx::query_as::<_, Photo>(
        "INSERT INTO photos (user_id, image_url, caption, event_id) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(user_id)
    .bind(image_url)
    .bind(caption)
    .bind(event_id)
    .fetch_one(pool)
    .await
}
