use validator::Validate;

use crate::{db, dto::NewPhotoDto, errors::ApiError, models::Photo, PGPool};

pub async fn list(user_id: i32, pool: &PGPool) -> Result<Vec<Photo>, ApiError> {
    Ok(db::photo::list_by_user(user_id, pool).await?)
}

pub async fn create(user_id: i32, dto: NewPhotoDto, pool: &PGPool) -> Result<Photo, ApiError> {
    dto.validate()?;
    let caption = dto.caption.filter(|c| !c.trim().is_empty());
    db::photo::create(user_id, dto.image_url, caption, dto.event_id, pool)
        .await
        .map_err(|err| match ApiError::from(err) {
            ApiError::NotFound(_) => ApiError::not_found("Event"),
            other => other,
        })
}
