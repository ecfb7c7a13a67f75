use log::debug;
use uuid::Uuid;

use crate::{
    db::{self, saved::SavedList},
    errors::ApiError,
    models::SavedEntry,
    PGPool,
};

pub async fn list(list: SavedList, user_id: i32, pool: &PGPool) -> Result<Vec<SavedEntry>, ApiError> {
    Ok(db::saved::list(list, user_id, pool).await?)
}

pub async fn contains(list: SavedList, user_id: i32, event_id: Uuid, pool: &PGPool) -> Result<bool, ApiError> {
    Ok(db::saved::contains(list, user_id, event_id, pool).await?)
}

/// Adding an already saved event is a no-op.
pub async fn add(list: SavedList, user_id: i32, event_id: Uuid, pool: &PGPool) -> Result<(), ApiError> {
    match db::saved::add(list, user_id, event_id, pool).await {
        Ok(inserted) => {
            debug!("{} add user={} event={} inserted={}", list.table(), user_id, event_id, inserted);
            Ok(())
        }
        Err(err) => match ApiError::from(err) {
            ApiError::NotFound(_) => Err(ApiError::not_found("Event")),
            other => Err(other),
        },
    }
}

pub async fn remove(list: SavedList, user_id: i32, event_id: Uuid, pool: &PGPool) -> Result<(), ApiError> {
    let removed = db::saved::remove(list, user_id, event_id, pool).await?;
    debug!("{} remove user={} event={} removed={}", list.table(), user_id, event_id, removed);
    Ok(())
}
