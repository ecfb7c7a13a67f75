use log::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{self, site::SiteChanges},
    dto::{NewSiteDto, UpdateSiteDto},
    errors::ApiError,
    models::Site,
    PGPool,
};

pub async fn list(pool: &PGPool) -> Result<Vec<Site>, ApiError> {
    Ok(db::site::list(pool).await?)
}

pub async fn create(dto: NewSiteDto, pool: &PGPool) -> Result<Site, ApiError> {
    dto.validate()?;
    let site = db::site::create(dto.name, dto.url, dto.json_url, dto.enabled.unwrap_or(true), pool).await?;
    info!("registered scraping source {} ({})", site.name, site.id);
    Ok(site)
}

pub async fn update(id: Uuid, dto: UpdateSiteDto, pool: &PGPool) -> Result<Site, ApiError> {
    dto.validate()?;
    let changes = SiteChanges {
        name: dto.name,
        url: dto.url,
        json_url: dto.json_url,
        enabled: dto.enabled,
    };
    db::site::update(id, changes, pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Site"))
}

pub async fn delete(id: Uuid, pool: &PGPool) -> Result<(), ApiError> {
    if db::site::delete(id, pool).await? {
        Ok(())
    } else {
        Err(ApiError::not_found("Site"))
    }
}
