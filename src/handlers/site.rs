use actix_web::{delete, get, patch, post, web, HttpResponse};
use uuid::Uuid;

use crate::{
    dto::{NewSiteDto, OkResponse, UpdateSiteDto},
    errors::ApiError,
    service::{self, auth::AdminUser},
    PGPool,
};

#[get("/admin/sites")]
pub async fn list(_admin: AdminUser, pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
    let sites = service::site::list(pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(sites))
}

#[post("/admin/sites")]
pub async fn create(
    _admin: AdminUser,
    dto: web::Json<NewSiteDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let site = service::site::create(dto.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(site))
}

#[patch("/admin/sites/{id}")]
pub async fn update(
    _admin: AdminUser,
    id: web::Path<Uuid>,
    dto: web::Json<UpdateSiteDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let site = service::site::update(id.into_inner(), dto.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(site))
}

#[delete("/admin/sites/{id}")]
pub async fn delete(_admin: AdminUser, id: web::Path<Uuid>, pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
    service::site::delete(id.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(OkResponse::ok()))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list)
        .service(create)
        .service(update)
        .service(delete);
}
