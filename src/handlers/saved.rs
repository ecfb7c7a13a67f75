use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::{
    db::saved::SavedList,
    dto::{OkResponse, SavedStatus},
    errors::ApiError,
    service::{self, auth::AuthUser},
    PGPool,
};

async fn list(
    AuthUser(user): AuthUser,
    list: web::Data<SavedList>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let rows = service::saved::list(**list, user.user_id, pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(rows))
}

async fn status(
    AuthUser(user): AuthUser,
    list: web::Data<SavedList>,
    event_id: web::Path<Uuid>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let saved = service::saved::contains(**list, user.user_id, event_id.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(SavedStatus { saved }))
}

async fn add(
    AuthUser(user): AuthUser,
    list: web::Data<SavedList>,
    event_id: web::Path<Uuid>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    service::saved::add(**list, user.user_id, event_id.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(OkResponse::ok()))
}

async fn remove(
    AuthUser(user): AuthUser,
    list: web::Data<SavedList>,
    event_id: web::Path<Uuid>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    service::saved::remove(**list, user.user_id, event_id.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(OkResponse::ok()))
}

fn scope(path: &str, list_kind: SavedList) -> actix_web::Scope {
    web::scope(path)
        .app_data(web::Data::new(list_kind))
        .route("", web::get().to(list))
        .route("/{event_id}", web::get().to(status))
        .route("/{event_id}", web::post().to(add))
        .route("/{event_id}", web::delete().to(remove))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(scope("/wishlist", SavedList::Wishlist))
        .service(scope("/attendance", SavedList::Attendance));
}
