use actix_web::{delete, get, post, put, web, HttpResponse};
use uuid::Uuid;

use crate::{
    db::event::{ADMIN_LIMIT, PUBLIC_LIMIT},
    dto::{EventQuery, NewEventDto, OkResponse, UpdateEventDto},
    errors::ApiError,
    service::{self, auth::{AdminUser, AuthUser}},
    PGPool,
};

#[get("/events")]
pub async fn list(query: web::Query<EventQuery>, pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
    let events = service::event::list(&query, PUBLIC_LIMIT, pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(events))
}

#[get("/admin/events")]
pub async fn admin_list(
    _admin: AdminUser,
    query: web::Query<EventQuery>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let events = service::event::list(&query, ADMIN_LIMIT, pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(events))
}

#[get("/events/{id}")]
pub async fn get_by_id(_user: AuthUser, id: web::Path<Uuid>, pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
    let event = service::event::get_by_id(id.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(event))
}

#[post("/events")]
pub async fn create(
    _admin: AdminUser,
    new_event_dto: web::Json<NewEventDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let event = service::event::create(new_event_dto.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(event))
}

#[put("/events/{id}")]
pub async fn update(
    _admin: AdminUser,
    id: web::Path<Uuid>,
    update_event_dto: web::Json<UpdateEventDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let event = service::event::update(id.into_inner(), update_event_dto.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(event))
}

#[delete("/events/{id}")]
pub async fn delete(_admin: AdminUser, id: web::Path<Uuid>, pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
    service::event::delete(id.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(OkResponse::ok()))
}

#[get("/cities")]
pub async fn cities(pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
    let cities = service::event::cities(pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(cities))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list)
        .service(create)
        .service(get_by_id)
        .service(update)
        .service(delete)
        .service(admin_list)
        .service(cities);
}
