use actix_web::{web, HttpResponse};
use log::info;

use crate::{
    config::Config,
    dto::{LoginRequest, RegisterRequest},
    errors::ApiError,
    service::{self, auth::AuthUser},
    PGPool,
};

/// Served on both `/register` and `/signup`.
pub async fn register(
    dto: web::Json<RegisterRequest>,
    config: web::Data<Config>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let conn: &PGPool = pool_state.get_ref();
    let response = service::user::register(dto.into_inner(), config.get_ref(), conn).await?;
    info!("RESPONSE /REGISTER: user {}", response.user_id);
    Ok(HttpResponse::Ok().json(response))
}

pub async fn login(
    dto: web::Json<LoginRequest>,
    config: web::Data<Config>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let conn: &PGPool = pool_state.get_ref();
    let response = service::user::login(dto.into_inner(), config.get_ref(), conn).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn me(AuthUser(user): AuthUser, pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
    let profile = service::user::me(user.user_id, pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/register", web::post().to(register))
        .route("/signup", web::post().to(register))
        .route("/login", web::post().to(login))
        .route("/me", web::get().to(me));
}
