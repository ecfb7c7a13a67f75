use actix_web::{get, post, web, HttpResponse};

use crate::{dto::NewPhotoDto, errors::ApiError, service::{self, auth::AuthUser}, PGPool};

#[get("/photos")]
pub async fn list(AuthUser(user): AuthUser, pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
    let photos = service::photo::list(user.user_id, pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(photos))
}

#[post("/photos")]
pub async fn create(
    AuthUser(user): AuthUser,
    dto: web::Json<NewPhotoDto>,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let photo = service::photo::create(user.user_id, dto.into_inner(), pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(photo))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list).service(create);
}
