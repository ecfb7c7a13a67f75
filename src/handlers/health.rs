use actix_web::{get, HttpResponse};

use crate::dto::OkResponse;

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(OkResponse::ok())
}
