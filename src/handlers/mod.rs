pub mod auth;
pub mod event;
pub mod health;
pub mod importer;
pub mod invite_code;
pub mod photo;
pub mod saved;
pub mod site;

use actix_web::web;

use crate::errors;

/// Large enough for base64-encoded profile photos.
pub const JSON_LIMIT: usize = 2 * 1024 * 1024;

/// Routes everything extractor failures produce through `ApiError`.
pub fn init_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT)
            .error_handler(errors::json_error_handler),
    )
    .app_data(web::QueryConfig::default().error_handler(errors::query_error_handler))
    .app_data(web::PathConfig::default().error_handler(errors::path_error_handler));
}

/// Every route below `/api`. The caller wraps the scope in `AuthMiddleware`.
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health);
    auth::init_routes(cfg);
    event::init_routes(cfg);
    saved::init_routes(cfg);
    photo::init_routes(cfg);
    site::init_routes(cfg);
    invite_code::init_routes(cfg);
    importer::init_routes(cfg);
}
