use actix_web::{post, web, HttpResponse};
use log::info;

use crate::{
    config::Config,
    service::{self, auth::AdminUser},
};

/// Blocks until the scraper exits. 200 on exit code 0, 500 otherwise.
#[post("/admin/run-import")]
pub async fn run_import(AdminUser(admin): AdminUser, config: web::Data<Config>) -> HttpResponse {
    info!("import triggered by {}", admin.username);
    let result = service::importer::run_import(&config.importer).await;
    if result.succeeded() {
        HttpResponse::Ok().json(result)
    } else {
        HttpResponse::InternalServerError().json(result)
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(run_import);
}
