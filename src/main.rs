pub mod config;
pub mod db;
pub mod dto;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod service;

use std::io;

use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};
use config::Config;
use db::init_db_pool;
use dotenv::dotenv;
use log::{error, info};
use service::{auth::AuthMiddleware, log::LoggerMiddleware};
use sqlx::{postgres::Postgres, Pool};

type PGPool = Pool<Postgres>;

/// Any origin may call the API; the browser client sends bearer tokens, not cookies.
fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allowed_methods(["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(86400)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Serve,
    FixStartDates,
    Seed,
}

impl Command {
    fn parse(arg: Option<&str>) -> Option<Self> {
        match arg {
            None | Some("serve") => Some(Self::Serve),
            Some("fix-start-dates") => Some(Self::FixStartDates),
            Some("seed") => Some(Self::Seed),
            Some(_) => None,
        }
    }
}

fn io_error(err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    service::log::init_logger();

    let arg = std::env::args().nth(1);
    let command = Command::parse(arg.as_deref()).ok_or_else(|| {
        let arg = arg.unwrap_or_default();
        error!("unknown command '{}', expected serve, fix-start-dates or seed", arg);
        io::Error::new(io::ErrorKind::InvalidInput, format!("unknown command '{arg}'"))
    })?;

    let config = Config::from_env().map_err(io_error)?;
    let pool: PGPool = init_db_pool(&config.database_url).await.map_err(io_error)?;
    db::migrate(&pool).await.map_err(io_error)?;

    match command {
        Command::FixStartDates => {
            service::maintenance::fix_start_dates(&pool).await.map_err(io_error)?;
            return Ok(());
        }
        Command::Seed => {
            service::maintenance::seed(&pool).await.map_err(io_error)?;
            return Ok(());
        }
        Command::Serve => {}
    }

    let addr = (config.host.clone(), config.port);
    info!("listening on http://{}:{}", addr.0, addr.1);

    let secret = config.jwt_secret.clone();
    let config = web::Data::new(config);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(config.clone())
            .configure(handlers::init_extractors)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware {
                        secret: secret.clone(),
                    })
                    .configure(handlers::init_routes),
            )
            .wrap(LoggerMiddleware)
            .wrap(cors())
    })
    .bind(addr)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::Method, test as actix_test, HttpResponse};

    #[test]
    fn serve_is_the_default_command() {
        assert_eq!(Some(Command::Serve), Command::parse(None));
        assert_eq!(Some(Command::Serve), Command::parse(Some("serve")));
        assert_eq!(Some(Command::FixStartDates), Command::parse(Some("fix-start-dates")));
        assert_eq!(Some(Command::Seed), Command::parse(Some("seed")));
        assert_eq!(None, Command::parse(Some("migrate")));
    }

    #[actix_rt::test]
    async fn preflight_is_answered_by_cors() {
        let app = actix_test::init_service(
            App::new()
                .wrap(cors())
                .route("/api/events", web::post().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;
        let req = actix_test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/api/events")
            .insert_header((header::ORIGIN, "http://localhost:5173"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization, content-type"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        assert_eq!("*", resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap());
        let allowed = resp
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
            .unwrap()
            .to_str()
            .unwrap()
            .to_ascii_lowercase();
        assert!(allowed.contains("authorization"));
        assert!(allowed.contains("content-type"));
    }

    #[actix_rt::test]
    async fn regular_responses_allow_any_origin() {
        let app = actix_test::init_service(
            App::new()
                .wrap(cors())
                .route("/api/health", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;
        let req = actix_test::TestRequest::get()
            .uri("/api/health")
            .insert_header((header::ORIGIN, "https://events.example.ro"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!("*", resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap());
    }
}
