use env_logger::{Builder, Env};
use log::{Level, info};
use std::io::Write;
use std::future::{ready, Ready};
use std::time::Instant;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures_util::future::LocalBoxFuture;

/// Logs one line per request: method, path, status and elapsed time.
pub struct LoggerMiddleware;

impl<S, B> Transform<S, ServiceRequest> for LoggerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggerMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggerMiddlewareService { service }))
    }
}

pub struct LoggerMiddlewareService<S> {
    service: S
}

impl<S, B> Service<ServiceRequest> for LoggerMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let started = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_string();
        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            info!(
                "{} {} -> {} ({} ms)",
                method,
                path,
                res.status().as_u16(),
                started.elapsed().as_millis()
            );
            Ok(res)
        })
    }
}

pub fn init_logger() {
    Builder::from_env(Env::default().default_filter_or("info"))
    .format(|buf, record| {
        let color_level = match record.level() {
            Level::Error => "\x1b[31;1m",
            Level::Warn => "\x1b[33;1m",
            Level::Info => "\x1b[32;1m",
            Level::Debug => "\x1b[34;1m",
            Level::Trace => "\x1b[35;1m",
        };
        writeln!(buf, "{}{} [{}] - {}\x1b[0m", color_level, record.level(), record.target(), record.args())
    })
    .init()
}
