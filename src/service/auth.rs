use std::future::{ready, Ready};

use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use log::debug;

use crate::{dto::Claims, errors::ApiError, models::Role};

#[derive(Debug, Clone)]
pub struct UserAuthData {
    pub user_id: i32,
    pub email: String,
    pub username: String,
    pub role: Role,
}

impl From<Claims> for UserAuthData {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.id,
            email: claims.email,
            username: claims.username,
            role: claims.role,
        }
    }
}

/// Outcome of reading the bearer token, stored in the request extensions.
#[derive(Debug, Clone)]
enum Authentication {
    Missing,
    Invalid,
    Valid(UserAuthData),
}

/// Decodes the bearer token, if any, for every request in its scope. It never
/// rejects by itself; [`AuthUser`] and [`AdminUser`] decide per route.
pub struct AuthMiddleware {
    pub secret: String,
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
    where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            secret: self.secret.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    secret: String,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
    where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let auth = match jwt::parse_request(req.request(), "Bearer ") {
            None => Authentication::Missing,
            Some(token) => match jwt::decode_claims(&token, &self.secret) {
                Ok(claims) => Authentication::Valid(claims.into()),
                Err(err) => {
                    debug!("rejected bearer token: {err}");
                    Authentication::Invalid
                }
            },
        };
        req.extensions_mut().insert(auth);
        let fut = self.service.call(req);
        Box::pin(async move { fut.await })
    }
}

fn authenticate(req: &HttpRequest) -> Result<UserAuthData, ApiError> {
    match req.extensions().get::<Authentication>() {
        Some(Authentication::Valid(data)) => Ok(data.clone()),
        Some(Authentication::Invalid) => Err(ApiError::InvalidToken),
        Some(Authentication::Missing) | None => Err(ApiError::MissingToken),
    }
}

/// Any signed-in user. Rejects with 401.
pub struct AuthUser(pub UserAuthData);

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req).map(AuthUser))
    }
}

/// A signed-in user whose role claim is `ADMIN`. Rejects with 401, then 403.
pub struct AdminUser(pub UserAuthData);

impl FromRequest for AdminUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let res = authenticate(req).and_then(|data| match data.role {
            Role::Admin => Ok(AdminUser(data)),
            Role::Partyer => {
                debug!("user {} denied admin route {}", data.user_id, req.path());
                Err(ApiError::Forbidden)
            }
        });
        ready(res)
    }
}

pub mod jwt {
    use actix_web::HttpRequest;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{decode, encode, errors::Error, Algorithm, DecodingKey, EncodingKey, Header, Validation};
    use log::error;

    use crate::{dto::Claims, errors::ApiError, models::Role};

    pub const TOKEN_TTL_DAYS: i64 = 7;

    pub fn create(id: i32, email: &str, role: Role, username: &str, secret: &str) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            id,
            email: email.to_string(),
            role,
            username: username.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_ref()))
            .map_err(|err| {
                error!("token creation failed: {err}");
                ApiError::InternalError
            })
    }

    /// Checks signature and expiry.
    pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, Error> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &validation)
            .map(|data| data.claims)
    }

    /// The token after `prefix` in the `Authorization` header, if the header has that shape.
    pub fn parse_request(req: &HttpRequest, prefix: &str) -> Option<String> {
        let value = req.headers().get("Authorization")?.to_str().ok()?;
        value.strip_prefix(prefix).map(|token| token.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test as actix_test, web, App, HttpResponse};
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    async fn admin_only(AdminUser(user): AdminUser) -> HttpResponse {
        HttpResponse::Ok().body(user.username)
    }

    async fn members_only(AuthUser(user): AuthUser) -> HttpResponse {
        HttpResponse::Ok().body(user.user_id.to_string())
    }

    fn bearer(role: Role) -> String {
        let token = jwt::create(7, "ana@example.com", role, "ana", SECRET).unwrap();
        format!("Bearer {token}")
    }

    macro_rules! app {
        () => {
            actix_test::init_service(
                App::new().service(
                    web::scope("/api")
                        .wrap(AuthMiddleware { secret: SECRET.to_string() })
                        .route("/admin", web::get().to(admin_only))
                        .route("/me", web::get().to(members_only)),
                ),
            )
            .await
        };
    }

    #[test]
    fn token_round_trip_keeps_claims() {
        let token = jwt::create(3, "ion@example.com", Role::Admin, "ion", SECRET).unwrap();
        let claims = jwt::decode_claims(&token, SECRET).unwrap();
        assert_eq!(3, claims.id);
        assert_eq!("ion", claims.username);
        assert_eq!(Role::Admin, claims.role);
        let lifetime = claims.exp - claims.iat;
        assert_eq!(7 * 24 * 60 * 60, lifetime);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = jwt::create(3, "ion@example.com", Role::Admin, "ion", "other").unwrap();
        assert!(jwt::decode_claims(&token, SECRET).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            id: 1,
            email: "ana@example.com".to_string(),
            role: Role::Partyer,
            username: "ana".to_string(),
            iat: now - 8 * 24 * 60 * 60,
            exp: now - 24 * 60 * 60,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_ref())).unwrap();
        assert!(jwt::decode_claims(&token, SECRET).is_err());
    }

    #[actix_rt::test]
    async fn admin_route_without_token_is_401() {
        let app = app!();
        let req = actix_test::TestRequest::get().uri("/api/admin").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(StatusCode::UNAUTHORIZED, resp.status());
    }

    #[actix_rt::test]
    async fn admin_route_with_partyer_token_is_403() {
        let app = app!();
        let req = actix_test::TestRequest::get()
            .uri("/api/admin")
            .insert_header(("Authorization", bearer(Role::Partyer)))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(StatusCode::FORBIDDEN, resp.status());
    }

    #[actix_rt::test]
    async fn admin_route_with_admin_token_passes() {
        let app = app!();
        let req = actix_test::TestRequest::get()
            .uri("/api/admin")
            .insert_header(("Authorization", bearer(Role::Admin)))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(StatusCode::OK, resp.status());
    }

    #[actix_rt::test]
    async fn garbage_token_is_401() {
        let app = app!();
        let req = actix_test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", "Bearer not.a.jwt"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(StatusCode::UNAUTHORIZED, resp.status());
        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!("Invalid token", body["error"]);
    }

    #[actix_rt::test]
    async fn non_bearer_header_counts_as_missing() {
        let app = app!();
        let req = actix_test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", "Basic YW5hOnNlY3JldA=="))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!("Missing token", body["error"]);
    }

    #[actix_rt::test]
    async fn member_route_accepts_any_role() {
        let app = app!();
        let req = actix_test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", bearer(Role::Partyer)))
            .to_request();
        let body = actix_test::call_and_read_body(&app, req).await;
        assert_eq!(&body[..], b"7");
    }
}
