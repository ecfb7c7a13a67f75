use actix_web::{get, post, web, HttpResponse};

use crate::{
    dto::NewInviteCodesDto,
    errors::ApiError,
    service::{self, auth::AdminUser},
    PGPool,
};

#[get("/admin/codes")]
pub async fn list(_admin: AdminUser, pool_state: web::Data<PGPool>) -> Result<HttpResponse, ApiError> {
    let codes = service::invite_code::list(pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(codes))
}

/// An empty body means the defaults. Anything else must be a valid
/// `NewInviteCodesDto`.
pub fn parse_body(body: &[u8]) -> Result<NewInviteCodesDto, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(NewInviteCodesDto::default());
    }
    serde_json::from_slice(body).map_err(|err| ApiError::invalid_field("body", err.to_string()))
}

#[post("/admin/codes")]
pub async fn create(
    AdminUser(admin): AdminUser,
    body: web::Bytes,
    pool_state: web::Data<PGPool>,
) -> Result<HttpResponse, ApiError> {
    let dto = parse_body(&body)?;
    let created = service::invite_code::create(admin.user_id, dto, pool_state.get_ref()).await?;
    Ok(HttpResponse::Ok().json(created))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list).service(create);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_uses_defaults() {
        let dto = parse_body(b"").unwrap();
        assert_eq!(None, dto.count);
        assert_eq!(None, dto.expires_in_days);
        assert!(parse_body(b"  \n").is_ok());
    }

    #[test]
    fn explicit_values_are_kept() {
        let dto = parse_body(br#"{"count": 3, "expiresInDays": 30}"#).unwrap();
        assert_eq!(Some(3), dto.count);
        assert_eq!(Some(30), dto.expires_in_days);
    }

    #[test]
    fn malformed_body_is_a_validation_error() {
        for body in [r#"{"count": -5}"#, r#"{"count": "abc"}"#, "not json"] {
            assert!(matches!(parse_body(body.as_bytes()), Err(ApiError::Validation(_))), "{body}");
        }
    }
}
