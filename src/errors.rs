use actix_web::{
    error::{self, JsonPayloadError, PathError, QueryPayloadError},
    http::StatusCode,
    HttpRequest, HttpResponse,
};
use derive_more::{Display, Error};
use log::error;
use serde_json::json;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Display, Error)]
pub enum ApiError {
    #[display(fmt = "internal error")]
    InternalError,

    #[display(fmt = "{}", _0)]
    BadRequest(#[error(not(source))] String),

    #[display(fmt = "Invalid input")]
    Validation(#[error(not(source))] serde_json::Value),

    #[display(fmt = "Missing token")]
    MissingToken,

    #[display(fmt = "Invalid token")]
    InvalidToken,

    #[display(fmt = "Admin only")]
    Forbidden,

    #[display(fmt = "{}", _0)]
    NotFound(#[error(not(source))] String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{what} not found"))
    }

    /// Field-level detail for a single offending input.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        ApiError::Validation(json!({ field: [{ "code": "invalid", "message": message.into() }] }))
    }
}

impl error::ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Validation(details) => json!({ "error": self.to_string(), "details": details }),
            _ => json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            ApiError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingToken => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Not found".to_string()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => ApiError::bad_request("Already exists"),
                Some(FOREIGN_KEY_VIOLATION) => ApiError::NotFound("Referenced record not found".to_string()),
                _ => {
                    error!("database error: {:?}", err);
                    ApiError::InternalError
                }
            },
            _ => {
                error!("database error: {:?}", err);
                ApiError::InternalError
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errs: validator::ValidationErrors) -> Self {
        ApiError::Validation(serde_json::to_value(&errs).unwrap_or_default())
    }
}

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(json!({ "body": [{ "code": "json", "message": err.to_string() }] })).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(json!({ "query": [{ "code": "query", "message": err.to_string() }] })).into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(json!({ "path": [{ "code": "path", "message": err.to_string() }] })).into()
}
