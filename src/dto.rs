use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{errors::ApiError, models::Role};

/// Tells an omitted field (`None`) apart from an explicit `null` (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Must be a valid email address."))]
    pub email: String,
    #[validate(length(min = 6, message = "Must be at least 6 characters."))]
    pub password: String,
    #[validate(length(min = 2, message = "Must be at least 2 characters."))]
    pub username: String,
    pub city: Option<String>,
    pub role: Option<Role>,
    pub admin_code: Option<String>,
}

#[derive(Debug, Deserialize, Validate, Clone)]
pub struct LoginRequest {
    #[validate(email(message = "Must be a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "Must not be empty."))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user_id: i32,
    pub role: Role,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Claims {
    pub id: i32,
    pub email: String,
    pub role: Role,
    pub username: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EventQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Debug, Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewEventDto {
    #[validate(length(min = 2, message = "Must be at least 2 characters."))]
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    #[validate(length(min = 2, message = "Must be at least 2 characters."))]
    pub city: String,
    pub venue: Option<String>,
    #[validate(length(min = 1, message = "Must not be empty."))]
    pub start_date: String,
    pub end_date: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub source_site_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventDto {
    #[validate(length(min = 2, message = "Must be at least 2 characters."))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    #[validate(length(min = 2, message = "Must be at least 2 characters."))]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub venue: Option<Option<String>>,
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub source_site_id: Option<Option<Uuid>>,
}

#[derive(Debug, Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewPhotoDto {
    #[validate(length(min = 3, message = "Must be at least 3 characters."))]
    pub image_url: String,
    pub caption: Option<String>,
    pub event_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewSiteDto {
    #[validate(length(min = 2, message = "Must be at least 2 characters."))]
    pub name: String,
    #[validate(length(min = 3, message = "Must be at least 3 characters."))]
    pub url: String,
    pub json_url: Option<String>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSiteDto {
    #[validate(length(min = 2, message = "Must be at least 2 characters."))]
    pub name: Option<String>,
    #[validate(length(min = 3, message = "Must be at least 3 characters."))]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub json_url: Option<Option<String>>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewInviteCodesDto {
    #[validate(range(min = 1, max = 50, message = "Must be between 1 and 50."))]
    pub count: Option<u32>,
    #[validate(range(min = 1, max = 365, message = "Must be between 1 and 365."))]
    pub expires_in_days: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct CreatedCode {
    pub id: i32,
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedCodes {
    pub created: Vec<CreatedCode>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SavedStatus {
    pub saved: bool,
}

/// Trims a query value; blank values count as absent.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` (read as UTC) or a bare date
/// (midnight UTC).
pub fn parse_datetime(field: &str, value: &str) -> Result<DateTime<Utc>, ApiError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    Err(ApiError::invalid_field(field, format!("'{value}' is not a valid date")))
}
