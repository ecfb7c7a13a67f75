use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Partyer,
}

impl Default for Role {
    fn default() -> Self {
        Role::Partyer
    }
}

#[derive(Debug, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub password: String,
    pub city: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub used_code_id: Option<i32>,
}

/// What `/api/me` exposes about a user.
#[derive(Debug, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub city: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub json_url: Option<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub city: String,
    pub venue: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub source_site_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub source_site: Option<Site>,
}

/// Raw `events LEFT JOIN sites` row. `start_date` is nullable in the table,
/// so rows are only turned into [`Event`]s once it is known to be present.
#[derive(Debug, FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub city: String,
    pub venue: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub source_site_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub site_id: Option<Uuid>,
    pub site_name: Option<String>,
    pub site_url: Option<String>,
    pub site_json_url: Option<String>,
    pub site_enabled: Option<bool>,
    pub site_created_at: Option<DateTime<Utc>>,
}

impl EventRow {
    pub fn into_event(self) -> Option<Event> {
        let start_date = self.start_date?;
        let source_site = match (
            self.site_id,
            self.site_name,
            self.site_url,
            self.site_enabled,
            self.site_created_at,
        ) {
            (Some(id), Some(name), Some(url), Some(enabled), Some(created_at)) => Some(Site {
                id,
                name,
                url,
                json_url: self.site_json_url,
                enabled,
                created_at,
            }),
            _ => None,
        };
        Some(Event {
            id: self.id,
            title: self.title,
            description: self.description,
            category: self.category,
            city: self.city,
            venue: self.venue,
            start_date,
            end_date: self.end_date,
            url: self.url,
            image_url: self.image_url,
            source_site_id: self.source_site_id,
            created_at: self.created_at,
            source_site,
        })
    }
}

/// A wishlist or attendance row together with the event it points at.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedEntry {
    pub id: i32,
    pub user_id: i32,
    pub event_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub event: Event,
}

#[derive(Debug, FromRow)]
pub struct SavedRow {
    pub entry_id: i32,
    pub entry_user_id: i32,
    pub entry_created_at: DateTime<Utc>,
    #[sqlx(flatten)]
    pub event: EventRow,
}

impl SavedRow {
    pub fn into_entry(self) -> Option<SavedEntry> {
        let event = self.event.into_event()?;
        Some(SavedEntry {
            id: self.entry_id,
            user_id: self.entry_user_id,
            event_id: event.id,
            created_at: self.entry_created_at,
            event,
        })
    }
}

#[derive(Debug, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: i32,
    pub user_id: i32,
    pub image_url: String,
    pub caption: Option<String>,
    pub event_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct AdminInviteCode {
    pub id: i32,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub used_at: Option<DateTime<Utc>>,
    pub used_by_id: Option<i32>,
    pub created_by_id: Option<i32>,
}

impl AdminInviteCode {
    /// A code can be redeemed while it is unused and not past its expiry.
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        self.used_at.is_none() && self.expires_at.map_or(true, |exp| exp > now)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteCodeView {
    pub id: i32,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub used_at: Option<DateTime<Utc>>,
    pub used_by: Option<UserSummary>,
    pub created_by: Option<UserSummary>,
}

#[derive(Debug, FromRow)]
pub struct InviteCodeRow {
    pub id: i32,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub used_at: Option<DateTime<Utc>>,
    pub used_by_id: Option<i32>,
    pub used_by_email: Option<String>,
    pub used_by_username: Option<String>,
    pub used_by_role: Option<Role>,
    pub created_by_id: Option<i32>,
    pub created_by_email: Option<String>,
    pub created_by_username: Option<String>,
    pub created_by_role: Option<Role>,
}

fn summary(
    id: Option<i32>,
    email: Option<String>,
    username: Option<String>,
    role: Option<Role>,
) -> Option<UserSummary> {
    Some(UserSummary {
        id: id?,
        email: email?,
        username: username?,
        role: role?,
    })
}

impl From<InviteCodeRow> for InviteCodeView {
    fn from(row: InviteCodeRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            created_at: row.created_at,
            expires_at: row.expires_at,
            used_at: row.used_at,
            used_by: summary(
                row.used_by_id,
                row.used_by_email,
                row.used_by_username,
                row.used_by_role,
            ),
            created_by: summary(
                row.created_by_id,
                row.created_by_email,
                row.created_by_username,
                row.created_by_role,
            ),
        }
    }
}
