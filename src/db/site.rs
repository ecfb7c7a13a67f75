use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{models::Site, PGPool};

#[derive(Debug, Default, Clone)]
pub struct SiteChanges {
    pub name: Option<String>,
    pub url: Option<String>,
    pub json_url: Option<Option<String>>,
    pub enabled: Option<bool>,
}

pub async fn list(pool: &PGPool) -> Result<Vec<Site>, sqlx::Error> {
    sqlx::query_as::<_, Site>("SELECT * FROM sites ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

pub async fn create(
    name: String,
    url: String,
    json_url: Option<String>,
    enabled: bool,
    pool: &PGPool,
) -> Result<Site, sqlx::Error> {
    sqlx::query_as::<_, Site>(
        "INSERT INTO sites (id, name, url, json_url, enabled) VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(url)
    .bind(json_url)
    .bind(enabled)
    .fetch_one(pool)
    .await
}

pub fn update_query(id: Uuid, changes: SiteChanges) -> QueryBuilder<'static, Postgres> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE sites SET ");
    {
        let mut set = qb.separated(", ");
        // keeps the statement valid when nothing changes
        set.push("id = id");
        if let Some(v) = changes.name {
            set.push("name = ").push_bind_unseparated(v);
        }
        if let Some(v) = changes.url {
            set.push("url = ").push_bind_unseparated(v);
        }
        if let Some(v) = changes.json_url {
            set.push("json_url = ").push_bind_unseparated(v);
        }
        if let Some(v) = changes.enabled {
            set.push("enabled = ").push_bind_unseparated(v);
        }
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" RETURNING *");
    qb
}

pub async fn update(id: Uuid, changes: SiteChanges, pool: &PGPool) -> Result<Option<Site>, sqlx::Error> {
    let mut qb = update_query(id, changes);
    qb.build_query_as::<Site>().fetch_optional(pool).await
}

pub async fn delete(id: Uuid, pool: &PGPool) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("DELETE FROM sites WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}
