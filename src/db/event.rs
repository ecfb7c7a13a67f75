use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    models::{Event, EventRow},
    PGPool,
};

pub const PUBLIC_LIMIT: i64 = 200;
pub const ADMIN_LIMIT: i64 = 500;

pub(crate) const EVENT_COLUMNS: &str = "e.id, e.title, e.description, e.category, e.city, e.venue, \
    e.start_date, e.end_date, e.url, e.image_url, e.source_site_id, e.created_at, \
    s.id AS site_id, s.name AS site_name, s.url AS site_url, s.json_url AS site_json_url, \
    s.enabled AS site_enabled, s.created_at AS site_created_at";

/// Optional predicates for listing events. `None` means "don't filter".
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EventFilter {
    pub q: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
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
}

/// Column changes for a partial update. The outer `Option` is "touch this
/// column", the inner one (where present) is the nullable value.
#[derive(Debug, Default, Clone)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<Option<String>>,
    pub city: Option<String>,
    pub venue: Option<Option<String>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub url: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub source_site_id: Option<Option<Uuid>>,
}

/// Case-insensitive substring pattern; `%`, `_` and `\` in the input match literally.
pub fn like_pattern(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

pub fn list_query(filter: &EventFilter, limit: i64) -> QueryBuilder<'static, Postgres> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
    qb.push(EVENT_COLUMNS);
    qb.push(" FROM events e LEFT JOIN sites s ON s.id = e.source_site_id");
    // legacy rows without a start date are never surfaced
    qb.push(" WHERE e.start_date IS NOT NULL");

    if let Some(city) = &filter.city {
        qb.push(" AND e.city ILIKE ").push_bind(like_pattern(city));
    }
    if let Some(category) = &filter.category {
        qb.push(" AND e.category ILIKE ").push_bind(like_pattern(category));
    }
    if let Some(q) = &filter.q {
        let pattern = like_pattern(q);
        qb.push(" AND (e.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR e.venue ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(from) = filter.date_from {
        qb.push(" AND e.start_date >= ").push_bind(from);
    }
    if let Some(to) = filter.date_to {
        qb.push(" AND e.start_date <= ").push_bind(to);
    }

    qb.push(" ORDER BY e.start_date ASC LIMIT ").push_bind(limit);
    qb
}

pub async fn list(filter: &EventFilter, limit: i64, pool: &PGPool) -> Result<Vec<Event>, sqlx::Error> {
    let mut qb = list_query(filter, limit);
    let rows = qb
        .build_query_as::<EventRow>()
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().filter_map(EventRow::into_event).collect())
}

pub async fn get_by_id(id: Uuid, pool: &PGPool) -> Result<Option<Event>, sqlx::Error> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM events e LEFT JOIN sites s ON s.id = e.source_site_id \
         WHERE e.id = $1 AND e.start_date IS NOT NULL"
    );
    let row = sqlx::query_as::<_, EventRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.and_then(EventRow::into_event))
}

pub async fn create(id: Uuid, event: NewEvent, pool: &PGPool) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO events (id, title, description, category, city, venue, start_date, end_date, url, image_url, source_site_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(id)
    .bind(event.title)
    .bind(event.description)
    .bind(event.category)
    .bind(event.city)
    .bind(event.venue)
    .bind(event.start_date)
    .bind(event.end_date)
    .bind(event.url)
    .bind(event.image_url)
    .bind(event.source_site_id)
    .execute(pool)
    .await?;
    Ok(res.rows_affected())
}

/// `None` when there is nothing to change.
pub fn update_query(id: Uuid, changes: EventChanges) -> Option<QueryBuilder<'static, Postgres>> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE events SET ");
    let mut touched = 0;
    let sets_start_date = changes.start_date.is_some();
    {
        let mut set = qb.separated(", ");
        if let Some(v) = changes.title {
            set.push("title = ").push_bind_unseparated(v);
            touched += 1;
        }
        if let Some(v) = changes.description {
            set.push("description = ").push_bind_unseparated(v);
            touched += 1;
        }
        if let Some(v) = changes.category {
            set.push("category = ").push_bind_unseparated(v);
            touched += 1;
        }
        if let Some(v) = changes.city {
            set.push("city = ").push_bind_unseparated(v);
            touched += 1;
        }
        if let Some(v) = changes.venue {
            set.push("venue = ").push_bind_unseparated(v);
            touched += 1;
        }
        if let Some(v) = changes.start_date {
            set.push("start_date = ").push_bind_unseparated(v);
            touched += 1;
        }
        if let Some(v) = changes.end_date {
            set.push("end_date = ").push_bind_unseparated(v);
            touched += 1;
        }
        if let Some(v) = changes.url {
            set.push("url = ").push_bind_unseparated(v);
            touched += 1;
        }
        if let Some(v) = changes.image_url {
            set.push("image_url = ").push_bind_unseparated(v);
            touched += 1;
        }
        if let Some(v) = changes.source_site_id {
            set.push("source_site_id = ").push_bind_unseparated(v);
            touched += 1;
        }
    }
    if touched == 0 {
        return None;
    }
    qb.push(" WHERE id = ").push_bind(id);
    // a legacy row stays hidden, and untouched, until it is given a start date
    if !sets_start_date {
        qb.push(" AND start_date IS NOT NULL");
    }
    Some(qb)
}

/// Returns whether a visible event was found. An empty change set only checks existence.
pub async fn set_fields(id: Uuid, changes: EventChanges, pool: &PGPool) -> Result<bool, sqlx::Error> {
    match update_query(id, changes) {
        Some(mut qb) => {
            let res = qb.build().execute(pool).await?;
            Ok(res.rows_affected() > 0)
        }
        None => exists(id, pool).await,
    }
}

pub async fn exists(id: Uuid, pool: &PGPool) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM events WHERE id = $1 AND start_date IS NOT NULL)",
    )
        .bind(id)
        .fetch_one(pool)
        .await
}

/// Deletes the event and every row pointing at it in one transaction.
/// Returns `false` (and rolls back) when the event does not exist.
pub async fn delete_cascade(id: Uuid, pool: &PGPool) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;
    for sql in [
        "DELETE FROM wishlists WHERE event_id = $1",
        "DELETE FROM attendances WHERE event_id = $1",
        "DELETE FROM photos WHERE event_id = $1",
    ] {
        sqlx::query(sql).bind(id).execute(&mut *tx).await?;
    }
    let res = sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if res.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }
    tx.commit().await?;
    Ok(true)
}

pub async fn cities(pool: &PGPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT city FROM events WHERE btrim(city) <> '' ORDER BY city ASC",
    )
    .fetch_all(pool)
    .await
}

pub async fn fill_missing_start_dates(pool: &PGPool) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("UPDATE events SET start_date = NOW() WHERE start_date IS NULL")
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Inserts unless an event with the same title already exists.
pub async fn insert_if_title_absent(event: NewEvent, pool: &PGPool) -> Result<bool, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO events (id, title, category, city, venue, start_date) \
         SELECT $1, $2, $3, $4, $5, $6 \
         WHERE NOT EXISTS (SELECT 1 FROM events WHERE title = $2)",
    )
    .bind(Uuid::new_v4())
    .bind(event.title)
    .bind(event.category)
    .bind(event.city)
    .bind(event.venue)
    .bind(event.start_date)
    .execute(pool)
    .await?;
    Ok(res.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    use crate::db::{fixtures, saved::{self, SavedList}};

    #[test]
    fn empty_filter_still_hides_legacy_rows() {
        let qb = list_query(&EventFilter::default(), PUBLIC_LIMIT);
        let sql = qb.sql();
        assert!(sql.contains("WHERE e.start_date IS NOT NULL ORDER BY e.start_date ASC LIMIT $1"));
    }

    #[test]
    fn every_filter_is_bound_not_interpolated() {
        let filter = EventFilter {
            q: Some("rock'; DROP TABLE events; --".to_string()),
            category: Some("Muzica".to_string()),
            city: Some("Cluj".to_string()),
            date_from: Some(Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap()),
            date_to: Some(Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap()),
        };
        let qb = list_query(&filter, ADMIN_LIMIT);
        let sql = qb.sql();
        assert!(!sql.contains("DROP TABLE"));
        assert!(sql.contains("e.start_date IS NOT NULL"));
        assert!(sql.contains("AND e.city ILIKE $1"));
        assert!(sql.contains("AND e.category ILIKE $2"));
        assert!(sql.contains("AND (e.title ILIKE $3 OR e.venue ILIKE $4)"));
        assert!(sql.contains("AND e.start_date >= $5"));
        assert!(sql.contains("AND e.start_date <= $6"));
        assert!(sql.ends_with("LIMIT $7"));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!("%Cluj%", like_pattern("Cluj"));
        assert_eq!("%100\\%%", like_pattern("100%"));
        assert_eq!("%a\\_b%", like_pattern("a_b"));
    }

    #[test]
    fn update_query_only_sets_given_columns() {
        let id = Uuid::new_v4();
        let changes = EventChanges {
            title: Some("Stand-up".to_string()),
            venue: Some(None),
            ..Default::default()
        };
        let qb = update_query(id, changes).unwrap();
        assert_eq!(
            "UPDATE events SET title = $1, venue = $2 WHERE id = $3 AND start_date IS NOT NULL",
            qb.sql()
        );
    }

    #[test]
    fn update_query_setting_start_date_reaches_legacy_rows() {
        let changes = EventChanges {
            start_date: Some(Utc.with_ymd_and_hms(2025, 12, 5, 20, 0, 0).unwrap()),
            ..Default::default()
        };
        let qb = update_query(Uuid::new_v4(), changes).unwrap();
        assert_eq!("UPDATE events SET start_date = $1 WHERE id = $2", qb.sql());
    }

    #[test]
    fn update_query_is_none_without_changes() {
        assert!(update_query(Uuid::new_v4(), EventChanges::default()).is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn legacy_rows_are_never_listed(pool: PGPool) {
        let dated = fixtures::event("Concert Rock", Some(Utc::now()), &pool).await;
        let legacy = fixtures::event("Concert Vechi", None, &pool).await;

        for limit in [PUBLIC_LIMIT, ADMIN_LIMIT] {
            let events = list(&EventFilter::default(), limit, &pool).await.unwrap();
            let ids: Vec<Uuid> = events.iter().map(|e| e.id).collect();
            assert_eq!(vec![dated], ids);
        }
        let filter = EventFilter { q: Some("Concert".to_string()), ..Default::default() };
        assert_eq!(1, list(&filter, ADMIN_LIMIT, &pool).await.unwrap().len());
        assert!(get_by_id(legacy, &pool).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn listing_is_ordered_and_filtered_by_date(pool: PGPool) {
        let now = Utc::now();
        let later = fixtures::event("Stand-up", Some(now + Duration::days(2)), &pool).await;
        let sooner = fixtures::event("Concert Rock", Some(now + Duration::days(1)), &pool).await;
        fixtures::event("Târg", Some(now - Duration::days(3)), &pool).await;

        let filter = EventFilter { date_from: Some(now), ..Default::default() };
        let ids: Vec<Uuid> = list(&filter, PUBLIC_LIMIT, &pool)
            .await
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(vec![sooner, later], ids);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn updating_a_legacy_row_writes_nothing_without_a_start_date(pool: PGPool) {
        let legacy = fixtures::event("Concert Vechi", None, &pool).await;

        let rename = EventChanges { title: Some("Concert Nou".to_string()), ..Default::default() };
        assert!(!set_fields(legacy, rename, &pool).await.unwrap());
        assert!(!set_fields(legacy, EventChanges::default(), &pool).await.unwrap());
        let title = sqlx::query_scalar::<_, String>("SELECT title FROM events WHERE id = $1")
            .bind(legacy)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!("Concert Vechi", title);

        let dated = EventChanges {
            title: Some("Concert Nou".to_string()),
            start_date: Some(Utc::now()),
            ..Default::default()
        };
        assert!(set_fields(legacy, dated, &pool).await.unwrap());
        assert_eq!("Concert Nou", get_by_id(legacy, &pool).await.unwrap().unwrap().title);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn delete_removes_dependent_rows(pool: PGPool) {
        let ana = fixtures::user("ana", &pool).await;
        let event = fixtures::event("Concert Rock", Some(Utc::now()), &pool).await;
        let other = fixtures::event("Stand-up", Some(Utc::now()), &pool).await;
        saved::add(SavedList::Wishlist, ana, event, &pool).await.unwrap();
        saved::add(SavedList::Attendance, ana, event, &pool).await.unwrap();
        saved::add(SavedList::Wishlist, ana, other, &pool).await.unwrap();
        crate::db::photo::create(ana, "data:image/png;base64,AAAA".to_string(), None, Some(event), &pool)
            .await
            .unwrap();

        assert!(delete_cascade(event, &pool).await.unwrap());

        assert_eq!(0, fixtures::count("SELECT COUNT(*) FROM events WHERE title = 'Concert Rock'", &pool).await);
        assert_eq!(1, fixtures::count("SELECT COUNT(*) FROM wishlists", &pool).await);
        assert_eq!(0, fixtures::count("SELECT COUNT(*) FROM attendances", &pool).await);
        assert_eq!(0, fixtures::count("SELECT COUNT(*) FROM photos", &pool).await);
        assert!(!delete_cascade(event, &pool).await.unwrap());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn fix_start_dates_brings_legacy_rows_back(pool: PGPool) {
        let legacy = fixtures::event("Concert Vechi", None, &pool).await;
        assert_eq!(1, fill_missing_start_dates(&pool).await.unwrap());
        assert!(get_by_id(legacy, &pool).await.unwrap().is_some());
        assert_eq!(0, fill_missing_start_dates(&pool).await.unwrap());
    }
}
