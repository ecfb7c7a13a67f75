use uuid::Uuid;

use crate::{
    db::event::EVENT_COLUMNS,
    models::{SavedEntry, SavedRow},
    PGPool,
};

/// The two per-user event lists. Both have the same shape and a unique
/// `(user_id, event_id)` constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavedList {
    Wishlist,
    Attendance,
}

impl SavedList {
    pub fn table(self) -> &'static str {
        match self {
            SavedList::Wishlist => "wishlists",
            SavedList::Attendance => "attendances",
        }
    }

    pub fn add_sql(self) -> String {
        format!(
            "INSERT INTO {} (user_id, event_id) VALUES ($1, $2) ON CONFLICT (user_id, event_id) DO NOTHING",
            self.table()
        )
    }

    pub fn list_sql(self) -> String {
        format!(
            "SELECT l.id AS entry_id, l.user_id AS entry_user_id, l.created_at AS entry_created_at, {EVENT_COLUMNS} \
             FROM {} l JOIN events e ON e.id = l.event_id \
             LEFT JOIN sites s ON s.id = e.source_site_id \
             WHERE l.user_id = $1 AND e.start_date IS NOT NULL \
             ORDER BY l.created_at DESC",
            self.table()
        )
    }
}

/// Returns the number of inserted rows: 0 when the pair was already there.
pub async fn add(list: SavedList, user_id: i32, event_id: Uuid, pool: &PGPool) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(&list.add_sql())
        .bind(user_id)
        .bind(event_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn remove(list: SavedList, user_id: i32, event_id: Uuid, pool: &PGPool) -> Result<u64, sqlx::Error> {
    let sql = format!("DELETE FROM {} WHERE user_id = $1 AND event_id = $2", list.table());
    let res = sqlx::query(&sql)
        .bind(user_id)
        .bind(event_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn contains(list: SavedList, user_id: i32, event_id: Uuid, pool: &PGPool) -> Result<bool, sqlx::Error> {
    let sql = format!(
        "SELECT EXISTS (SELECT 1 FROM {} WHERE user_id = $1 AND event_id = $2)",
        list.table()
    );
    sqlx::query_scalar::<_, bool>(&sql)
        .bind(user_id)
        .bind(event_id)
        .fetch_one(pool)
        .await
}

pub async fn list(list: SavedList, user_id: i32, pool: &PGPool) -> Result<Vec<SavedEntry>, sqlx::Error> {
    let rows = sqlx::query_as::<_, SavedRow>(&list.list_sql())
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().filter_map(SavedRow::into_entry).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::db::fixtures;

    #[test]
    fn add_is_an_idempotent_upsert() {
        let sql = SavedList::Wishlist.add_sql();
        assert!(sql.starts_with("INSERT INTO wishlists"));
        assert!(sql.ends_with("ON CONFLICT (user_id, event_id) DO NOTHING"));
    }

    #[test]
    fn listing_skips_legacy_events() {
        let sql = SavedList::Attendance.list_sql();
        assert!(sql.contains("FROM attendances l"));
        assert!(sql.contains("e.start_date IS NOT NULL"));
        assert!(sql.contains("ORDER BY l.created_at DESC"));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn saving_twice_keeps_one_row(pool: PGPool) {
        let ana = fixtures::user("ana", &pool).await;
        let event = fixtures::event("Concert Rock", Some(Utc::now()), &pool).await;

        assert_eq!(1, add(SavedList::Wishlist, ana, event, &pool).await.unwrap());
        assert_eq!(0, add(SavedList::Wishlist, ana, event, &pool).await.unwrap());

        let saved = list(SavedList::Wishlist, ana, &pool).await.unwrap();
        assert_eq!(1, saved.len());
        assert!(contains(SavedList::Wishlist, ana, event, &pool).await.unwrap());
        assert!(!contains(SavedList::Attendance, ana, event, &pool).await.unwrap());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn removing_an_unsaved_event_is_a_no_op(pool: PGPool) {
        let ana = fixtures::user("ana", &pool).await;
        let event = fixtures::event("Stand-up", Some(Utc::now()), &pool).await;

        assert_eq!(0, remove(SavedList::Attendance, ana, event, &pool).await.unwrap());
        add(SavedList::Attendance, ana, event, &pool).await.unwrap();
        assert_eq!(1, remove(SavedList::Attendance, ana, event, &pool).await.unwrap());
        assert!(list(SavedList::Attendance, ana, &pool).await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn saved_legacy_events_are_not_listed(pool: PGPool) {
        let ana = fixtures::user("ana", &pool).await;
        let legacy = fixtures::event("Old import", None, &pool).await;
        let dated = fixtures::event("Târg de Crăciun", Some(Utc::now()), &pool).await;
        add(SavedList::Wishlist, ana, legacy, &pool).await.unwrap();
        add(SavedList::Wishlist, ana, dated, &pool).await.unwrap();

        let saved = list(SavedList::Wishlist, ana, &pool).await.unwrap();
        assert_eq!(1, saved.len());
        assert_eq!(dated, saved[0].event.id);
    }
}
