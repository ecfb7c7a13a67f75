use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use crate::{
    dto::CreatedCode,
    models::{AdminInviteCode, InviteCodeRow, InviteCodeView},
    PGPool,
};

pub const LIST_LIMIT: i64 = 200;

pub async fn find_by_code(code: &str, pool: &PGPool) -> Result<Option<AdminInviteCode>, sqlx::Error> {
    sqlx::query_as::<_, AdminInviteCode>("SELECT * FROM admin_invite_codes WHERE code = $1")
        .bind(code)
        .fetch_optional(pool)
        .await
}

/// Marks the code used by `user_id`. Only succeeds (returns `true`) if the code
/// is still redeemable at the time of the write, so a code is consumed once.
pub async fn consume<'e, E>(id: i32, user_id: i32, executor: E) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let res = sqlx::query(
        "UPDATE admin_invite_codes SET used_at = NOW(), used_by_id = $1 \
         WHERE id = $2 AND used_at IS NULL AND (expires_at IS NULL OR expires_at > NOW())",
    )
    .bind(user_id)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(res.rows_affected() == 1)
}

/// `None` when the code collides with an existing one.
pub async fn insert(
    code: &str,
    created_by: i32,
    expires_at: Option<DateTime<Utc>>,
    pool: &PGPool,
) -> Result<Option<CreatedCode>, sqlx::Error> {
    sqlx::query_as::<_, CreatedCode>(
        "INSERT INTO admin_invite_codes (code, created_by_id, expires_at) VALUES ($1, $2, $3) \
         ON CONFLICT (code) DO NOTHING RETURNING id, code",
    )
    .bind(code)
    .bind(created_by)
    .bind(expires_at)
    .fetch_optional(pool)
    .await
}

pub async fn list(pool: &PGPool) -> Result<Vec<InviteCodeView>, sqlx::Error> {
    let rows = sqlx::query_as::<_, InviteCodeRow>(
        "SELECT c.id, c.code, c.created_at, c.expires_at, c.used_at, \
         u.id AS used_by_id, u.email AS used_by_email, u.username AS used_by_username, u.role AS used_by_role, \
         cb.id AS created_by_id, cb.email AS created_by_email, cb.username AS created_by_username, cb.role AS created_by_role \
         FROM admin_invite_codes c \
         LEFT JOIN users u ON u.id = c.used_by_id \
         LEFT JOIN users cb ON cb.id = c.created_by_id \
         ORDER BY c.created_at DESC LIMIT $1",
    )
    .bind(LIST_LIMIT)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(InviteCodeView::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::db::fixtures;

    #[sqlx::test(migrations = "./migrations")]
    async fn a_code_is_consumed_once(pool: PGPool) {
        let admin = fixtures::user("admin", &pool).await;
        let ana = fixtures::user("ana", &pool).await;
        let ion = fixtures::user("ion", &pool).await;
        let code = insert("AB12CD34", admin, None, &pool).await.unwrap().unwrap();

        assert!(consume(code.id, ana, &pool).await.unwrap());
        assert!(!consume(code.id, ion, &pool).await.unwrap());

        let stored = find_by_code("AB12CD34", &pool).await.unwrap().unwrap();
        assert_eq!(Some(ana), stored.used_by_id);
        assert!(!stored.is_redeemable(Utc::now()));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn expired_codes_cannot_be_consumed(pool: PGPool) {
        let admin = fixtures::user("admin", &pool).await;
        let ana = fixtures::user("ana", &pool).await;
        let expired = Utc::now() - Duration::days(1);
        let code = insert("EXPIRED1", admin, Some(expired), &pool).await.unwrap().unwrap();

        assert!(!consume(code.id, ana, &pool).await.unwrap());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn duplicate_codes_are_not_inserted(pool: PGPool) {
        let admin = fixtures::user("admin", &pool).await;
        assert!(insert("SAMECODE", admin, None, &pool).await.unwrap().is_some());
        assert!(insert("SAMECODE", admin, None, &pool).await.unwrap().is_none());

        let codes = list(&pool).await.unwrap();
        assert_eq!(1, codes.len());
    }
}
