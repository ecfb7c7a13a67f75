use sqlx::PgExecutor;

use crate::{
    models::{Profile, Role, User},
    PGPool,
};

pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub city: Option<String>,
    pub role: Role,
}

pub async fn create<'e, E>(user: NewUser, executor: E) -> Result<User, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, User>(
        "INSERT INTO users (email, username, password, city, role) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(user.email)
    .bind(user.username)
    .bind(user.password_hash)
    .bind(user.city)
    .bind(user.role)
    .fetch_one(executor)
    .await
}

pub async fn get_by_email(email: &str, pool: &PGPool) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn email_taken(email: &str, pool: &PGPool) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await
}

pub async fn username_taken(username: &str, pool: &PGPool) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
        .bind(username)
        .fetch_one(pool)
        .await
}

pub async fn get_profile(id: i32, pool: &PGPool) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>(
        "SELECT id, email, username, city, role, created_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn set_used_code<'e, E>(id: i32, code_id: i32, executor: E) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let res = sqlx::query("UPDATE users SET used_code_id = $1, updated_at = NOW() WHERE id = $2")
        .bind(code_id)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}
