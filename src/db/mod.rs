pub mod event;
pub mod invite_code;
pub mod photo;
pub mod saved;
pub mod site;
pub mod user;

use crate::PGPool;
use log::info;
use sqlx::postgres::PgPoolOptions;

pub async fn init_db_pool(db_url: &str) -> Result<PGPool, sqlx::Error> {
    let pool: PGPool = PgPoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;
    info!("connected to postgresql");
    Ok(pool)
}

pub async fn migrate(pool: &PGPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("database schema is up to date");
    Ok(())
}
