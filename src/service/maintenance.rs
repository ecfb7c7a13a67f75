use chrono::{NaiveDate, Utc};
use log::info;

use crate::{db::{self, event::NewEvent}, PGPool};

/// Gives legacy events a start date so they show up again.
pub async fn fix_start_dates(pool: &PGPool) -> Result<u64, sqlx::Error> {
    let updated = db::event::fill_missing_start_dates(pool).await?;
    info!("updated rows: {}", updated);
    Ok(updated)
}

pub fn sample_events() -> Vec<NewEvent> {
    [
        ("Concert Rock", "Cluj", (2025, 12, 5), "Muzică", "Form Space"),
        ("Stand-up", "București", (2025, 12, 6), "Comedie", "Sala Gloria"),
        ("Târg de Crăciun", "Brașov", (2025, 12, 7), "Târg", "Piața Sfatului"),
    ]
    .into_iter()
    .map(|(title, city, (y, m, d), category, venue)| NewEvent {
        title: title.to_string(),
        description: None,
        category: Some(category.to_string()),
        city: city.to_string(),
        venue: Some(venue.to_string()),
        start_date: NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now),
        end_date: None,
        url: None,
        image_url: None,
        source_site_id: None,
    })
    .collect()
}

pub async fn seed(pool: &PGPool) -> Result<usize, sqlx::Error> {
    let mut inserted = 0;
    for event in sample_events() {
        if db::event::insert_if_title_absent(event, pool).await? {
            inserted += 1;
        }
    }
    info!("seed OK, {} new event(s)", inserted);
    Ok(inserted)
}
