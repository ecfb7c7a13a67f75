use log::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{self, event::{EventChanges, EventFilter, NewEvent}},
    dto::{non_blank, parse_datetime, EventQuery, NewEventDto, UpdateEventDto},
    errors::ApiError,
    models::Event,
    PGPool,
};

pub fn build_filter(query: &EventQuery) -> Result<EventFilter, ApiError> {
    let date_from = match non_blank(query.date_from.as_deref()) {
        Some(v) => Some(parse_datetime("dateFrom", &v)?),
        None => None,
    };
    let date_to = match non_blank(query.date_to.as_deref()) {
        Some(v) => Some(parse_datetime("dateTo", &v)?),
        None => None,
    };
    Ok(EventFilter {
        q: non_blank(query.q.as_deref()),
        category: non_blank(query.category.as_deref()),
        city: non_blank(query.city.as_deref()),
        date_from,
        date_to,
    })
}

pub async fn list(query: &EventQuery, limit: i64, pool: &PGPool) -> Result<Vec<Event>, ApiError> {
    let filter = build_filter(query)?;
    Ok(db::event::list(&filter, limit, pool).await?)
}

pub async fn get_by_id(id: Uuid, pool: &PGPool) -> Result<Event, ApiError> {
    db::event::get_by_id(id, pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Event"))
}

fn optional_date(field: &str, value: Option<String>) -> Result<Option<chrono::DateTime<chrono::Utc>>, ApiError> {
    match non_blank(value.as_deref()) {
        Some(v) => parse_datetime(field, &v).map(Some),
        None => Ok(None),
    }
}

pub fn new_event(dto: NewEventDto) -> Result<NewEvent, ApiError> {
    dto.validate()?;
    Ok(NewEvent {
        start_date: parse_datetime("startDate", &dto.start_date)?,
        end_date: optional_date("endDate", dto.end_date)?,
        title: dto.title,
        description: dto.description,
        category: dto.category,
        city: dto.city,
        venue: dto.venue,
        url: dto.url,
        image_url: dto.image_url,
        source_site_id: dto.source_site_id,
    })
}

pub fn event_changes(dto: UpdateEventDto) -> Result<EventChanges, ApiError> {
    dto.validate()?;
    let start_date = match dto.start_date {
        Some(v) => Some(parse_datetime("startDate", &v)?),
        None => None,
    };
    let end_date = match dto.end_date {
        Some(v) => Some(optional_date("endDate", v)?),
        None => None,
    };
    Ok(EventChanges {
        title: dto.title,
        description: dto.description,
        category: dto.category,
        city: dto.city,
        venue: dto.venue,
        start_date,
        end_date,
        url: dto.url,
        image_url: dto.image_url,
        source_site_id: dto.source_site_id,
    })
}

pub async fn create(dto: NewEventDto, pool: &PGPool) -> Result<Event, ApiError> {
    let event = new_event(dto)?;
    let id = Uuid::new_v4();
    db::event::create(id, event, pool).await?;
    info!("created event {}", id);
    get_by_id(id, pool).await
}

pub async fn update(id: Uuid, dto: UpdateEventDto, pool: &PGPool) -> Result<Event, ApiError> {
    let changes = event_changes(dto)?;
    if !db::event::set_fields(id, changes, pool).await? {
        return Err(ApiError::not_found("Event"));
    }
    get_by_id(id, pool).await
}

pub async fn delete(id: Uuid, pool: &PGPool) -> Result<(), ApiError> {
    if db::event::delete_cascade(id, pool).await? {
        info!("deleted event {} with its wishlist, attendance and photo rows", id);
        Ok(())
    } else {
        Err(ApiError::not_found("Event"))
    }
}

pub async fn cities(pool: &PGPool) -> Result<Vec<String>, ApiError> {
    Ok(db::event::cities(pool).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_trims_and_drops_blank_params() {
        let query = EventQuery {
            q: Some("  rock ".to_string()),
            category: Some("".to_string()),
            city: Some("Cluj".to_string()),
            date_from: Some("2025-12-01".to_string()),
            date_to: None,
        };
        let filter = build_filter(&query).unwrap();
        assert_eq!(Some("rock".to_string()), filter.q);
        assert_eq!(None, filter.category);
        assert_eq!(Some("Cluj".to_string()), filter.city);
        assert!(filter.date_from.is_some());
        assert!(filter.date_to.is_none());
    }

    #[test]
    fn bad_date_param_is_a_validation_error() {
        let query = EventQuery {
            date_to: Some("tomorrow-ish".to_string()),
            ..Default::default()
        };
        assert!(matches!(build_filter(&query), Err(ApiError::Validation(_))));
    }

    #[test]
    fn new_event_requires_parseable_start_date() {
        let dto: NewEventDto = serde_json::from_str(
            r#"{"title": "Concert Rock", "city": "Cluj", "startDate": "soon"}"#,
        )
        .unwrap();
        assert!(matches!(new_event(dto), Err(ApiError::Validation(_))));
    }

    #[test]
    fn new_event_parses_dates() {
        let dto: NewEventDto = serde_json::from_str(
            r#"{"title": "Concert Rock", "city": "Cluj", "startDate": "2025-12-05", "endDate": ""}"#,
        )
        .unwrap();
        let event = new_event(dto).unwrap();
        assert_eq!("2025-12-05T00:00:00+00:00", event.start_date.to_rfc3339());
        assert!(event.end_date.is_none());
    }

    #[test]
    fn null_end_date_clears_it() {
        let dto: UpdateEventDto = serde_json::from_str(r#"{"endDate": null}"#).unwrap();
        let changes = event_changes(dto).unwrap();
        assert_eq!(Some(None), changes.end_date);
        assert!(changes.start_date.is_none());
    }

    #[test]
    fn short_title_is_rejected_on_update() {
        let dto: UpdateEventDto = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert!(matches!(event_changes(dto), Err(ApiError::Validation(_))));
    }
}
