use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::WatchStore,
    error::AppResult,
    models::{validate_rating, NewShow, Show, ShowView},
};

/// Shared catalog with timing evaluated at `now`, earliest start first.
///
/// `query` narrows the list to titles containing it, ignoring case.
pub async fn browse(
    store: &dyn WatchStore,
    query: Option<&str>,
    now: DateTime<Utc>,
) -> AppResult<Vec<ShowView>> {
    let shows = store.list_shows().await?;
    Ok(evaluate(shows, query, now))
}

/// Filters by title and attaches timing
pub fn evaluate(shows: Vec<Show>, query: Option<&str>, now: DateTime<Utc>) -> Vec<ShowView> {
    let term = query.map(str::trim).unwrap_or_default();
    shows
        .into_iter()
        .filter(|show| show.matches(term))
        .map(|show| ShowView::at(show, now))
        .collect()
}

pub async fn add_show(store: &dyn WatchStore, new: NewShow) -> AppResult<Show> {
    let new = new.validated()?;
    let show = store.insert_show(new).await?;

    tracing::info!(show_id = %show.id, title = %show.title, "Show added to catalog");
    Ok(show)
}

pub async fn rate_show(store: &dyn WatchStore, id: Uuid, rating: i16) -> AppResult<Show> {
    let rating = validate_rating(rating)?;
    let show = store.set_rating(id, rating).await?;

    tracing::info!(show_id = %id, rating, "Show rated");
    Ok(show)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockWatchStore;
    use crate::error::AppError;
    use crate::timing::Status;
    use chrono::TimeZone;

    fn show(title: &str) -> Show {
        Show::new(NewShow {
            title: title.to_string(),
            season: 2,
            episode: 4,
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            genre: "Comedy".to_string(),
            link: String::new(),
            status: String::new(),
        })
    }

    #[tokio::test]
    async fn test_browse_filters_and_evaluates() {
        let mut store = MockWatchStore::new();
        store
            .expect_list_shows()
            .times(1)
            .returning(|| Ok(vec![show("Abbott Elementary"), show("Hacks")]));

        let now = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();
        let views = browse(&store, Some(" hack "), now).await.unwrap();

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].show.title, "Hacks");
        assert_eq!(views[0].computed_status, Status::Ongoing);
        assert_eq!(views[0].timer.as_deref(), Some("Next episode in 7d 0h 0m 0s"));
    }

    #[tokio::test]
    async fn test_add_show_rejects_invalid_before_store() {
        let mut store = MockWatchStore::new();
        store.expect_insert_show().never();

        let mut new = NewShow {
            title: String::new(),
            season: 1,
            episode: 1,
            start_date: Utc::now(),
            end_date: Utc::now(),
            genre: String::new(),
            link: String::new(),
            status: String::new(),
        };
        assert!(matches!(
            add_show(&store, new.clone()).await,
            Err(AppError::InvalidInput(_))
        ));

        new.title = "Ok".to_string();
        new.end_date = new.start_date - chrono::Duration::days(1);
        assert!(matches!(
            add_show(&store, new).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_rate_show_validates_range() {
        let mut store = MockWatchStore::new();
        store.expect_set_rating().never();

        let result = rate_show(&store, Uuid::new_v4(), 9).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_rate_show_stores_rating() {
        let mut store = MockWatchStore::new();
        let rated = {
            let mut s = show("Hacks");
            s.rating = 4;
            s
        };
        let id = rated.id;
        store
            .expect_set_rating()
            .withf(move |got_id, rating| *got_id == id && *rating == 4)
            .times(1)
            .returning(move |_, _| Ok(rated.clone()));

        let show = rate_show(&store, id, 4).await.unwrap();
        assert_eq!(show.rating, 4);
    }
}
