use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::WatchStore,
    error::{AppError, AppResult},
    models::{Show, ShowView},
    services::catalog,
};

/// Shows bookmarked by `username`, earliest start first
pub async fn watchlist_shows(store: &dyn WatchStore, username: &str) -> AppResult<Vec<Show>> {
    let ids = store.watchlist_ids(username).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    store.shows_by_ids(&ids).await
}

/// The signed-in user's watchlist with timing, optionally narrowed by title
pub async fn user_watchlist(
    store: &dyn WatchStore,
    username: &str,
    query: Option<&str>,
    now: DateTime<Utc>,
) -> AppResult<Vec<ShowView>> {
    let shows = watchlist_shows(store, username).await?;
    Ok(catalog::evaluate(shows, query, now))
}

/// Shows on someone's shared watchlist; `NotFound` for unknown usernames
pub async fn public_watchlist_shows(store: &dyn WatchStore, username: &str) -> AppResult<Vec<Show>> {
    if store.profile_by_username(username).await?.is_none() {
        return Err(AppError::NotFound(format!("no watchlist for {}", username)));
    }
    watchlist_shows(store, username).await
}

pub async fn public_watchlist(
    store: &dyn WatchStore,
    username: &str,
    now: DateTime<Utc>,
) -> AppResult<Vec<ShowView>> {
    let shows = public_watchlist_shows(store, username).await?;
    Ok(catalog::evaluate(shows, None, now))
}

pub async fn bookmark(store: &dyn WatchStore, username: &str, show_id: Uuid) -> AppResult<()> {
    store.add_to_watchlist(username, show_id).await?;
    tracing::info!(username = %username, show_id = %show_id, "Show bookmarked");
    Ok(())
}

pub async fn unbookmark(store: &dyn WatchStore, username: &str, show_id: Uuid) -> AppResult<()> {
    store.remove_from_watchlist(username, show_id).await?;
    tracing::info!(username = %username, show_id = %show_id, "Show removed from watchlist");
    Ok(())
}

/// Public link to a user's watchlist
pub fn share_url(public_base_url: &str, username: &str) -> String {
    format!("{}/watch-list/{}", public_base_url.trim_end_matches('/'), username)
}
