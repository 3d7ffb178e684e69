use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_stream::{Stream, StreamExt};
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::session::CurrentUser,
    models::ShowView,
    routes::{AppState, SearchQuery},
    services::{profile, watchlist},
    timing::LiveBoard,
};

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub show_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub url: String,
}

/// Handler for the signed-in user's watchlist
pub async fn mine(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<ShowView>>> {
    let store = state.store.as_ref();
    let owner = profile::require_profile(store, &user.email).await?;
    let shows =
        watchlist::user_watchlist(store, &owner.username, params.q.as_deref(), Utc::now()).await?;
    Ok(Json(shows))
}

pub async fn add(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(request): Json<AddRequest>,
) -> AppResult<StatusCode> {
    let store = state.store.as_ref();
    let owner = profile::require_profile(store, &user.email).await?;
    watchlist::bookmark(store, &owner.username, request.show_id).await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(show_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let store = state.store.as_ref();
    let owner = profile::require_profile(store, &user.email).await?;
    watchlist::unbookmark(store, &owner.username, show_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler returning the shareable link to the user's watchlist
pub async fn share(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> AppResult<Json<ShareResponse>> {
    let owner = profile::require_profile(state.store.as_ref(), &user.email).await?;
    Ok(Json(ShareResponse {
        url: watchlist::share_url(&state.public_base_url, &owner.username),
    }))
}

/// Handler for someone else's shared watchlist
pub async fn public(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> AppResult<Json<Vec<ShowView>>> {
    let shows = watchlist::public_watchlist(state.store.as_ref(), &username, Utc::now()).await?;
    Ok(Json(shows))
}

/// Server-sent events re-evaluating a shared watchlist on every tick.
///
/// The watchlist is read once; the ticker stops when the client disconnects.
pub async fn live(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    let shows = watchlist::public_watchlist_shows(state.store.as_ref(), &username).await?;

    tracing::info!(
        username = %username,
        shows = shows.len(),
        "Live watchlist view opened"
    );

    let stream = LiveBoard::spawn(shows, state.refresh_interval)
        .into_stream()
        .map(|snapshot| Event::default().event("snapshot").json_data(snapshot.as_ref()));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
