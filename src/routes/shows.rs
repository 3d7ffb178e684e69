use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::{request_id::RequestId, session::CurrentUser},
    models::{NewShow, Show, ShowView},
    routes::{AppState, SearchQuery},
    services::catalog,
};

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub rating: i16,
}

/// Handler for browsing the catalog
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<ShowView>>> {
    let shows = catalog::browse(state.store.as_ref(), params.q.as_deref(), Utc::now()).await?;
    Ok(Json(shows))
}

/// Handler for adding a show to the catalog
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    user: CurrentUser,
    Json(request): Json<NewShow>,
) -> AppResult<(StatusCode, Json<Show>)> {
    tracing::info!(
        request_id = %request_id,
        email = %user.email,
        title = %request.title,
        "Adding show"
    );

    let show = catalog::add_show(state.store.as_ref(), request).await?;
    Ok((StatusCode::CREATED, Json(show)))
}

/// Handler for rating a show
pub async fn rate(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RateRequest>,
) -> AppResult<Json<Show>> {
    let show = catalog::rate_show(state.store.as_ref(), id, request.rating).await?;
    Ok(Json(show))
}
