use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::session::CurrentUser,
    models::Profile,
    routes::AppState,
    services::profile,
};

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub username: String,
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> AppResult<Json<Profile>> {
    let profile = profile::require_profile(state.store.as_ref(), &user.email).await?;
    Ok(Json(profile))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(request): Json<CreateProfileRequest>,
) -> AppResult<(StatusCode, Json<Profile>)> {
    let profile =
        profile::create_profile(state.store.as_ref(), &user.email, &request.username).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}
