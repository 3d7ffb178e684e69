use crate::{
    db::WatchStore,
    error::{AppError, AppResult},
    models::Profile,
};

/// Claims `username` for the signed-in email
pub async fn create_profile(
    store: &dyn WatchStore,
    email: &str,
    username: &str,
) -> AppResult<Profile> {
    let profile = Profile::new(username, email)?;
    let profile = store.insert_profile(profile).await?;

    tracing::info!(username = %profile.username, "Profile created");
    Ok(profile)
}

/// Profile of the signed-in email, or `NotFound` if none was created yet
pub async fn require_profile(store: &dyn WatchStore, email: &str) -> AppResult<Profile> {
    store
        .profile_by_email(email)
        .await?
        .ok_or_else(|| AppError::NotFound("profile not found".to_string()))
}
