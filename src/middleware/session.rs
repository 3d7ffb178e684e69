use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

/// Header carrying the email the upstream auth provider signed in
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// The signed-in user, as vouched for by the auth provider in front of us
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let email = parts
            .headers
            .get(USER_EMAIL_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .ok_or_else(|| AppError::Unauthorized("sign in required".to_string()))?;

        Ok(Self {
            email: email.to_string(),
        })
    }
}
