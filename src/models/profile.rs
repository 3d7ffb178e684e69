use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Public identity of a user, bound to the email the auth provider vouches for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Profile {
    pub username: String,
    pub email: String,
}

impl Profile {
    /// Creates a profile after checking the username can be used in a share link
    pub fn new(username: &str, email: &str) -> AppResult<Self> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::InvalidInput("username is required".to_string()));
        }
        if username.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(AppError::InvalidInput(
                "username must not contain spaces or slashes".to_string(),
            ));
        }

        Ok(Self {
            username: username.to_string(),
            email: email.to_string(),
        })
    }
}
