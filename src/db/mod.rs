//! Storage seam to the backend that owns shows, profiles and watchlists
//!
//! Handlers and services only see [`WatchStore`]. [`PgStore`] talks to
//! Postgres, [`MemoryStore`] keeps everything in process for local runs and
//! tests.

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{NewShow, Profile, Show},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{create_pool, PgStore};

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait WatchStore: Send + Sync {
    /// Whole catalog, earliest start date first
    async fn list_shows(&self) -> AppResult<Vec<Show>>;

    /// Catalog entries whose id is in `ids`, earliest start date first.
    /// Unknown ids are skipped.
    async fn shows_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Show>>;

    async fn insert_show(&self, new: NewShow) -> AppResult<Show>;

    /// Stores a rating that has already been validated
    async fn set_rating(&self, id: Uuid, rating: i16) -> AppResult<Show>;

    /// Fails with `Conflict` if the username or email already has a profile
    async fn insert_profile(&self, profile: Profile) -> AppResult<Profile>;

    async fn profile_by_email(&self, email: &str) -> AppResult<Option<Profile>>;

    async fn profile_by_username(&self, username: &str) -> AppResult<Option<Profile>>;

    /// Bookmarked show ids in the order they were added
    async fn watchlist_ids(&self, username: &str) -> AppResult<Vec<Uuid>>;

    async fn add_to_watchlist(&self, username: &str, show_id: Uuid) -> AppResult<()>;

    async fn remove_from_watchlist(&self, username: &str, show_id: Uuid) -> AppResult<()>;
}
