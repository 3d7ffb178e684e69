use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{NewShow, Profile, Show},
};

use super::WatchStore;

/// In-process store
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    shows: HashMap<Uuid, Show>,
    /// Keyed by username
    profiles: HashMap<String, Profile>,
    /// Keyed by username, bookmarks in insertion order
    watchlists: HashMap<String, Vec<Uuid>>,
}

impl MemoryStore {
    /// Creates a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

fn by_start_date(mut shows: Vec<Show>) -> Vec<Show> {
    shows.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
    shows
}

#[async_trait::async_trait]
impl WatchStore for MemoryStore {
    async fn list_shows(&self) -> AppResult<Vec<Show>> {
        let inner = self.inner.read().await;
        Ok(by_start_date(inner.shows.values().cloned().collect()))
    }

    async fn shows_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Show>> {
        let inner = self.inner.read().await;
        let shows = inner
            .shows
            .values()
            .filter(|show| ids.contains(&show.id))
            .cloned()
            .collect();
        Ok(by_start_date(shows))
    }

    async fn insert_show(&self, new: NewShow) -> AppResult<Show> {
        let show = Show::new(new);
        let mut inner = self.inner.write().await;
        inner.shows.insert(show.id, show.clone());
        Ok(show)
    }

    async fn set_rating(&self, id: Uuid, rating: i16) -> AppResult<Show> {
        let mut inner = self.inner.write().await;
        let show = inner
            .shows
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("show {}", id)))?;
        show.rating = rating;
        Ok(show.clone())
    }

    async fn insert_profile(&self, profile: Profile) -> AppResult<Profile> {
        let mut inner = self.inner.write().await;
        if inner.profiles.contains_key(&profile.username) {
            return Err(AppError::Conflict(format!(
                "username {} is taken",
                profile.username
            )));
        }
        if inner.profiles.values().any(|p| p.email == profile.email) {
            return Err(AppError::Conflict("profile already exists".to_string()));
        }
        inner
            .profiles
            .insert(profile.username.clone(), profile.clone());
        Ok(profile)
    }

    async fn profile_by_email(&self, email: &str) -> AppResult<Option<Profile>> {
        let inner = self.inner.read().await;
        Ok(inner.profiles.values().find(|p| p.email == email).cloned())
    }

    async fn profile_by_username(&self, username: &str) -> AppResult<Option<Profile>> {
        let inner = self.inner.read().await;
        Ok(inner.profiles.get(username).cloned())
    }

    async fn watchlist_ids(&self, username: &str) -> AppResult<Vec<Uuid>> {
        let inner = self.inner.read().await;
        Ok(inner.watchlists.get(username).cloned().unwrap_or_default())
    }

    async fn add_to_watchlist(&self, username: &str, show_id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.shows.contains_key(&show_id) {
            return Err(AppError::NotFound(format!("show {}", show_id)));
        }

        let ids = inner.watchlists.entry(username.to_string()).or_default();
        if ids.contains(&show_id) {
            return Err(AppError::Conflict("show is already on the watchlist".to_string()));
        }
        ids.push(show_id);
        Ok(())
    }

    async fn remove_from_watchlist(&self, username: &str, show_id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let not_listed = || AppError::NotFound("show is not on the watchlist".to_string());
        let ids = inner.watchlists.get_mut(username).ok_or_else(not_listed)?;
        let before = ids.len();
        ids.retain(|id| *id != show_id);

        if ids.len() == before {
            return Err(not_listed());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn new_show(title: &str, start_day: u32) -> NewShow {
        NewShow {
            title: title.to_string(),
            season: 1,
            episode: 1,
            start_date: Utc.with_ymd_and_hms(2024, 1, start_day, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            genre: String::new(),
            link: String::new(),
            status: String::new(),
        }
    }

    #[tokio::test]
    async fn test_list_shows_sorted_by_start_date() {
        let store = MemoryStore::new();
        store.insert_show(new_show("Later", 20)).await.unwrap();
        store.insert_show(new_show("Earlier", 2)).await.unwrap();

        let titles: Vec<String> = store
            .list_shows()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["Earlier", "Later"]);
    }

    #[tokio::test]
    async fn test_set_rating_missing_show() {
        let store = MemoryStore::new();
        let result = store.set_rating(Uuid::new_v4(), 3).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_profile_conflicts() {
        let store = MemoryStore::new();
        let profile = Profile::new("ada", "ada@example.com").unwrap();
        store.insert_profile(profile).await.unwrap();

        let same_name = Profile::new("ada", "other@example.com").unwrap();
        assert!(matches!(
            store.insert_profile(same_name).await,
            Err(AppError::Conflict(_))
        ));

        let same_email = Profile::new("grace", "ada@example.com").unwrap();
        assert!(matches!(
            store.insert_profile(same_email).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_watchlist_add_remove() {
        let store = MemoryStore::new();
        let show = store.insert_show(new_show("Fargo", 1)).await.unwrap();

        tokio_test::assert_ok!(store.add_to_watchlist("ada", show.id).await);
        assert!(matches!(
            store.add_to_watchlist("ada", show.id).await,
            Err(AppError::Conflict(_))
        ));
        assert_eq!(store.watchlist_ids("ada").await.unwrap(), vec![show.id]);
        assert!(store.watchlist_ids("grace").await.unwrap().is_empty());

        tokio_test::assert_ok!(store.remove_from_watchlist("ada", show.id).await);
        assert!(matches!(
            store.remove_from_watchlist("ada", show.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_for_user_without_watchlist() {
        let store = MemoryStore::new();
        let show = store.insert_show(new_show("Fargo", 1)).await.unwrap();

        let result = store.remove_from_watchlist("grace", show.id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(!store.inner.read().await.watchlists.contains_key("grace"));
    }

    #[tokio::test]
    async fn test_add_unknown_show_to_watchlist() {
        let store = MemoryStore::new();
        let result = store.add_to_watchlist("ada", Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
