use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{NewShow, Profile, Show},
};

use super::WatchStore;

const SHOW_COLUMNS: &str =
    "id, title, season, episode, start_date, end_date, genre, link, status, rating";

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Postgres-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies pending schema migrations
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Maps constraint violations onto the error the caller can act on
fn constraint_error(e: sqlx::Error, conflict: &str, missing: &str) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return AppError::Conflict(conflict.to_string());
        }
        if db.is_foreign_key_violation() {
            return AppError::NotFound(missing.to_string());
        }
        if db.is_check_violation() {
            return AppError::InvalidInput(format!("violates {}", db.constraint().unwrap_or("check")));
        }
    }
    AppError::Database(e)
}

#[async_trait::async_trait]
impl WatchStore for PgStore {
    async fn list_shows(&self) -> AppResult<Vec<Show>> {
        let shows = sqlx::query_as::<_, Show>(&format!(
            "SELECT {} FROM shows ORDER BY start_date, id",
            SHOW_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(shows)
    }

    async fn shows_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Show>> {
        let shows = sqlx::query_as::<_, Show>(&format!(
            "SELECT {} FROM shows WHERE id = ANY($1) ORDER BY start_date, id",
            SHOW_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(shows)
    }

    async fn insert_show(&self, new: NewShow) -> AppResult<Show> {
        let show = Show::new(new);
        sqlx::query(
            r#"
            INSERT INTO shows (id, title, season, episode, start_date, end_date, genre, link, status, rating)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(show.id)
        .bind(&show.title)
        .bind(show.season)
        .bind(show.episode)
        .bind(show.start_date)
        .bind(show.end_date)
        .bind(&show.genre)
        .bind(&show.link)
        .bind(&show.status)
        .bind(show.rating)
        .execute(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "show already exists", "show"))?;

        tracing::debug!(show_id = %show.id, "Inserted show");
        Ok(show)
    }

    async fn set_rating(&self, id: Uuid, rating: i16) -> AppResult<Show> {
        sqlx::query_as::<_, Show>(&format!(
            "UPDATE shows SET rating = $2 WHERE id = $1 RETURNING {}",
            SHOW_COLUMNS
        ))
        .bind(id)
        .bind(rating)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("show {}", id)))
    }

    async fn insert_profile(&self, profile: Profile) -> AppResult<Profile> {
        sqlx::query("INSERT INTO profiles (username, email) VALUES ($1, $2)")
            .bind(&profile.username)
            .bind(&profile.email)
            .execute(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "username or email already has a profile", "profile"))?;
        Ok(profile)
    }

    async fn profile_by_email(&self, email: &str) -> AppResult<Option<Profile>> {
        let profile =
            sqlx::query_as::<_, Profile>("SELECT username, email FROM profiles WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(profile)
    }

    async fn profile_by_username(&self, username: &str) -> AppResult<Option<Profile>> {
        let profile =
            sqlx::query_as::<_, Profile>("SELECT username, email FROM profiles WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        Ok(profile)
    }

    async fn watchlist_ids(&self, username: &str) -> AppResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT show_id FROM watchlist_entries WHERE username = $1 ORDER BY added_at",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn add_to_watchlist(&self, username: &str, show_id: Uuid) -> AppResult<()> {
        sqlx::query("INSERT INTO watchlist_entries (username, show_id) VALUES ($1, $2)")
            .bind(username)
            .bind(show_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                constraint_error(
                    e,
                    "show is already on the watchlist",
                    &format!("show {}", show_id),
                )
            })?;
        Ok(())
    }

    async fn remove_from_watchlist(&self, username: &str, show_id: Uuid) -> AppResult<()> {
        let result =
            sqlx::query("DELETE FROM watchlist_entries WHERE username = $1 AND show_id = $2")
                .bind(username)
                .bind(show_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("show is not on the watchlist".to_string()));
        }
        Ok(())
    }
}
