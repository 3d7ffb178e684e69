use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::timing::{Schedule, Status};

/// Highest rating a show can be given
pub const MAX_RATING: i16 = 5;

/// A show or movie in the shared catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Show {
    pub id: Uuid,
    pub title: String,
    pub season: i32,
    pub episode: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub genre: String,
    /// Where to find more about the show
    pub link: String,
    /// Free-text status entered by whoever added the show
    pub status: String,
    /// 0 until someone rates it, then 1..=5
    pub rating: i16,
}

/// Fields submitted when adding a show to the catalog
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NewShow {
    pub title: String,
    #[serde(default)]
    pub season: i32,
    #[serde(default)]
    pub episode: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub status: String,
}

impl NewShow {
    /// Checks the submission and returns it with the title trimmed
    pub fn validated(mut self) -> AppResult<Self> {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            return Err(AppError::InvalidInput("title is required".to_string()));
        }
        if self.season < 0 || self.episode < 0 {
            return Err(AppError::InvalidInput(
                "season and episode must not be negative".to_string(),
            ));
        }
        if Schedule::new(self.start_date, self.end_date).is_inverted() {
            return Err(AppError::InvalidInput(
                "end_date must not be before start_date".to_string(),
            ));
        }
        Ok(self)
    }
}

impl Show {
    /// Builds a catalog entry with a fresh id and no rating
    pub fn new(new: NewShow) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: new.title,
            season: new.season,
            episode: new.episode,
            start_date: new.start_date,
            end_date: new.end_date,
            genre: new.genre,
            link: new.link,
            status: new.status,
            rating: 0,
        }
    }

    pub fn schedule(&self) -> Schedule {
        Schedule::new(self.start_date, self.end_date)
    }

    /// Case-insensitive title match; an empty term matches everything
    pub fn matches(&self, term: &str) -> bool {
        self.title.to_lowercase().contains(&term.to_lowercase())
    }
}

/// Checks a rating submitted by a user
pub fn validate_rating(rating: i16) -> AppResult<i16> {
    if (1..=MAX_RATING).contains(&rating) {
        Ok(rating)
    } else {
        Err(AppError::InvalidInput(format!(
            "rating must be between 1 and {}",
            MAX_RATING
        )))
    }
}

/// A show together with its timing, evaluated at one instant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowView {
    #[serde(flatten)]
    pub show: Show,
    pub computed_status: Status,
    /// Countdown to the next episode, present only while ongoing
    pub timer: Option<String>,
}

impl ShowView {
    pub fn at(show: Show, now: DateTime<Utc>) -> Self {
        let timing = show.schedule().evaluate(now);
        Self {
            show,
            computed_status: timing.status,
            timer: timing.countdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_show(title: &str) -> NewShow {
        NewShow {
            title: title.to_string(),
            season: 1,
            episode: 1,
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            genre: "Drama".to_string(),
            link: "https://example.com/show".to_string(),
            status: "Airing".to_string(),
        }
    }

    #[test]
    fn test_new_show_starts_unrated() {
        let show = Show::new(new_show("Severance"));
        assert_eq!(show.title, "Severance");
        assert_eq!(show.rating, 0);
    }

    #[test]
    fn test_validated_trims_title() {
        let show = new_show("  Shogun ").validated().unwrap();
        assert_eq!(show.title, "Shogun");
    }

    #[test]
    fn test_validated_rejects_blank_title() {
        let result = new_show("   ").validated();
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_validated_rejects_negative_numbers() {
        let mut show = new_show("Dark");
        show.episode = -1;
        assert!(show.validated().is_err());
    }

    #[test]
    fn test_validated_rejects_inverted_schedule() {
        let mut show = new_show("Dark");
        std::mem::swap(&mut show.start_date, &mut show.end_date);
        let err = show.validated().unwrap_err();
        assert!(err.to_string().contains("end_date"));
    }

    #[test]
    fn test_validate_rating_bounds() {
        assert_eq!(validate_rating(1).unwrap(), 1);
        assert_eq!(validate_rating(5).unwrap(), 5);
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let show = Show::new(new_show("The Bear"));
        assert!(show.matches("bear"));
        assert!(show.matches("THE"));
        assert!(show.matches(""));
        assert!(!show.matches("lion"));
    }

    #[test]
    fn test_show_view_flattens_show_fields() {
        let show = Show::new(new_show("Andor"));
        let now = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();
        let view = ShowView::at(show, now);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["title"], "Andor");
        assert_eq!(json["computed_status"], "Ongoing");
        assert_eq!(json["timer"], "Next episode in 7d 0h 0m 0s");
    }

    #[test]
    fn test_show_view_hides_timer_when_finished() {
        let show = Show::new(new_show("Andor"));
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let view = ShowView::at(show, now);
        assert_eq!(view.computed_status, Status::Finished);
        assert_eq!(view.timer, None);
    }
}
