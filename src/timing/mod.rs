//! Episode timing engine
//!
//! Derives a show's lifecycle status and the countdown to its next weekly
//! episode from its airing window. Everything here is pure: callers pass the
//! current instant in, so evaluating twice with the same `now` gives the same
//! answer.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod refresh;

pub use refresh::{LiveBoard, Snapshot};

const MS_PER_SECOND: i64 = 1000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// One airing week in milliseconds
pub const WEEK_MS: i64 = 7 * MS_PER_DAY;

/// Shown in place of a countdown once the next episode is due
pub const AIRING_NOW: &str = "Episode airing now or just released.";

/// Lifecycle status of a show relative to its airing window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Airing has not started yet
    Soon,
    /// Between the first and last airing date, both inclusive
    Ongoing,
    /// Airing window is over
    Finished,
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Soon => write!(f, "Soon"),
            Status::Ongoing => write!(f, "Ongoing"),
            Status::Finished => write!(f, "Finished"),
        }
    }
}

/// Classifies `now` against the airing window.
///
/// Strict comparisons are used for `Soon` and `Finished`, so landing exactly on
/// either bound counts as `Ongoing`. An inverted window (`end < start`) is not
/// corrected here; see [`Schedule::is_inverted`].
pub fn classify(now: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> Status {
    if now < start {
        Status::Soon
    } else if now > end {
        Status::Finished
    } else {
        Status::Ongoing
    }
}

/// Time remaining until an episode, or notice that it is already out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Remaining {
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
    },
    AiringNow,
}

impl Countdown {
    /// Breaks a positive millisecond difference into whole units.
    ///
    /// Days are not carried into any larger unit and sub-second remainders are
    /// truncated.
    fn from_millis(diff: i64) -> Self {
        Countdown::Remaining {
            days: diff / MS_PER_DAY,
            hours: (diff / MS_PER_HOUR) % 24,
            minutes: (diff / MS_PER_MINUTE) % 60,
            seconds: (diff / MS_PER_SECOND) % 60,
        }
    }
}

impl Display for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Countdown::Remaining {
                days,
                hours,
                minutes,
                seconds,
            } => write!(
                f,
                "Next episode in {}d {}h {}m {}s",
                days, hours, minutes, seconds
            ),
            Countdown::AiringNow => write!(f, "{}", AIRING_NOW),
        }
    }
}

/// Returns the first weekly occurrence of `start` strictly after the last
/// whole week elapsed at `now`.
///
/// Uses floor division, so for `now < start` the week count is negative and
/// the result is the first weekly slot after `now` counted back from `start`.
pub fn next_episode(now: DateTime<Utc>, start: DateTime<Utc>) -> DateTime<Utc> {
    let start_ms = start.timestamp_millis();
    let weeks_since_start = (now.timestamp_millis() - start_ms).div_euclid(WEEK_MS);
    let next_ms = start_ms + (weeks_since_start + 1) * WEEK_MS;

    // The next slot is at most one week past `now`, which is itself a valid
    // instant, so this only fails at the very edge of chrono's range.
    Utc.timestamp_millis_opt(next_ms)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Countdown from `now` to a known episode instant
pub fn countdown_to(now: DateTime<Utc>, episode_at: DateTime<Utc>) -> Countdown {
    if now < episode_at {
        Countdown::from_millis(episode_at.timestamp_millis() - now.timestamp_millis())
    } else {
        Countdown::AiringNow
    }
}

/// Countdown to the next weekly episode of a show that started at `start`
pub fn time_until_next(now: DateTime<Utc>, start: DateTime<Utc>) -> Countdown {
    countdown_to(now, next_episode(now, start))
}

/// Human-readable countdown to the next weekly episode.
///
/// Only meaningful while the show is [`Status::Ongoing`]; callers are expected
/// to check the status first.
pub fn countdown(now: DateTime<Utc>, start: DateTime<Utc>) -> String {
    time_until_next(now, start).to_string()
}

/// Airing window of a show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Result of evaluating a schedule at one instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeTiming {
    pub status: Status,
    /// Set only while the show is ongoing
    pub countdown: Option<String>,
}

impl Schedule {
    pub fn new(start_date: DateTime<Utc>, end_date: DateTime<Utc>) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    /// Whether the window ends before it starts
    pub fn is_inverted(&self) -> bool {
        self.end_date < self.start_date
    }

    pub fn status(&self, now: DateTime<Utc>) -> Status {
        classify(now, self.start_date, self.end_date)
    }

    /// Status plus countdown, with the countdown withheld unless ongoing
    pub fn evaluate(&self, now: DateTime<Utc>) -> EpisodeTiming {
        let status = self.status(now);
        let countdown = match status {
            Status::Ongoing => Some(countdown(now, self.start_date)),
            Status::Soon | Status::Finished => None,
        };

        EpisodeTiming { status, countdown }
    }
}
