//! Periodic re-evaluation of a set of shows
//!
//! A [`LiveBoard`] owns a fixed list of shows and a ticker task. On every tick
//! it evaluates the whole list against the current time and publishes the
//! result as a new immutable [`Snapshot`]; subscribers never see a partially
//! updated list. The ticker stops on its own once nobody is subscribed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::WatchStream;

use crate::models::{Show, ShowView};

/// Every show evaluated at one instant
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Snapshot {
    pub generated_at: DateTime<Utc>,
    pub items: Vec<ShowView>,
}

impl Snapshot {
    pub fn evaluate(shows: &[Show], now: DateTime<Utc>) -> Self {
        Self {
            generated_at: now,
            items: shows
                .iter()
                .cloned()
                .map(|show| ShowView::at(show, now))
                .collect(),
        }
    }
}

/// Logs each show whose airing window ends before it starts.
///
/// Called once when a list is loaded rather than on every tick. Returns how
/// many were flagged.
pub fn flag_inverted(shows: &[Show]) -> usize {
    let mut flagged = 0;
    for show in shows.iter().filter(|show| show.schedule().is_inverted()) {
        tracing::warn!(
            show_id = %show.id,
            start_date = %show.start_date,
            end_date = %show.end_date,
            "Schedule ends before it starts"
        );
        flagged += 1;
    }
    flagged
}

/// Handle to a running ticker and the latest snapshot it published
pub struct LiveBoard {
    rx: watch::Receiver<Arc<Snapshot>>,
    task: JoinHandle<()>,
}

impl LiveBoard {
    /// Starts ticking every `period`.
    ///
    /// The first snapshot is computed before this returns, so
    /// [`LiveBoard::current`] never waits for a tick.
    pub fn spawn(shows: Vec<Show>, period: Duration) -> Self {
        flag_inverted(&shows);
        let shows: Arc<[Show]> = shows.into();
        let first = Snapshot::evaluate(&shows, Utc::now());
        let (tx, rx) = watch::channel(Arc::new(first));

        let task = tokio::spawn(async move {
            tracing::debug!(
                shows = shows.len(),
                period_ms = period.as_millis() as u64,
                "Live board started"
            );

            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // interval() fires immediately; the first snapshot is already out
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let snapshot = Snapshot::evaluate(&shows, Utc::now());
                        if tx.send(Arc::new(snapshot)).is_err() {
                            break;
                        }
                    }
                    _ = tx.closed() => break,
                }
            }

            tracing::debug!("Live board stopped");
        });

        Self { rx, task }
    }

    /// Latest published snapshot
    pub fn current(&self) -> Arc<Snapshot> {
        self.rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.rx.clone()
    }

    /// Stream yielding the current snapshot, then one per tick
    pub fn into_stream(self) -> WatchStream<Arc<Snapshot>> {
        WatchStream::new(self.rx)
    }

    pub fn into_parts(self) -> (watch::Receiver<Arc<Snapshot>>, JoinHandle<()>) {
        (self.rx, self.task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewShow;
    use crate::timing::Status;
    use chrono::Duration as ChronoDuration;
    use tokio_stream::StreamExt;

    fn show(title: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Show {
        Show::new(NewShow {
            title: title.to_string(),
            season: 1,
            episode: 1,
            start_date: start,
            end_date: end,
            genre: String::new(),
            link: String::new(),
            status: String::new(),
        })
    }

    fn mixed_shows() -> Vec<Show> {
        let now = Utc::now();
        vec![
            show("Upcoming", now + ChronoDuration::days(3), now + ChronoDuration::days(90)),
            show("Airing", now - ChronoDuration::days(10), now + ChronoDuration::days(90)),
            show("Done", now - ChronoDuration::days(90), now - ChronoDuration::days(10)),
        ]
    }

    #[test]
    fn test_snapshot_evaluates_every_show() {
        let shows = mixed_shows();
        let snapshot = Snapshot::evaluate(&shows, Utc::now());

        let statuses: Vec<Status> = snapshot.items.iter().map(|v| v.computed_status).collect();
        assert_eq!(statuses, vec![Status::Soon, Status::Ongoing, Status::Finished]);
        assert!(snapshot.items[0].timer.is_none());
        assert!(snapshot.items[1].timer.is_some());
        assert!(snapshot.items[2].timer.is_none());
    }

    #[test]
    fn test_flag_inverted_counts_bad_windows() {
        let now = Utc::now();
        let mut shows = mixed_shows();
        assert_eq!(flag_inverted(&shows), 0);

        shows.push(show("Backwards", now, now - ChronoDuration::days(1)));
        assert_eq!(flag_inverted(&shows), 1);
    }

    #[tokio::test]
    async fn test_inverted_schedule_still_evaluated_each_tick() {
        let now = Utc::now();
        let shows = vec![show(
            "Backwards",
            now + ChronoDuration::days(1),
            now - ChronoDuration::days(1),
        )];
        let board = LiveBoard::spawn(shows, Duration::from_millis(10));

        let mut rx = board.subscribe();
        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.items[0].computed_status, Status::Soon);
        assert!(snapshot.items[0].timer.is_none());
    }

    #[tokio::test]
    async fn test_first_snapshot_is_immediate() {
        let board = LiveBoard::spawn(mixed_shows(), Duration::from_secs(60));
        let snapshot = board.current();
        assert_eq!(snapshot.items.len(), 3);
    }

    #[tokio::test]
    async fn test_ticks_replace_whole_snapshot() {
        let board = LiveBoard::spawn(mixed_shows(), Duration::from_millis(10));
        let first = board.current();

        let mut rx = board.subscribe();
        rx.changed().await.unwrap();
        let second = rx.borrow_and_update().clone();

        assert!(second.generated_at >= first.generated_at);
        assert_eq!(second.items.len(), first.items.len());
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_stream_yields_current_then_ticks() {
        let board = LiveBoard::spawn(mixed_shows(), Duration::from_millis(10));
        let mut stream = board.into_stream();

        let first = stream.next().await.unwrap();
        let second = stream.next().await.unwrap();
        assert!(second.generated_at >= first.generated_at);
    }

    #[tokio::test]
    async fn test_stops_when_unsubscribed() {
        let board = LiveBoard::spawn(mixed_shows(), Duration::from_millis(10));
        let (rx, task) = board.into_parts();
        drop(rx);

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("ticker should stop once every receiver is gone")
            .unwrap();
    }
}
