//! One poll: fetch, parse, classify, and the bookkeeping between polls.
//!
//! [`PollCoordinator`] owns the only state that survives from one poll to the
//! next: the set of entry ids already shown and the fetch status used for the
//! outage banner. It is driven from a single thread, so none of it is locked.

use std::collections::HashSet;

use chrono::{DateTime, Local, Utc};

use crate::activity::{classify, Activity};
use crate::error::FeedError;
use crate::source::{atom, FeedEntry, FeedFetcher};

/// Tunables the coordinator applies to every poll.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// Entries younger than this are flagged as recent.
    pub recent_window: chrono::Duration,
    /// Comment bodies longer than this many characters are cut.
    pub detail_max_chars: usize,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            recent_window: chrono::Duration::minutes(15),
            detail_max_chars: 150,
        }
    }
}

/// One entry, classified and flagged for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRecord {
    pub id: String,
    pub author: String,
    pub updated_at: DateTime<Utc>,
    pub activity: Activity,
    /// Not present in the previous poll.
    pub is_new: bool,
    /// Happened within the recency window.
    pub is_recent: bool,
}

impl ActivityRecord {
    pub fn headline(&self) -> String {
        self.activity.headline()
    }
}

/// Entry ids seen in the most recent successful poll.
#[derive(Debug, Default, Clone)]
pub struct SeenIdSet {
    ids: HashSet<String>,
}

impl SeenIdSet {
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Record `current` as seen and forget every id not in it.
    fn replace_with<'a>(&mut self, current: impl IntoIterator<Item = &'a str>) {
        let current: HashSet<String> = current.into_iter().map(String::from).collect();
        self.ids.extend(current.iter().cloned());
        self.ids.retain(|id| current.contains(id));
    }
}

/// Health of the feed, as shown in the status bar.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FetchStatus {
    pub last_success: Option<DateTime<Utc>>,
    /// Message of the most recent failure; `None` after a successful poll.
    pub error: Option<String>,
}

impl FetchStatus {
    /// Outage message, or `None` while the feed is healthy.
    pub fn banner(&self) -> Option<String> {
        let error = self.error.as_ref()?;
        let since = match self.last_success {
            Some(at) => format_outage_time(at),
            None => "now".to_string(),
        };
        Some(format!(
            "The feed has been unavailable since {since} - Error: {error}"
        ))
    }
}

/// `MM/DD/YYYY h:mm AM` in local time.
pub fn format_outage_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%m/%d/%Y %-I:%M %p")
        .to_string()
}

/// Result of a successful poll.
#[derive(Debug, Clone)]
pub struct PollOutcome {
    /// Records in feed order.
    pub records: Vec<ActivityRecord>,
    /// At least one record is new; the view should scroll to the top.
    pub has_new: bool,
    pub status: FetchStatus,
}

/// Runs polls against one fetcher and carries state between them.
pub struct PollCoordinator<F> {
    fetcher: F,
    policy: PollPolicy,
    seen: SeenIdSet,
    status: FetchStatus,
}

impl<F: FeedFetcher> PollCoordinator<F> {
    pub fn new(fetcher: F, policy: PollPolicy) -> Self {
        Self {
            fetcher,
            policy,
            seen: SeenIdSet::default(),
            status: FetchStatus::default(),
        }
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    pub fn seen(&self) -> &SeenIdSet {
        &self.seen
    }

    /// Poll now, by the wall clock.
    pub fn poll(&mut self) -> Result<PollOutcome, FeedError> {
        self.poll_at(Utc::now())
    }

    /// Poll as if the current time were `now`.
    ///
    /// On failure the seen set is untouched and [`status`](Self::status)
    /// carries the error until the next success.
    pub fn poll_at(&mut self, now: DateTime<Utc>) -> Result<PollOutcome, FeedError> {
        let entries = match self.fetcher.fetch().and_then(|body| atom::parse(&body)) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(
                    url = self.fetcher.url(),
                    network = err.is_network(),
                    error = %err,
                    "feed poll failed"
                );
                self.status.error = Some(err.to_string());
                return Err(err);
            }
        };

        let records: Vec<ActivityRecord> = entries
            .iter()
            .map(|entry| self.record(entry, now))
            .collect();
        let has_new = records.iter().any(|r| r.is_new);

        self.seen.replace_with(entries.iter().map(|e| e.id.as_str()));
        self.status = FetchStatus {
            last_success: Some(now),
            error: None,
        };

        tracing::info!(
            entries = records.len(),
            new = records.iter().filter(|r| r.is_new).count(),
            seen = self.seen.len(),
            "feed polled"
        );

        Ok(PollOutcome {
            records,
            has_new,
            status: self.status.clone(),
        })
    }

    fn record(&self, entry: &FeedEntry, now: DateTime<Utc>) -> ActivityRecord {
        ActivityRecord {
            id: entry.id.clone(),
            author: entry.author_name.clone(),
            updated_at: entry.updated_at,
            activity: classify(entry, self.policy.detail_max_chars),
            is_new: !self.seen.contains(&entry.id),
            is_recent: entry.is_recent(now, self.policy.recent_window),
        }
    }
}
