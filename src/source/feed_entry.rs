//! The entry type produced by the Atom parser.
//!
//! `FeedEntry` is the raw material for classification: a GitLab activity
//! event exactly as the feed describes it, before any phrase matching.
//!
//! ## For contributors
//!
//! Every optional Atom sub-element degrades to a default here rather than an
//! `Option`, so the classifier never has to guess whether a field exists.

use chrono::{DateTime, Utc};

/// Author name used when an entry carries no `<author><name>`.
pub const UNKNOWN_AUTHOR: &str = "Unknown User";

/// A single `<entry>` from the activity feed.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FeedEntry {
    /// Stable identifier of the underlying event; the de-duplication key.
    pub id: String,

    /// When the event happened, normalised to UTC.
    pub updated_at: DateTime<Utc>,

    /// Free-text activity description, e.g.
    /// `"Alice pushed to main at group/project"`.
    pub title: String,

    /// HTML detail blob (commit list, comment body, ...). Empty when the
    /// entry has no `<summary>`.
    pub summary_html: String,

    /// Display name of the actor, [`UNKNOWN_AUTHOR`] when absent.
    pub author_name: String,
}

impl FeedEntry {
    /// Is this entry younger than `window` at `now`?
    ///
    /// Entries stamped in the future count as recent.
    pub fn is_recent(&self, now: DateTime<Utc>, window: chrono::Duration) -> bool {
        now.signed_duration_since(self.updated_at) < window
    }
}
