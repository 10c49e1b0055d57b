//! Feed acquisition: fetching the document and turning it into entries.
//!
//! This module defines the [`FeedFetcher`] trait and the [`FeedEntry`] type.
//! [`HttpFetcher`] is the production fetcher; [`atom::parse`] reads the body.
//!
//! ## For contributors
//!
//! The poll coordinator only depends on the trait, so a test can hand it any
//! fetcher that returns canned text or errors.

pub mod atom;
mod feed_entry;
mod http;

pub use feed_entry::FeedEntry;
pub use http::HttpFetcher;

#[cfg(test)]
pub(crate) use feed_entry::tests::make_entry;

use crate::error::FeedError;

/// Something that can produce the raw feed document.
///
/// The poller calls [`fetch()`](FeedFetcher::fetch) from a background
/// thread, so implementations must be [`Send`].
pub trait FeedFetcher: Send {
    /// Where the feed comes from, for logs.
    fn url(&self) -> &str;

    /// Fetch the document body once. No retries: the next poll is the retry.
    fn fetch(&self) -> Result<String, FeedError>;
}
