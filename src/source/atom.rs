//! Atom document parsing.
//!
//! Turns the body returned by a [`FeedFetcher`](super::FeedFetcher) into
//! [`FeedEntry`] values using the [`atom_syndication`] crate. This is a pure
//! function (no I/O) so that tests can exercise it without a network.

use atom_syndication::{Entry, Feed};
use chrono::Utc;

use super::feed_entry::{FeedEntry, UNKNOWN_AUTHOR};
use crate::error::FeedError;

/// Parse an Atom document into entries, in document order.
///
/// Fails with [`FeedError::Parse`] when the text is not well-formed XML, the
/// root is not an Atom `<feed>`, or an entry has no `<id>`.
pub fn parse(body: &str) -> Result<Vec<FeedEntry>, FeedError> {
    let feed = Feed::read_from(body.as_bytes())?;
    feed.entries().iter().map(convert_entry).collect()
}

fn convert_entry(entry: &Entry) -> Result<FeedEntry, FeedError> {
    let id = entry.id().trim();
    if id.is_empty() {
        return Err(FeedError::Parse(format!(
            "entry {:?} has no id",
            entry.title().as_str()
        )));
    }

    // Only the first author is shown; GitLab emits exactly one.
    let author_name = entry
        .authors()
        .first()
        .map(|person| person.name().trim())
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_AUTHOR);

    Ok(FeedEntry {
        id: id.to_string(),
        updated_at: entry.updated().with_timezone(&Utc),
        title: entry.title().as_str().trim().to_string(),
        summary_html: entry
            .summary()
            .map(|summary| summary.value.clone())
            .unwrap_or_default(),
        author_name: author_name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GITLAB_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:media="http://search.yahoo.com/mrss/">
  <title>group activity</title>
  <id>https://gitlab.example.com/group.atom</id>
  <updated>2025-03-01T12:00:00Z</updated>
  <entry>
    <id>tag:gitlab.example.com,2025-03-01:1001</id>
    <link href="https://gitlab.example.com/group/project/-/compare/a...b"/>
    <title>Alice pushed to main at group / project</title>
    <updated>2025-03-01T11:58:00Z</updated>
    <media:thumbnail width="40" height="40" url="https://gitlab.example.com/avatar.png"/>
    <author>
      <name>Alice</name>
      <email>alice@example.com</email>
    </author>
    <summary type="html">&lt;div class="blockquote"&gt;&lt;p&gt;Fix the build&lt;/p&gt;&lt;/div&gt;</summary>
  </entry>
  <entry>
    <id>tag:gitlab.example.com,2025-03-01:1000</id>
    <title>Bob opened issue #42: Fix crash at group / project</title>
    <updated>2025-03-01T06:00:00-05:00</updated>
  </entry>
</feed>"#;

    #[test]
    fn parse_extracts_entries_in_document_order() {
        let entries = parse(GITLAB_FEED).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "tag:gitlab.example.com,2025-03-01:1001");
        assert_eq!(entries[0].title, "Alice pushed to main at group / project");
        assert_eq!(entries[0].author_name, "Alice");
        assert_eq!(
            entries[0].summary_html,
            r#"<div class="blockquote"><p>Fix the build</p></div>"#
        );
        assert_eq!(entries[1].id, "tag:gitlab.example.com,2025-03-01:1000");
    }

    #[test]
    fn missing_summary_and_author_degrade_to_defaults() {
        let entries = parse(GITLAB_FEED).unwrap();

        assert_eq!(entries[1].summary_html, "");
        assert_eq!(entries[1].author_name, UNKNOWN_AUTHOR);
    }

    #[test]
    fn updated_is_normalised_to_utc() {
        let entries = parse(GITLAB_FEED).unwrap();

        assert_eq!(
            entries[1].updated_at.format("%Y-%m-%d %H:%M").to_string(),
            "2025-03-01 11:00"
        );
    }

    #[test]
    fn empty_feed_yields_no_entries() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Empty</title>
  <id>urn:test</id>
  <updated>2025-01-01T00:00:00Z</updated>
</feed>"#;

        assert!(parse(xml).unwrap().is_empty());
    }

    #[test]
    fn malformed_xml_is_a_parse_error() {
        let err = parse("<feed><entry><title>oops</feed>").unwrap_err();
        assert!(matches!(err, FeedError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn html_error_page_is_a_parse_error() {
        let err = parse("<html><body>502 Bad Gateway</body></html>").unwrap_err();
        assert!(matches!(err, FeedError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn entry_without_id_is_a_parse_error() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>t</title>
  <id>urn:test</id>
  <updated>2025-01-01T00:00:00Z</updated>
  <entry>
    <title>Alice pushed to main at g/p</title>
    <updated>2025-01-01T00:00:00Z</updated>
  </entry>
</feed>"#;

        let err = parse(xml).unwrap_err();
        assert!(matches!(err, FeedError::Parse(_)), "got {err:?}");
    }
}
