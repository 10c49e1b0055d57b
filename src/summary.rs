//! Reading the HTML `<summary>` blob GitLab attaches to each entry.
//!
//! Push events carry a `div.blockquote` with the commit message and a link
//! whose text is the short hash. Comment events carry the rendered Markdown
//! body, whose paragraphs GitLab tags with `data-sourcepos`.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

static BLOCKQUOTE_PARAGRAPH: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".blockquote p").unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static SOURCEPOS_PARAGRAPH: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p[data-sourcepos]").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

static RE_MORE_COMMITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+) more commits").unwrap());

/// A parsed summary fragment.
pub struct Summary {
    doc: Html,
}

impl Summary {
    pub fn parse(html: &str) -> Self {
        Self {
            doc: Html::parse_fragment(html),
        }
    }

    /// Text of the first paragraph inside the commit blockquote, trimmed.
    pub fn commit_message(&self) -> String {
        self.first_text(&BLOCKQUOTE_PARAGRAPH)
    }

    /// Text of the first link, which for push events is the short hash.
    pub fn commit_hash(&self) -> String {
        self.first_text(&ANCHOR)
    }

    /// `N` from a trailing "... N more commits" note, if present.
    pub fn more_commits(&self) -> Option<u32> {
        RE_MORE_COMMITS
            .captures(&self.text())
            .and_then(|caps| caps[1].parse().ok())
    }

    /// Comment body as one whitespace-collapsed line.
    ///
    /// Prefers GitLab's source-positioned paragraphs, then any paragraph,
    /// then the whole fragment text.
    pub fn comment_text(&self) -> String {
        let mut text = self.joined_paragraphs(&SOURCEPOS_PARAGRAPH);
        if text.is_empty() {
            text = self.joined_paragraphs(&PARAGRAPH);
        }
        if text.is_empty() {
            text = self.text();
        }
        collapse_whitespace(&text)
    }

    /// All text content of the fragment.
    pub fn text(&self) -> String {
        self.doc.root_element().text().collect()
    }

    fn first_text(&self, selector: &Selector) -> String {
        self.doc
            .select(selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    }

    fn joined_paragraphs(&self, selector: &Selector) -> String {
        self.doc
            .select(selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `text` to `max_chars` characters, appending `"..."` when shortened.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUSH_SUMMARY: &str = r#"<div class="blockquote"><p>Fix the flaky login test</p></div>
<a href="https://gitlab.example.com/g/p/-/commit/a1b2c3d4">a1b2c3d4</a>
<p>... and 3 more commits</p>"#;

    #[test]
    fn commit_message_and_hash_from_push_summary() {
        let summary = Summary::parse(PUSH_SUMMARY);
        assert_eq!(summary.commit_message(), "Fix the flaky login test");
        assert_eq!(summary.commit_hash(), "a1b2c3d4");
        assert_eq!(summary.more_commits(), Some(3));
    }

    #[test]
    fn missing_blockquote_yields_empty_strings() {
        let summary = Summary::parse("");
        assert_eq!(summary.commit_message(), "");
        assert_eq!(summary.commit_hash(), "");
        assert_eq!(summary.more_commits(), None);
    }

    #[test]
    fn comment_prefers_sourcepos_paragraphs() {
        let summary = Summary::parse(
            r#"<p>quoted context</p>
<p data-sourcepos="1:1-1:10">Looks good</p>
<p data-sourcepos="3:1-3:12">  ship   it  </p>"#,
        );
        assert_eq!(summary.comment_text(), "Looks good ship it");
    }

    #[test]
    fn comment_falls_back_to_plain_paragraphs() {
        let summary = Summary::parse("<p>first</p><p></p><p>second\n line</p>");
        assert_eq!(summary.comment_text(), "first second line");
    }

    #[test]
    fn comment_falls_back_to_all_text() {
        let summary = Summary::parse("<div>just\n\n<b>text</b></div>");
        assert_eq!(summary.comment_text(), "just text");
    }

    #[test]
    fn truncate_leaves_short_text_alone() {
        let body = "x".repeat(100);
        assert_eq!(truncate(&body, 150), body);
    }

    #[test]
    fn truncate_cuts_long_text_and_appends_ellipsis() {
        let body = "y".repeat(200);
        let out = truncate(&body, 150);
        assert_eq!(out, format!("{}...", "y".repeat(150)));
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        let body = "é".repeat(5);
        assert_eq!(truncate(&body, 3), "ééé...");
    }
}
