//! Classifying GitLab activity titles.
//!
//! GitLab describes every event as a sentence:
//! `"<actor> <verb phrase> at <project>"` (or `in <project>` for wiki pages).
//! [`classify`] walks an ordered rule table and the first rule whose pattern
//! matches the title decides the [`ActivityKind`]. Order matters: the issue
//! and merge request rules must win over the generic "commented on" rule, and
//! everything unmatched degrades to [`ActivityKind::Unknown`].

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::source::FeedEntry;
use crate::summary::{truncate, Summary};

/// Project shown when the title has no `at <project>` / `in <project>` tail.
pub const UNKNOWN_PROJECT: &str = "Unknown Project";

/// Detail shown for a comment whose entry has no summary at all.
pub const NO_COMMENT_CONTENT: &str = "No comment content available";

/// What a comment was left on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentTarget {
    Issue(u64),
    /// Anything else, verbatim: `"merge request !3"`, `"commit a1b2c3"`, ...
    Other(String),
}

/// The recognised event categories, with the fields each one extracts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityKind {
    Push { branch: String },
    BranchPush { branch: String },
    IssueOpened { number: u64, title: String },
    IssueClosed { number: u64, title: String },
    MergeRequestOpened { number: u64, title: String },
    MergeRequestAccepted { number: u64, title: String },
    Comment { target: CommentTarget },
    WikiCreated { page: String },
    WikiUpdated { page: String },
    /// No rule matched; `headline` is the title minus actor and project.
    Unknown { headline: String },
}

/// A classified entry, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub kind: ActivityKind,
    pub project: String,
    /// Secondary line; empty when there is nothing to add.
    pub detail: String,
}

impl Activity {
    /// Short phrase that follows the author name, e.g. `"pushed to main"`.
    pub fn headline(&self) -> String {
        match &self.kind {
            ActivityKind::Push { branch } => format!("pushed to {branch}"),
            ActivityKind::BranchPush { branch } => format!("pushed new branch {branch}"),
            ActivityKind::IssueOpened { number, .. } => format!("opened issue #{number}"),
            ActivityKind::IssueClosed { number, .. } => format!("closed issue #{number}"),
            ActivityKind::MergeRequestOpened { number, .. } => {
                format!("opened merge request !{number}")
            }
            ActivityKind::MergeRequestAccepted { number, .. } => {
                format!("accepted merge request !{number}")
            }
            ActivityKind::Comment {
                target: CommentTarget::Issue(number),
            } => format!("commented on issue #{number}"),
            ActivityKind::Comment {
                target: CommentTarget::Other(target),
            } => format!("commented on {target}"),
            ActivityKind::WikiCreated { .. } => "created wiki page".to_string(),
            ActivityKind::WikiUpdated { .. } => "updated wiki page".to_string(),
            ActivityKind::Unknown { headline } => headline.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

type Extract = fn(&Captures, &FeedEntry, usize) -> (ActivityKind, String);

struct Rule {
    name: &'static str,
    pattern: Regex,
    extract: Extract,
}

impl Rule {
    fn new(name: &'static str, pattern: &str, extract: Extract) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).unwrap(),
            extract,
        }
    }
}

// Greedy captures stop at the LAST " at " / " in ", so issue titles that
// contain those words survive intact.
static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new("push", r"pushed to (.+) at ", extract_push),
        Rule::new(
            "branch-push",
            r"pushed new project branch (.+) at ",
            extract_branch_push,
        ),
        Rule::new("issue-opened", r"opened issue #(\d+): (.+) at ", |caps, _, _| {
            let (number, title) = number_and_title(caps);
            (ActivityKind::IssueOpened { number, title: title.clone() }, title)
        }),
        Rule::new("issue-closed", r"closed issue #(\d+): (.+) at ", |caps, _, _| {
            let (number, title) = number_and_title(caps);
            (ActivityKind::IssueClosed { number, title: title.clone() }, title)
        }),
        Rule::new(
            "merge-request-opened",
            r"opened merge request !(\d+): (.+) at ",
            |caps, _, _| {
                let (number, title) = number_and_title(caps);
                (ActivityKind::MergeRequestOpened { number, title: title.clone() }, title)
            },
        ),
        Rule::new(
            "merge-request-accepted",
            r"accepted merge request !(\d+): (.+) at ",
            |caps, _, _| {
                let (number, title) = number_and_title(caps);
                (ActivityKind::MergeRequestAccepted { number, title: title.clone() }, title)
            },
        ),
        Rule::new("comment", r"commented on (.+) at ", extract_comment),
        Rule::new("wiki-created", r"created wiki page (.+) in ", |caps, _, _| {
            let page = group(caps, 1);
            (ActivityKind::WikiCreated { page: page.clone() }, page)
        }),
        Rule::new("wiki-updated", r"updated wiki page (.+) in ", |caps, _, _| {
            let page = group(caps, 1);
            (ActivityKind::WikiUpdated { page: page.clone() }, page)
        }),
    ]
});

static RE_PROJECT_AT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.* at (.+)$").unwrap());
static RE_PROJECT_IN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.* in (.+)$").unwrap());
static RE_BEFORE_PROJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+) at ").unwrap());
static RE_ISSUE_TARGET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^issue #(\d+)(?:: .+)?$").unwrap());

/// Classify one entry. Never fails: unknown phrasing becomes
/// [`ActivityKind::Unknown`].
pub fn classify(entry: &FeedEntry, detail_max_chars: usize) -> Activity {
    let project = project_info(&entry.title);

    for rule in RULES.iter() {
        if let Some(caps) = rule.pattern.captures(&entry.title) {
            tracing::trace!(rule = rule.name, title = %entry.title, "activity rule matched");
            let (kind, detail) = (rule.extract)(&caps, entry, detail_max_chars);
            return Activity {
                kind,
                project,
                detail: detail.trim().to_string(),
            };
        }
    }

    tracing::debug!(title = %entry.title, "no activity rule matched, using fallback");
    Activity {
        kind: ActivityKind::Unknown {
            headline: fallback_headline(entry),
        },
        project,
        detail: String::new(),
    }
}

/// Project path from the title tail, or [`UNKNOWN_PROJECT`].
pub fn project_info(title: &str) -> String {
    RE_PROJECT_AT
        .captures(title)
        .or_else(|| RE_PROJECT_IN.captures(title))
        .map(|caps| group(&caps, 1))
        .unwrap_or_else(|| UNKNOWN_PROJECT.to_string())
}

fn group(caps: &Captures, idx: usize) -> String {
    caps.get(idx)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

fn number_and_title(caps: &Captures) -> (u64, String) {
    let number = caps
        .get(1)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or_default();
    (number, group(caps, 2))
}

fn push_detail(summary: &Summary) -> String {
    format!("{} {}", summary.commit_message(), summary.commit_hash())
        .trim()
        .to_string()
}

fn extract_push(caps: &Captures, entry: &FeedEntry, _: usize) -> (ActivityKind, String) {
    let summary = Summary::parse(&entry.summary_html);
    (
        ActivityKind::Push {
            branch: group(caps, 1),
        },
        push_detail(&summary),
    )
}

fn extract_branch_push(caps: &Captures, entry: &FeedEntry, _: usize) -> (ActivityKind, String) {
    let summary = Summary::parse(&entry.summary_html);
    let mut detail = String::new();
    if !summary.commit_message().is_empty() {
        detail = push_detail(&summary);
        if let Some(more) = summary.more_commits() {
            detail.push_str(&format!(" (and {more} more commits)"));
        }
    }
    (
        ActivityKind::BranchPush {
            branch: group(caps, 1),
        },
        detail,
    )
}

fn extract_comment(
    caps: &Captures,
    entry: &FeedEntry,
    detail_max_chars: usize,
) -> (ActivityKind, String) {
    let raw_target = group(caps, 1);
    let issue_number: Option<u64> = RE_ISSUE_TARGET
        .captures(&raw_target)
        .and_then(|c| c[1].parse().ok());
    let target = match issue_number {
        Some(number) => CommentTarget::Issue(number),
        None => CommentTarget::Other(raw_target),
    };

    let detail = if entry.summary_html.trim().is_empty() {
        NO_COMMENT_CONTENT.to_string()
    } else {
        let body = Summary::parse(&entry.summary_html).comment_text();
        truncate(&body, detail_max_chars)
    };

    (ActivityKind::Comment { target }, detail)
}

/// Title minus the leading actor and the trailing `at <project>`.
fn fallback_headline(entry: &FeedEntry) -> String {
    let title = entry.title.trim();
    if title.is_empty() {
        return "Unknown Activity".to_string();
    }
    let phrase = RE_BEFORE_PROJECT
        .captures(title)
        .map(|caps| group(&caps, 1))
        .unwrap_or_else(|| title.to_string());

    let without_actor = phrase
        .strip_prefix(entry.author_name.as_str())
        .filter(|rest| rest.starts_with(' '))
        .or_else(|| phrase.split_once(' ').map(|(_, rest)| rest))
        .map(str::trim)
        .unwrap_or("");

    if without_actor.is_empty() {
        phrase
    } else {
        without_actor.to_string()
    }
}
