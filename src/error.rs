//! Failure taxonomy for one poll.
//!
//! A poll either cannot get the document (`Network`, `Status`) or gets one it
//! cannot read (`Parse`). Neither is fatal: the coordinator records the
//! message and the next tick tries again.

/// Errors produced while fetching or parsing the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    /// Transport failure: DNS, connect, TLS, timeout, body read.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("network response was not ok: {code} {reason}")]
    Status { code: u16, reason: String },

    /// The body is not a well-formed Atom document.
    #[error("malformed feed: {0}")]
    Parse(String),
}

impl FeedError {
    /// `true` for the network branch (transport or HTTP status), `false` for
    /// parse failures.
    pub fn is_network(&self) -> bool {
        matches!(self, FeedError::Network(_) | FeedError::Status { .. })
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FeedError::Network(format!("request timed out: {err}"))
        } else {
            FeedError::Network(err.to_string())
        }
    }
}

impl From<atom_syndication::Error> for FeedError {
    fn from(err: atom_syndication::Error) -> Self {
        FeedError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_displays_code_and_reason() {
        let err = FeedError::Status {
            code: 503,
            reason: "Service Unavailable".into(),
        };
        assert_eq!(
            err.to_string(),
            "network response was not ok: 503 Service Unavailable"
        );
        assert!(err.is_network());
    }

    #[test]
    fn parse_error_is_not_network() {
        let err = FeedError::Parse("unexpected end of file".into());
        assert!(!err.is_network());
        assert!(err.to_string().starts_with("malformed feed"));
    }
}
