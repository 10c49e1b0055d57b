//! HTTPS fetcher for the activity feed.
//!
//! One [`reqwest::blocking::Client`] is built per fetcher and reused for every
//! poll. Certificate checks can be switched off for this client only; other
//! clients in the process are unaffected.

use std::time::Duration;

use super::FeedFetcher;
use crate::error::FeedError;

/// Fetches the feed document over HTTP(S).
pub struct HttpFetcher {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Build a fetcher for `url`.
    ///
    /// * `timeout`: upper bound for one request, connect to last body byte.
    /// * `accept_invalid_certs`: trust self-signed or otherwise invalid
    ///   certificates presented by this endpoint.
    pub fn new(
        url: impl Into<String>,
        timeout: Duration,
        accept_invalid_certs: bool,
    ) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(format!("gitlab-kiosk/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {}", e))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

impl FeedFetcher for HttpFetcher {
    fn url(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> Result<String, FeedError> {
        let response = self.client.get(&self.url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }
        Ok(response.text()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn fetcher(server: &MockServer) -> HttpFetcher {
        HttpFetcher::new(server.url("/dashboard/projects.atom"), Duration::from_secs(5), true)
            .unwrap()
    }

    #[test]
    fn fetch_returns_body_on_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/dashboard/projects.atom");
            then.status(200)
                .header("content-type", "application/atom+xml")
                .body("<feed/>");
        });

        let body = fetcher(&server).fetch().unwrap();

        mock.assert();
        assert_eq!(body, "<feed/>");
    }

    #[test]
    fn fetch_maps_503_to_status_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/dashboard/projects.atom");
            then.status(503).body("down for maintenance");
        });

        let err = fetcher(&server).fetch().unwrap_err();

        assert_eq!(
            err,
            FeedError::Status {
                code: 503,
                reason: "Service Unavailable".into()
            }
        );
        assert!(err.is_network());
    }

    #[test]
    fn fetch_sends_user_agent() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/dashboard/projects.atom")
                .header_exists("user-agent");
            then.status(200).body("<feed/>");
        });

        fetcher(&server).fetch().unwrap();
        mock.assert();
    }

    #[test]
    fn connection_refused_is_network_error() {
        // Port 9 (discard) on localhost is almost never listening.
        let fetcher =
            HttpFetcher::new("http://127.0.0.1:9/feed.atom", Duration::from_secs(2), true)
                .unwrap();

        let err = fetcher.fetch().unwrap_err();
        assert!(matches!(err, FeedError::Network(_)), "got {err:?}");
    }

    #[test]
    fn url_returns_configured_url() {
        let fetcher =
            HttpFetcher::new("https://gitlab.example.com/x.atom", Duration::from_secs(1), false)
                .unwrap();
        assert_eq!(fetcher.url(), "https://gitlab.example.com/x.atom");
    }
}
