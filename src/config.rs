//! Command-line flags and the optional JSON config file.
//!
//! Precedence, highest first: flags (and their environment variables), the
//! config file, built-in defaults. The file uses the camelCase keys the
//! kiosk's `config.json` has always used, so an existing file keeps working.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Deserialize;

use crate::coordinator::PollPolicy;

const DEFAULT_CONFIG_FILE: &str = "config.json";

/// GitLab activity kiosk: shows a GitLab Atom activity feed full-screen.
#[derive(Debug, Default, Parser)]
#[command(name = "gitlab-kiosk", version, about)]
pub struct Cli {
    /// Atom feed URL, e.g. https://gitlab.example.com/dashboard/projects.atom?feed_token=...
    #[arg(long, env = "GITLAB_FEED_URL")]
    pub feed_url: Option<String>,

    /// JSON config file [default: ./config.json when present]
    #[arg(long, short, env = "KIOSK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Milliseconds between polls [default: 60000]
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Entries younger than this many milliseconds get a NEW! badge [default: 900000]
    #[arg(long)]
    pub recent_window_ms: Option<u64>,

    /// How long new entries stay highlighted, in milliseconds [default: 1000]
    #[arg(long)]
    pub highlight_duration_ms: Option<u64>,

    /// Comment bodies are cut to this many characters [default: 150]
    #[arg(long)]
    pub detail_max_chars: Option<usize>,

    /// Per-request timeout in milliseconds [default: 30000]
    #[arg(long)]
    pub request_timeout_ms: Option<u64>,

    /// Verify the feed server's TLS certificate (off by default)
    #[arg(long)]
    pub verify_tls: bool,

    /// Poll once, print the activity list to stdout and exit
    #[arg(long)]
    pub once: bool,

    /// Write logs to this file (the live display owns the terminal)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Contents of the JSON config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(alias = "gitlabFeedUrl")]
    pub feed_url: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub recent_window_ms: Option<u64>,
    pub highlight_duration_ms: Option<u64>,
    pub detail_max_chars: Option<usize>,
    pub request_timeout_ms: Option<u64>,
    pub verify_tls: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub feed_url: String,
    pub poll_interval: Duration,
    pub recent_window: Duration,
    pub highlight_duration: Duration,
    pub detail_max_chars: usize,
    pub request_timeout: Duration,
    pub verify_tls: bool,
}

impl Config {
    /// Merge flags, the config file and defaults.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                FileConfig::load(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => FileConfig::default(),
        };
        Self::merge(cli, file)
    }

    fn merge(cli: &Cli, file: FileConfig) -> Result<Self> {
        let Some(feed_url) = cli.feed_url.clone().or(file.feed_url) else {
            bail!("no feed URL configured: pass --feed-url, set GITLAB_FEED_URL or add \"feedUrl\" to the config file");
        };
        let millis = |flag: Option<u64>, file: Option<u64>, default: u64| {
            Duration::from_millis(flag.or(file).unwrap_or(default))
        };

        let config = Self {
            feed_url,
            poll_interval: millis(cli.poll_interval_ms, file.poll_interval_ms, 60_000),
            recent_window: millis(cli.recent_window_ms, file.recent_window_ms, 900_000),
            highlight_duration: millis(
                cli.highlight_duration_ms,
                file.highlight_duration_ms,
                1_000,
            ),
            detail_max_chars: cli.detail_max_chars.or(file.detail_max_chars).unwrap_or(150),
            request_timeout: millis(cli.request_timeout_ms, file.request_timeout_ms, 30_000),
            verify_tls: cli.verify_tls || file.verify_tls.unwrap_or(false),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.feed_url.trim().is_empty() {
            bail!("feed URL is empty");
        }
        if self.poll_interval.is_zero() {
            bail!("poll interval must be greater than zero");
        }
        if self.request_timeout.is_zero() {
            bail!("request timeout must be greater than zero");
        }
        if self.detail_max_chars == 0 {
            bail!("detailMaxChars must be greater than zero");
        }
        Ok(())
    }

    pub fn poll_policy(&self) -> Result<PollPolicy> {
        Ok(PollPolicy {
            recent_window: chrono::Duration::from_std(self.recent_window)
                .context("recent window is too large")?,
            detail_max_chars: self.detail_max_chars,
        })
    }
}
