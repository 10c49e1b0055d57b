use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use ratatui::widgets::ListState;

use crate::coordinator::ActivityRecord;
use crate::poll::PollMsg;

pub struct App {
    /// Records from the last successful poll, in feed order.
    pub records: Vec<ActivityRecord>,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Outage banner; `None` while the feed is healthy.
    pub banner: Option<String>,
    /// When the last successful poll landed.
    pub last_update: Option<DateTime<Utc>>,
    /// New records stay highlighted until this instant.
    highlight_until: Option<Instant>,
    highlight_duration: Duration,
}

impl App {
    pub fn new(highlight_duration: Duration) -> Self {
        Self {
            records: Vec::new(),
            list_state: ListState::default(),
            quit: false,
            banner: None,
            last_update: None,
            highlight_until: None,
            highlight_duration,
        }
    }

    /// Fold one poller message into the display state.
    pub fn apply(&mut self, msg: PollMsg, now: Instant) {
        match msg {
            PollMsg::Rendered(outcome) => {
                self.records = outcome.records;
                self.last_update = outcome.status.last_success;
                self.banner = None;
                if outcome.has_new {
                    self.highlight_until = Some(now + self.highlight_duration);
                    self.scroll_to_top();
                } else {
                    self.clamp_selection();
                }
            }
            // Keep the last good list on screen.
            PollMsg::Failed { banner } => self.banner = Some(banner),
        }
    }

    /// Is the new-item highlight still showing at `now`?
    pub fn highlight_active(&self, now: Instant) -> bool {
        self.highlight_until.is_some_and(|until| now < until)
    }

    /// Should `record` be drawn highlighted at `now`?
    pub fn is_highlighted(&self, record: &ActivityRecord, now: Instant) -> bool {
        record.is_new && self.highlight_active(now)
    }

    pub fn scroll_to_top(&mut self) {
        *self.list_state.offset_mut() = 0;
        if self.records.is_empty() {
            self.list_state.select(None);
        } else {
            self.list_state.select(Some(0));
        }
    }

    fn clamp_selection(&mut self) {
        match (self.list_state.selected(), self.records.len()) {
            (_, 0) => self.list_state.select(None),
            (Some(i), len) if i >= len => self.list_state.select(Some(len - 1)),
            _ => {}
        }
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        if self.records.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.records.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.records.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.records.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.records.is_empty() {
            self.list_state.select(Some(self.records.len() - 1));
        }
    }
}
