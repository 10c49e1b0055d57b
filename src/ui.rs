//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * The layout is a two-row split: the activity list on top and a one-line
//!   status bar at the bottom.
//! * [`entry_text`] is shared with the `--once` printer in `main.rs`, so the
//!   wording of an item only lives in one place.

use std::time::Instant;

use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::coordinator::ActivityRecord;

/// The words of one list item, before styling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryText {
    /// `"{author} {headline}"`
    pub heading: String,
    /// `"MM/DD h:mm AM • project"`
    pub meta: String,
    /// Omitted when the activity has no detail.
    pub detail: Option<String>,
}

pub fn entry_text(record: &ActivityRecord) -> EntryText {
    EntryText {
        heading: format!("{} {}", record.author, record.headline()),
        meta: format!(
            "{} • {}",
            format_entry_time(record.updated_at),
            record.activity.project
        ),
        detail: Some(record.activity.detail.clone()).filter(|d| !d.is_empty()),
    }
}

/// `MM/DD h:mm AM` in local time.
pub fn format_entry_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%m/%d %-I:%M %p").to_string()
}

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame, now: Instant) {
    let [main_area, status_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_activity_list(app, frame, main_area, now);
    draw_status_bar(app, frame, status_area);
}

/// Render the scrollable activity list.
fn draw_activity_list(app: &mut App, frame: &mut Frame, area: Rect, now: Instant) {
    let list_items: Vec<ListItem> = app
        .records
        .iter()
        .map(|record| {
            let text = entry_text(record);

            let mut meta = vec![Span::styled(text.meta, Style::default().fg(Color::DarkGray))];
            if record.is_recent {
                meta.push(Span::styled(" ● ", Style::default().fg(Color::Red)));
                meta.push(Span::styled(
                    "NEW!",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ));
            }

            let mut lines = vec![
                Line::from(Span::styled(
                    text.heading,
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                )),
                Line::from(meta),
            ];
            if let Some(detail) = text.detail {
                lines.push(Line::from(Span::styled(
                    detail,
                    Style::default().fg(Color::Gray),
                )));
            }

            let item = ListItem::new(lines);
            if app.is_highlighted(record, now) {
                item.style(Style::default().bg(Color::Blue))
            } else {
                item
            }
        })
        .collect();

    let list = List::new(list_items)
        .block(
            Block::default()
                .title(" GitLab Activity ")
                .borders(Borders::ALL),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let line = match &app.banner {
        Some(banner) => Line::from(Span::styled(
            format!(" {banner}"),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        None => {
            let updated = app
                .last_update
                .map(|at| format!("Updated {}", format_entry_time(at)))
                .unwrap_or_else(|| "Loading…".into());
            Line::from(vec![
                Span::styled(format!(" {updated}"), Style::default().fg(Color::Yellow)),
                Span::raw("  "),
                Span::styled(
                    format!("{} items", app.records.len()),
                    Style::default().fg(Color::Green),
                ),
                Span::raw("  q: quit  ↑/↓: scroll"),
            ])
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}
