//! Terminal user interface components.
//!
//! This module provides the visual components for the player: the preset
//! and frequency lists, the transport and now-playing panels, the playlist
//! queue, and modal overlays.

mod dialogs;
mod help;
mod now_playing;
mod playlist;
mod presets;

use crate::app::{App, FocusedPanel};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

pub use dialogs::render_resume_prompt;
pub use help::render_help;
pub use now_playing::{render_now_playing, render_transport};
pub use playlist::render_playlist;
pub use presets::{render_frequency_list, render_preset_list};

/// Renders the complete UI layout.
///
/// The layout is divided into:
/// - Top: transport bar with state and status message
/// - Left: preset list above the selected preset's frequencies
/// - Right: now-playing panel above the playlist queue
/// - Bottom: key hints
pub fn render(frame: &mut Frame, app: &App) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Transport
            Constraint::Min(10),   // Content
            Constraint::Length(1), // Key hints
        ])
        .split(frame.area());

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(main_chunks[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(content_chunks[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Now playing
            Constraint::Min(5),    // Playlist
        ])
        .split(content_chunks[1]);

    render_transport(frame, main_chunks[0], app);
    render_preset_list(
        frame,
        left[0],
        app,
        app.focused_panel == FocusedPanel::Presets,
    );
    render_frequency_list(
        frame,
        left[1],
        app,
        app.focused_panel == FocusedPanel::Frequencies,
    );
    render_now_playing(frame, right[0], app);
    render_playlist(frame, right[1], app);
    render_key_hints(frame, main_chunks[2]);
}

/// Renders the one-line key reference at the bottom of the screen.
fn render_key_hints(frame: &mut Frame, area: Rect) {
    let key_style = Style::default().fg(Color::Yellow);
    let desc_style = Style::default().fg(Color::DarkGray);

    let hints = [
        ("Enter", "Start"),
        ("Space", "Play/Pause"),
        ("s", "Stop"),
        ("a", "Queue"),
        ("p", "Playlist"),
        ("+/-", "Minutes"),
        ("Tab", "Focus"),
        ("v", "Preview"),
        ("?", "Help"),
        ("q", "Quit"),
    ];

    let mut spans = Vec::with_capacity(hints.len() * 4);
    for (key, description) in hints {
        spans.push(Span::styled("[", desc_style));
        spans.push(Span::styled(key, key_style));
        spans.push(Span::styled("]", desc_style));
        spans.push(Span::styled(format!("{} ", description), desc_style));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().add_modifier(Modifier::DIM)),
        area,
    );
}

/// Helper function to center a rectangle within another rectangle.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
