//! Transport bar and now-playing panel rendering.

use crate::app::App;
use crate::engine::PlaybackState;
use crate::sequence::format_time;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};
use ratatui::Frame;

/// Renders the transport bar at the top of the screen.
///
/// Shows playback state, the pause countdown between playlist items, and
/// the latest status message.
pub fn render_transport(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" toneseq ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(16), // State
            Constraint::Length(18), // Gap countdown
            Constraint::Min(20),    // Status
        ])
        .split(inner);

    let previewing = app.player.sequencer().is_previewing();
    let state = match app.player.state() {
        _ if previewing => Span::styled(
            " [~] PREVIEW ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        PlaybackState::Playing => Span::styled(
            " [>] PLAY ",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        PlaybackState::Paused => Span::styled(
            " [||] PAUSE ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        PlaybackState::Completed => Span::styled(
            " [#] DONE ",
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        ),
        PlaybackState::Idle => Span::styled(
            " [.] IDLE ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    };
    frame.render_widget(Paragraph::new(Line::from(state)), chunks[0]);

    if let Some(remaining) = app.player.playlist().gap_remaining() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("Next in {:.1}s", remaining.as_secs_f32()),
                Style::default().fg(Color::Magenta),
            )),
            chunks[1],
        );
    }

    if let Some((msg, _)) = &app.status_message {
        frame.render_widget(
            Paragraph::new(Span::styled(
                msg.as_str(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            )),
            chunks[2],
        );
    }
}

/// Renders the current frequency, its purpose, and progress gauges.
pub fn render_now_playing(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Now Playing ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (Some(entry), Some(report)) = (app.player.current_entry(), app.player.progress_report())
    else {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Nothing loaded. Select a preset and press Enter.",
                Style::default().fg(Color::DarkGray),
            )),
            inner,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Preset name
            Constraint::Length(1), // Frequency
            Constraint::Length(1), // Purpose
            Constraint::Length(2), // Entry gauge
            Constraint::Length(2), // Total gauge
        ])
        .split(inner);

    let name = app.now_playing_name().unwrap_or_default();
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(name, Style::default().fg(Color::White)),
            Span::styled(
                format!("  {}/{}", report.current_index + 1, report.total_entries),
                Style::default().fg(Color::DarkGray),
            ),
        ])),
        chunks[0],
    );

    frame.render_widget(
        Paragraph::new(Span::styled(
            entry.label(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        chunks[1],
    );

    frame.render_widget(
        Paragraph::new(Span::styled(
            entry.purpose.clone(),
            Style::default().fg(Color::Gray),
        )),
        chunks[2],
    );

    let entry_label = format!(
        "{} / {}",
        format_time(report.elapsed_in_entry as u64),
        format_time(report.seconds_per_entry as u64)
    );
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Green))
            .ratio(report.entry_ratio())
            .label(entry_label),
        chunks[3],
    );

    let total_seconds = report.total_entries as u64 * report.seconds_per_entry as u64;
    let total_label = format!(
        "{} / {}",
        format_time(report.elapsed_total),
        format_time(total_seconds)
    );
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Blue))
            .ratio(report.total_ratio())
            .label(total_label),
        chunks[4],
    );
}
