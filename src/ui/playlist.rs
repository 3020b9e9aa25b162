//! Playlist queue rendering.

use crate::app::App;
use crate::sequence::format_time;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;

/// Renders the queued items, marking the one that is playing.
pub fn render_playlist(frame: &mut Frame, area: Rect, app: &App) {
    let playlist = app.player.playlist();
    let queue = playlist.queue();

    let title = format!(
        " Playlist ({} items, {}) ",
        queue.len(),
        format_time(queue.total_seconds())
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if playlist.is_active() {
            Color::Magenta
        } else {
            Color::Gray
        }));

    if queue.is_empty() {
        frame.render_widget(
            Paragraph::new(vec![
                Line::from(Span::styled(
                    "Empty. Press [a] to queue the selected preset.",
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(Span::styled(
                    "[x] remove last  [c] clear  [p] play",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .block(block),
            area,
        );
        return;
    }

    let current = playlist.current_position();
    let items: Vec<ListItem> = queue
        .items()
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if current == Some(i) {
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:2}. ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(item.name.clone(), style),
                Span::styled(
                    format!(
                        "  {} tones, {}",
                        item.sequence.len(),
                        format_time(item.sequence.total_seconds())
                    ),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
