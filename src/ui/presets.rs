//! Preset and frequency list rendering.
//!
//! The preset list shows every catalog preset with its length. The
//! frequency list below it shows the selected preset's entries and whether
//! each is enabled.

use crate::app::App;
use crate::sequence::format_time;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

#[inline]
fn border_style(focused: bool) -> Style {
    Style::default().fg(if focused { Color::Cyan } else { Color::Gray })
}

#[inline]
fn highlight_style() -> Style {
    Style::default()
        .bg(Color::Rgb(40, 40, 40))
        .add_modifier(Modifier::BOLD)
}

/// Renders the preset list.
///
/// # Arguments
///
/// * `frame` - The frame to render to
/// * `area` - The area to render in
/// * `app` - Application state
/// * `focused` - Whether this panel is focused
pub fn render_preset_list(frame: &mut Frame, area: Rect, app: &App, focused: bool) {
    let title = if app.catalog.title.is_empty() {
        " Presets ".to_string()
    } else {
        format!(" Presets: {} ", app.catalog.title)
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(focused));

    let playing_id = app.player.sequence().map(|s| s.preset_id().to_string());

    let items: Vec<ListItem> = app
        .catalog
        .presets
        .iter()
        .map(|preset| {
            let is_playing = playing_id.as_deref() == Some(preset.id.as_str());
            let marker = if is_playing {
                Span::styled(
                    "* ",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::raw("  ")
            };
            let total = preset.playable_count() as u64 * preset.clamped_minutes() as u64 * 60;
            let mut spans = vec![
                marker,
                Span::styled(preset.name.clone(), Style::default().fg(Color::White)),
                Span::styled(
                    format!(
                        "  {}x{}m {}",
                        preset.playable_count(),
                        preset.clamped_minutes(),
                        format_time(total)
                    ),
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            if !preset.category.is_empty() {
                spans.push(Span::styled(
                    format!("  [{}]", preset.category),
                    Style::default().fg(Color::Blue),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    if items.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Catalog is empty",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block),
            area,
        );
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style())
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.selected_preset));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Renders the selected preset's frequencies.
pub fn render_frequency_list(frame: &mut Frame, area: Rect, app: &App, focused: bool) {
    let block = Block::default()
        .title(" Frequencies [t]oggle ")
        .borders(Borders::ALL)
        .border_style(border_style(focused));

    let Some(preset) = app.selected() else {
        frame.render_widget(block, area);
        return;
    };

    let items: Vec<ListItem> = preset
        .frequencies
        .iter()
        .map(|entry| {
            let (check, style) = if entry.enabled {
                ("[x] ", Style::default().fg(Color::White))
            } else {
                ("[ ] ", Style::default().fg(Color::DarkGray))
            };
            ListItem::new(Line::from(vec![
                Span::styled(check, style),
                Span::styled(
                    format!("{:>10}", entry.label()),
                    style.add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  {}", entry.purpose), style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style())
        .highlight_symbol(if focused { "> " } else { "  " });

    let mut state = ListState::default();
    state.select(Some(app.selected_frequency));
    frame.render_stateful_widget(list, area, &mut state);
}
