//! Modal prompt for resuming the last session.

use crate::app::App;
use crate::sequence::format_time;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::centered_rect;

/// Renders the resume prompt when a checkpoint is on offer.
///
/// # Arguments
///
/// * `frame` - The frame to render to
/// * `app` - Application state
pub fn render_resume_prompt(frame: &mut Frame, app: &App) {
    let Some(checkpoint) = &app.resume_offer else {
        return;
    };

    let area = centered_rect(50, 25, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Resume Session ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Spacer
            Constraint::Length(2), // Message
            Constraint::Length(1), // Spacer
            Constraint::Min(1),    // Instructions
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled(
                format!("Continue {}?", app.preset_name(&checkpoint.preset_id)),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!(
                    "Frequency {} at {}",
                    checkpoint.current_index + 1,
                    format_time(checkpoint.elapsed_in_entry as u64)
                ),
                Style::default().fg(Color::Gray),
            )),
        ]),
        chunks[1],
    );

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("[r/Enter]", Style::default().fg(Color::Yellow)),
            Span::styled(" Resume  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[Esc/n]", Style::default().fg(Color::Yellow)),
            Span::styled(" Dismiss", Style::default().fg(Color::DarkGray)),
        ])),
        chunks[3],
    );
}
