//! Help overlay rendering.
//!
//! Displays keyboard shortcuts in a modal overlay.

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::centered_rect;

/// Key binding entry for the help display.
struct KeyBinding {
    key: &'static str,
    description: &'static str,
}

const GENERAL_BINDINGS: &[KeyBinding] = &[
    KeyBinding {
        key: "?",
        description: "Toggle this help",
    },
    KeyBinding {
        key: "q / Esc",
        description: "Quit (position is saved for resume)",
    },
    KeyBinding {
        key: "Ctrl+C",
        description: "Force quit",
    },
    KeyBinding {
        key: "Tab",
        description: "Switch between presets and frequencies",
    },
];

const PLAYBACK_BINDINGS: &[KeyBinding] = &[
    KeyBinding {
        key: "Enter",
        description: "Start selected preset from the beginning",
    },
    KeyBinding {
        key: "Space",
        description: "Play / Pause",
    },
    KeyBinding {
        key: "s",
        description: "Stop (reset to start)",
    },
    KeyBinding {
        key: "r",
        description: "Resume last session",
    },
];

const PRESET_BINDINGS: &[KeyBinding] = &[
    KeyBinding {
        key: "k / Up",
        description: "Select previous",
    },
    KeyBinding {
        key: "j / Down",
        description: "Select next",
    },
    KeyBinding {
        key: "+ / -",
        description: "More / fewer minutes per frequency",
    },
    KeyBinding {
        key: "t",
        description: "Enable / disable highlighted frequency",
    },
    KeyBinding {
        key: "v",
        description: "Preview highlighted frequency (3 s)",
    },
];

const PLAYLIST_BINDINGS: &[KeyBinding] = &[
    KeyBinding {
        key: "a",
        description: "Queue selected preset",
    },
    KeyBinding {
        key: "x",
        description: "Remove last queued item",
    },
    KeyBinding {
        key: "c",
        description: "Clear queue",
    },
    KeyBinding {
        key: "p",
        description: "Play queue from the first item",
    },
];

/// Renders the help overlay.
///
/// # Arguments
///
/// * `frame` - The frame to render to
/// * `scroll` - Vertical scroll offset
pub fn render_help(frame: &mut Frame, scroll: u16) {
    let area = centered_rect(60, 70, frame.area());

    // Clear the area behind the popup
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Help - Keyboard Shortcuts ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Scrollable content
            Constraint::Length(1), // Fixed footer
        ])
        .split(inner);

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(Color::White);

    let sections = [
        ("General", GENERAL_BINDINGS),
        ("Playback", PLAYBACK_BINDINGS),
        ("Presets", PRESET_BINDINGS),
        ("Playlist", PLAYLIST_BINDINGS),
    ];

    let mut lines: Vec<Line<'static>> = Vec::new();
    for (title, bindings) in sections {
        lines.push(Line::from(Span::styled(title, section_style)));
        for binding in bindings {
            lines.push(Line::from(vec![
                Span::styled(format!("{:15}", binding.key), key_style),
                Span::styled(binding.description, desc_style),
            ]));
        }
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), chunks[0]);

    let footer = Paragraph::new(Line::from(Span::styled(
        "Scroll: Up/Down/j/k  |  Close: ?/Esc",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )));
    frame.render_widget(footer, chunks[1]);
}
