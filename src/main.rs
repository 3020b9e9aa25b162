//! toneseq - A terminal player for frequency sequences.
//!
//! Plays each enabled frequency of a preset for a fixed number of minutes,
//! with smooth fades between tones, and remembers where it stopped.
//!
//! # Features
//!
//! - Presets from a JSON catalog, or a built-in set
//! - Click-free fade-in and fade-out on every tone change
//! - Resume prompt after quitting mid-session
//! - Playlists of several presets with a short pause between them
//! - WAV export of a whole preset
//!
//! # Usage
//!
//! ```bash
//! cargo run                                   # Built-in presets, offer resume
//! cargo run -- --catalog presets.json --fresh # Custom catalog, skip resume
//! cargo run -- --export solfeggio out.wav     # Render a preset to WAV
//! ```
//!
//! Press `?` for help with keyboard shortcuts.

use toneseq::app::App;
use toneseq::catalog::{Catalog, PresetSource};
use toneseq::checkpoint::{FileStore, KeyValueStore, MemoryStore};
use toneseq::engine::{export_to_wav, LogObserver, RodioBackend, SilentBackend, ToneBackend};
use toneseq::{ui, Player, PlayerConfig};

use anyhow::{anyhow, Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::fs;
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Command-line options for the application.
struct CliOptions {
    /// Preset catalog file; the built-in presets are used if absent.
    catalog: Option<PathBuf>,
    /// JSON settings file.
    config: Option<PathBuf>,
    /// Skip the resume prompt and discard the saved checkpoint.
    fresh: bool,
    /// Run without an audio device.
    silent: bool,
    /// Render a preset to WAV instead of starting the TUI.
    export: Option<(String, PathBuf)>,
}

impl CliOptions {
    /// Parses command-line arguments.
    ///
    /// Supports:
    /// - `--catalog <path>` or `-c <path>`: Load presets from a JSON file
    /// - `--config <path>`: Load settings from a JSON file
    /// - `--fresh` or `-f`: Skip resume and clear the checkpoint
    /// - `--silent`: No audio output; timing, events, and checkpoints still run
    /// - `--export <preset-id> <out.wav>`: Render a preset and exit
    /// - `--help` or `-h`: Print help and exit
    fn parse() -> Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        let mut options = Self {
            catalog: None,
            config: None,
            fresh: false,
            silent: false,
            export: None,
        };
        let mut i = 1;

        let value = |i: usize, flag: &str| -> Result<String> {
            args.get(i)
                .cloned()
                .ok_or_else(|| anyhow!("{} requires an argument", flag))
        };

        while i < args.len() {
            match args[i].as_str() {
                "--catalog" | "-c" => {
                    i += 1;
                    options.catalog = Some(PathBuf::from(value(i, "--catalog")?));
                }
                "--config" => {
                    i += 1;
                    options.config = Some(PathBuf::from(value(i, "--config")?));
                }
                "--fresh" | "-f" => options.fresh = true,
                "--silent" => options.silent = true,
                "--export" => {
                    let preset_id = value(i + 1, "--export")?;
                    let output = value(i + 2, "--export")?;
                    options.export = Some((preset_id, PathBuf::from(output)));
                    i += 2;
                }
                "--help" | "-h" => {
                    eprintln!("toneseq - Terminal frequency sequence player");
                    eprintln!();
                    eprintln!(
                        "Usage: {} [OPTIONS]",
                        args.first().map_or("toneseq", String::as_str)
                    );
                    eprintln!();
                    eprintln!("Options:");
                    eprintln!("  -c, --catalog PATH         Load presets from a JSON catalog");
                    eprintln!("      --config PATH          Load settings from a JSON file");
                    eprintln!("  -f, --fresh                Ignore and clear the saved session");
                    eprintln!("      --silent               Run without audio output");
                    eprintln!("      --export ID OUT.wav    Render preset ID to a WAV file");
                    eprintln!("  -h, --help                 Print this help message");
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown option: {}", other);
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
            }
            i += 1;
        }

        Ok(options)
    }
}

/// Sends log output to a file in the state directory, since the terminal is
/// in raw mode while the TUI runs. Falls back to stderr.
fn init_logging(config: &PlayerConfig) {
    let file = fs::create_dir_all(&config.state_dir).and_then(|_| {
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(config.log_path())
    });

    let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());
    match file {
        Ok(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).init(),
        Err(_) => builder.with_writer(std::io::stderr).init(),
    }
}

/// Main entry point.
fn main() -> Result<()> {
    let cli = CliOptions::parse()?;

    let config = match &cli.config {
        Some(path) => PlayerConfig::load_or_default(path)?,
        None => PlayerConfig::default(),
    };
    init_logging(&config);

    let catalog = match &cli.catalog {
        Some(path) => Catalog::load_json(path)?,
        None => Catalog::built_in(),
    };

    if let Some((preset_id, output)) = &cli.export {
        return run_export(&catalog, &config, preset_id, output);
    }

    let backend: Box<dyn ToneBackend> = if cli.silent {
        Box::new(SilentBackend)
    } else {
        match RodioBackend::new(&config) {
            Ok(backend) => Box::new(backend),
            Err(e) => {
                tracing::warn!("{}; continuing without sound", e);
                Box::new(SilentBackend)
            }
        }
    };

    let store: Box<dyn KeyValueStore> = match FileStore::open(config.checkpoint_dir()) {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::warn!("Checkpoint storage unavailable: {}", e);
            Box::new(MemoryStore::unavailable())
        }
    };

    let playlist_path = config.playlist_path();
    let mut player = Player::new(backend, store, config);
    player.subscribe(LogObserver);

    let mut app = App::new(catalog, player, playlist_path);
    app.try_load_playlist();
    if cli.fresh {
        app.player.checkpoints_mut().clear();
    } else {
        app.offer_resume();
    }

    let mut terminal = setup_terminal().context("Failed to setup terminal")?;

    let result = run_app(&mut terminal, &mut app);

    app.shutdown();
    restore_terminal(&mut terminal).context("Failed to restore terminal")?;

    result
}

/// Renders one preset to a WAV file, printing progress to stderr.
fn run_export(
    catalog: &Catalog,
    config: &PlayerConfig,
    preset_id: &str,
    output: &Path,
) -> Result<()> {
    let preset = catalog
        .preset(preset_id)
        .ok_or_else(|| anyhow!("unknown preset '{}'", preset_id))?;
    let sequence = preset.to_sequence();

    eprintln!(
        "Exporting '{}' ({} frequencies) to {}",
        preset.name,
        sequence.len(),
        output.display()
    );
    let mut last_percent = 0;
    export_to_wav(
        &sequence,
        config,
        output,
        Some(|progress: f32| {
            let percent = (progress * 100.0) as u32;
            if percent >= last_percent + 10 {
                last_percent = percent;
                eprintln!("  {}%", percent);
            }
        }),
    )
    .context("Export failed")?;
    eprintln!("Done");
    Ok(())
}

/// Sets up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Main application loop.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let mut last_frame = Instant::now();

    loop {
        let now = Instant::now();
        app.update(now.duration_since(last_frame));
        last_frame = now;
        app.clear_expired_status();

        terminal.draw(|frame| {
            ui::render(frame, app);
            ui::render_resume_prompt(frame, app);
            if app.show_help {
                ui::render_help(frame, app.help_scroll);
            }
        })?;

        // Short timeout so the engine keeps advancing between key presses
        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_key(app, key.code, key.modifiers) {
                    return Ok(());
                }
            }
        }
    }
}

/// Handles a key press event.
///
/// # Returns
///
/// `true` if the application should quit
fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if app.show_help {
        match code {
            KeyCode::Char('?') | KeyCode::Esc => {
                app.show_help = false;
                app.help_scroll = 0;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll = app.help_scroll.saturating_add(1);
            }
            _ => {}
        }
        return false;
    }

    if app.resume_offer.is_some() {
        match code {
            KeyCode::Char('r') | KeyCode::Enter => app.accept_resume(),
            KeyCode::Char('n') | KeyCode::Esc => app.dismiss_resume(),
            KeyCode::Char('q') => return true,
            _ => {}
        }
        return false;
    }

    match code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Tab => app.cycle_focus(),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::Enter => app.start_selected(),
        KeyCode::Char(' ') => app.toggle_playback(),
        KeyCode::Char('s') => app.stop(),
        KeyCode::Char('r') => {
            app.offer_resume();
            if app.resume_offer.is_none() {
                app.set_status("No saved session");
            }
        }
        KeyCode::Char('t') => app.toggle_frequency(),
        KeyCode::Char('v') => app.preview_selected(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_minutes(1),
        KeyCode::Char('-') => app.adjust_minutes(-1),
        KeyCode::Char('a') => app.enqueue_selected(),
        KeyCode::Char('x') => app.remove_last_queued(),
        KeyCode::Char('c') => app.clear_playlist(),
        KeyCode::Char('p') => app.start_playlist(),
        _ => {}
    }
    false
}
