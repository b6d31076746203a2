//! closeout - PPM closeout in the terminal
//!
//! Walks a customer through documenting a personally procured move and
//! submitting it, against a local JSON file or the closeout API.

use std::fs::File;
use std::io;
use std::sync::Mutex;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ppm_closeout::application::{App, AppMode};
use ppm_closeout::cli::Cli;
use ppm_closeout::infrastructure::CsvExporter;
use ppm_closeout::presentation::{render_ui, InputHandler};

/// Entry point for the closeout terminal application.
///
/// Parses the command line, opens the document source, then either prints
/// or exports the summary, or runs the interactive flow until the user
/// quits.
///
/// # Errors
///
/// Returns an error if the log file cannot be created, the initial fetch
/// fails, or the terminal cannot be set up.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let mut app = App::new(cli.open_source()?, cli.session(), cli.options())?;

    if let Some(path) = &cli.export_csv {
        CsvExporter::export_to_path(&app.summary(), &app.review(), path)?;
        println!("Exported to {}", path.display());
        return Ok(());
    }
    if cli.summary {
        print_summary(&app);
        return Ok(());
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = %err, "terminal loop failed");
        println!("{err:?}");
    }
    if let Some(status) = &app.status_message {
        println!("{status}");
    }

    Ok(())
}

/// Sends log output to the file named by `--log-file`, filtered by
/// `RUST_LOG` (default `info`). The terminal belongs to the UI.
fn init_logging(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(&cli.log_file)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    info!(log_file = %cli.log_file.display(), batch = cli.is_batch(), "closeout starting");
    Ok(())
}

fn print_summary(app: &App) {
    let summary = app.summary();
    println!("{}", summary.incentive_heading);
    for line in summary.lines.iter().chain(summary.incentive_lines().iter()) {
        println!("  {line}");
    }
    let review = app.review();
    for section in &review.sections {
        println!("{}: {} ({} item(s))", section.heading, section.total, section.items.len());
    }
    if review.show_incomplete_error {
        println!("Some items are missing required information.");
    }
}

/// Main application event loop.
///
/// Handles terminal rendering and keyboard input processing.
/// Continues running until the app asks to quit or the user presses 'q'
/// in normal mode.
///
/// # Arguments
///
/// * `terminal` - Terminal interface for rendering
/// * `app` - Mutable reference to application state
///
/// # Errors
///
/// Returns an IO error if terminal operations fail.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') if matches!(app.mode, AppMode::Normal) => return Ok(()),
                    _ => InputHandler::handle_key_event(app, key.code, key.modifiers),
                }
            }
        }
        if app.should_quit {
            return Ok(());
        }
    }
}
