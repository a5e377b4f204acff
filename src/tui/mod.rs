//! Terminal dashboard for a single usage report.
//!
//! Feature-gated behind `tui`. Launch with `--tui` on the CLI.

mod app;
mod controls;
mod layout;
mod style;

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

pub use app::App;

use crate::report::UsageReport;

/// Input poll interval.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Shows `report` until the user quits.
///
/// Sets up the terminal (raw mode, alternate screen), runs the event loop,
/// and restores the terminal on exit, including on error.
///
/// # Errors
///
/// Returns an `io::Error` if the terminal cannot be set up or drawn.
pub fn run(report: UsageReport) -> io::Result<()> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e);
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = match Terminal::new(backend) {
        Ok(t) => t,
        Err(e) => {
            let _ = disable_raw_mode();
            return Err(e);
        }
    };

    let mut app = App::new(report);
    let result = event_loop(&mut terminal, &mut app);

    // Restore the terminal even if the loop failed
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|frame| layout::render(frame, app))?;

        if app.quit {
            return Ok(());
        }

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                controls::handle_key(app, key);
            }
        }
    }
}
