//! Terminal lifecycle for the full-screen menu.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::ssh::LaunchError;
use crate::store::CredentialStore;

use super::{App, AppConfig, PendingConnect};

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

/// Open the store, take over the terminal and run until the user quits
pub fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = CredentialStore::open(config.store_config())?;
    let mut app = App::new(config, store);

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;

    result
}

fn setup_terminal() -> io::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(terminal: &mut Tui) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

fn run_app(terminal: &mut Tui, app: &mut App) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if app.handle_key_event(key)? {
                    break;
                }
            }
        }

        if let Some(pending) = app.take_pending_connect() {
            let result = launch(terminal, &pending)?;
            app.finish_connect(&pending.name, result);
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Hand the terminal to ssh and take it back when the session ends
fn launch(terminal: &mut Tui, pending: &PendingConnect) -> io::Result<Result<(), LaunchError>> {
    restore_terminal(terminal)?;
    println!("Connecting to {}...", pending.name);

    let result = pending.command.run();
    if let Err(e) = &result {
        tracing::warn!(name = %pending.name, error = %e, "ssh session failed");
    }

    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.clear()?;
    Ok(result)
}
