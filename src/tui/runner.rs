//! Terminal session: raw mode, alternate screen, and the select loop that
//! interleaves redraws, fetch completions and key input until quit.

use std::io;
use std::time::Duration;

use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::info;

use crate::controller::Completions;
use crate::view::ViewId;

use super::app::TuiApp;
use super::event::{spawn_input_reader, TuiMessage};
use super::layout;

/// Run the TUI main loop. Blocks until quit.
pub async fn run_tui(
    mut app: TuiApp,
    mut completions: Completions,
    start_tab: ViewId,
) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_input_reader(tx);

    app.select_tab(start_tab);
    info!(tab = %start_tab, "viewer started");

    let mut render_interval = interval(Duration::from_millis(33)); // ~30fps

    let outcome: anyhow::Result<()> = loop {
        tokio::select! {
            _ = render_interval.tick() => {
                if let Err(e) = terminal.draw(|f| layout::draw(f, &mut app)) {
                    break Err(e.into());
                }
            }
            Some(completion) = completions.recv() => {
                app.update(TuiMessage::Completion(completion));
            }
            msg = rx.recv() => match msg {
                Some(msg) => app.update(msg),
                None => app.should_quit = true,
            },
        }

        if app.should_quit {
            break Ok(());
        }
    };

    info!(in_flight = app.viewer.in_flight(), "viewer stopping");

    // Restore terminal
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    outcome
}
