//! TUI event plumbing — merges keyboard input and fetch completions.
//!
//! A blocking reader thread polls crossterm and forwards key presses as
//! `TuiMessage::Input` over an mpsc channel. Completions arrive on the
//! viewer's own channel; the runner selects over both.

use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use tokio::sync::mpsc;
use tracing::warn;

use crate::controller::Completion;

/// Messages that drive the TUI update loop.
#[derive(Debug)]
pub enum TuiMessage {
    /// Keyboard input.
    Input(KeyEvent),
    /// A fetch finished.
    Completion(Completion),
    /// Quit the TUI.
    Quit,
}

/// Spawn the keyboard reader. It stops once the receiver is dropped.
pub fn spawn_input_reader(tx: mpsc::UnboundedSender<TuiMessage>) {
    tokio::task::spawn_blocking(move || loop {
        if tx.is_closed() {
            break;
        }
        match event::poll(Duration::from_millis(50)) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if tx.send(TuiMessage::Input(key)).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("input read failed: {e}");
                    let _ = tx.send(TuiMessage::Quit);
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                warn!("input poll failed: {e}");
                let _ = tx.send(TuiMessage::Quit);
                break;
            }
        }
    });
}
