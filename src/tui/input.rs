//! Key binding dispatch for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::view::ViewId;

use super::app::{TuiApp, HIDE_DETAIL_PANEL};
use super::surface::ModalKind;

/// Handle a key event, mutating app state.
pub fn handle_key(app: &mut TuiApp, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // Modals swallow input until answered
    if let Some(kind) = app.viewer.surface().current_modal().map(|m| m.kind) {
        handle_modal_key(app, kind, key);
        return;
    }

    // Global bindings
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.should_quit = true;
            return;
        }
        KeyCode::Tab => {
            let next = app.active_view().next();
            app.select_tab(next);
            return;
        }
        KeyCode::Char('1') => return app.select_tab(ViewId::BankList),
        KeyCode::Char('2') => return app.select_tab(ViewId::SimpleList),
        KeyCode::Char('3') => return app.select_tab(ViewId::DocsReadme),
        KeyCode::Char('4') => return app.select_tab(ViewId::DocsWwiser),
        KeyCode::Char('j') | KeyCode::Down => return app.move_down(),
        KeyCode::Char('k') | KeyCode::Up => return app.move_up(),
        KeyCode::PageDown => return app.page_down(),
        KeyCode::PageUp => return app.page_up(),
        _ => {}
    }

    // Bank view tools
    if !app.active_view().has_node_tree() {
        return;
    }
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected(),
        KeyCode::Char('f') => app.cycle_filter(),
        KeyCode::Char('a') => app.load_all(),
        KeyCode::Char('h') => {
            app.viewer.toggle_panel(HIDE_DETAIL_PANEL);
        }
        _ => {}
    }
}

fn handle_modal_key(app: &mut TuiApp, kind: ModalKind, key: KeyEvent) {
    match kind {
        ModalKind::Alert => {
            app.viewer.surface_mut().dismiss();
        }
        ModalKind::Confirm => {
            let answer = match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => true,
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
                _ => return,
            };
            app.viewer.surface_mut().dismiss();
            app.viewer.answer(answer);
        }
    }
}
