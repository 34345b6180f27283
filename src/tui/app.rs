//! TuiApp — the TEA model.
//!
//! Wraps the viewer controller plus the purely visual state (tree cursor,
//! scroll). Update receives TuiMessages and mutates state. View reads state
//! to produce ratatui widgets. No side effects in view.

use tui_tree_widget::{TreeItem, TreeState};

use crate::controller::Viewer;
use crate::view::ViewId;

use super::event::TuiMessage;
use super::input;
use super::node_tree::{self, TreeKey};
use super::surface::TuiSurface;

/// Panel flag hiding fetched detail text under expanded nodes.
pub const HIDE_DETAIL_PANEL: &str = "hide-detail";

/// What the cached bank tree was built from: bank generation, node table
/// revision, detail panel shown.
type TreeStamp = (u64, u64, bool);

/// The main TUI application state (TEA model).
pub struct TuiApp {
    /// The controller; owns all view and node state.
    pub viewer: Viewer<TuiSurface>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Tree widget state for the bank node tree.
    pub tree_state: TreeState<TreeKey>,
    /// Bank tree items, rebuilt only when the node table changes.
    pub tree_items: Vec<TreeItem<'static, TreeKey>>,
    tree_stamp: Option<TreeStamp>,
    /// Scroll offset for text views.
    pub scroll: u16,
    /// Viewport height of the content pane (set by renderer).
    pub viewport_height: u16,
}

impl TuiApp {
    pub fn new(viewer: Viewer<TuiSurface>) -> Self {
        Self {
            viewer,
            should_quit: false,
            tree_state: TreeState::default(),
            tree_items: Vec::new(),
            tree_stamp: None,
            scroll: 0,
            viewport_height: 20,
        }
    }

    /// Handle one message.
    pub fn update(&mut self, msg: TuiMessage) {
        match msg {
            TuiMessage::Input(key) => input::handle_key(self, key),
            TuiMessage::Completion(completion) => self.viewer.apply(completion),
            TuiMessage::Quit => self.should_quit = true,
        }
    }

    pub fn active_view(&self) -> ViewId {
        self.viewer.registry().active()
    }

    /// Switch tabs. Scroll resets; the tree cursor is kept.
    pub fn select_tab(&mut self, id: ViewId) {
        if self.active_view() != id {
            self.scroll = 0;
        }
        self.viewer.surface_mut().clear_notice();
        self.viewer.activate(id);
    }

    /// Node under the tree cursor, if any.
    pub fn selected_node(&self) -> Option<String> {
        node_tree::node_for_selection(self.tree_state.selected())
    }

    /// Toggle the node under the cursor.
    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_node() {
            self.viewer.toggle_node(&id);
        }
    }

    /// Advance the filter selector: no filter → each kind in turn → no filter.
    pub fn cycle_filter(&mut self) {
        let options = self.viewer.filter_options();
        let next = match self.viewer.filter() {
            None => options.first().cloned(),
            Some(current) => match options.iter().position(|k| k == current) {
                Some(i) => options.get(i + 1).cloned(),
                None => options.first().cloned(),
            },
        };
        self.viewer.set_filter(next);
    }

    pub fn load_all(&mut self) {
        self.viewer.surface_mut().clear_notice();
        self.viewer.load_all();
    }

    pub fn move_down(&mut self) {
        if self.active_view().has_node_tree() {
            self.tree_state.key_down();
        } else {
            self.scroll = self.scroll.saturating_add(1);
        }
    }

    pub fn move_up(&mut self) {
        if self.active_view().has_node_tree() {
            self.tree_state.key_up();
        } else {
            self.scroll = self.scroll.saturating_sub(1);
        }
    }

    pub fn page_down(&mut self) {
        let step = self.viewport_height.max(1);
        for _ in 0..step {
            self.move_down();
        }
    }

    pub fn page_up(&mut self) {
        let step = self.viewport_height.max(1);
        for _ in 0..step {
            self.move_up();
        }
    }

    /// Rebuild the bank tree items if the node table moved since the last
    /// build, then mirror node states onto the tree. Returns whether a
    /// rebuild happened.
    pub fn refresh_tree(&mut self) -> bool {
        let bank = self.viewer.registry().bank();
        let show_detail = !bank.panel_hidden(HIDE_DETAIL_PANEL);
        let stamp = (bank.generation(), bank.nodes.revision(), show_detail);
        if self.tree_stamp == Some(stamp) {
            return false;
        }

        self.tree_items = node_tree::build_node_tree(&bank.nodes, show_detail);
        self.tree_stamp = Some(stamp);
        self.sync_tree();
        if self.tree_state.selected().is_empty() {
            if let Some(first) = self.tree_items.first() {
                self.tree_state.select(vec![first.identifier().clone()]);
            }
        }
        true
    }

    /// Open/close tree nodes to mirror the node table.
    pub fn sync_tree(&mut self) {
        let table = &self.viewer.registry().bank().nodes;
        for node in table.iter() {
            let path = node_tree::node_path(table, &node.id);
            if node.state.is_expanded() {
                self.tree_state.open(path);
            } else {
                self.tree_state.close(&path);
            }
        }
    }
}
