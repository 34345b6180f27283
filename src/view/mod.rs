//! View registry — one View per tab, fetched at most once per session.
//!
//! The registry is an owned map created at startup. Activating a view marks
//! it the sole selected tab; the first activation also asks for its fragment.
//! `loaded` only ever goes false → true.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::node::NodeTable;
use crate::service::{DocName, Payload, Request};

/// Tab identifiers, in tab-strip order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewId {
    BankList,
    SimpleList,
    DocsReadme,
    DocsWwiser,
}

impl ViewId {
    pub const ALL: [ViewId; 4] = [
        ViewId::BankList,
        ViewId::SimpleList,
        ViewId::DocsReadme,
        ViewId::DocsWwiser,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ViewId::BankList => "bank-list",
            ViewId::SimpleList => "simple-list",
            ViewId::DocsReadme => "docs-readme",
            ViewId::DocsWwiser => "docs-wwiser",
        }
    }

    /// Tab caption.
    pub fn title(self) -> &'static str {
        match self {
            ViewId::BankList => "Banks",
            ViewId::SimpleList => "Simple",
            ViewId::DocsReadme => "README",
            ViewId::DocsWwiser => "WWISER",
        }
    }

    /// The fetch bound to this view. Fixed for the life of the view.
    pub fn request(self) -> Request {
        match self {
            ViewId::BankList => Request::BankList { include_all: false },
            ViewId::SimpleList => Request::SimpleList { include_all: false },
            ViewId::DocsReadme => Request::Doc(DocName::Readme),
            ViewId::DocsWwiser => Request::Doc(DocName::Wwiser),
        }
    }

    /// Only the bank view carries an expandable node tree.
    pub fn has_node_tree(self) -> bool {
        self == ViewId::BankList
    }

    pub fn next(self) -> ViewId {
        let i = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn parse(s: &str) -> Option<ViewId> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tab's content pane plus its load state.
#[derive(Debug, Clone)]
pub struct View {
    pub id: ViewId,
    request: Request,
    loaded: bool,
    pending: bool,
    content: Option<Payload>,
    /// Bumped on every wholesale content replacement.
    generation: u64,
    /// Node tree (bank view only; empty elsewhere).
    pub nodes: NodeTable,
    /// Hide/show flags toggled by the pane's panel buttons.
    pub panels: BTreeSet<String>,
}

impl View {
    fn new(id: ViewId) -> Self {
        Self {
            id,
            request: id.request(),
            loaded: false,
            pending: false,
            content: None,
            generation: 0,
            nodes: NodeTable::new(),
            panels: BTreeSet::new(),
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn content(&self) -> Option<&Payload> {
        self.content.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Overwrite the content wholesale and mark the view loaded.
    pub fn replace_content(&mut self, payload: Payload) {
        if self.id.has_node_tree() {
            self.nodes = NodeTable::from_payload(&payload);
        }
        self.content = Some(payload);
        self.loaded = true;
        self.generation += 1;
    }

    /// Flip a named hide/show flag. Returns the new "hidden" value.
    pub fn toggle_panel(&mut self, name: &str) -> bool {
        if self.panels.remove(name) {
            false
        } else {
            self.panels.insert(name.to_string());
            true
        }
    }

    pub fn panel_hidden(&self, name: &str) -> bool {
        self.panels.contains(name)
    }
}

/// What activation decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Already loaded; nothing to fetch.
    Loaded,
    /// A fetch for this view is already in flight.
    Pending,
    /// Issue this request; the view is now pending.
    Fetch(Request),
}

/// Owned map of all views plus the exclusive selection.
#[derive(Debug, Clone)]
pub struct ViewRegistry {
    views: HashMap<ViewId, View>,
    active: ViewId,
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self {
            views: ViewId::ALL.into_iter().map(|id| (id, View::new(id))).collect(),
            active: ViewId::BankList,
        }
    }

    pub fn active(&self) -> ViewId {
        self.active
    }

    pub fn is_active(&self, id: ViewId) -> bool {
        self.active == id
    }

    pub fn view(&self, id: ViewId) -> &View {
        // All ids are inserted at construction and never removed.
        &self.views[&id]
    }

    pub fn view_mut(&mut self, id: ViewId) -> &mut View {
        self.views
            .get_mut(&id)
            .unwrap_or_else(|| unreachable!("view {id} registered at construction"))
    }

    pub fn bank(&self) -> &View {
        self.view(ViewId::BankList)
    }

    pub fn bank_mut(&mut self) -> &mut View {
        self.view_mut(ViewId::BankList)
    }

    /// Select `id` and decide whether its fragment must be fetched.
    pub fn activate(&mut self, id: ViewId) -> Activation {
        if self.active != id {
            debug!(from = %self.active, to = %id, "switching view");
        }
        self.active = id;

        let view = self.view_mut(id);
        if view.loaded {
            return Activation::Loaded;
        }
        if view.pending {
            return Activation::Pending;
        }
        view.pending = true;
        info!(view = %id, request = %view.request, "loading view");
        Activation::Fetch(view.request.clone())
    }

    /// Store a successful fetch for `id`.
    pub fn complete(&mut self, id: ViewId, payload: Payload) {
        let view = self.view_mut(id);
        view.pending = false;
        view.replace_content(payload);
        info!(view = %id, nodes = view.nodes.len(), "view loaded");
    }

    /// Clear the pending mark after a failed fetch. `loaded` is untouched.
    pub fn fail(&mut self, id: ViewId) {
        self.view_mut(id).pending = false;
    }
}
