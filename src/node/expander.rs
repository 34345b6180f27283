//! Node expander — single-node toggles and the bulk "load all" plan.
//!
//! Pure state transitions over a [`NodeTable`]. Issuing the actual fetches
//! is the controller's job; these functions only say what to do and move
//! the node out of `CollapsedUnloaded` at the moment a fetch is decided, so
//! a second toggle can never ask for the same detail twice.

use tracing::debug;

use super::{fragment, NodeId, NodeState, NodeTable};
use crate::service::Payload;

/// Above this many candidates the unfiltered bulk load asks first.
pub const NODE_WARNING_MAX: usize = 300;
pub const NODE_WARNING_MSG: &str = "Warning! Preload size is big and may be slow/unresponsive!";
pub const NODE_EMPTY_MSG: &str = "No nodes found";

/// Result of toggling (or expanding) one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    /// Detail must be fetched; the node is now `Loading`.
    Fetch(NodeId),
    /// Loaded node became visible.
    Expanded,
    /// Loaded node became hidden.
    Collapsed,
    /// A fetch for this node is already in flight.
    InFlight,
    /// No such node in the table.
    Unknown,
}

/// Toggle a node's heading.
pub fn toggle(table: &mut NodeTable, id: &str) -> Toggle {
    let Some(node) = table.get_mut(id) else {
        return Toggle::Unknown;
    };
    match node.state {
        NodeState::CollapsedUnloaded => {
            node.state = NodeState::Loading;
            Toggle::Fetch(node.id.clone())
        }
        NodeState::Loading => Toggle::InFlight,
        NodeState::CollapsedLoaded => {
            node.state = NodeState::ExpandedLoaded;
            Toggle::Expanded
        }
        NodeState::ExpandedLoaded => {
            node.state = NodeState::CollapsedLoaded;
            Toggle::Collapsed
        }
    }
}

/// Expand a node, fetching it if needed. Never collapses.
pub fn expand(table: &mut NodeTable, id: &str) -> Toggle {
    match table.state(id) {
        Some(NodeState::ExpandedLoaded) => Toggle::Expanded,
        _ => toggle(table, id),
    }
}

/// Swap a loading placeholder for its fetched detail.
///
/// Placeholders found inside the detail join the table as children. Returns
/// false when the node was not waiting for this detail (stale completion).
pub fn apply_detail(table: &mut NodeTable, id: &str, detail: Payload) -> bool {
    let Some(node) = table.get_mut(id) else {
        return false;
    };
    if node.state != NodeState::Loading {
        debug!(node = id, state = ?node.state, "dropping stale node detail");
        return false;
    }

    let nested = fragment::scan_placeholders(detail.as_str());
    node.detail = Some(detail);
    node.state = NodeState::ExpandedLoaded;

    let parent = node.id.clone();
    table.insert_placeholders(nested, Some(&parent));
    true
}

/// Return a loading node to `CollapsedUnloaded` after its fetch failed.
pub fn abort_fetch(table: &mut NodeTable, id: &str) -> bool {
    match table.get_mut(id) {
        Some(node) if node.state == NodeState::Loading => {
            node.state = NodeState::CollapsedUnloaded;
            true
        }
        _ => false,
    }
}

/// What a bulk "load all" should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkPlan {
    /// Nothing matched; tell the user, fetch nothing.
    Empty,
    /// Unfiltered and over the threshold; ask before reloading.
    NeedsConfirmation { candidates: usize },
    /// Filtered: expand each of these placeholders individually.
    ExpandEach(Vec<NodeId>),
    /// Unfiltered: refetch the whole bank tree with `all=true`.
    ReloadAll,
}

/// Decide a bulk load over the current placeholders.
///
/// Only the unfiltered path is guarded by [`NODE_WARNING_MAX`]; a filtered
/// load expands every match without asking, however many there are.
pub fn plan_load_all(table: &NodeTable, filter: Option<&str>) -> BulkPlan {
    let candidates: Vec<NodeId> = table
        .iter()
        .filter(|n| n.state.is_placeholder())
        .filter(|n| filter.map_or(true, |f| n.has_kind(f)))
        .map(|n| n.id.clone())
        .collect();

    if candidates.is_empty() {
        return BulkPlan::Empty;
    }

    match filter {
        Some(_) => BulkPlan::ExpandEach(candidates),
        None if candidates.len() > NODE_WARNING_MAX => BulkPlan::NeedsConfirmation {
            candidates: candidates.len(),
        },
        None => BulkPlan::ReloadAll,
    }
}
