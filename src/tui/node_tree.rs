//! Foldable node tree — tui-tree-widget integration.
//!
//! Projects the bank node table as a collapsible tree:
//! ```text
//! [v] CAkEvent 140234
//!      type: Play
//!      [+] CAkAction 8812      ← nested placeholder
//! [+] CAkEvent 140235          ← not fetched yet
//! [..] CAkEvent 140236         ← fetch in flight
//! ```

use ratatui::style::{Color, Style};
use ratatui::text::Line;
use tui_tree_widget::TreeItem;

use crate::node::fragment;
use crate::node::{Node, NodeId, NodeState, NodeTable};

/// Identifier of one tree row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TreeKey {
    /// A node heading.
    Node(NodeId),
    /// Line `n` of a node's detail text.
    Line(NodeId, usize),
}

/// Build tree items for every root node. `show_detail` controls whether
/// loaded detail text is listed under expanded nodes.
pub fn build_node_tree<'a>(table: &NodeTable, show_detail: bool) -> Vec<TreeItem<'a, TreeKey>> {
    table
        .roots()
        .map(|node| build_item(table, node, show_detail))
        .collect()
}

fn build_item<'a>(table: &NodeTable, node: &Node, show_detail: bool) -> TreeItem<'a, TreeKey> {
    let label = Line::styled(
        format!("{} {}", state_marker(node.state), node.label),
        Style::default().fg(state_color(node.state)),
    );
    let key = TreeKey::Node(node.id.clone());

    let mut children: Vec<TreeItem<'a, TreeKey>> = Vec::new();
    if show_detail {
        if let Some(detail) = &node.detail {
            for (i, line) in fragment::to_text(detail.as_str())
                .lines()
                .filter(|l| !l.trim().is_empty())
                .enumerate()
            {
                children.push(TreeItem::new_leaf(
                    TreeKey::Line(node.id.clone(), i),
                    line.to_string(),
                ));
            }
        }
    }
    for child in table.children_of(&node.id) {
        children.push(build_item(table, child, show_detail));
    }

    if children.is_empty() {
        return TreeItem::new_leaf(key, label);
    }
    match TreeItem::new(key.clone(), label.clone(), children) {
        Ok(item) => item,
        // Duplicate identifiers among children; show the heading alone.
        Err(_) => TreeItem::new_leaf(key, label),
    }
}

/// Heading marker for a node state.
pub fn state_marker(state: NodeState) -> &'static str {
    match state {
        NodeState::CollapsedUnloaded => "[+]",
        NodeState::Loading => "[..]",
        NodeState::CollapsedLoaded => "[>]",
        NodeState::ExpandedLoaded => "[v]",
    }
}

pub fn state_color(state: NodeState) -> Color {
    match state {
        NodeState::CollapsedUnloaded => Color::DarkGray,
        NodeState::Loading => Color::Yellow,
        NodeState::CollapsedLoaded => Color::Blue,
        NodeState::ExpandedLoaded => Color::Green,
    }
}

/// Tree path (ancestor keys, root first) of a node.
pub fn node_path(table: &NodeTable, id: &str) -> Vec<TreeKey> {
    let mut path = Vec::new();
    let mut current = table.get(id);
    while let Some(node) = current {
        path.push(TreeKey::Node(node.id.clone()));
        current = node.parent.as_deref().and_then(|p| table.get(p));
    }
    path.reverse();
    path
}

/// The node a selected tree path points at. Detail lines resolve to the
/// node that owns them.
pub fn node_for_selection(selected: &[TreeKey]) -> Option<NodeId> {
    match selected.last()? {
        TreeKey::Node(id) | TreeKey::Line(id, _) => Some(id.clone()),
    }
}
