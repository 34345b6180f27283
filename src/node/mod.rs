//! Node table — explicit expand/collapse state for the bank tree.
//!
//! Each node starts as a placeholder (`CollapsedUnloaded`). Its detail is
//! fetched at most once; afterwards toggling only flips visibility. The
//! visual layer is a projection of this table.

pub mod expander;
pub mod fragment;

use std::collections::HashMap;

use crate::service::Payload;

use fragment::Placeholder;

/// Opaque node identifier assigned by the backend.
pub type NodeId = String;

/// Expansion state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Placeholder only; detail never fetched.
    CollapsedUnloaded,
    /// Still a placeholder, but its detail fetch is in flight.
    Loading,
    /// Detail fetched, currently hidden.
    CollapsedLoaded,
    /// Detail fetched and visible.
    ExpandedLoaded,
}

impl NodeState {
    pub fn is_loaded(self) -> bool {
        matches!(self, NodeState::CollapsedLoaded | NodeState::ExpandedLoaded)
    }

    /// Placeholders are what the bulk selector sees.
    pub fn is_placeholder(self) -> bool {
        !self.is_loaded()
    }

    pub fn is_expanded(self) -> bool {
        self == NodeState::ExpandedLoaded
    }
}

/// One expandable entry of the bank tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    /// Kind tags (first one is the display kind).
    pub kinds: Vec<String>,
    pub label: String,
    pub state: NodeState,
    /// Loaded representation, present once the placeholder was swapped.
    pub detail: Option<Payload>,
    /// Node whose detail introduced this one, if any.
    pub parent: Option<NodeId>,
}

impl Node {
    fn from_placeholder(p: Placeholder, parent: Option<NodeId>) -> Self {
        Self {
            id: p.id,
            kinds: p.kinds,
            label: p.label,
            state: NodeState::CollapsedUnloaded,
            detail: None,
            parent,
        }
    }

    pub fn kind(&self) -> Option<&str> {
        self.kinds.first().map(String::as_str)
    }

    pub fn has_kind(&self, kind: &str) -> bool {
        self.kinds.iter().any(|k| k == kind)
    }
}

/// Ordered table of the nodes rendered in the bank view.
#[derive(Debug, Clone, Default)]
pub struct NodeTable {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    roots: Vec<usize>,
    children: HashMap<NodeId, Vec<usize>>,
    /// Bumped on every insertion or mutable access.
    revision: u64,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh table from a whole-view payload. Every node starts
    /// `CollapsedUnloaded`.
    pub fn from_payload(payload: &Payload) -> Self {
        let mut table = Self::new();
        table.insert_placeholders(fragment::scan_placeholders(payload.as_str()), None);
        table
    }

    /// Add placeholders not already present. Returns how many were added.
    pub fn insert_placeholders(
        &mut self,
        placeholders: Vec<Placeholder>,
        parent: Option<&NodeId>,
    ) -> usize {
        let mut added = 0;
        for p in placeholders {
            if self.index.contains_key(&p.id) {
                continue;
            }
            let at = self.nodes.len();
            self.index.insert(p.id.clone(), at);
            match parent {
                Some(parent) => self.children.entry(parent.clone()).or_default().push(at),
                None => self.roots.push(at),
            }
            self.nodes.push(Node::from_placeholder(p, parent.cloned()));
            added += 1;
        }
        if added > 0 {
            self.revision += 1;
        }
        added
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Mutable access to one node. Counts as a change for [`Self::revision`].
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        let &i = self.index.get(id)?;
        self.revision += 1;
        self.nodes.get_mut(i)
    }

    /// Change counter; equal values mean nothing in the table moved.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn state(&self, id: &str) -> Option<NodeState> {
        self.get(id).map(|n| n.state)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Nodes with no parent, in document order.
    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.roots.iter().map(move |&i| &self.nodes[i])
    }

    /// Nodes introduced by `id`'s detail, in insertion order.
    pub fn children_of(&self, id: &str) -> impl Iterator<Item = &Node> {
        self.children
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&i| &self.nodes[i])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Distinct kind tags among current placeholders, in first-seen order.
    pub fn placeholder_kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = Vec::new();
        for node in self.nodes.iter().filter(|n| n.state.is_placeholder()) {
            for kind in &node.kinds {
                if !kinds.contains(kind) {
                    kinds.push(kind.clone());
                }
            }
        }
        kinds
    }
}
