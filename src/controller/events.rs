//! Completion messages — how finished fetches re-enter the event loop.
//!
//! Each spawned fetch sends exactly one [`Completion`] on the viewer's
//! channel. The loop applies it; nothing else mutates state.

use tokio::sync::mpsc;

use crate::node::NodeId;
use crate::service::{Payload, ServiceError};
use crate::view::ViewId;

/// Who is waiting on a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchTarget {
    /// Plain view load on first activation.
    View(ViewId),
    /// One node's detail, tagged with the bank content generation it was
    /// issued against.
    Node { id: NodeId, generation: u64 },
    /// Unfiltered "load all": whole bank tree with `all=true`.
    BankReload,
}

/// The single resolution of one fetch.
#[derive(Debug)]
pub struct Completion {
    pub target: FetchTarget,
    pub result: Result<Payload, ServiceError>,
}

/// Receiving half of the completion channel, owned by the loop driver.
#[derive(Debug)]
pub struct Completions {
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl Completions {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<Completion>) -> Self {
        Self { rx }
    }

    /// Wait for the next finished fetch.
    pub async fn recv(&mut self) -> Option<Completion> {
        self.rx.recv().await
    }

    /// Take a finished fetch if one is already queued.
    pub fn try_recv(&mut self) -> Option<Completion> {
        self.rx.try_recv().ok()
    }
}
