//! Viewer controller — the event-dispatch core.
//!
//! Owns the view registry (and through it the bank node table), decides what
//! to fetch, spawns fetches, and applies their completions. Runs on a single
//! task: every state change happens inside a `&mut self` call made by the
//! loop driver, either for a UI action or for a [`Completion`].
//!
//! ```text
//! UiAction ──► Viewer::dispatch ──► tokio::spawn(fetch) ──► Completion
//!                    ▲                                          │
//!                    └──────────── Viewer::apply ◄──────────────┘
//! ```

pub mod events;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::node::expander::{self, BulkPlan, Toggle, NODE_EMPTY_MSG, NODE_WARNING_MSG};
use crate::node::NodeId;
use crate::service::{DataService, Request, ServiceError, VIEWER_STOPPED_MSG};
use crate::view::{Activation, ViewId, ViewRegistry};

pub use events::{Completion, Completions, FetchTarget};

/// The hosting display surface's notification capabilities.
pub trait Surface: Send {
    /// Blocking notification the user has to acknowledge.
    fn alert(&mut self, message: &str);

    /// Informational notice; no acknowledgement needed.
    fn notify(&mut self, message: &str);

    /// Ask a yes/no question. The answer comes back as
    /// [`UiAction::Answer`].
    fn prompt(&mut self, message: &str);
}

/// Caller-supplied failure handling that replaces the default alert.
pub type FailureHandler = Box<dyn FnMut(&FetchTarget, &ServiceError) + Send>;

/// User intents routed into the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    /// Tab click.
    Activate(ViewId),
    /// Click on a node heading.
    ToggleNode(NodeId),
    /// Hide/show panel button (no data effect).
    TogglePanel(String),
    /// Filter selector changed.
    SetFilter(Option<String>),
    /// "Load all" button.
    LoadAll,
    /// Answer to a pending confirmation prompt.
    Answer(bool),
}

/// What a "load all" (or its confirmation answer) ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOutcome {
    /// No candidates; the empty notice was shown.
    NoNodes,
    /// Over the threshold; waiting for the user's answer.
    AwaitingConfirmation,
    /// The user said no. Nothing happened.
    Declined,
    /// Filtered path: this many node fetches were issued.
    Expanding(usize),
    /// Unfiltered path: one whole-tree reload was issued.
    Reloading,
}

/// The viewer controller.
pub struct Viewer<S: Surface> {
    service: Arc<dyn DataService>,
    surface: S,
    registry: ViewRegistry,
    filter: Option<String>,
    awaiting_confirmation: bool,
    on_failure: Option<FailureHandler>,
    tx: mpsc::UnboundedSender<Completion>,
    in_flight: usize,
}

impl<S: Surface> Viewer<S> {
    /// Create a viewer plus the completion stream its loop must drain.
    pub fn new(service: Arc<dyn DataService>, surface: S) -> (Self, Completions) {
        let (tx, rx) = mpsc::unbounded_channel();
        let viewer = Self {
            service,
            surface,
            registry: ViewRegistry::new(),
            filter: None,
            awaiting_confirmation: false,
            on_failure: None,
            tx,
            in_flight: 0,
        };
        (viewer, Completions::new(rx))
    }

    /// Replace the default "viewer stopped" alert with `handler`.
    pub fn with_failure_handler(mut self, handler: FailureHandler) -> Self {
        self.on_failure = Some(handler);
        self
    }

    pub fn registry(&self) -> &ViewRegistry {
        &self.registry
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Fetches issued but not yet applied.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn awaiting_confirmation(&self) -> bool {
        self.awaiting_confirmation
    }

    /// Filter selector options: kinds of the currently rendered placeholders.
    pub fn filter_options(&self) -> Vec<String> {
        self.registry.bank().nodes.placeholder_kinds()
    }

    /// Route one UI action.
    pub fn dispatch(&mut self, action: UiAction) {
        match action {
            UiAction::Activate(id) => {
                self.activate(id);
            }
            UiAction::ToggleNode(id) => {
                self.toggle_node(&id);
            }
            UiAction::TogglePanel(name) => {
                self.toggle_panel(&name);
            }
            UiAction::SetFilter(filter) => self.set_filter(filter),
            UiAction::LoadAll => {
                self.load_all();
            }
            UiAction::Answer(accepted) => {
                self.answer(accepted);
            }
        }
    }

    /// Select a view, fetching its fragment on first activation.
    pub fn activate(&mut self, id: ViewId) -> Activation {
        let activation = self.registry.activate(id);
        if let Activation::Fetch(request) = &activation {
            self.spawn_fetch(FetchTarget::View(id), request.clone());
        }
        activation
    }

    /// Toggle a node heading in the bank view.
    pub fn toggle_node(&mut self, id: &str) -> Toggle {
        let toggle = expander::toggle(&mut self.registry.bank_mut().nodes, id);
        self.issue_node_fetch(&toggle);
        toggle
    }

    /// Flip a hide/show panel flag on the bank view.
    pub fn toggle_panel(&mut self, name: &str) -> bool {
        self.registry.bank_mut().toggle_panel(name)
    }

    pub fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter.filter(|f| !f.is_empty());
    }

    /// Bulk "load all" with the filter as it stands right now.
    pub fn load_all(&mut self) -> BulkOutcome {
        if self.awaiting_confirmation {
            return BulkOutcome::AwaitingConfirmation;
        }

        let plan = expander::plan_load_all(&self.registry.bank().nodes, self.filter.as_deref());
        info!(filter = ?self.filter, plan = plan_name(&plan), "load all");

        match plan {
            BulkPlan::Empty => {
                self.surface.notify(NODE_EMPTY_MSG);
                BulkOutcome::NoNodes
            }
            BulkPlan::NeedsConfirmation { candidates } => {
                debug!(candidates, "bulk load over threshold, asking");
                self.awaiting_confirmation = true;
                self.surface.prompt(NODE_WARNING_MSG);
                BulkOutcome::AwaitingConfirmation
            }
            BulkPlan::ExpandEach(ids) => {
                let mut issued = 0;
                for id in ids {
                    let toggle = expander::expand(&mut self.registry.bank_mut().nodes, &id);
                    if self.issue_node_fetch(&toggle) {
                        issued += 1;
                    }
                }
                BulkOutcome::Expanding(issued)
            }
            BulkPlan::ReloadAll => {
                self.spawn_reload();
                BulkOutcome::Reloading
            }
        }
    }

    /// Answer the pending "load all" confirmation.
    pub fn answer(&mut self, accepted: bool) -> Option<BulkOutcome> {
        if !self.awaiting_confirmation {
            return None;
        }
        self.awaiting_confirmation = false;
        if accepted {
            self.spawn_reload();
            Some(BulkOutcome::Reloading)
        } else {
            debug!("bulk load declined");
            Some(BulkOutcome::Declined)
        }
    }

    /// Apply one finished fetch.
    pub fn apply(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let Completion { target, result } = completion;

        match result {
            Ok(payload) => match &target {
                FetchTarget::View(id) => self.registry.complete(*id, payload),
                FetchTarget::BankReload => self.registry.complete(ViewId::BankList, payload),
                FetchTarget::Node { id, generation } => {
                    let bank = self.registry.bank_mut();
                    if *generation != bank.generation() {
                        debug!(node = %id, "bank content replaced, dropping node detail");
                    } else if expander::apply_detail(&mut bank.nodes, id, payload) {
                        debug!(node = %id, "node loaded");
                    }
                }
            },
            Err(err) => {
                match &target {
                    FetchTarget::View(id) => self.registry.fail(*id),
                    FetchTarget::BankReload => {}
                    FetchTarget::Node { id, generation } => {
                        let bank = self.registry.bank_mut();
                        if *generation == bank.generation() {
                            expander::abort_fetch(&mut bank.nodes, id);
                        }
                    }
                }
                self.report_failure(&target, &err);
            }
        }
    }

    /// Apply completions until nothing is in flight.
    pub async fn settle(&mut self, completions: &mut Completions) {
        while self.in_flight > 0 {
            match completions.recv().await {
                Some(completion) => self.apply(completion),
                None => break,
            }
        }
    }

    fn report_failure(&mut self, target: &FetchTarget, err: &ServiceError) {
        warn!(?target, error = %err, "fetch failed");
        match self.on_failure.as_mut() {
            Some(handler) => handler(target, err),
            None => self.surface.alert(VIEWER_STOPPED_MSG),
        }
    }

    /// Spawn a node fetch if the toggle asked for one.
    fn issue_node_fetch(&mut self, toggle: &Toggle) -> bool {
        let Toggle::Fetch(id) = toggle else {
            return false;
        };
        let generation = self.registry.bank().generation();
        self.spawn_fetch(
            FetchTarget::Node {
                id: id.clone(),
                generation,
            },
            Request::Node { id: id.clone() },
        );
        true
    }

    fn spawn_reload(&mut self) {
        self.spawn_fetch(
            FetchTarget::BankReload,
            Request::BankList { include_all: true },
        );
    }

    fn spawn_fetch(&mut self, target: FetchTarget, request: Request) {
        debug!(?target, %request, "issuing fetch");
        self.in_flight += 1;
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = service.fetch(&request).await;
            // Receiver gone means the session is over.
            let _ = tx.send(Completion { target, result });
        });
    }
}

fn plan_name(plan: &BulkPlan) -> &'static str {
    match plan {
        BulkPlan::Empty => "empty",
        BulkPlan::NeedsConfirmation { .. } => "confirm",
        BulkPlan::ExpandEach(_) => "expand-each",
        BulkPlan::ReloadAll => "reload-all",
    }
}
