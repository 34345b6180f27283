//! Controller scenarios: fetch-at-most-once, exclusive activation, and the
//! bulk "load all" paths, run against a recording in-memory backend.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bankview::controller::{BulkOutcome, Completions, Surface, UiAction, Viewer};
use bankview::node::expander::{Toggle, NODE_EMPTY_MSG, NODE_WARNING_MSG};
use bankview::node::NodeState;
use bankview::service::{
    DataService, HttpDataService, Payload, Request, ServiceError, VIEWER_STOPPED_MSG,
};
use bankview::view::{Activation, ViewId};

// ============================================================================
// Helpers
// ============================================================================

#[derive(Default)]
struct RecordingSurface {
    alerts: Vec<String>,
    notices: Vec<String>,
    prompts: Vec<String>,
}

impl Surface for RecordingSurface {
    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
    fn prompt(&mut self, message: &str) {
        self.prompts.push(message.to_string());
    }
}

/// In-memory backend that records every request path.
struct FakeBackend {
    bank: String,
    bank_all: String,
    failing_nodes: HashSet<String>,
    requests: Mutex<Vec<String>>,
}

impl FakeBackend {
    fn new(bank: String) -> Self {
        Self {
            bank_all: bank.clone(),
            bank,
            failing_nodes: HashSet::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn failing(mut self, id: &str) -> Self {
        self.failing_nodes.insert(id.to_string());
        self
    }

    fn with_bank_all(mut self, bank_all: String) -> Self {
        self.bank_all = bank_all;
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }
}

#[async_trait]
impl DataService for FakeBackend {
    async fn fetch(&self, request: &Request) -> Result<Payload, ServiceError> {
        let path = request.path_and_query();
        self.requests.lock().unwrap().push(path.clone());
        match request {
            Request::BankList { include_all: false } => Ok(Payload::new(self.bank.clone())),
            Request::BankList { include_all: true } => Ok(Payload::new(self.bank_all.clone())),
            Request::Node { id } if self.failing_nodes.contains(id) => {
                Err(ServiceError::Status {
                    status: 500,
                    request: path,
                })
            }
            Request::Node { id } => Ok(Payload::new(format!("<p>detail of {id}</p>"))),
            _ => Ok(Payload::new(format!("<h1>{path}</h1>"))),
        }
    }
}

fn placeholder(id: &str, kind: &str) -> String {
    format!(
        r#"<div class="closable hidden js-load-node {kind}" data-id="{id}"><span class="head">{kind} {id}</span></div>"#
    )
}

/// A bank tree with `events` event nodes and `others` sound nodes.
fn bank_html(events: usize, others: usize) -> String {
    let mut html = String::from("<div class=\"bank\">");
    for i in 0..events {
        html.push_str(&placeholder(&format!("e{i}"), "event"));
    }
    for i in 0..others {
        html.push_str(&placeholder(&format!("s{i}"), "sound"));
    }
    html.push_str("</div>");
    html
}

fn viewer_with(
    backend: FakeBackend,
) -> (Viewer<RecordingSurface>, Completions, Arc<FakeBackend>) {
    let backend = Arc::new(backend);
    let (viewer, completions) = Viewer::new(backend.clone(), RecordingSurface::default());
    (viewer, completions, backend)
}

/// Viewer with the bank view already loaded.
async fn loaded_bank(
    backend: FakeBackend,
) -> (Viewer<RecordingSurface>, Completions, Arc<FakeBackend>) {
    let (mut viewer, mut completions, backend) = viewer_with(backend);
    viewer.activate(ViewId::BankList);
    viewer.settle(&mut completions).await;
    assert!(viewer.registry().bank().is_loaded());
    (viewer, completions, backend)
}

// ============================================================================
// Views
// ============================================================================

#[tokio::test]
async fn readme_fetched_once() {
    let (mut viewer, mut rx, backend) = viewer_with(FakeBackend::new(bank_html(0, 0)));

    assert!(matches!(viewer.activate(ViewId::DocsReadme), Activation::Fetch(_)));
    viewer.settle(&mut rx).await;
    let content = viewer.registry().view(ViewId::DocsReadme).content().cloned();
    assert_eq!(backend.requests(), vec!["/load-docs?doc=readme"]);

    assert_eq!(viewer.activate(ViewId::DocsReadme), Activation::Loaded);
    viewer.settle(&mut rx).await;
    assert_eq!(backend.requests(), vec!["/load-docs?doc=readme"]);
    assert_eq!(
        viewer.registry().view(ViewId::DocsReadme).content().cloned(),
        content
    );
}

#[tokio::test]
async fn each_view_fetched_at_most_once() {
    let (mut viewer, mut rx, backend) = viewer_with(FakeBackend::new(bank_html(1, 0)));

    for _ in 0..3 {
        for id in ViewId::ALL {
            viewer.dispatch(UiAction::Activate(id));
        }
        viewer.settle(&mut rx).await;
    }

    let mut requests = backend.requests();
    requests.sort();
    assert_eq!(
        requests,
        vec![
            "/load-banks",
            "/load-banks?simple=true",
            "/load-docs?doc=readme",
            "/load-docs?doc=wwiser",
        ]
    );
}

#[tokio::test]
async fn double_activation_before_completion_fetches_once() {
    let (mut viewer, mut rx, backend) = viewer_with(FakeBackend::new(bank_html(0, 0)));
    viewer.activate(ViewId::DocsWwiser);
    assert_eq!(viewer.activate(ViewId::DocsWwiser), Activation::Pending);
    viewer.settle(&mut rx).await;
    assert_eq!(backend.count("/load-docs"), 1);
}

#[tokio::test]
async fn activation_is_exclusive_and_keeps_loaded_state() {
    let (mut viewer, mut rx, _backend) = viewer_with(FakeBackend::new(bank_html(2, 0)));

    viewer.activate(ViewId::BankList);
    viewer.settle(&mut rx).await;
    viewer.activate(ViewId::SimpleList);
    viewer.settle(&mut rx).await;

    let active: Vec<ViewId> = ViewId::ALL
        .into_iter()
        .filter(|id| viewer.registry().is_active(*id))
        .collect();
    assert_eq!(active, vec![ViewId::SimpleList]);

    // Switching away never unloads the bank view.
    let bank = viewer.registry().bank();
    assert!(bank.is_loaded());
    assert_eq!(bank.nodes.len(), 2);
}

#[tokio::test]
async fn loaded_flag_is_monotonic() {
    let (mut viewer, mut rx, _backend) = viewer_with(FakeBackend::new(bank_html(3, 0)));
    viewer.activate(ViewId::BankList);
    viewer.settle(&mut rx).await;

    let ops = [
        UiAction::Activate(ViewId::DocsReadme),
        UiAction::ToggleNode("e0".into()),
        UiAction::LoadAll,
        UiAction::Activate(ViewId::BankList),
        UiAction::TogglePanel("hide-detail".into()),
    ];
    for op in ops {
        viewer.dispatch(op);
        assert!(viewer.registry().bank().is_loaded());
        viewer.settle(&mut rx).await;
        assert!(viewer.registry().bank().is_loaded());
    }
}

#[tokio::test]
async fn failed_view_load_alerts_and_stays_unloaded() {
    struct Down;

    #[async_trait]
    impl DataService for Down {
        async fn fetch(&self, request: &Request) -> Result<Payload, ServiceError> {
            Err(ServiceError::Status {
                status: 503,
                request: request.path_and_query(),
            })
        }
    }

    let (mut viewer, mut rx) = Viewer::new(Arc::new(Down), RecordingSurface::default());
    viewer.activate(ViewId::DocsReadme);
    viewer.settle(&mut rx).await;

    let view = viewer.registry().view(ViewId::DocsReadme);
    assert!(!view.is_loaded());
    assert!(!view.is_pending());
    assert!(view.content().is_none());
    assert_eq!(viewer.surface().alerts, vec![VIEWER_STOPPED_MSG.to_string()]);
}

// ============================================================================
// Single-node toggle
// ============================================================================

#[tokio::test]
async fn node_fetched_once_across_toggles() {
    let (mut viewer, mut rx, backend) = loaded_bank(FakeBackend::new(bank_html(1, 0))).await;

    assert_eq!(viewer.toggle_node("e0"), Toggle::Fetch("e0".into()));
    // Clicks before the detail arrives never issue a second fetch.
    assert_eq!(viewer.toggle_node("e0"), Toggle::InFlight);
    viewer.settle(&mut rx).await;

    let states: Vec<NodeState> = (0..5)
        .map(|_| {
            viewer.toggle_node("e0");
            viewer.registry().bank().nodes.state("e0").unwrap()
        })
        .collect();
    viewer.settle(&mut rx).await;

    assert_eq!(
        states,
        vec![
            NodeState::CollapsedLoaded,
            NodeState::ExpandedLoaded,
            NodeState::CollapsedLoaded,
            NodeState::ExpandedLoaded,
            NodeState::CollapsedLoaded,
        ]
    );
    assert_eq!(backend.count("/load-node"), 1);
}

#[tokio::test]
async fn node_detail_swapped_in_place() {
    let (mut viewer, mut rx, _backend) = loaded_bank(FakeBackend::new(bank_html(2, 0))).await;
    viewer.toggle_node("e1");
    viewer.settle(&mut rx).await;

    let node = viewer.registry().bank().nodes.get("e1").unwrap();
    assert_eq!(node.state, NodeState::ExpandedLoaded);
    assert_eq!(
        node.detail.as_ref().map(Payload::as_str),
        Some("<p>detail of e1</p>")
    );
    // Neighbours untouched.
    assert_eq!(
        viewer.registry().bank().nodes.state("e0"),
        Some(NodeState::CollapsedUnloaded)
    );
}

#[tokio::test]
async fn node_500_leaves_node_unloaded() {
    let backend = FakeBackend::new(bank_html(2, 0)).failing("e0");
    let (mut viewer, mut rx, backend) = loaded_bank(backend).await;

    viewer.toggle_node("e0");
    viewer.settle(&mut rx).await;

    let node = viewer.registry().bank().nodes.get("e0").unwrap();
    assert_eq!(node.state, NodeState::CollapsedUnloaded);
    assert!(node.detail.is_none());
    assert_eq!(viewer.surface().alerts, vec![VIEWER_STOPPED_MSG.to_string()]);
    assert_eq!(backend.count("/load-node"), 1);

    // A later click is a fresh user action and fetches again.
    viewer.toggle_node("e0");
    viewer.settle(&mut rx).await;
    assert_eq!(backend.count("/load-node"), 2);
}

#[tokio::test]
async fn panel_toggle_has_no_data_effect() {
    let (mut viewer, mut rx, backend) = loaded_bank(FakeBackend::new(bank_html(1, 0))).await;
    let before = backend.requests().len();

    assert!(viewer.toggle_panel("hide-detail"));
    assert!(!viewer.toggle_panel("hide-detail"));
    viewer.settle(&mut rx).await;

    assert_eq!(backend.requests().len(), before);
    assert_eq!(
        viewer.registry().bank().nodes.state("e0"),
        Some(NodeState::CollapsedUnloaded)
    );
}

// ============================================================================
// Bulk "load all"
// ============================================================================

#[tokio::test]
async fn filtered_load_all_fetches_matching_nodes_only() {
    let (mut viewer, mut rx, backend) = loaded_bank(FakeBackend::new(bank_html(5, 4))).await;

    viewer.dispatch(UiAction::SetFilter(Some("event".into())));
    assert_eq!(viewer.load_all(), BulkOutcome::Expanding(5));
    viewer.settle(&mut rx).await;

    let node_requests: Vec<String> = backend
        .requests()
        .into_iter()
        .filter(|r| r.starts_with("/load-node"))
        .collect();
    assert_eq!(node_requests.len(), 5);
    assert!(node_requests.iter().all(|r| r.starts_with("/load-node?id=e")));

    let nodes = &viewer.registry().bank().nodes;
    assert!((0..5).all(|i| nodes.state(&format!("e{i}")) == Some(NodeState::ExpandedLoaded)));
    assert!((0..4).all(|i| nodes.state(&format!("s{i}")) == Some(NodeState::CollapsedUnloaded)));
}

#[tokio::test]
async fn filtered_load_all_skips_loaded_and_in_flight() {
    let (mut viewer, mut rx, backend) = loaded_bank(FakeBackend::new(bank_html(3, 0))).await;

    viewer.toggle_node("e0");
    viewer.settle(&mut rx).await;
    viewer.toggle_node("e1"); // still in flight during load all

    viewer.set_filter(Some("event".into()));
    assert_eq!(viewer.load_all(), BulkOutcome::Expanding(1));
    viewer.settle(&mut rx).await;

    assert_eq!(backend.count("/load-node"), 3);
}

#[tokio::test]
async fn unfiltered_load_all_with_no_nodes_notifies() {
    let (mut viewer, mut rx, backend) = loaded_bank(FakeBackend::new(bank_html(0, 0))).await;
    let before = backend.requests().len();

    assert_eq!(viewer.load_all(), BulkOutcome::NoNodes);
    viewer.settle(&mut rx).await;

    assert_eq!(viewer.surface().notices, vec![NODE_EMPTY_MSG.to_string()]);
    assert!(viewer.surface().alerts.is_empty());
    assert_eq!(backend.requests().len(), before);
}

#[tokio::test]
async fn filtered_load_all_with_no_match_notifies() {
    let (mut viewer, mut rx, backend) = loaded_bank(FakeBackend::new(bank_html(0, 3))).await;
    viewer.set_filter(Some("event".into()));

    assert_eq!(viewer.load_all(), BulkOutcome::NoNodes);
    viewer.settle(&mut rx).await;

    assert_eq!(viewer.surface().notices, vec![NODE_EMPTY_MSG.to_string()]);
    assert_eq!(backend.count("/load-node"), 0);
}

#[tokio::test]
async fn unfiltered_load_all_over_threshold_declined() {
    let (mut viewer, mut rx, backend) = loaded_bank(FakeBackend::new(bank_html(301, 0))).await;
    let before = backend.requests().len();

    assert_eq!(viewer.load_all(), BulkOutcome::AwaitingConfirmation);
    assert_eq!(viewer.surface().prompts, vec![NODE_WARNING_MSG.to_string()]);
    assert_eq!(viewer.answer(false), Some(BulkOutcome::Declined));
    viewer.settle(&mut rx).await;

    assert_eq!(backend.requests().len(), before);
    assert!(viewer.surface().notices.is_empty());
    assert!(viewer.surface().alerts.is_empty());
    assert!(!viewer.awaiting_confirmation());
}

#[tokio::test]
async fn unfiltered_load_all_over_threshold_accepted() {
    let (mut viewer, mut rx, backend) = loaded_bank(FakeBackend::new(bank_html(301, 0))).await;
    let before = backend.requests().len();

    viewer.dispatch(UiAction::LoadAll);
    assert!(viewer.awaiting_confirmation());
    viewer.dispatch(UiAction::Answer(true));
    viewer.settle(&mut rx).await;

    let issued = backend.requests()[before..].to_vec();
    assert_eq!(issued, vec!["/load-banks?all=true"]);
    assert_eq!(backend.count("/load-node"), 0);
}

#[tokio::test]
async fn load_all_while_prompt_open_does_not_reprompt() {
    let (mut viewer, _rx, _backend) = loaded_bank(FakeBackend::new(bank_html(301, 0))).await;
    viewer.load_all();
    assert_eq!(viewer.load_all(), BulkOutcome::AwaitingConfirmation);
    assert_eq!(viewer.surface().prompts.len(), 1);
}

#[tokio::test]
async fn filtered_load_all_over_threshold_does_not_ask() {
    // The threshold guard covers only the whole-tree reload.
    let (mut viewer, mut rx, backend) = loaded_bank(FakeBackend::new(bank_html(301, 0))).await;
    viewer.set_filter(Some("event".into()));

    assert_eq!(viewer.load_all(), BulkOutcome::Expanding(301));
    viewer.settle(&mut rx).await;

    assert!(viewer.surface().prompts.is_empty());
    assert_eq!(backend.count("/load-node"), 301);
}

#[tokio::test]
async fn unfiltered_load_all_replaces_tree_wholesale() {
    let backend = FakeBackend::new(bank_html(3, 0)).with_bank_all(bank_html(3, 2));
    let (mut viewer, mut rx, backend) = loaded_bank(backend).await;

    viewer.toggle_node("e0");
    viewer.settle(&mut rx).await;
    assert_eq!(
        viewer.registry().bank().nodes.state("e0"),
        Some(NodeState::ExpandedLoaded)
    );

    assert_eq!(viewer.load_all(), BulkOutcome::Reloading);
    viewer.settle(&mut rx).await;

    let bank = viewer.registry().bank();
    assert_eq!(bank.nodes.len(), 5);
    assert!(bank
        .nodes
        .iter()
        .all(|n| n.state == NodeState::CollapsedUnloaded));
    assert_eq!(backend.count("/load-banks?all=true"), 1);
}

// ============================================================================
// End to end over HTTP
// ============================================================================

#[tokio::test]
async fn http_readme_fetched_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/load-docs"))
        .and(query_param("doc", "readme"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>README</h1>"))
        .expect(1)
        .mount(&server)
        .await;

    let service = HttpDataService::with_base_url(&server.uri(), None).unwrap();
    let (mut viewer, mut rx) = Viewer::new(Arc::new(service), RecordingSurface::default());

    viewer.activate(ViewId::DocsReadme);
    viewer.settle(&mut rx).await;
    viewer.activate(ViewId::DocsReadme);
    viewer.settle(&mut rx).await;

    assert_eq!(
        viewer
            .registry()
            .view(ViewId::DocsReadme)
            .content()
            .map(Payload::as_str),
        Some("<h1>README</h1>")
    );
}

#[tokio::test]
async fn http_node_500_surfaces_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/load-banks"))
        .respond_with(ResponseTemplate::new(200).set_body_string(placeholder("42", "event")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/load-node"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let service = HttpDataService::with_base_url(&server.uri(), None).unwrap();
    let (mut viewer, mut rx) = Viewer::new(Arc::new(service), RecordingSurface::default());
    viewer.activate(ViewId::BankList);
    viewer.settle(&mut rx).await;

    viewer.toggle_node("42");
    viewer.settle(&mut rx).await;

    assert_eq!(
        viewer.registry().bank().nodes.state("42"),
        Some(NodeState::CollapsedUnloaded)
    );
    assert_eq!(viewer.surface().alerts, vec![VIEWER_STOPPED_MSG.to_string()]);
}
