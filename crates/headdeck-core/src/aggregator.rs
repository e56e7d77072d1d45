// ── Resource aggregator ──
//
// Owns one observable state slot per collection, runs fetches through the
// authenticated client, and keeps the navigation summary in step with the
// collection sizes.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use headdeck_api::{
    ApiClient, ApiKey, ApiOutcome, CredentialStore, Node, Route, TransportConfig, User,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use crate::error::CoreError;
use crate::kind::ResourceKind;
use crate::nav::{NavCounts, NavEntry};
use crate::navigation::Navigation;
use crate::state::{CollectionState, FetchError};
use crate::stream::StateStream;

/// Reactive view over Users, Nodes, Routes and `ApiKeys`.
///
/// Cheap to clone; clones share state. Fetches for different collections
/// are independent. Re-fetching a collection supersedes any fetch of the
/// same collection still in flight, and a redirect (e.g. to setup)
/// discards every in-flight result.
#[derive(Clone)]
pub struct Aggregator {
    inner: Arc<AggregatorInner>,
}

struct AggregatorInner {
    client: ApiClient,
    navigation: Navigation,
    users: Slot<User>,
    nodes: Slot<Node>,
    routes: Slot<Route>,
    api_keys: Slot<ApiKey>,
    // Serializes count snapshots so an older snapshot never lands last.
    counts: Mutex<()>,
}

impl Aggregator {
    /// Wrap an existing client. `navigation` should be the same instance
    /// the client redirects through, otherwise redirects will not discard
    /// in-flight results.
    pub fn new(client: ApiClient, navigation: Navigation) -> Self {
        Self {
            inner: Arc::new(AggregatorInner {
                client,
                navigation,
                users: Slot::new(ResourceKind::Users),
                nodes: Slot::new(ResourceKind::Nodes),
                routes: Slot::new(ResourceKind::Routes),
                api_keys: Slot::new(ResourceKind::ApiKeys),
                counts: Mutex::new(()),
            }),
        }
    }

    /// Build a client wired to a fresh `Navigation` starting at `/`.
    pub fn connect(
        base_url: Url,
        credentials: Arc<dyn CredentialStore>,
        transport: &TransportConfig,
    ) -> Result<Self, CoreError> {
        let navigation = Navigation::default();
        let client = ApiClient::new(
            base_url,
            credentials,
            Arc::new(navigation.clone()),
            transport,
        )?;
        Ok(Self::new(client, navigation))
    }

    // ── Fetches ──────────────────────────────────────────────────────

    pub async fn fetch_users(&self) {
        let inner = &self.inner;
        self.run(&inner.users, inner.client.list_users()).await;
    }

    pub async fn fetch_nodes(&self) {
        let inner = &self.inner;
        self.run(&inner.nodes, inner.client.list_nodes()).await;
    }

    pub async fn fetch_routes(&self) {
        let inner = &self.inner;
        self.run(&inner.routes, inner.client.list_routes()).await;
    }

    pub async fn fetch_api_keys(&self) {
        let inner = &self.inner;
        self.run(&inner.api_keys, inner.client.list_api_keys())
            .await;
    }

    pub async fn fetch(&self, kind: ResourceKind) {
        match kind {
            ResourceKind::Users => self.fetch_users().await,
            ResourceKind::Nodes => self.fetch_nodes().await,
            ResourceKind::Routes => self.fetch_routes().await,
            ResourceKind::ApiKeys => self.fetch_api_keys().await,
        }
    }

    /// Fetch all four collections concurrently.
    pub async fn fetch_all(&self) {
        tokio::join!(
            self.fetch_users(),
            self.fetch_nodes(),
            self.fetch_routes(),
            self.fetch_api_keys(),
        );
    }

    /// Fire-and-forget variant of [`fetch`](Self::fetch).
    pub fn spawn_fetch(&self, kind: ResourceKind) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move { this.fetch(kind).await })
    }

    async fn run<T, F>(&self, slot: &Slot<T>, request: F)
    where
        F: Future<Output = ApiOutcome<Vec<T>>>,
    {
        let generation = slot.begin();
        let epoch = self.inner.navigation.epoch();

        let outcome = request.await;

        let redirected = self.inner.navigation.epoch() != epoch;
        if slot.finish(generation, redirected, outcome) {
            self.refresh_counts();
        }
    }

    fn refresh_counts(&self) {
        let inner = &self.inner;
        let _guard = inner.counts.lock().unwrap_or_else(PoisonError::into_inner);
        let counts = NavCounts {
            users: inner.users.len(),
            nodes: inner.nodes.len(),
            routes: inner.routes.len(),
            api_keys: inner.api_keys.len(),
        };
        inner.navigation.update_counts(counts);
    }

    // ── Snapshots ────────────────────────────────────────────────────

    pub fn users(&self) -> CollectionState<User> {
        self.inner.users.snapshot()
    }

    pub fn nodes(&self) -> CollectionState<Node> {
        self.inner.nodes.snapshot()
    }

    pub fn routes(&self) -> CollectionState<Route> {
        self.inner.routes.snapshot()
    }

    pub fn api_keys(&self) -> CollectionState<ApiKey> {
        self.inner.api_keys.snapshot()
    }

    pub fn count(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Users => self.inner.users.len(),
            ResourceKind::Nodes => self.inner.nodes.len(),
            ResourceKind::Routes => self.inner.routes.len(),
            ResourceKind::ApiKeys => self.inner.api_keys.len(),
        }
    }

    pub fn is_loading(&self, kind: ResourceKind) -> bool {
        match kind {
            ResourceKind::Users => self.inner.users.state.borrow().loading,
            ResourceKind::Nodes => self.inner.nodes.state.borrow().loading,
            ResourceKind::Routes => self.inner.routes.state.borrow().loading,
            ResourceKind::ApiKeys => self.inner.api_keys.state.borrow().loading,
        }
    }

    pub fn error(&self, kind: ResourceKind) -> Option<FetchError> {
        match kind {
            ResourceKind::Users => self.inner.users.state.borrow().error.clone(),
            ResourceKind::Nodes => self.inner.nodes.state.borrow().error.clone(),
            ResourceKind::Routes => self.inner.routes.state.borrow().error.clone(),
            ResourceKind::ApiKeys => self.inner.api_keys.state.borrow().error.clone(),
        }
    }

    pub fn nav_entries(&self) -> Arc<Vec<NavEntry>> {
        self.inner.navigation.entries()
    }

    pub fn selected(&self) -> Option<NavEntry> {
        self.inner.navigation.selected()
    }

    pub fn navigation(&self) -> &Navigation {
        &self.inner.navigation
    }

    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_users(&self) -> StateStream<User> {
        StateStream::new(self.inner.users.state.subscribe())
    }

    pub fn subscribe_nodes(&self) -> StateStream<Node> {
        StateStream::new(self.inner.nodes.state.subscribe())
    }

    pub fn subscribe_routes(&self) -> StateStream<Route> {
        StateStream::new(self.inner.routes.state.subscribe())
    }

    pub fn subscribe_api_keys(&self) -> StateStream<ApiKey> {
        StateStream::new(self.inner.api_keys.state.subscribe())
    }
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("client", &self.inner.client)
            .field("navigation", &self.inner.navigation)
            .finish_non_exhaustive()
    }
}

// ── Slot ─────────────────────────────────────────────────────────────

struct Slot<T> {
    kind: ResourceKind,
    state: watch::Sender<CollectionState<T>>,
    /// Only read or written inside the watch lock (`send_modify` /
    /// `send_if_modified`), so check-and-apply is atomic per slot.
    generation: AtomicU64,
}

impl<T> Slot<T> {
    fn new(kind: ResourceKind) -> Self {
        let (state, _) = watch::channel(CollectionState::default());
        Self {
            kind,
            state,
            generation: AtomicU64::new(0),
        }
    }

    fn snapshot(&self) -> CollectionState<T> {
        self.state.borrow().clone()
    }

    fn len(&self) -> usize {
        self.state.borrow().len()
    }

    /// Mark the slot loading and claim a new generation.
    fn begin(&self) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|s| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            s.loading = true;
        });
        debug!(kind = %self.kind, generation, "fetch started");
        generation
    }

    /// Apply a finished fetch. Returns `true` when `data` was replaced.
    fn finish(&self, generation: u64, redirected: bool, outcome: ApiOutcome<Vec<T>>) -> bool {
        let kind = self.kind;
        let mut replaced = false;

        self.state.send_if_modified(|s| {
            if self.generation.load(Ordering::SeqCst) != generation {
                debug!(%kind, generation, "dropping superseded response");
                return false;
            }
            s.loading = false;

            if redirected {
                debug!(%kind, generation, "dropping response that outlived a redirect");
                return true;
            }

            match outcome {
                ApiOutcome::Ok(items) => {
                    debug!(%kind, count = items.len(), "fetch succeeded");
                    s.data = Arc::new(items);
                    s.error = None;
                    replaced = true;
                }
                ApiOutcome::AuthRequired(why) => {
                    debug!(%kind, %why, "fetch needs authentication");
                }
                ApiOutcome::Failed(e) => {
                    warn!(%kind, error = %e, "fetch failed");
                    s.error = Some(FetchError::from(&e));
                }
            }
            true
        });

        replaced
    }
}
