//! Node Controller - worker confirmation state machine
//!
//! Owns the connection and the worker bookkeeping. It consumes typed
//! [`NodeEvent`]s from its private queue, one at a time, and never awaits
//! network I/O itself: every node call runs on a spawned task whose result
//! comes back as another event.
//!
//! ```text
//! Disconnected ──ConnectRequested──► Connecting ──ConnectionEstablished──► Connected
//!      ▲                                 │                                   │
//!      └──────────ConnectionFailed───────┘         RefreshWorkerList / ConfirmWorker
//! ```
//!
//! Everything visible goes through the router.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::workers::{reconcile, ConfirmationStatus, WorkerListView};
use super::{Connection, Connector, Credentials, WorkerInfo};
use crate::address::Address;
use crate::element::{AsyncLabel, Label, LabelStyle};
use crate::error::{ConsoleError, FixSuggestion, Result};
use crate::router::Router;

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum NodeEvent {
    ConnectRequested {
        endpoint: String,
        credentials: Credentials,
    },
    /// `attempt` ties the result to the request that started it
    ConnectionEstablished {
        attempt: u64,
        connection: Connection,
    },
    ConnectionFailed {
        attempt: u64,
        endpoint: String,
        error: ConsoleError,
    },
    RefreshWorkerList,
    WorkersFetched(Result<Vec<WorkerInfo>>),
    ConfirmWorker(Address),
    ConfirmWorkerDone {
        address: Address,
        error: Option<ConsoleError>,
    },
    RefreshUptime,
}

/// Cloneable sender into the controller's queue
#[derive(Debug, Clone)]
pub struct NodeHandle {
    tx: mpsc::UnboundedSender<NodeEvent>,
}

impl NodeHandle {
    /// Post an event; dropped with a debug log once the controller is gone
    pub fn send(&self, event: NodeEvent) {
        if let Err(e) = self.tx.send(event) {
            debug!(event = ?e.0, "node controller stopped, event dropped");
        }
    }

    pub fn connect(&self, endpoint: impl Into<String>, credentials: Credentials) {
        self.send(NodeEvent::ConnectRequested {
            endpoint: endpoint.into(),
            credentials,
        });
    }

    pub fn refresh_workers(&self) {
        self.send(NodeEvent::RefreshWorkerList);
    }

    pub fn confirm_worker(&self, address: Address) {
        self.send(NodeEvent::ConfirmWorker(address));
    }

    /// Handle whose events land in the returned receiver instead of a controller
    #[cfg(test)]
    pub(crate) fn detached() -> (Self, mpsc::UnboundedReceiver<NodeEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// View and timings
// ─────────────────────────────────────────────────────────────────────────────

/// The elements the controller reports into
#[derive(Debug, Clone)]
pub struct ControllerView {
    pub node: AsyncLabel,
    pub account: AsyncLabel,
    pub balance: AsyncLabel,
    pub orders: AsyncLabel,
    pub deals: AsyncLabel,
    pub workers: Arc<WorkerListView>,
    pub status: Arc<Label>,
}

impl ControllerView {
    /// Fresh view; the async labels start their loops under `cancel`
    pub fn new(router: &Router, cancel: &CancellationToken, tick: Duration) -> Self {
        let cell = |text: &str| {
            AsyncLabel::with_timing(
                text,
                router.clone(),
                cancel,
                tick,
                crate::element::DEFAULT_FRAMES,
            )
        };
        Self {
            node: cell("disconnected"),
            account: cell("-"),
            balance: cell("-"),
            orders: cell("-"),
            deals: cell("-"),
            workers: Arc::new(WorkerListView::new()),
            status: Arc::new(Label::default()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerTimings {
    pub connect_timeout: Duration,
    pub refresh_retry: Duration,
    pub uptime_interval: Duration,
}

impl Default for ControllerTimings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(3),
            refresh_retry: Duration::from_secs(1),
            uptime_interval: Duration::from_secs(60),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Controller
// ─────────────────────────────────────────────────────────────────────────────

pub struct NodeController {
    rx: mpsc::UnboundedReceiver<NodeEvent>,
    tx: mpsc::UnboundedSender<NodeEvent>,
    router: Router,
    connector: Arc<dyn Connector>,
    view: ControllerView,
    timings: ControllerTimings,
    cancel: CancellationToken,

    connection: Option<Connection>,
    /// Bumped on every connect request; older results are stale
    connect_attempt: u64,
    workers: Vec<WorkerInfo>,
    in_flight: HashSet<Address>,
    confirmed: HashSet<Address>,
    refreshing: bool,
    refresh_queued: bool,
}

impl NodeController {
    pub fn new(
        router: Router,
        connector: Arc<dyn Connector>,
        view: ControllerView,
        timings: ControllerTimings,
        cancel: &CancellationToken,
    ) -> (Self, NodeHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = NodeHandle { tx: tx.clone() };
        let controller = Self {
            rx,
            tx,
            router,
            connector,
            view,
            timings,
            cancel: cancel.child_token(),
            connection: None,
            connect_attempt: 0,
            workers: Vec::new(),
            in_flight: HashSet::new(),
            confirmed: HashSet::new(),
            refreshing: false,
            refresh_queued: false,
        };
        (controller, handle)
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Event loop. Returns once the cancellation token fires.
    pub async fn run(mut self) {
        // First tick fires immediately
        let mut uptime = tokio::time::interval(self.timings.uptime_interval);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!("node controller cancelled");
                    return;
                }
                Some(event) = self.rx.recv() => self.handle(event).await,
                _ = uptime.tick() => self.handle(NodeEvent::RefreshUptime).await,
            }
        }
    }

    async fn handle(&mut self, event: NodeEvent) {
        match event {
            NodeEvent::ConnectRequested {
                endpoint,
                credentials,
            } => self.on_connect_requested(endpoint, credentials).await,
            NodeEvent::ConnectionEstablished { attempt, .. }
            | NodeEvent::ConnectionFailed { attempt, .. }
                if attempt != self.connect_attempt =>
            {
                debug!(
                    attempt,
                    current = self.connect_attempt,
                    "stale connect result dropped"
                );
            }
            NodeEvent::ConnectionEstablished { connection, .. } => {
                self.on_connection_established(connection).await
            }
            NodeEvent::ConnectionFailed {
                endpoint, error, ..
            } => self.on_connection_failed(endpoint, error).await,
            NodeEvent::RefreshWorkerList => self.on_refresh_requested(),
            NodeEvent::WorkersFetched(result) => self.on_workers_fetched(result).await,
            NodeEvent::ConfirmWorker(address) => self.on_confirm_worker(address).await,
            NodeEvent::ConfirmWorkerDone { address, error } => {
                self.on_confirm_done(address, error).await
            }
            NodeEvent::RefreshUptime => {
                debug!("uptime tick");
            }
        }
    }

    async fn on_connect_requested(&mut self, endpoint: String, credentials: Credentials) {
        self.connect_attempt += 1;
        let attempt = self.connect_attempt;
        info!(%endpoint, account = %credentials.address, attempt, "connecting to node");
        self.connection = None;
        self.view.node.run_progress();
        self.set_status(format!("Connecting to {endpoint}..."), LabelStyle::Normal)
            .await;

        let connector = Arc::clone(&self.connector);
        let timeout = self.timings.connect_timeout;
        self.spawn_task(async move {
            let owner = credentials.address;
            match tokio::time::timeout(timeout, connector.connect(&endpoint, &credentials)).await {
                Ok(Ok(client)) => NodeEvent::ConnectionEstablished {
                    attempt,
                    connection: Connection {
                        endpoint,
                        owner,
                        client,
                    },
                },
                Ok(Err(error)) => NodeEvent::ConnectionFailed {
                    attempt,
                    endpoint,
                    error,
                },
                Err(_) => NodeEvent::ConnectionFailed {
                    attempt,
                    error: ConsoleError::ConnectTimeout {
                        endpoint: endpoint.clone(),
                        timeout_ms: timeout.as_millis() as u64,
                    },
                    endpoint,
                },
            }
        });
    }

    async fn on_connection_established(&mut self, connection: Connection) {
        info!(endpoint = %connection.endpoint, "connected");
        let owner = connection.owner;

        self.view.node.stop_progress(connection.endpoint.clone());
        self.view.account.stop_progress(owner.to_hex());

        let client = Arc::clone(&connection.client);
        self.view.balance.set_text_async(move || async move {
            client.balance(owner).await.unwrap_or_else(|e| e.to_string())
        });
        let client = Arc::clone(&connection.client);
        self.view.orders.set_text_async(move || async move {
            match client.order_count().await {
                Ok(n) => n.to_string(),
                Err(e) => e.to_string(),
            }
        });
        let client = Arc::clone(&connection.client);
        self.view.deals.set_text_async(move || async move {
            match client.deal_count(owner).await {
                Ok(n) => n.to_string(),
                Err(e) => e.to_string(),
            }
        });

        self.connection = Some(connection);
        self.set_status("Connected", LabelStyle::Succ).await;
        self.post(NodeEvent::RefreshWorkerList);
    }

    async fn on_connection_failed(&mut self, endpoint: String, error: ConsoleError) {
        warn!(%endpoint, %error, "connection failed");
        self.connection = None;

        let text = error.to_string();
        self.view
            .node
            .stop_progress_with(text.clone(), LabelStyle::Error);
        let status = match error.fix_suggestion() {
            Some(hint) => format!("{text} ({hint})"),
            None => text,
        };
        self.set_status(status, LabelStyle::Error).await;
    }

    fn on_refresh_requested(&mut self) {
        let Some(connection) = &self.connection else {
            debug!(retry_in = ?self.timings.refresh_retry, "not connected, refresh requeued");
            let tx = self.tx.clone();
            let cancel = self.cancel.clone();
            let delay = self.timings.refresh_retry;
            tokio::spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(delay) => {
                        let _ = tx.send(NodeEvent::RefreshWorkerList);
                    }
                }
            });
            return;
        };

        if self.refreshing {
            self.refresh_queued = true;
            return;
        }
        self.refreshing = true;

        let client = Arc::clone(&connection.client);
        let owner = connection.owner;
        self.spawn_task(async move { NodeEvent::WorkersFetched(client.list_workers(owner).await) });
    }

    async fn on_workers_fetched(&mut self, result: Result<Vec<WorkerInfo>>) {
        self.refreshing = false;

        match result {
            Ok(workers) => {
                debug!(count = workers.len(), "worker list fetched");
                self.workers = workers;
                self.push_records().await;
            }
            Err(error) => {
                warn!(%error, "worker list refresh failed");
                self.set_status(error.to_string(), LabelStyle::Error).await;
            }
        }

        if std::mem::take(&mut self.refresh_queued) {
            self.post(NodeEvent::RefreshWorkerList);
        }
    }

    async fn on_confirm_worker(&mut self, address: Address) {
        if self.confirmed.contains(&address) || self.in_flight.contains(&address) {
            debug!(%address, "already confirmed or confirming");
            return;
        }
        let Some(connection) = &self.connection else {
            debug!(%address, "confirm ignored, not connected");
            return;
        };

        info!(%address, "confirming worker");
        self.in_flight.insert(address);

        let client = Arc::clone(&connection.client);
        self.spawn_task(async move {
            NodeEvent::ConfirmWorkerDone {
                address,
                error: client.confirm_worker(address).await.err(),
            }
        });

        let view = Arc::clone(&self.view.workers);
        self.execute(move || view.set_status(&address, ConfirmationStatus::InProgress))
            .await;
    }

    async fn on_confirm_done(&mut self, address: Address, error: Option<ConsoleError>) {
        self.in_flight.remove(&address);

        if let Some(error) = error {
            warn!(%address, %error, "worker confirmation failed");
            self.set_status(
                format!("Confirm {}: {error}", address.short()),
                LabelStyle::Error,
            )
            .await;
        }
        self.post(NodeEvent::RefreshWorkerList);
    }

    async fn push_records(&mut self) {
        let records = reconcile(&self.workers, &self.in_flight, &mut self.confirmed);
        let view = Arc::clone(&self.view.workers);
        self.execute(move || view.set_records(records)).await;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Plumbing
    // ─────────────────────────────────────────────────────────────────────

    fn post(&self, event: NodeEvent) {
        // The receiver lives in self, so this only fails during teardown
        let _ = self.tx.send(event);
    }

    /// Run `work` in the background and feed its outcome back as an event
    fn spawn_task<F>(&self, work: F)
    where
        F: Future<Output = NodeEvent> + Send + 'static,
    {
        let tx = self.tx.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                event = work => {
                    let _ = tx.send(event);
                }
            }
        });
    }

    async fn execute<F>(&self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Err(e) = self.router.execute(action).await {
            debug!(error = %e, "display update dropped");
        }
    }

    async fn set_status(&self, text: impl Into<String>, style: LabelStyle) {
        let status = Arc::clone(&self.view.status);
        let text = text.into();
        self.execute(move || status.set(text, style)).await;
    }
}
