//! Mock Node - in-memory node, connector and keystore
//!
//! Used by the tests and by `worker-console run`, which drives a simulated
//! node instead of a remote one.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Connector, Credentials, Keystore, NodeClient, WorkerInfo};
use crate::address::Address;
use crate::error::{ConsoleError, Result};

/// Account seeded by [`MockKeystore::demo`]
pub const DEMO_ACCOUNT: Address = Address::new([
    0x81, 0x25, 0x72, 0x1c, 0x2a, 0xb4, 0xc1, 0x3b, 0x0a, 0x1c, 0x4e, 0x3d, 0x51, 0x8a, 0x2b,
    0x2c, 0x3e, 0x4f, 0x5a, 0x6b,
]);

/// Passphrase for [`DEMO_ACCOUNT`]
pub const DEMO_PASSPHRASE: &str = "demo";

// ─────────────────────────────────────────────────────────────────────────────
// Node
// ─────────────────────────────────────────────────────────────────────────────

/// Node that keeps its worker table in memory and counts calls
#[derive(Debug, Default)]
pub struct MockNode {
    workers: Mutex<Vec<WorkerInfo>>,
    latency: Duration,
    confirm_failure: Mutex<Option<String>>,
    list_calls: AtomicUsize,
    confirm_calls: AtomicUsize,
}

impl MockNode {
    pub fn new(workers: Vec<WorkerInfo>) -> Self {
        Self {
            workers: Mutex::new(workers),
            ..Self::default()
        }
    }

    /// Unconfirmed workers with the given addresses
    pub fn with_workers(addresses: impl IntoIterator<Item = Address>) -> Self {
        Self::new(
            addresses
                .into_iter()
                .map(|a| WorkerInfo::new(a, false))
                .collect(),
        )
    }

    /// Five workers, one already confirmed, with a little latency on every call
    pub fn demo() -> Self {
        let workers = (1u8..=5)
            .map(|n| {
                let mut bytes = [0u8; 20];
                bytes[0] = 0xa0 + n;
                bytes[19] = n.wrapping_mul(37);
                WorkerInfo::new(Address::from(bytes), n == 3)
            })
            .collect();
        Self::new(workers).with_latency(Duration::from_millis(400))
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make every following confirmation fail with `reason`
    pub fn fail_confirmations(&self, reason: impl Into<String>) {
        *self.confirm_failure.lock() = Some(reason.into());
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn confirm_calls(&self) -> usize {
        self.confirm_calls.load(Ordering::SeqCst)
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl NodeClient for MockNode {
    async fn list_workers(&self, _owner: Address) -> Result<Vec<WorkerInfo>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        Ok(self.workers.lock().clone())
    }

    async fn confirm_worker(&self, worker: Address) -> Result<()> {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;

        if let Some(reason) = self.confirm_failure.lock().clone() {
            return Err(ConsoleError::node("confirm worker", reason));
        }

        let mut workers = self.workers.lock();
        match workers.iter_mut().find(|w| w.address == worker) {
            Some(info) => {
                info.confirmed = true;
                Ok(())
            }
            None => Err(ConsoleError::node(
                "confirm worker",
                format!("unknown worker {worker}"),
            )),
        }
    }

    async fn balance(&self, _owner: Address) -> Result<String> {
        self.delay().await;
        Ok("1250.000 SNM".to_string())
    }

    async fn order_count(&self) -> Result<u64> {
        self.delay().await;
        Ok(42)
    }

    async fn deal_count(&self, _owner: Address) -> Result<u64> {
        self.delay().await;
        Ok(self.workers.lock().iter().filter(|w| w.confirmed).count() as u64)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Connector
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum ConnectMode {
    Ready,
    Hang,
    Refuse(String),
}

/// Connector handing out a shared [`MockNode`]
#[derive(Debug, Clone)]
pub struct MockConnector {
    node: Arc<MockNode>,
    mode: ConnectMode,
}

impl MockConnector {
    pub fn ready(node: Arc<MockNode>) -> Self {
        Self {
            node,
            mode: ConnectMode::Ready,
        }
    }

    /// Never answers; the caller's timeout decides
    pub fn hanging() -> Self {
        Self {
            node: Arc::new(MockNode::default()),
            mode: ConnectMode::Hang,
        }
    }

    pub fn refusing(reason: impl Into<String>) -> Self {
        Self {
            node: Arc::new(MockNode::default()),
            mode: ConnectMode::Refuse(reason.into()),
        }
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(
        &self,
        endpoint: &str,
        _credentials: &Credentials,
    ) -> Result<Arc<dyn NodeClient>> {
        match &self.mode {
            ConnectMode::Ready => {
                self.node.delay().await;
                Ok(Arc::clone(&self.node) as Arc<dyn NodeClient>)
            }
            ConnectMode::Hang => std::future::pending().await,
            ConnectMode::Refuse(reason) => Err(ConsoleError::Connect {
                endpoint: endpoint.to_string(),
                reason: reason.clone(),
            }),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Keystore
// ─────────────────────────────────────────────────────────────────────────────

/// Keystore holding `(account, passphrase)` pairs, whatever the path
#[derive(Debug, Clone, Default)]
pub struct MockKeystore {
    accounts: Vec<(Address, String)>,
}

impl MockKeystore {
    pub fn new(accounts: Vec<(Address, String)>) -> Self {
        Self { accounts }
    }

    pub fn demo() -> Self {
        Self::new(vec![(DEMO_ACCOUNT, DEMO_PASSPHRASE.to_string())])
    }
}

#[async_trait]
impl Keystore for MockKeystore {
    async fn accounts(&self, _path: &Path) -> Result<Vec<Address>> {
        Ok(self.accounts.iter().map(|(a, _)| *a).collect())
    }

    async fn unlock(&self, path: &Path, account: Address, passphrase: &str) -> Result<Credentials> {
        let (_, expected) = self
            .accounts
            .iter()
            .find(|(a, _)| *a == account)
            .ok_or_else(|| ConsoleError::Keystore {
                path: path.display().to_string(),
                reason: format!("no key for {account}"),
            })?;

        if expected != passphrase {
            return Err(ConsoleError::WrongPassphrase {
                account: account.to_hex(),
            });
        }
        Ok(Credentials::new(account, account.as_bytes().to_vec()))
    }
}
