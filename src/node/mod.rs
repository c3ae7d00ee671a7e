//! Node Layer - external collaborators and the worker controller
//!
//! The console never speaks a wire protocol itself. Everything it needs from
//! the management node, the connection setup and the keystore is expressed as
//! a capability trait here; the terminal front end is handed concrete
//! implementations through [`Backend`].

pub mod controller;
pub mod keystore;
pub mod mock;
pub mod workers;

pub use controller::{ControllerTimings, ControllerView, NodeController, NodeEvent, NodeHandle};
pub use keystore::DirKeystore;
pub use mock::{MockConnector, MockKeystore, MockNode};
pub use workers::{reconcile, ConfirmationStatus, WorkerListView, WorkerRecord};

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::address::Address;
use crate::error::Result;

// ─────────────────────────────────────────────────────────────────────────────
// Capabilities
// ─────────────────────────────────────────────────────────────────────────────

/// Request/response calls against the management node
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Workers registered for `owner`, in the node's order
    async fn list_workers(&self, owner: Address) -> Result<Vec<WorkerInfo>>;

    /// Mark a worker as trusted by its owner
    async fn confirm_worker(&self, worker: Address) -> Result<()>;

    /// Token balance, already formatted for display
    async fn balance(&self, owner: Address) -> Result<String>;

    async fn order_count(&self) -> Result<u64>;

    async fn deal_count(&self, owner: Address) -> Result<u64>;
}

/// Establishes a ready [`NodeClient`]. Callers bound the wait themselves.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &str, credentials: &Credentials)
        -> Result<Arc<dyn NodeClient>>;
}

/// Account enumeration and unlocking
#[async_trait]
pub trait Keystore: Send + Sync {
    /// Accounts available under `path`
    async fn accounts(&self, path: &Path) -> Result<Vec<Address>>;

    /// Produce signing credentials for `account`
    async fn unlock(&self, path: &Path, account: Address, passphrase: &str) -> Result<Credentials>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Values
// ─────────────────────────────────────────────────────────────────────────────

/// One worker as reported by the node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerInfo {
    pub address: Address,
    pub confirmed: bool,
}

impl WorkerInfo {
    pub fn new(address: Address, confirmed: bool) -> Self {
        Self { address, confirmed }
    }
}

/// Unlocked signing material. Opaque to the console; only the connector
/// interprets `secret`.
#[derive(Clone)]
pub struct Credentials {
    pub address: Address,
    secret: Arc<[u8]>,
}

impl Credentials {
    pub fn new(address: Address, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            address,
            secret: secret.into().into(),
        }
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("address", &self.address)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// A ready session with the node
#[derive(Clone)]
pub struct Connection {
    pub endpoint: String,
    pub owner: Address,
    pub client: Arc<dyn NodeClient>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("endpoint", &self.endpoint)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

/// The collaborators the terminal front end is started with
#[derive(Clone)]
pub struct Backend {
    pub connector: Arc<dyn Connector>,
    pub keystore: Arc<dyn Keystore>,
}

impl Backend {
    pub fn new(connector: Arc<dyn Connector>, keystore: Arc<dyn Keystore>) -> Self {
        Self {
            connector,
            keystore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_hides_secret() {
        let creds = Credentials::new(Address::from([7u8; 20]), b"top secret".to_vec());
        let shown = format!("{creds:?}");
        assert!(!shown.contains("top secret"));
        assert!(shown.contains("redacted"));
        assert_eq!(creds.secret(), b"top secret");
    }
}
