//! Worker Console - terminal console for a worker-management node
//!
//! Everything that touches interactive elements runs as an action on one
//! consumer ([`router::Router`]); background work reports back through it.

pub mod address;
pub mod config;
pub mod element;
pub mod error;
pub mod focus;
pub mod node;
pub mod router;
pub mod tui;

pub use address::Address;
pub use config::Config;
pub use error::{ConsoleError, FixSuggestion, Result};
pub use focus::{FocusChain, FocusController, FocusHandle, Focusable};
pub use router::{Router, RouterError, Signal};
