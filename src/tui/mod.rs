//! TUI Module - the interactive console
//!
//! Architecture:
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                  SCREENS (screens/) + widgets/                      │
//! │  Focus chains, key handling, layout. Talk through signals only.     │
//! └─────────────────────────────────────────────────────────────────────┘
//!                               ▲
//!                               │ Actions (single consumer)
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     ROUTER + ELEMENTS (crate)                       │
//! │  Every element mutation runs on the terminal loop's consumer.       │
//! └─────────────────────────────────────────────────────────────────────┘
//!                               ▲
//!                               │ NodeEvents / spawned tasks
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                   NODE CONTROLLER (crate::node)                     │
//! │  Connector / NodeClient / Keystore capabilities.                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

mod app;
mod events;
mod screens;
mod state;
mod theme;

pub mod widgets;

pub use app::ConsoleApp;
pub use state::{ScreenId, Shell};
pub use theme::ConsoleTheme;

use crate::config::Config;
use crate::node::Backend;

/// Run the console until the user quits
pub async fn run(config: Config, backend: Backend) -> anyhow::Result<()> {
    let app = ConsoleApp::new(config, backend);
    app.run().await
}
