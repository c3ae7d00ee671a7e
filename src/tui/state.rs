//! Shell State - which screen is active, plus the status line
//!
//! Cloned into signal subscribers so they can switch screens. Like every
//! other interactive state it is only touched on the router's consumer.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::element::{Label, LabelStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenId {
    Welcome,
    Password,
    Login,
    Main,
}

impl ScreenId {
    pub fn title(&self) -> &'static str {
        match self {
            ScreenId::Welcome => "Accounts",
            ScreenId::Password => "Unlock Account",
            ScreenId::Login => "Open Keystore",
            ScreenId::Main => "Workers",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Shell {
    screen: Arc<Mutex<ScreenId>>,
    status: Arc<Label>,
    cancel: CancellationToken,
}

impl Shell {
    pub fn new(status: Arc<Label>, cancel: CancellationToken) -> Self {
        Self {
            screen: Arc::new(Mutex::new(ScreenId::Welcome)),
            status,
            cancel,
        }
    }

    pub fn current(&self) -> ScreenId {
        *self.screen.lock()
    }

    pub fn switch_to(&self, screen: ScreenId) {
        debug!(?screen, "switching screen");
        *self.screen.lock() = screen;
    }

    pub fn status(&self) -> &Arc<Label> {
        &self.status
    }

    pub fn set_status(&self, text: impl Into<String>, style: LabelStyle) {
        self.status.set(text, style);
    }

    pub fn clear_status(&self) {
        self.status.set("", LabelStyle::Normal);
    }

    /// Stop the console
    pub fn quit(&self) {
        self.cancel.cancel();
    }

    pub fn is_quitting(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_welcome() {
        let shell = Shell::new(Arc::new(Label::default()), CancellationToken::new());
        assert_eq!(shell.current(), ScreenId::Welcome);
        shell.switch_to(ScreenId::Main);
        assert_eq!(shell.clone().current(), ScreenId::Main, "clones share state");
    }

    #[test]
    fn test_quit_cancels() {
        let cancel = CancellationToken::new();
        let shell = Shell::new(Arc::new(Label::default()), cancel.clone());
        shell.quit();
        assert!(cancel.is_cancelled());
        assert!(shell.is_quitting());
    }
}
