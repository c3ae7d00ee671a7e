//! Screens - focus chains, key handling and layout per screen
//!
//! Each screen is a cheap `Clone` bundle of element handles. Key handlers run
//! on the router's consumer; anything slow is spawned and comes back through
//! the router. Screens talk to each other only through their signals.

mod login;
mod main_view;
mod password;
mod welcome;

pub use login::LoginScreen;
pub use main_view::MainScreen;
pub use password::PasswordScreen;
pub use welcome::WelcomeScreen;

use ratatui::{layout::Rect, Frame};
use tracing::warn;

use super::theme::ConsoleTheme;
use crate::element::Key;
use crate::router::{RouterError, Signal};

/// What screens get to draw with
pub struct RenderContext<'a> {
    pub theme: &'a ConsoleTheme,
    /// Animation frame counter, advanced by the terminal loop
    pub frame: usize,
}

pub trait Screen: Send + Sync {
    fn handle_key(&self, key: Key);

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &RenderContext<'_>);

    /// Key help for the status bar
    fn help(&self) -> &'static str;
}

/// Emit from a key handler. A full queue drops the notification with a warning.
pub(crate) fn notify<T>(signal: &Signal<T>, payload: T, what: &str)
where
    T: Clone + Send + 'static,
{
    if let Err(e) = signal.emit(payload) {
        match e {
            RouterError::QueueFull => warn!(signal = what, "action queue full, notification dropped"),
            other => warn!(signal = what, error = %other, "notification dropped"),
        }
    }
}
