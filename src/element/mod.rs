//! Interactive elements
//!
//! Elements are shared handles (`Arc<...>`) with interior state. Their
//! mutating methods are meant to be called from the router's consumer only:
//! either inside a router action or from a key handler running on the
//! terminal loop. Background tasks reach them exclusively through actions.

mod entry;
mod hint;
mod label;
mod list;
mod progress;

pub use entry::{Button, Entry};
pub use hint::{HintEntry, HintOutcome, HintProvider};
pub use label::{Label, LabelStyle};
pub use list::List;
pub use progress::{AsyncLabel, DEFAULT_FRAMES, DEFAULT_TICK};

/// Decoded key press routed to whichever element holds focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
    Enter,
    Backspace,
    Esc,
    Char(char),
}
