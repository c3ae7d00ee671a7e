//! Single-line text entry and push button

use parking_lot::Mutex;

use crate::focus::Focusable;

#[derive(Debug, Default)]
struct EntryState {
    text: String,
    focused: bool,
}

/// Editable one-line text field. Masked entries render as `*`.
#[derive(Debug, Default)]
pub struct Entry {
    state: Mutex<EntryState>,
    masked: bool,
}

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry whose contents are never shown
    pub fn password() -> Self {
        Self {
            masked: true,
            ..Self::default()
        }
    }

    pub fn is_masked(&self) -> bool {
        self.masked
    }

    pub fn text(&self) -> String {
        self.state.lock().text.clone()
    }

    /// What the terminal may show for this entry
    pub fn display_text(&self) -> String {
        let state = self.state.lock();
        if self.masked {
            "*".repeat(state.text.chars().count())
        } else {
            state.text.clone()
        }
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.state.lock().text = text.into();
    }

    pub fn insert(&self, ch: char) {
        self.state.lock().text.push(ch);
    }

    pub fn backspace(&self) {
        self.state.lock().text.pop();
    }
}

impl Focusable for Entry {
    fn set_focused(&self, focused: bool) {
        self.state.lock().focused = focused;
    }

    fn is_focused(&self) -> bool {
        self.state.lock().focused
    }
}

/// Activatable caption such as `[Unlock]`
#[derive(Debug)]
pub struct Button {
    caption: String,
    focused: Mutex<bool>,
}

impl Button {
    pub fn new(caption: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            focused: Mutex::new(false),
        }
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }
}

impl Focusable for Button {
    fn set_focused(&self, focused: bool) {
        *self.focused.lock() = focused;
    }

    fn is_focused(&self) -> bool {
        *self.focused.lock()
    }
}
