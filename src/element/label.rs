//! Plain text label

use parking_lot::Mutex;

/// Named style tags; the terminal theme maps them to colours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelStyle {
    #[default]
    Normal,
    Ok,
    Warn,
    Succ,
    Error,
    Bold,
    Highlight,
    Title,
}

#[derive(Debug, Clone)]
struct LabelState {
    text: String,
    style: LabelStyle,
}

/// Text + style tag. Mutated only from router actions or key handlers.
#[derive(Debug)]
pub struct Label {
    state: Mutex<LabelState>,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self::styled(text, LabelStyle::Normal)
    }

    pub fn styled(text: impl Into<String>, style: LabelStyle) -> Self {
        Self {
            state: Mutex::new(LabelState {
                text: text.into(),
                style,
            }),
        }
    }

    pub fn text(&self) -> String {
        self.state.lock().text.clone()
    }

    pub fn style(&self) -> LabelStyle {
        self.state.lock().style
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.state.lock().text = text.into();
    }

    pub fn set_style(&self, style: LabelStyle) {
        self.state.lock().style = style;
    }

    /// Set both at once so a render never sees half an update
    pub fn set(&self, text: impl Into<String>, style: LabelStyle) {
        let mut state = self.state.lock();
        state.text = text.into();
        state.style = style;
    }
}

impl Default for Label {
    fn default() -> Self {
        Self::new("")
    }
}
