//! Entry with Tab completion
//!
//! First Tab with several candidates only shows them; a second Tab moves into
//! the candidate list, where typing filters, Up/Down move and Enter accepts.
//! A single candidate is completed immediately.

use std::sync::Arc;

use parking_lot::Mutex;

use super::Key;
use crate::focus::Focusable;

/// Produces completion candidates for the current text
pub type HintProvider = Arc<dyn Fn(&str) -> Vec<String> + Send + Sync>;

/// What a key press did to the field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HintOutcome {
    /// Key handled, nothing for the screen to do
    Consumed,
    /// Enter in editing mode
    Submitted(String),
    /// Not ours; the screen may use it
    Ignored,
}

#[derive(Debug, Default)]
struct HintState {
    text: String,
    focused: bool,
    suggestions: Vec<String>,
    shown: bool,
    choosing: bool,
    filter: String,
    filtered: Vec<String>,
    selected: usize,
}

#[derive(Default)]
pub struct HintEntry {
    state: Mutex<HintState>,
    provider: Mutex<Option<HintProvider>>,
}

impl HintEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(provider: HintProvider) -> Self {
        let entry = Self::new();
        entry.set_provider(Some(provider));
        entry
    }

    /// Swap the candidate source (e.g. once a keystore has been opened)
    pub fn set_provider(&self, provider: Option<HintProvider>) {
        *self.provider.lock() = provider;
    }

    pub fn text(&self) -> String {
        self.state.lock().text.clone()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        let mut state = self.state.lock();
        state.text = text.into();
        reset_suggestions(&mut state);
    }

    /// Candidates currently on screen (filtered while choosing)
    pub fn visible_suggestions(&self) -> Vec<String> {
        let state = self.state.lock();
        if state.choosing {
            state.filtered.clone()
        } else if state.shown {
            state.suggestions.clone()
        } else {
            Vec::new()
        }
    }

    /// Highlighted candidate index while choosing
    pub fn chosen(&self) -> Option<usize> {
        let state = self.state.lock();
        (state.choosing && !state.filtered.is_empty()).then_some(state.selected)
    }

    pub fn is_choosing(&self) -> bool {
        self.state.lock().choosing
    }

    pub fn filter(&self) -> String {
        self.state.lock().filter.clone()
    }

    /// Apply a Tab press against `candidates`. For sources too slow to run
    /// inside a key handler: the screen computes them elsewhere and calls this.
    pub fn complete_with(&self, candidates: Vec<String>) {
        let mut state = self.state.lock();
        match candidates.len() {
            0 => {}
            1 => {
                state.text = candidates[0].clone();
                reset_suggestions(&mut state);
            }
            _ if state.shown && state.suggestions == candidates => {
                state.choosing = true;
                state.filter.clear();
                state.filtered = candidates;
                state.selected = 0;
            }
            _ => {
                state.suggestions = candidates;
                state.shown = true;
            }
        }
    }

    pub fn handle_key(&self, key: &Key) -> HintOutcome {
        let choosing = self.state.lock().choosing;
        if choosing {
            self.handle_choosing(key)
        } else {
            self.handle_editing(key)
        }
    }

    fn handle_editing(&self, key: &Key) -> HintOutcome {
        match key {
            Key::Char(ch) => {
                let mut state = self.state.lock();
                state.text.push(*ch);
                reset_suggestions(&mut state);
                HintOutcome::Consumed
            }
            Key::Backspace => {
                let mut state = self.state.lock();
                state.text.pop();
                reset_suggestions(&mut state);
                HintOutcome::Consumed
            }
            Key::Tab => {
                let text = self.text();
                let provider = self.provider.lock().clone();
                if let Some(provider) = provider {
                    self.complete_with(provider(&text));
                }
                HintOutcome::Consumed
            }
            Key::Enter => {
                let mut state = self.state.lock();
                reset_suggestions(&mut state);
                HintOutcome::Submitted(state.text.clone())
            }
            _ => HintOutcome::Ignored,
        }
    }

    fn handle_choosing(&self, key: &Key) -> HintOutcome {
        let mut state = self.state.lock();
        match key {
            Key::Char(ch) => {
                state.filter.push(*ch);
                refilter(&mut state);
            }
            Key::Backspace => {
                if state.filter.is_empty() {
                    reset_suggestions(&mut state);
                } else {
                    state.filter.pop();
                    refilter(&mut state);
                }
            }
            Key::Down | Key::Tab => {
                let len = state.filtered.len();
                if len > 0 {
                    state.selected = (state.selected + 1) % len;
                }
            }
            Key::Up | Key::BackTab => {
                let len = state.filtered.len();
                if len > 0 {
                    state.selected = (state.selected + len - 1) % len;
                }
            }
            Key::Enter => {
                if let Some(choice) = state.filtered.get(state.selected).cloned() {
                    state.text = choice;
                    reset_suggestions(&mut state);
                }
            }
            Key::Esc => reset_suggestions(&mut state),
            _ => return HintOutcome::Ignored,
        }
        HintOutcome::Consumed
    }
}

fn reset_suggestions(state: &mut HintState) {
    state.suggestions.clear();
    state.filtered.clear();
    state.filter.clear();
    state.shown = false;
    state.choosing = false;
    state.selected = 0;
}

fn refilter(state: &mut HintState) {
    state.filtered = state
        .suggestions
        .iter()
        .filter(|s| s.contains(state.filter.as_str()))
        .cloned()
        .collect();
    state.selected = 0;
}

impl Focusable for HintEntry {
    fn set_focused(&self, focused: bool) {
        let mut state = self.state.lock();
        state.focused = focused;
        if !focused {
            reset_suggestions(&mut state);
        }
    }

    fn is_focused(&self) -> bool {
        self.state.lock().focused
    }
}

impl std::fmt::Debug for HintEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HintEntry")
            .field("text", &self.text())
            .field("choosing", &self.is_choosing())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(candidates: &'static [&'static str]) -> HintProvider {
        Arc::new(move |_| candidates.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_single_candidate_completes() {
        let entry = HintEntry::with_provider(fixed(&["/home/op/keys/"]));
        assert_eq!(entry.handle_key(&Key::Tab), HintOutcome::Consumed);
        assert_eq!(entry.text(), "/home/op/keys/");
        assert!(entry.visible_suggestions().is_empty());
    }

    #[test]
    fn test_second_tab_enters_choosing() {
        let entry = HintEntry::with_provider(fixed(&["/a/one/", "/a/two/"]));
        entry.handle_key(&Key::Tab);
        assert!(!entry.is_choosing());
        assert_eq!(entry.visible_suggestions().len(), 2);

        entry.handle_key(&Key::Tab);
        assert!(entry.is_choosing());
        assert_eq!(entry.chosen(), Some(0));

        entry.handle_key(&Key::Char('t'));
        entry.handle_key(&Key::Char('w'));
        assert_eq!(entry.visible_suggestions(), vec!["/a/two/".to_string()]);

        entry.handle_key(&Key::Enter);
        assert_eq!(entry.text(), "/a/two/");
        assert!(!entry.is_choosing());
    }

    #[test]
    fn test_backspace_on_empty_filter_leaves_choosing() {
        let entry = HintEntry::with_provider(fixed(&["x", "y"]));
        entry.handle_key(&Key::Tab);
        entry.handle_key(&Key::Tab);
        entry.handle_key(&Key::Backspace);
        assert!(!entry.is_choosing());
        assert!(entry.visible_suggestions().is_empty());
    }

    #[test]
    fn test_enter_submits_text() {
        let entry = HintEntry::new();
        entry.handle_key(&Key::Char('~'));
        assert_eq!(
            entry.handle_key(&Key::Enter),
            HintOutcome::Submitted("~".to_string())
        );
    }

    #[test]
    fn test_complete_with_precomputed_candidates() {
        let entry = HintEntry::new();
        entry.set_text("/srv/k");

        entry.complete_with(vec!["/srv/keys/".into(), "/srv/kube/".into()]);
        assert_eq!(entry.visible_suggestions().len(), 2);
        assert!(!entry.is_choosing());

        entry.complete_with(vec!["/srv/keys/".into(), "/srv/kube/".into()]);
        assert!(entry.is_choosing());

        entry.handle_key(&Key::Esc);
        entry.complete_with(vec!["/srv/keys/".into()]);
        assert_eq!(entry.text(), "/srv/keys/");
    }

    #[test]
    fn test_without_provider_tab_does_nothing() {
        let entry = HintEntry::new();
        entry.set_text("abc");
        entry.handle_key(&Key::Tab);
        assert_eq!(entry.text(), "abc");
        assert_eq!(entry.handle_key(&Key::Left), HintOutcome::Ignored);
    }
}
