//! Selectable list
//!
//! Up/Down wrap around at both ends. Losing focus remembers the selection and
//! clears it; regaining focus restores it (or selects the first row).

use parking_lot::Mutex;

use crate::focus::Focusable;

#[derive(Debug, Default)]
struct ListState {
    items: Vec<String>,
    selected: Option<usize>,
    remembered: Option<usize>,
    focused: bool,
}

#[derive(Debug, Default)]
pub struct List {
    state: Mutex<ListState>,
}

impl List {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = Self::new();
        list.replace_items(items);
        list
    }

    pub fn items(&self) -> Vec<String> {
        self.state.lock().items.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    /// Replace all items. The selection is clamped to the new length.
    pub fn replace_items<I, S>(&self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.state.lock();
        state.items = items.into_iter().map(Into::into).collect();
        let len = state.items.len();
        state.selected = clamp(state.selected, len);
        state.remembered = clamp(state.remembered, len);
    }

    pub fn clear(&self) {
        self.replace_items(Vec::<String>::new());
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.lock().selected
    }

    pub fn selected_item(&self) -> Option<String> {
        let state = self.state.lock();
        state.selected.and_then(|i| state.items.get(i).cloned())
    }

    /// Select a row, clamped into range; ignored on an empty list
    pub fn select(&self, index: usize) {
        let mut state = self.state.lock();
        if !state.items.is_empty() {
            state.selected = Some(index.min(state.items.len() - 1));
        }
    }

    pub fn select_next(&self) {
        let mut state = self.state.lock();
        let len = state.items.len();
        if len == 0 {
            return;
        }
        state.selected = Some(match state.selected {
            Some(i) if i + 1 < len => i + 1,
            Some(_) => 0,
            None => 0,
        });
    }

    pub fn select_prev(&self) {
        let mut state = self.state.lock();
        let len = state.items.len();
        if len == 0 {
            return;
        }
        state.selected = Some(match state.selected {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        });
    }
}

impl Focusable for List {
    fn set_focused(&self, focused: bool) {
        let mut state = self.state.lock();
        if focused {
            if !state.items.is_empty() {
                state.selected = Some(state.remembered.unwrap_or(0).min(state.items.len() - 1));
            }
        } else {
            state.remembered = state.selected;
            state.selected = None;
        }
        state.focused = focused;
    }

    fn is_focused(&self) -> bool {
        self.state.lock().focused
    }
}

fn clamp(index: Option<usize>, len: usize) -> Option<usize> {
    match (index, len) {
        (_, 0) => None,
        (Some(i), len) => Some(i.min(len - 1)),
        (None, _) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_wraps() {
        let list = List::with_items(["a", "b", "c"]);
        list.select(2);
        list.select_next();
        assert_eq!(list.selected(), Some(0));
        list.select_prev();
        assert_eq!(list.selected(), Some(2));
    }

    #[test]
    fn test_focus_remembers_selection() {
        let list = List::with_items(["a", "b", "c"]);
        list.set_focused(true);
        assert_eq!(list.selected(), Some(0));
        list.select_next();
        list.set_focused(false);
        assert_eq!(list.selected(), None);
        list.set_focused(true);
        assert_eq!(list.selected_item().as_deref(), Some("b"));
    }

    #[test]
    fn test_replace_clamps_selection() {
        let list = List::with_items(["a", "b", "c"]);
        list.select(2);
        list.replace_items(["x"]);
        assert_eq!(list.selected(), Some(0));
        list.clear();
        assert_eq!(list.selected(), None);
    }

    #[test]
    fn test_empty_list_ignores_navigation() {
        let list = List::new();
        list.select_next();
        list.select(3);
        list.set_focused(true);
        assert_eq!(list.selected(), None);
        assert!(list.is_focused());
    }
}
