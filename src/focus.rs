//! Focus Chain and Focus Controller
//!
//! A [`FocusChain`] is a circular, ordered list of focusable elements. A
//! [`FocusController`] wraps one chain and owns the "currently focused"
//! reference, toggling focus flags as it moves.
//!
//! Screens never edit a chain that is in use: whenever the set of reachable
//! elements changes, they build a fresh chain and a fresh controller.

use std::sync::Arc;

/// Anything that can hold input focus
pub trait Focusable: Send + Sync {
    /// Set or clear the focus flag
    fn set_focused(&self, focused: bool);

    /// Current focus flag
    fn is_focused(&self) -> bool;
}

/// Shared handle to a focusable element
pub type FocusHandle = Arc<dyn Focusable>;

/// Identity comparison for focus handles (data pointer only, vtables ignored)
pub fn same_element(a: &FocusHandle, b: &FocusHandle) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Type-erased handle sharing `element`'s identity
pub fn handle<T: Focusable + 'static>(element: &Arc<T>) -> FocusHandle {
    Arc::clone(element) as FocusHandle
}

// ─────────────────────────────────────────────────────────────────────────────
// Focus Chain
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered ring of focusable elements
#[derive(Clone, Default)]
pub struct FocusChain {
    elements: Vec<FocusHandle>,
}

impl FocusChain {
    /// Build a chain from elements in traversal order
    pub fn new(elements: Vec<FocusHandle>) -> Self {
        Self { elements }
    }

    /// Append an element at the end of the ring
    pub fn push(&mut self, element: FocusHandle) {
        self.elements.push(element);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn position(&self, current: &FocusHandle) -> Option<usize> {
        self.elements.iter().position(|e| same_element(e, current))
    }

    /// Element after `current`, wrapping to the first.
    /// `None` when `current` is not part of the chain.
    pub fn next(&self, current: &FocusHandle) -> Option<FocusHandle> {
        let idx = self.position(current)?;
        let next = if idx + 1 < self.elements.len() { idx + 1 } else { 0 };
        Some(self.elements[next].clone())
    }

    /// Element before `current`, wrapping to the last.
    /// `None` when `current` is not part of the chain.
    pub fn prev(&self, current: &FocusHandle) -> Option<FocusHandle> {
        let idx = self.position(current)?;
        let prev = if idx == 0 { self.elements.len() - 1 } else { idx - 1 };
        Some(self.elements[prev].clone())
    }

    pub fn contains(&self, element: &FocusHandle) -> bool {
        self.position(element).is_some()
    }

    /// First element, if any
    pub fn default_element(&self) -> Option<FocusHandle> {
        self.elements.first().cloned()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Focus Controller
// ─────────────────────────────────────────────────────────────────────────────

/// Tracks which element of a chain currently holds focus
#[derive(Clone, Default)]
pub struct FocusController {
    chain: FocusChain,
    focused: Option<FocusHandle>,
}

impl FocusController {
    /// Wrap a chain. The default element becomes current but its flag is not
    /// touched until one of the `focus_*_widget` calls.
    pub fn new(chain: FocusChain) -> Self {
        let focused = chain.default_element();
        Self { chain, focused }
    }

    /// Currently focused element
    pub fn focused(&self) -> Option<&FocusHandle> {
        self.focused.as_ref()
    }

    /// True if `element` is the current one
    pub fn is_current(&self, element: &FocusHandle) -> bool {
        self.focused
            .as_ref()
            .is_some_and(|current| same_element(current, element))
    }

    pub fn chain(&self) -> &FocusChain {
        &self.chain
    }

    /// Focus the first element of the chain
    pub fn focus_default_widget(&mut self) {
        let target = self.chain.default_element();
        self.move_to(target);
    }

    /// Focus the element after the current one
    pub fn focus_next_widget(&mut self) {
        let target = self.focused.as_ref().and_then(|c| self.chain.next(c));
        self.move_to(target);
    }

    /// Focus the element before the current one
    pub fn focus_prev_widget(&mut self) {
        let target = self.focused.as_ref().and_then(|c| self.chain.prev(c));
        self.move_to(target);
    }

    /// Focus `element` if it belongs to the chain; returns whether it did
    pub fn focus_widget(&mut self, element: &FocusHandle) -> bool {
        if !self.chain.contains(element) {
            return false;
        }
        self.move_to(Some(element.clone()));
        true
    }

    /// Drop focus entirely (e.g. when a screen is hidden)
    pub fn blur(&mut self) {
        if let Some(current) = self.focused.take() {
            current.set_focused(false);
        }
    }

    fn move_to(&mut self, target: Option<FocusHandle>) {
        if let Some(current) = self.focused.take() {
            current.set_focused(false);
        }
        if let Some(next) = &target {
            next.set_focused(true);
        }
        self.focused = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct Stub(AtomicBool);

    impl Focusable for Stub {
        fn set_focused(&self, focused: bool) {
            self.0.store(focused, Ordering::SeqCst);
        }
        fn is_focused(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn stubs(n: usize) -> Vec<FocusHandle> {
        (0..n)
            .map(|_| Arc::new(Stub::default()) as FocusHandle)
            .collect()
    }

    #[test]
    fn test_next_cycles_with_wraparound() {
        let p = stubs(3);
        let chain = FocusChain::new(p.clone());
        let mut current = p[0].clone();
        for expected in [1, 2, 0, 1, 2, 0] {
            current = chain.next(&current).unwrap();
            assert!(same_element(&current, &p[expected]));
        }
    }

    #[test]
    fn test_prev_mirrors_next() {
        let p = stubs(3);
        let chain = FocusChain::new(p.clone());
        let mut current = p[0].clone();
        for expected in [2, 1, 0, 2] {
            current = chain.prev(&current).unwrap();
            assert!(same_element(&current, &p[expected]));
        }
    }

    #[test]
    fn test_unknown_element_has_no_neighbour() {
        let p = stubs(2);
        let stranger = stubs(1).remove(0);
        let chain = FocusChain::new(p);
        assert!(chain.next(&stranger).is_none());
        assert!(chain.prev(&stranger).is_none());
    }

    #[test]
    fn test_default_of_empty_chain_is_none() {
        assert!(FocusChain::default().default_element().is_none());
    }

    #[test]
    fn test_controller_toggles_flags() {
        let p = stubs(3);
        let mut ctl = FocusController::new(FocusChain::new(p.clone()));
        ctl.focus_default_widget();
        assert!(p[0].is_focused());

        ctl.focus_next_widget();
        assert!(!p[0].is_focused());
        assert!(p[1].is_focused());

        ctl.focus_prev_widget();
        ctl.focus_prev_widget();
        assert!(p[2].is_focused());
        assert_eq!(p.iter().filter(|e| e.is_focused()).count(), 1);
    }

    #[test]
    fn test_controller_on_empty_chain_does_not_panic() {
        let mut ctl = FocusController::new(FocusChain::default());
        ctl.focus_default_widget();
        ctl.focus_next_widget();
        ctl.focus_prev_widget();
        assert!(ctl.focused().is_none());
    }

    #[test]
    fn test_focus_widget_jumps_within_chain() {
        let p = stubs(3);
        let stranger = stubs(1).remove(0);
        let mut ctl = FocusController::new(FocusChain::new(p.clone()));
        ctl.focus_default_widget();

        assert!(ctl.focus_widget(&p[2]));
        assert!(p[2].is_focused());
        assert!(!p[0].is_focused());

        assert!(!ctl.focus_widget(&stranger));
        assert!(ctl.is_current(&p[2]));
    }

    #[test]
    fn test_blur_clears_current() {
        let p = stubs(2);
        let mut ctl = FocusController::new(FocusChain::new(p.clone()));
        ctl.focus_default_widget();
        ctl.blur();
        assert!(!p[0].is_focused());
        assert!(ctl.focused().is_none());
    }
}
