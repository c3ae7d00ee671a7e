//! Signal Bus - typed one-to-many notifications
//!
//! Emission never calls a subscriber inline: every subscriber gets its own
//! [`Action`](super::Action) on the owning router, so subscriber bodies always
//! run on the router's consumer and may touch interactive state freely.

use std::sync::Arc;

use parking_lot::RwLock;

use super::{Router, RouterError};

/// A subscriber callback
pub type Slot<T> = Arc<dyn Fn(T) + Send + Sync + 'static>;

/// Broadcast point bound to exactly one [`Router`]
pub struct Signal<T> {
    router: Router,
    slots: RwLock<Vec<Slot<T>>>,
}

impl<T> Signal<T>
where
    T: Clone + Send + 'static,
{
    /// Create a signal delivering through `router`
    pub fn new(router: Router) -> Self {
        Self {
            router,
            slots: RwLock::new(Vec::new()),
        }
    }

    /// Append a subscriber. Subscribers are notified in connection order.
    pub fn connect<F>(&self, slot: F)
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.slots.write().push(Arc::new(slot));
    }

    /// Number of connected subscribers
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    /// True when nobody is listening
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    /// Schedule one action per subscriber without waiting for queue space.
    ///
    /// Stops at the first subscriber that cannot be scheduled and reports why;
    /// the ones before it stay queued.
    pub fn emit(&self, payload: T) -> Result<(), RouterError> {
        let slots = self.slots.read();
        for slot in slots.iter() {
            let slot = Arc::clone(slot);
            let payload = payload.clone();
            self.router.try_execute(move || slot(payload))?;
        }
        Ok(())
    }

    /// Schedule one action per subscriber, waiting for queue space.
    ///
    /// The subscriber list is snapshotted first so no lock is held across an
    /// await point.
    pub async fn emit_async(&self, payload: T) -> Result<(), RouterError> {
        let slots: Vec<Slot<T>> = self.slots.read().clone();
        for slot in slots {
            let payload = payload.clone();
            self.router.execute(move || slot(payload)).await?;
        }
        Ok(())
    }
}

impl<T> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("slots", &self.slots.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_emit_is_deferred_and_ordered() {
        let router = Router::new();
        let mut rx = router.rx();
        let signal: Signal<u32> = router.new_signal();
        let calls = Arc::new(Mutex::new(Vec::new()));

        for name in ["s1", "s2", "s3"] {
            let calls = calls.clone();
            signal.connect(move |v| calls.lock().push((name, v)));
        }

        signal.emit(7).unwrap();
        assert!(calls.lock().is_empty(), "subscribers must not run inside emit");

        assert_eq!(rx.run_pending(), 3);
        assert_eq!(*calls.lock(), vec![("s1", 7), ("s2", 7), ("s3", 7)]);
    }

    #[test]
    fn test_emit_without_subscribers_is_noop() {
        let router = Router::new();
        let mut rx = router.rx();
        let signal: Signal<()> = router.new_signal();
        assert!(signal.is_empty());
        signal.emit(()).unwrap();
        assert_eq!(rx.run_pending(), 0);
    }

    #[test]
    fn test_emit_reports_full_queue() {
        let router = Router::with_capacity(1);
        let _rx = router.rx();
        let signal: Signal<u8> = router.new_signal();
        signal.connect(|_| {});
        signal.connect(|_| {});
        assert_eq!(signal.emit(1), Err(RouterError::QueueFull));
    }

    #[tokio::test]
    async fn test_emit_async_from_background_task() {
        let router = Router::new();
        let mut rx = router.rx();
        let signal = Arc::new(router.new_signal::<String>());
        let seen = Arc::new(Mutex::new(Vec::new()));
        {
            let seen = seen.clone();
            signal.connect(move |s| seen.lock().push(s));
        }

        let emitter = signal.clone();
        tokio::spawn(async move { emitter.emit_async("hello".to_string()).await })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(rx.run_pending(), 1);
        assert_eq!(*seen.lock(), vec!["hello".to_string()]);
    }
}
