//! Action Router - the single serialization point
//!
//! Any task may hand the router a deferred [`Action`]; exactly one consumer
//! drains the queue and runs the actions in enqueue order. That consumer is the
//! terminal loop, and it is the only place allowed to mutate anything the user
//! can see.
//!
//! ```text
//!  background task ──┐
//!  progress cell ────┼──► Router (bounded FIFO) ──► ActionReceiver ──► action()
//!  Signal::emit ─────┘                                 (one consumer)
//! ```

pub mod signal;

pub use signal::{Signal, Slot};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;

/// Reference queue capacity
pub const DEFAULT_CAPACITY: usize = 128;

/// A deferred unit of work executed on the router's consumer
pub type Action = Box<dyn FnOnce() + Send + 'static>;

/// Router failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterError {
    /// The consumer end was already handed out
    #[error("action consumer already taken: only one consumer may drain the router")]
    ConsumerTaken,

    /// Non-blocking enqueue hit the capacity limit
    #[error("action queue is full")]
    QueueFull,

    /// The consumer was dropped
    #[error("action consumer is gone")]
    Closed,
}

struct Inner {
    tx: mpsc::Sender<Action>,
    rx: Mutex<Option<mpsc::Receiver<Action>>>,
    consumer_taken: AtomicBool,
}

/// Cloneable producer handle to the action queue
#[derive(Clone)]
pub struct Router {
    inner: Arc<Inner>,
}

impl Router {
    /// Create a router with the reference capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a router whose queue holds at most `capacity` pending actions
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                tx,
                rx: Mutex::new(Some(rx)),
                consumer_taken: AtomicBool::new(false),
            }),
        }
    }

    /// Enqueue an action, waiting for a free slot when the queue is full.
    ///
    /// This is the backpressure point for background tasks: a slow consumer
    /// eventually parks its producers here. The action never runs inline.
    pub async fn execute<F>(&self, action: F) -> Result<(), RouterError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner
            .tx
            .send(Box::new(action))
            .await
            .map_err(|_| RouterError::Closed)
    }

    /// Enqueue an action without waiting.
    ///
    /// Used by code already running on the consumer (key handlers, signal
    /// emission from inside an action), where waiting on our own queue would
    /// deadlock.
    pub fn try_execute<F>(&self, action: F) -> Result<(), RouterError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner
            .tx
            .try_send(Box::new(action))
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => RouterError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => RouterError::Closed,
            })
    }

    /// Take the consumer end of the queue.
    ///
    /// Succeeds exactly once per router; every later call returns
    /// [`RouterError::ConsumerTaken`].
    pub fn try_rx(&self) -> Result<ActionReceiver, RouterError> {
        if self.inner.consumer_taken.swap(true, Ordering::AcqRel) {
            return Err(RouterError::ConsumerTaken);
        }
        self.inner
            .rx
            .lock()
            .take()
            .map(|rx| ActionReceiver { rx })
            .ok_or(RouterError::ConsumerTaken)
    }

    /// Take the consumer end of the queue.
    ///
    /// # Panics
    ///
    /// Panics on the second call. Two consumers would break the single
    /// serialization invariant, so this is a programmer error.
    pub fn rx(&self) -> ActionReceiver {
        match self.try_rx() {
            Ok(rx) => rx,
            Err(err) => panic!("Router::rx called twice: {err}"),
        }
    }

    /// Create a signal bound to this router
    pub fn new_signal<T>(&self) -> Signal<T>
    where
        T: Clone + Send + 'static,
    {
        Signal::new(self.clone())
    }

    /// Number of actions waiting for the consumer
    pub fn pending(&self) -> usize {
        self.inner.tx.max_capacity() - self.inner.tx.capacity()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("pending", &self.pending())
            .field(
                "consumer_taken",
                &self.inner.consumer_taken.load(Ordering::Acquire),
            )
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Consumer
// ─────────────────────────────────────────────────────────────────────────────

/// The single consumer end of a [`Router`]
pub struct ActionReceiver {
    rx: mpsc::Receiver<Action>,
}

impl ActionReceiver {
    /// Wait for the next action. `None` once every producer is gone.
    pub async fn recv(&mut self) -> Option<Action> {
        self.rx.recv().await
    }

    /// Pop the next action if one is already queued
    pub fn try_recv(&mut self) -> Option<Action> {
        self.rx.try_recv().ok()
    }

    /// Run every action that is already queued, returning how many ran
    pub fn run_pending(&mut self) -> usize {
        let mut count = 0;
        while let Some(action) = self.try_recv() {
            action();
            count += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_rx_is_rejected() {
        let router = Router::new();
        assert!(router.try_rx().is_ok());
        assert_eq!(router.try_rx().err(), Some(RouterError::ConsumerTaken));
    }

    #[test]
    #[should_panic(expected = "called twice")]
    fn test_second_rx_panics() {
        let router = Router::new();
        let _first = router.rx();
        let _second = router.rx();
    }

    #[test]
    fn test_clones_share_the_consumer_guard() {
        let router = Router::new();
        let clone = router.clone();
        let _rx = router.rx();
        assert_eq!(clone.try_rx().err(), Some(RouterError::ConsumerTaken));
    }

    #[test]
    fn test_actions_run_in_enqueue_order() {
        let router = Router::new();
        let mut rx = router.rx();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..10 {
            let seen = seen.clone();
            router.try_execute(move || seen.lock().push(i)).unwrap();
        }

        assert!(seen.lock().is_empty());
        assert_eq!(rx.run_pending(), 10);
        assert_eq!(*seen.lock(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_try_execute_reports_full_queue() {
        let router = Router::with_capacity(2);
        let _rx = router.rx();
        router.try_execute(|| {}).unwrap();
        router.try_execute(|| {}).unwrap();
        assert_eq!(router.try_execute(|| {}), Err(RouterError::QueueFull));
        assert_eq!(router.pending(), 2);
    }

    #[test]
    fn test_try_execute_reports_closed_consumer() {
        let router = Router::new();
        drop(router.rx());
        assert_eq!(router.try_execute(|| {}), Err(RouterError::Closed));
    }

    #[tokio::test]
    async fn test_execute_waits_for_capacity() {
        let router = Router::with_capacity(1);
        let mut rx = router.rx();
        router.execute(|| {}).await.unwrap();

        let producer = {
            let router = router.clone();
            tokio::spawn(async move { router.execute(|| {}).await })
        };

        tokio::task::yield_now().await;
        assert!(!producer.is_finished());

        rx.try_recv().expect("first action queued")();
        producer.await.unwrap().unwrap();
        assert_eq!(rx.run_pending(), 1);
    }
}
