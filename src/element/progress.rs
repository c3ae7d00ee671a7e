//! Async Progress Cell
//!
//! A label that can show a ticking placeholder while some background work is
//! running, then settle on the final text.
//!
//! ```text
//! Settled(text, style) ──run_progress──► Running(tick=0)
//!        ▲                                  │ every tick: text = FRAMES[tick % N]
//!        └────────── stop_progress(text) ◄──┘ style = Ok, timer dropped
//! ```
//!
//! The cell's loop lives on its own task. It only talks to the outside world
//! through its inbound queue and through router actions; it never touches the
//! label directly.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, Interval};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::label::{Label, LabelStyle};
use crate::router::Router;

/// Default animation frames
pub const DEFAULT_FRAMES: &[&str] = &[".", "..", "..."];

/// Default tick interval
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

#[derive(Debug)]
enum ProgressEvent {
    Run,
    Stop(String, LabelStyle),
}

/// Label with a running/settled progress state machine
#[derive(Clone)]
pub struct AsyncLabel {
    label: Arc<Label>,
    events: mpsc::UnboundedSender<ProgressEvent>,
    cancel: CancellationToken,
    /// Token of the latest `set_text_async` work
    work: Arc<Mutex<Option<CancellationToken>>>,
}

impl AsyncLabel {
    /// Create a settled cell showing `text`, with default frames and tick.
    ///
    /// Must be called inside a tokio runtime; the cell's loop is spawned
    /// immediately and lives until `cancel` fires or the cell is dropped.
    pub fn new(text: impl Into<String>, router: Router, cancel: &CancellationToken) -> Self {
        Self::with_timing(text, router, cancel, DEFAULT_TICK, DEFAULT_FRAMES)
    }

    pub fn with_timing(
        text: impl Into<String>,
        router: Router,
        cancel: &CancellationToken,
        tick: Duration,
        frames: &'static [&'static str],
    ) -> Self {
        let label = Arc::new(Label::new(text));
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = cancel.child_token();

        tokio::spawn(run(
            Arc::clone(&label),
            rx,
            router,
            cancel.clone(),
            tick,
            frames,
        ));

        Self {
            label,
            events: tx,
            cancel,
            work: Arc::new(Mutex::new(None)),
        }
    }

    /// The label this cell drives
    pub fn label(&self) -> &Arc<Label> {
        &self.label
    }

    pub fn text(&self) -> String {
        self.label.text()
    }

    pub fn style(&self) -> LabelStyle {
        self.label.style()
    }

    /// Start the placeholder animation. No-op while already running.
    pub fn run_progress(&self) {
        self.send(ProgressEvent::Run);
    }

    /// Stop any animation and settle on `text` with the `Ok` style
    pub fn stop_progress(&self, text: impl Into<String>) {
        self.stop_progress_with(text, LabelStyle::Ok);
    }

    /// Like [`stop_progress`](Self::stop_progress) with an explicit style,
    /// e.g. `Error` when the awaited value turned out to be a failure
    pub fn stop_progress_with(&self, text: impl Into<String>, style: LabelStyle) {
        self.send(ProgressEvent::Stop(text.into(), style));
    }

    /// Enter the running state, compute the final text on a background task,
    /// then settle on it. `work` must not touch interactive state.
    ///
    /// A newer call supersedes an older one still running: the older result
    /// is discarded.
    pub fn set_text_async<F, Fut>(&self, work: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = String> + Send + 'static,
    {
        let cancel = self.cancel.child_token();
        if let Some(previous) = self.work.lock().replace(cancel.clone()) {
            previous.cancel();
        }

        self.run_progress();
        let cell = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                text = work() => cell.stop_progress(text),
            }
        });
    }

    /// Stop the cell's loop. Pending display updates already queued on the
    /// router still run.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    fn send(&self, event: ProgressEvent) {
        if self.events.send(event).is_err() {
            debug!("progress cell loop already stopped");
        }
    }
}

impl std::fmt::Debug for AsyncLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncLabel")
            .field("text", &self.label.text())
            .finish()
    }
}

async fn run(
    label: Arc<Label>,
    mut events: mpsc::UnboundedReceiver<ProgressEvent>,
    router: Router,
    cancel: CancellationToken,
    tick: Duration,
    frames: &'static [&'static str],
) {
    let mut ticker: Option<Interval> = None;
    let mut counter: usize = 0;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            event = events.recv() => match event {
                None => return,
                Some(ProgressEvent::Run) => {
                    if ticker.is_none() {
                        ticker = Some(time::interval_at(Instant::now() + tick, tick));
                        counter = 0;
                    }
                }
                Some(ProgressEvent::Stop(text, style)) => {
                    ticker = None;
                    let label = Arc::clone(&label);
                    if router.execute(move || label.set(text, style)).await.is_err() {
                        return;
                    }
                }
            },
            _ = next_tick(&mut ticker) => {
                counter += 1;
                let frame = frames[counter % frames.len()];
                let label = Arc::clone(&label);
                if router.execute(move || label.set(frame, LabelStyle::Normal)).await.is_err() {
                    return;
                }
            }
        }
    }
}

/// Resolves on the next tick, or never when the cell is settled
async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Router, crate::router::ActionReceiver, CancellationToken) {
        let router = Router::new();
        let rx = router.rx();
        (router, rx, CancellationToken::new())
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_go_through_router() {
        let (router, mut rx, cancel) = setup();
        let cell = AsyncLabel::new("-", router, &cancel);

        cell.run_progress();
        time::sleep(Duration::from_millis(250)).await;

        assert_eq!(cell.text(), "-", "no direct mutation from the cell task");
        assert_eq!(rx.run_pending(), 2);
        assert_eq!(cell.text(), DEFAULT_FRAMES[2]);
        assert_eq!(cell.style(), LabelStyle::Normal);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_progress_is_idempotent() {
        let (router, mut rx, cancel) = setup();
        let cell = AsyncLabel::new("-", router, &cancel);

        cell.run_progress();
        cell.run_progress();
        time::sleep(Duration::from_millis(350)).await;

        assert_eq!(rx.run_pending(), 3, "one timer, three ticks");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_settles_and_cancels_timer() {
        let (router, mut rx, cancel) = setup();
        let cell = AsyncLabel::new("-", router, &cancel);

        cell.run_progress();
        time::sleep(Duration::from_millis(150)).await;
        cell.stop_progress("42 SNM");
        time::sleep(Duration::from_millis(10)).await;
        rx.run_pending();

        assert_eq!(cell.text(), "42 SNM");
        assert_eq!(cell.style(), LabelStyle::Ok);

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(rx.run_pending(), 0, "no ticks after settling");
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_text_async_settles_on_result() {
        let (router, mut rx, cancel) = setup();
        let cell = AsyncLabel::new("-", router, &cancel);

        cell.set_text_async(|| async {
            time::sleep(Duration::from_millis(220)).await;
            "7".to_string()
        });
        time::sleep(Duration::from_millis(500)).await;
        rx.run_pending();

        assert_eq!(cell.text(), "7");
        assert_eq!(cell.style(), LabelStyle::Ok);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_set_text_async_wins() {
        let (router, mut rx, cancel) = setup();
        let cell = AsyncLabel::new("-", router, &cancel);

        cell.set_text_async(|| async {
            time::sleep(Duration::from_secs(1)).await;
            "old".to_string()
        });
        cell.set_text_async(|| async {
            time::sleep(Duration::from_millis(100)).await;
            "new".to_string()
        });

        time::sleep(Duration::from_secs(2)).await;
        rx.run_pending();

        assert_eq!(cell.text(), "new");
        assert_eq!(cell.style(), LabelStyle::Ok);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_the_loop() {
        let (router, mut rx, cancel) = setup();
        let cell = AsyncLabel::new("-", router, &cancel);

        cell.run_progress();
        time::sleep(Duration::from_millis(120)).await;
        cancel.cancel();
        time::sleep(Duration::from_millis(10)).await;
        rx.run_pending();

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(rx.run_pending(), 0);
    }
}
