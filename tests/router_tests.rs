//! Router and signal behaviour through the public API

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use worker_console::{Router, RouterError};

#[test]
fn test_actions_run_in_submission_order() {
    let router = Router::new();
    let mut rx = router.rx();
    let log = Arc::new(Mutex::new(Vec::new()));

    for i in 0..10 {
        let log = log.clone();
        router.try_execute(move || log.lock().push(i)).unwrap();
    }
    assert!(log.lock().is_empty(), "nothing runs before the consumer drains");

    assert_eq!(rx.run_pending(), 10);
    assert_eq!(*log.lock(), (0..10).collect::<Vec<_>>());
}

#[test]
fn test_only_one_consumer() {
    let router = Router::new();
    let _rx = router.rx();
    assert_eq!(router.try_rx().err(), Some(RouterError::ConsumerTaken));
}

#[test]
fn test_full_queue_rejects_without_blocking() {
    let router = Router::with_capacity(2);
    let _rx = router.rx();
    router.try_execute(|| {}).unwrap();
    router.try_execute(|| {}).unwrap();
    assert_eq!(router.try_execute(|| {}), Err(RouterError::QueueFull));
    assert_eq!(router.pending(), 2);
}

#[tokio::test]
async fn test_execute_waits_for_space() {
    let router = Router::with_capacity(1);
    let mut rx = router.rx();
    router.try_execute(|| {}).unwrap();

    let producer = {
        let router = router.clone();
        tokio::spawn(async move { router.execute(|| {}).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!producer.is_finished(), "blocked on a full queue");

    assert_eq!(rx.run_pending(), 1);
    producer.await.unwrap().unwrap();
    assert_eq!(rx.run_pending(), 1);
}

#[tokio::test]
async fn test_execute_after_consumer_dropped_fails() {
    let router = Router::new();
    drop(router.rx());
    assert_eq!(router.execute(|| {}).await, Err(RouterError::Closed));
}

#[test]
fn test_signal_fans_out_in_subscription_order() {
    let router = Router::new();
    let mut rx = router.rx();
    let signal = router.new_signal::<u32>();
    let log = Arc::new(Mutex::new(Vec::new()));

    for tag in ["a", "b", "c"] {
        let log = log.clone();
        signal.connect(move |n| log.lock().push(format!("{tag}{n}")));
    }

    signal.emit(1).unwrap();
    signal.emit(2).unwrap();
    assert_eq!(router.pending(), 6);

    rx.run_pending();
    assert_eq!(*log.lock(), ["a1", "b1", "c1", "a2", "b2", "c2"]);
}

#[tokio::test]
async fn test_signal_emit_async_from_background() {
    let router = Router::new();
    let mut rx = router.rx();
    let signal = Arc::new(router.new_signal::<String>());
    let got = Arc::new(Mutex::new(None));
    {
        let got = got.clone();
        signal.connect(move |s| *got.lock() = Some(s));
    }

    let emitter = signal.clone();
    tokio::spawn(async move { emitter.emit_async("done".to_string()).await })
        .await
        .unwrap()
        .unwrap();

    let action = rx.recv().await.unwrap();
    action();
    assert_eq!(got.lock().as_deref(), Some("done"));
}
