//! Tests for the shutdown trigger and termination forwarding

use super::handle::{ServerHandle, ServerStatus};
use super::shutdown::*;
use axum::{routing::get, Router};
use std::time::Duration;
use tokio::sync::oneshot;

async fn idle_listener() -> ServerHandle {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let router = Router::new().route("/", get(|| async { "ok" }));
    ServerHandle::spawn("test", listener, router).expect("spawn listener")
}

/// Every clone wakes on a single trigger
#[tokio::test]
async fn test_trigger_wakes_every_clone() {
    let (controller, signal) = shutdown_channel();
    let waiters: Vec<_> = (0..3)
        .map(|_| {
            let mut signal = signal.clone();
            tokio::spawn(async move { signal.wait().await })
        })
        .collect();

    controller.trigger();

    for waiter in waiters {
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake on trigger")
            .expect("join");
    }
}

/// A signal cloned after the trigger still sees it
#[tokio::test]
async fn test_wait_after_trigger_returns_at_once() {
    let (controller, signal) = shutdown_channel();
    controller.trigger();
    controller.trigger();

    let mut late = signal.clone();
    tokio::time::timeout(Duration::from_millis(100), late.wait())
        .await
        .expect("late waiter should not block");
}

/// Without a trigger the signal keeps waiting
#[tokio::test]
async fn test_wait_pending_until_triggered() {
    let (_controller, mut signal) = shutdown_channel();

    let waited = tokio::time::timeout(Duration::from_millis(50), signal.wait()).await;
    assert!(waited.is_err(), "wait() resolved without a trigger");
}

/// A dropped controller counts as shutdown so waiters never hang
#[tokio::test]
async fn test_dropped_controller_counts_as_shutdown() {
    let (controller, mut signal) = shutdown_channel();
    drop(controller);

    tokio::time::timeout(Duration::from_secs(1), signal.wait())
        .await
        .expect("wait() should complete once the controller is gone");
}

/// A listener drains by itself once its handle, and so its trigger, is dropped
#[tokio::test]
async fn test_dropped_handle_stops_listener() {
    let handle = idle_listener().await;
    let addr = handle.local_addr();
    drop(handle);

    tokio::time::timeout(Duration::from_secs(2), async {
        while tokio::net::TcpStream::connect(addr).await.is_ok() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("listener should stop accepting once its handle is gone");
}

/// The listener's private trigger moves it to Stopped
#[tokio::test]
async fn test_listener_trigger_stops_serving() {
    let handle = idle_listener().await;

    handle.begin_close();
    tokio::time::timeout(Duration::from_secs(1), handle.stopped())
        .await
        .expect("idle listener should stop right after the trigger");
    assert_eq!(handle.status(), ServerStatus::Stopped);

    handle.join().await.expect("normal close");
}

/// Termination sources are forwarded onto the coordinator's channel
#[tokio::test]
async fn test_forward_termination_fires_controller() {
    let (controller, mut signal) = shutdown_channel();
    let (fire, fired) = oneshot::channel::<()>();

    let task = forward_termination(
        async move {
            let _ = fired.await;
            "SIGTERM"
        },
        controller,
    );

    let waited = tokio::time::timeout(Duration::from_millis(50), signal.wait()).await;
    assert!(waited.is_err(), "nothing was forwarded yet");

    fire.send(()).expect("forwarder alive");
    tokio::time::timeout(Duration::from_secs(1), signal.wait())
        .await
        .expect("forwarded termination should fire the signal");
    task.await.expect("forwarder should finish after one signal");
}

/// Registering the OS handlers succeeds and waits quietly
#[tokio::test]
async fn test_listen_for_termination_registers_and_waits() {
    let (controller, mut signal) = shutdown_channel();

    let task = listen_for_termination(controller).expect("signal registration failed");

    let waited = tokio::time::timeout(Duration::from_millis(50), signal.wait()).await;
    assert!(waited.is_err(), "no signal was sent");
    assert!(!task.is_finished());
    task.abort();
}
