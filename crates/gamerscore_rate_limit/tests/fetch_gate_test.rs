//! Tests for the single-flight fetch gate.

use gamerscore_rate_limit::{FetchGate, GateConfig};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[tokio::test]
async fn test_acquire_releases_on_drop() {
    let gate = FetchGate::default();

    let guard = gate.acquire().await;
    assert!(gate.is_busy());
    assert!(gate.try_acquire().is_none());

    drop(guard);

    assert!(!gate.is_busy());
    let _guard = gate.try_acquire().expect("Should acquire after drop");
}

#[tokio::test]
async fn test_clones_share_one_region() {
    let gate = FetchGate::default();
    let clone = gate.clone();

    let _guard = gate.acquire().await;
    assert!(clone.try_acquire().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_holders_never_overlap() {
    let gate = FetchGate::default();
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let gate = gate.clone();
        let in_flight = Arc::clone(&in_flight);
        let peak = Arc::clone(&peak);
        handles.push(tokio::spawn(async move {
            let _guard = gate.acquire().await;
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(peak.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_waiter_releases_gate() {
    let gate = FetchGate::default();

    let holder = {
        let gate = gate.clone();
        tokio::spawn(async move {
            let _guard = gate.acquire().await;
            tokio::time::sleep(Duration::from_secs(60)).await;
        })
    };
    tokio::task::yield_now().await;
    assert!(gate.is_busy());

    holder.abort();
    let _ = holder.await;

    assert!(!gate.is_busy(), "aborted holder must release the gate");
}

#[tokio::test]
async fn test_quota_limits_try_acquire() {
    let gate = FetchGate::new(&GateConfig::default().with_requests_per_minute(1));

    let first = gate.try_acquire().expect("First request within quota");
    drop(first);

    assert!(gate.try_acquire().is_none(), "Second request should exceed quota");
}
