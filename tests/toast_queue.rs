use std::time::Duration;

use acesse_core::toast::{ToastConfig, ToastKind, ToastQueue};

// Let spawned expiry tasks run after advancing the paused clock.
async fn settle() {
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn success_toast_expires_after_its_duration() {
    let queue = ToastQueue::new();
    let toast = queue.add(ToastConfig::new(ToastKind::Success, "m"));

    assert_eq!(toast.duration_ms, 5_000);
    assert!(toast.closable);
    assert_eq!(queue.len(), 1);

    tokio::time::advance(Duration::from_millis(4_999)).await;
    settle().await;
    assert_eq!(queue.len(), 1);

    tokio::time::advance(Duration::from_millis(2)).await;
    settle().await;
    assert!(queue.is_empty());
}

#[tokio::test(start_paused = true)]
async fn zero_duration_persists_until_manual_remove() {
    let queue = ToastQueue::new();
    let toast = queue.add(ToastConfig::new(ToastKind::Info, "sticky").with_duration_ms(0));

    tokio::time::advance(Duration::from_secs(60)).await;
    settle().await;
    assert_eq!(queue.len(), 1);

    assert!(queue.remove(toast.id));
    assert!(queue.is_empty());
}

#[tokio::test(start_paused = true)]
async fn removing_the_first_of_two_leaves_the_second() {
    let queue = ToastQueue::new();
    let first = queue.success("first");
    let second = queue.error("second");

    assert!(queue.remove(first.id));
    let remaining = queue.active();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0], second);
}

#[tokio::test(start_paused = true)]
async fn clear_defuses_pending_expiries() {
    let queue = ToastQueue::new();
    queue.success("a");
    queue.warning("b");
    assert_eq!(queue.len(), 2);

    queue.clear();
    assert!(queue.is_empty());

    // New toast added after the clear must survive the old timers firing.
    let keeper = queue.add(ToastConfig::new(ToastKind::Info, "keep").with_duration_ms(0));
    tokio::time::advance(Duration::from_millis(10_000)).await;
    settle().await;
    assert_eq!(queue.active(), vec![keeper]);
}

#[tokio::test(start_paused = true)]
async fn staggered_expiries_fire_independently() {
    let queue = ToastQueue::new();
    queue.info("short-lived");
    let long = queue.error("long-lived");

    tokio::time::advance(Duration::from_millis(5_001)).await;
    settle().await;
    assert_eq!(queue.active(), vec![long]);

    tokio::time::advance(Duration::from_millis(2_000)).await;
    settle().await;
    assert!(queue.is_empty());
}

#[tokio::test(start_paused = true)]
async fn overrides_beat_defaults() {
    let queue = ToastQueue::new();
    let toast = queue.add(
        ToastConfig::new(ToastKind::Error, "upload failed")
            .with_title("Documents")
            .with_icon("cloud-off")
            .with_duration_ms(1_000)
            .with_closable(false),
    );

    assert_eq!(toast.title.as_deref(), Some("Documents"));
    assert_eq!(toast.icon.as_deref(), Some("cloud-off"));
    assert!(!toast.closable);

    tokio::time::advance(Duration::from_millis(1_001)).await;
    settle().await;
    assert!(queue.is_empty());
}
