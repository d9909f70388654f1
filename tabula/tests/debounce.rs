//! Debounce timing against manual and tokio clocks.

use std::sync::Arc;
use std::time::Duration;

use tabula::debounce::{Debounced, ManualScheduler, TokioScheduler};
use tabula::wakeup;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn debounced(clock: &ManualScheduler, delay: u64) -> Debounced<String> {
    Debounced::new(String::new(), ms(delay), Arc::new(clock.clone()))
}

#[test]
fn test_initial_value_is_committed_immediately() {
    let clock = ManualScheduler::new();
    let search = Debounced::new("seed".to_string(), ms(300), Arc::new(clock.clone()));
    assert_eq!(search.get(), "seed");
    assert!(!search.is_pending());
    assert_eq!(clock.pending(), 0);
}

#[test]
fn test_burst_commits_only_last_value() {
    let clock = ManualScheduler::new();
    let mut search = debounced(&clock, 300);

    // "r" at 0, "re" at 100, "react" at 250
    search.set("r".to_string());
    clock.advance(ms(100));
    search.set("re".to_string());
    clock.advance(ms(150));
    search.set("react".to_string());

    clock.advance(ms(299));
    assert_eq!(search.get(), "");
    assert!(search.is_pending());

    // quiet for the full delay after the last change: t = 550
    clock.advance(ms(1));
    assert_eq!(clock.now(), ms(550));
    assert_eq!(search.get(), "react");
    assert!(!search.is_pending());
}

#[test]
fn test_output_follows_last_value_after_quiet_period() {
    let clock = ManualScheduler::new();
    let mut value = Debounced::new("v0".to_string(), ms(500), Arc::new(clock.clone()));

    clock.advance(ms(100));
    value.set("v1".to_string());
    clock.advance(ms(100));
    value.set("v2".to_string());

    clock.advance(ms(499));
    assert_eq!(value.get(), "v0");
    clock.advance(ms(1));
    assert_eq!(clock.now(), ms(700));
    assert_eq!(value.get(), "v2");
}

#[test]
fn test_intermediate_values_never_appear() {
    let clock = ManualScheduler::new();
    let mut search = debounced(&clock, 300);
    let output = search.output();
    let mut seen = Vec::new();

    for text in ["a", "ab", "abc"] {
        search.set(text.to_string());
        clock.advance(ms(100));
        seen.push(output.get());
    }
    clock.advance(ms(200));
    seen.push(output.get());

    assert_eq!(seen, vec!["", "", "", "abc"]);
}

#[test]
fn test_observe_returns_committed_value() {
    let clock = ManualScheduler::new();
    let mut search = debounced(&clock, 50);
    assert_eq!(search.observe("x".to_string()), "");
    clock.advance(ms(50));
    assert_eq!(search.observe("x".to_string()), "x");
}

#[test]
fn test_unchanged_input_does_not_restart() {
    let clock = ManualScheduler::new();
    let mut search = debounced(&clock, 300);

    search.set("a".to_string());
    clock.advance(ms(200));
    search.set("a".to_string());
    clock.advance(ms(100));
    assert_eq!(search.get(), "a");
}

#[test]
fn test_value_changed_back_still_waits() {
    let clock = ManualScheduler::new();
    let mut search = debounced(&clock, 100);

    search.set("a".to_string());
    clock.advance(ms(50));
    search.set(String::new());
    clock.advance(ms(100));
    assert_eq!(search.get(), "");
    assert!(!search.is_pending());
}

#[test]
fn test_zero_delay_commits_on_next_tick() {
    let clock = ManualScheduler::new();
    let mut search = debounced(&clock, 0);

    search.set("now".to_string());
    assert_eq!(search.get(), "");
    clock.run_pending();
    assert_eq!(search.get(), "now");
}

#[test]
fn test_set_delay_restarts_timer() {
    let clock = ManualScheduler::new();
    let mut search = debounced(&clock, 300);

    search.set("a".to_string());
    clock.advance(ms(200));
    search.set_delay(ms(500));
    assert_eq!(search.delay(), ms(500));

    clock.advance(ms(499));
    assert_eq!(search.get(), "");
    clock.advance(ms(1));
    assert_eq!(search.get(), "a");
}

#[test]
fn test_cancel_keeps_output() {
    let clock = ManualScheduler::new();
    let mut search = debounced(&clock, 100);

    search.set("a".to_string());
    search.cancel();
    assert!(!search.is_pending());
    clock.advance(ms(500));
    assert_eq!(search.get(), "");
    assert_eq!(search.input(), "a");
}

#[test]
fn test_drop_cancels_pending_timer() {
    let clock = ManualScheduler::new();
    let mut search = debounced(&clock, 100);
    let output = search.output();

    search.set("late".to_string());
    drop(search);
    clock.advance(ms(200));
    assert_eq!(output.get(), "");
    assert!(!output.is_dirty());
}

#[test]
fn test_commit_wakes_host() {
    let clock = ManualScheduler::new();
    let mut search = debounced(&clock, 10);
    let (tx, mut rx) = wakeup::channel();
    search.output().install_wakeup(tx);

    search.set("a".to_string());
    assert!(!rx.try_recv());
    clock.advance(ms(10));
    assert!(rx.try_recv());
}

#[tokio::test(start_paused = true)]
async fn test_tokio_scheduler_debounces() {
    let mut search = Debounced::new(
        String::new(),
        ms(300),
        Arc::new(TokioScheduler::current()),
    );

    search.set("r".to_string());
    tokio::time::sleep(ms(100)).await;
    search.set("react".to_string());

    tokio::time::sleep(ms(299)).await;
    assert_eq!(search.get(), "");

    tokio::time::sleep(ms(2)).await;
    assert_eq!(search.get(), "react");
}

#[tokio::test(start_paused = true)]
async fn test_tokio_drop_cancels() {
    let mut search = Debounced::new(0u32, ms(50), Arc::new(TokioScheduler::current()));
    let output = search.output();

    search.set(7);
    drop(search);
    tokio::time::sleep(ms(100)).await;
    assert_eq!(output.get(), 0);
}
