use super::*;
use tokio::time::advance;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[tokio::test(start_paused = true)]
async fn test_tracker_without_pause_reports_wall_clock() {
    let metrics = PerformanceMetrics::new();
    let mut tracker = metrics.start("tts.A");
    advance(ms(120)).await;

    assert_eq!(tracker.done(), Some(ms(120)));
    assert_eq!(metrics.average("tts.A"), ms(120));
    assert_eq!(metrics.sample_count("tts.A"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_paused_interval_is_excluded() {
    let metrics = PerformanceMetrics::new();
    let mut tracker = metrics.start("tts.A");

    advance(ms(100)).await;
    tracker.pause();
    assert!(tracker.is_paused());
    advance(ms(50)).await;
    tracker.resume();
    assert!(tracker.is_running());
    advance(ms(50)).await;

    // 200ms wall clock, 50ms paused
    assert_eq!(tracker.done(), Some(ms(150)));
    assert_eq!(metrics.average("tts.A"), ms(150));
}

#[tokio::test(start_paused = true)]
async fn test_done_while_paused() {
    let metrics = PerformanceMetrics::new();
    let mut tracker = metrics.start("stt.whisper");

    advance(ms(30)).await;
    tracker.pause();
    advance(ms(500)).await;

    assert_eq!(tracker.done(), Some(ms(30)));
    assert!(tracker.is_done());
}

#[tokio::test(start_paused = true)]
async fn test_misuse_is_ignored() {
    let metrics = PerformanceMetrics::new();
    let mut tracker = metrics.start("action.echo");

    tracker.resume(); // running already
    advance(ms(10)).await;
    tracker.pause();
    tracker.pause(); // double pause
    advance(ms(10)).await;
    tracker.resume();
    advance(ms(10)).await;

    assert_eq!(tracker.done(), Some(ms(20)));

    tracker.pause();
    tracker.resume();
    advance(ms(10)).await;
    assert_eq!(tracker.done(), None);
    assert_eq!(tracker.elapsed(), ms(20));
    assert_eq!(metrics.sample_count("action.echo"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_elapsed_is_frozen_at_done() {
    let metrics = PerformanceMetrics::new();
    let mut tracker = metrics.start("stt.A");
    advance(ms(30)).await;
    tracker.pause();
    advance(ms(70)).await;
    tracker.resume();
    advance(ms(45)).await;

    let reported = tracker.done();
    assert_eq!(reported, Some(ms(75)));
    assert!(tracker.is_done());

    advance(ms(100)).await;
    assert_eq!(tracker.elapsed(), ms(75));
    assert_eq!(metrics.average("stt.A"), ms(75));
}

#[tokio::test(start_paused = true)]
async fn test_unfinished_tracker_is_not_reported() {
    let metrics = PerformanceMetrics::new();
    {
        let _tracker = metrics.start("tts.cancelled");
        advance(ms(40)).await;
    }

    assert!(metrics.keys().is_empty());
    assert_eq!(metrics.average("tts.cancelled"), Duration::ZERO);
    assert_eq!(metrics.sample_count("tts.cancelled"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_started_key_appears_only_after_done() {
    let metrics = PerformanceMetrics::new();
    let mut tracker = metrics.start("tokenizer.cl100k");
    assert!(metrics.keys().is_empty());

    advance(ms(5)).await;
    tracker.done();
    assert_eq!(metrics.keys(), vec!["tokenizer.cl100k".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_average_mixes_tracker_and_direct_samples() {
    let metrics = PerformanceMetrics::new();

    metrics.track("tts.A", ms(100));
    let mut tracker = metrics.start("tts.A");
    advance(ms(200)).await;
    tracker.done();
    metrics.track("tts.A", ms(300));

    assert_eq!(metrics.sample_count("tts.A"), 3);
    assert_eq!(metrics.average("tts.A"), ms(200));
}

#[tokio::test(start_paused = true)]
async fn test_time_helper() {
    let metrics = PerformanceMetrics::new();
    let value = metrics
        .time("action.echo", async {
            tokio::time::sleep(ms(75)).await;
            42
        })
        .await;

    assert_eq!(value, 42);
    assert_eq!(metrics.average("action.echo"), ms(75));
}

#[test]
fn test_average_of_unknown_key_is_zero() {
    let metrics = PerformanceMetrics::new();
    assert_eq!(metrics.average("missing"), Duration::ZERO);
    assert!(metrics.recent_samples("missing").is_empty());
}

#[test]
fn test_keys_lists_every_tracked_key() {
    let metrics = PerformanceMetrics::new();
    metrics.track("tts.A", ms(1));
    metrics.track("tts.B", ms(2));
    metrics.track("tts.A", ms(3));

    let mut keys = metrics.keys();
    keys.sort();
    assert_eq!(keys, vec!["tts.A".to_string(), "tts.B".to_string()]);
}

#[test]
fn test_sample_window_keeps_exact_average() {
    let metrics = PerformanceMetrics::with_sample_window(2);
    for n in [10, 20, 30, 40] {
        metrics.track("stt.local", ms(n));
    }

    assert_eq!(metrics.recent_samples("stt.local"), vec![ms(30), ms(40)]);
    assert_eq!(metrics.sample_count("stt.local"), 4);
    assert_eq!(metrics.average("stt.local"), ms(25));
}

#[test]
fn test_clones_share_state() {
    let metrics = PerformanceMetrics::new();
    let clone = metrics.clone();
    clone.track("tts.A", ms(10));
    assert_eq!(metrics.sample_count("tts.A"), 1);
}

#[test]
fn test_concurrent_track_loses_no_updates() {
    let metrics = PerformanceMetrics::new();
    let handles: Vec<_> = (1..=64u64)
        .map(|n| {
            let metrics = metrics.clone();
            std::thread::spawn(move || metrics.track("tts.shared", ms(n)))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // mean of 1..=64 ms = 32.5 ms
    assert_eq!(metrics.sample_count("tts.shared"), 64);
    assert_eq!(metrics.average("tts.shared"), Duration::from_micros(32_500));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_trackers_on_same_key() {
    let metrics = PerformanceMetrics::new();
    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..16 {
        let metrics = metrics.clone();
        tasks.spawn(async move {
            let mut tracker = metrics.start("action.shared");
            tokio::task::yield_now().await;
            tracker.done().unwrap()
        });
    }

    let mut total = Duration::ZERO;
    while let Some(reported) = tasks.join_next().await {
        total += reported.unwrap();
    }

    assert_eq!(metrics.sample_count("action.shared"), 16);
    assert_eq!(metrics.average("action.shared"), total / 16);
}

#[test]
fn test_snapshot_sorted_by_key() {
    let metrics = PerformanceMetrics::new();
    metrics.track("tts.B", ms(40));
    metrics.track("stt.A", ms(10));
    metrics.track("tts.B", ms(20));

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].key, "stt.A");
    assert_eq!(snapshot[1].count, 2);
    assert_eq!(snapshot[1].total, ms(60));
    assert!((snapshot[1].average_ms() - 30.0).abs() < f64::EPSILON);
}

#[test]
fn test_prometheus_export() {
    let metrics = PerformanceMetrics::new();
    metrics.track("tts.A", ms(500));
    metrics.track("tts.A", ms(1500));

    let output = metrics.export_prometheus("parley_operation");
    assert!(output.contains("# TYPE parley_operation_seconds summary"));
    assert!(output.contains("parley_operation_seconds_sum{key=\"tts.A\"} 2"));
    assert!(output.contains("parley_operation_seconds_count{key=\"tts.A\"} 2"));
    assert!(output.contains("parley_operation_average_seconds{key=\"tts.A\"} 1"));
}
