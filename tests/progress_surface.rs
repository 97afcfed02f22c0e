// tests/progress_surface.rs

use std::time::Duration;

use o2reap::exec::{CommandSpec, ParentHandle, ProcessRequest, Runner};
use o2reap_test_utils::builders::fast_options;
use o2reap_test_utils::recording_progress::{ProgressEvent, RecordingProgress};
use o2reap_test_utils::{init_tracing, with_timeout};

#[tokio::test]
async fn quick_command_never_shows_progress() {
    init_tracing();
    let progress = RecordingProgress::new();
    let request = ProcessRequest::new(CommandSpec::from_string("true"))
        .with_title("Query")
        .with_desc("Querying nodes");

    let result = with_timeout(
        Runner::new(fast_options(Duration::from_secs(10)))
            .with_progress(progress.clone())
            .run(&request),
    )
    .await
    .unwrap();

    assert!(result.succeeded);
    let events = progress.events();
    assert!(!events.iter().any(|e| matches!(e, ProgressEvent::Show { .. })));
    assert_eq!(events.last(), Some(&ProgressEvent::Finish));
}

#[tokio::test]
async fn spin_now_shows_progress_before_the_first_tick() {
    init_tracing();
    let progress = RecordingProgress::new();
    let request = ProcessRequest::new(CommandSpec::from_string("true"))
        .with_title("Format")
        .with_desc("Formatting")
        .with_parent(ParentHandle::new("main window"))
        .with_spin_now(true);

    let result = with_timeout(
        Runner::new(fast_options(Duration::from_secs(10)))
            .with_progress(progress.clone())
            .run(&request),
    )
    .await
    .unwrap();

    assert!(result.succeeded);
    let events = progress.events();
    assert_eq!(
        events.first(),
        Some(&ProgressEvent::Show {
            title: "Format".to_string(),
            desc: "Formatting".to_string(),
            has_parent: true,
        })
    );
    assert_eq!(events.last(), Some(&ProgressEvent::Finish));
}

#[tokio::test]
async fn slow_command_shows_progress_once_past_the_threshold() {
    init_tracing();
    let progress = RecordingProgress::new();
    // 20ms ticks, 1s budget = 50 ticks, threshold 10% = 5 ticks.
    let opts = fast_options(Duration::from_secs(1));
    assert_eq!(opts.threshold_ticks(opts.budget_ticks(false)), 5);

    let request = ProcessRequest::new(CommandSpec::argv(["sleep", "0.5"]))
        .with_title("Mount")
        .with_desc("Mounting");

    let result = with_timeout(
        Runner::new(opts)
            .with_progress(progress.clone())
            .run(&request),
    )
    .await
    .unwrap();

    assert!(result.succeeded);
    assert_eq!(progress.pulses_before_show(), Some(4));

    let events = progress.events();
    let shows = events
        .iter()
        .filter(|e| matches!(e, ProgressEvent::Show { .. }))
        .count();
    assert_eq!(shows, 1);
    assert!(progress.signals().is_empty());
}
