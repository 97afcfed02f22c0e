// tests/runner_timeout.rs

use std::time::Duration;

use o2reap::exec::{CommandSpec, KILLED_MARKER, ProcessRequest, Runner, cancel_pair};
use o2reap::types::{Outcome, Termination};
use o2reap_test_utils::builders::fast_options;
use o2reap_test_utils::recording_progress::RecordingProgress;
use o2reap_test_utils::{init_tracing, with_timeout};

const TIMEOUT: Duration = Duration::from_millis(200);

#[tokio::test]
async fn child_ignoring_term_is_killed_after_grace_window() {
    init_tracing();
    let progress = RecordingProgress::new();
    let opts = fast_options(TIMEOUT);
    let grace = opts.grace();
    let request = ProcessRequest::new(CommandSpec::shell(
        "trap '' TERM; echo waiting; sleep 10",
    ));

    let result = with_timeout(Runner::new(opts).with_progress(progress.clone()).run(&request))
        .await
        .unwrap();

    assert!(result.killed);
    assert!(!result.succeeded);
    assert!(result.forced, "forceful signal should have been needed");
    assert_eq!(result.outcome(), Outcome::Killed);
    assert!(result.output.starts_with("waiting\n"), "output: {:?}", result.output);
    assert!(result.output.ends_with(KILLED_MARKER));
    assert_eq!(result.output, format!("waiting\n\n{KILLED_MARKER}"));

    // Graceful first, forceful only after the grace window.
    assert_eq!(
        progress.signals(),
        vec![Termination::Graceful, Termination::Forceful]
    );
    assert!(result.elapsed >= TIMEOUT + grace, "elapsed {:?}", result.elapsed);
    assert!(result.elapsed < Duration::from_secs(5), "elapsed {:?}", result.elapsed);
}

#[tokio::test]
async fn child_honouring_term_is_not_forced() {
    init_tracing();
    let progress = RecordingProgress::new();
    let request = ProcessRequest::new(CommandSpec::argv(["sleep", "10"]));

    let result = with_timeout(
        Runner::new(fast_options(TIMEOUT))
            .with_progress(progress.clone())
            .run(&request),
    )
    .await
    .unwrap();

    assert!(result.killed);
    assert!(!result.succeeded);
    assert!(!result.forced);
    assert_eq!(result.exit_code, None);
    assert_eq!(result.output, KILLED_MARKER);
    assert_eq!(progress.signals(), vec![Termination::Graceful]);
}

#[tokio::test]
async fn clean_exit_after_term_still_counts_as_killed() {
    init_tracing();
    let request = ProcessRequest::new(CommandSpec::shell(
        "trap 'echo bye; exit 0' TERM; while :; do sleep 0.05; done",
    ));

    let result = with_timeout(Runner::new(fast_options(TIMEOUT)).run(&request))
        .await
        .unwrap();

    assert!(result.killed);
    assert!(!result.succeeded);
    assert_eq!(result.exit_code, Some(0));
    assert_eq!(result.output, format!("bye\n\n{KILLED_MARKER}"));
}

#[tokio::test]
async fn output_written_before_the_kill_is_kept() {
    init_tracing();
    let request = ProcessRequest::new(CommandSpec::shell(
        "printf 'formatting'; printf ' ...'; sleep 10",
    ));

    let result = with_timeout(Runner::new(fast_options(TIMEOUT)).run(&request))
        .await
        .unwrap();

    assert!(result.killed);
    assert_eq!(result.output, format!("formatting ...\n{KILLED_MARKER}"));
}

#[tokio::test]
async fn cancel_terminates_early() {
    init_tracing();
    let (handle, token) = cancel_pair();
    let request = ProcessRequest::new(CommandSpec::argv(["sleep", "10"]));
    let runner = Runner::new(fast_options(Duration::from_secs(20))).with_cancel(token);

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.cancel()
    });

    let result = with_timeout(runner.run(&request)).await.unwrap();

    assert!(canceller.await.unwrap(), "run should still have been active");
    assert!(result.killed);
    assert!(!result.succeeded);
    assert!(result.output.ends_with(KILLED_MARKER));
    assert!(result.elapsed < Duration::from_secs(5), "elapsed {:?}", result.elapsed);
}

#[tokio::test]
async fn dropped_cancel_handle_changes_nothing() {
    init_tracing();
    let (handle, token) = cancel_pair();
    drop(handle);

    let request = ProcessRequest::new(CommandSpec::shell("sleep 0.1; echo done"));
    let result = with_timeout(
        Runner::new(fast_options(Duration::from_secs(10)))
            .with_cancel(token)
            .run(&request),
    )
    .await
    .unwrap();

    assert!(result.succeeded);
    assert!(!result.killed);
    assert_eq!(result.output, "done\n");
}

#[tokio::test]
async fn cancel_after_completion_reports_false() {
    init_tracing();
    let (handle, token) = cancel_pair();
    let request = ProcessRequest::new(CommandSpec::from_string("true"));

    let result = with_timeout(
        Runner::new(fast_options(Duration::from_secs(10)))
            .with_cancel(token)
            .run(&request),
    )
    .await
    .unwrap();

    assert!(result.succeeded);
    assert!(!handle.cancel());
}
