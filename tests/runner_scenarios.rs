// tests/runner_scenarios.rs

use std::time::Duration;

use o2reap::exec::{CommandSpec, ProcessRequest, Runner, run};
use o2reap::types::Outcome;
use o2reap_test_utils::builders::fast_options;
use o2reap_test_utils::{init_tracing, with_timeout};

fn runner() -> Runner {
    Runner::new(fast_options(Duration::from_secs(10)))
}

async fn run_spec(spec: CommandSpec) -> o2reap::exec::ProcessResult {
    init_tracing();
    with_timeout(runner().run(&ProcessRequest::new(spec)))
        .await
        .expect("runner returned a hard error")
}

#[tokio::test]
async fn true_succeeds_with_no_output() {
    let result = run_spec(CommandSpec::from_string("true")).await;

    assert!(result.succeeded);
    assert!(!result.killed);
    assert!(!result.forced);
    assert_eq!(result.output, "");
    assert_eq!(result.exit_code, Some(0));
    assert_eq!(result.outcome(), Outcome::Succeeded);
}

#[tokio::test]
async fn false_fails_without_being_killed() {
    let result = run_spec(CommandSpec::from_string("false")).await;

    assert!(!result.succeeded);
    assert!(!result.killed);
    assert_eq!(result.output, "");
    assert_eq!(result.exit_code, Some(1));
    assert_eq!(result.outcome(), Outcome::Failed);
}

#[tokio::test]
async fn hello_is_captured() {
    let result = run_spec(CommandSpec::argv(["echo", "hello"])).await;

    assert!(result.succeeded);
    assert_eq!(result.output, "hello\n");
}

#[tokio::test]
async fn shell_string_is_interpreted_by_the_shell() {
    let result = run_spec(CommandSpec::from_string("echo a; echo b")).await;
    assert!(result.succeeded);
    assert_eq!(result.output, "a\nb\n");

    // The same text as a single argv element is just an argument.
    let result = run_spec(CommandSpec::argv(["echo", "a; echo b"])).await;
    assert!(result.succeeded);
    assert_eq!(result.output, "a; echo b\n");
}

#[tokio::test]
async fn stdout_and_stderr_share_one_stream_in_order() {
    let result = run_spec(CommandSpec::shell("echo out; echo err 1>&2; echo out2")).await;

    assert!(result.succeeded);
    assert_eq!(result.output, "out\nerr\nout2\n");
}

#[tokio::test]
async fn nonzero_exit_keeps_output_and_code() {
    let result = run_spec(CommandSpec::shell("echo 'mount.ocfs2: Bad magic number'; exit 3")).await;

    assert!(!result.succeeded);
    assert!(!result.killed);
    assert_eq!(result.exit_code, Some(3));
    assert_eq!(result.output, "mount.ocfs2: Bad magic number\n");
}

#[tokio::test]
async fn missing_executable_is_a_launch_failure_not_an_error() {
    let result = run_spec(CommandSpec::argv(["/nonexistent/o2reap-no-such-tool", "-v"])).await;

    assert!(!result.succeeded);
    assert!(!result.killed);
    assert_eq!(result.exit_code, None);
    assert!(!result.output.is_empty(), "OS error text expected");
}

#[tokio::test]
async fn empty_argv_is_a_launch_failure() {
    let result = run_spec(CommandSpec::Argv(vec![])).await;

    assert!(!result.succeeded);
    assert!(!result.killed);
    assert_eq!(result.output, "empty command line");
}

#[tokio::test]
async fn output_larger_than_the_pipe_buffer_is_complete() {
    let result = run_spec(CommandSpec::shell("head -c 200000 /dev/zero | tr '\\0' x")).await;

    assert!(result.succeeded);
    assert_eq!(result.output.len(), 200_000);
    assert!(result.output.bytes().all(|b| b == b'x'));
}

#[tokio::test]
async fn signal_death_not_caused_by_runner_is_plain_failure() {
    let result = run_spec(CommandSpec::shell("echo dying; kill -9 $$")).await;

    assert!(!result.succeeded);
    assert!(!result.killed);
    assert_eq!(result.exit_code, None);
    assert_eq!(result.output, "dying\n");
}

#[tokio::test]
async fn background_grandchild_does_not_hold_the_run_open() {
    let result = run_spec(CommandSpec::shell("sleep 3 & echo started")).await;

    assert!(result.succeeded);
    assert_eq!(result.output, "started\n");
    assert!(
        result.elapsed < Duration::from_secs(2),
        "run took {:?}",
        result.elapsed
    );
}

#[tokio::test]
async fn default_run_is_headless() {
    init_tracing();
    let result = with_timeout(run(&ProcessRequest::new(CommandSpec::from_string("true"))))
        .await
        .unwrap();
    assert!(result.succeeded);
}

#[test]
fn blocking_facade_returns_the_same_result() {
    init_tracing();
    let request = ProcessRequest::new(CommandSpec::shell("printf 'x\\ny'; exit 2"));
    let result = runner().run_blocking(&request).unwrap();

    assert!(!result.succeeded);
    assert_eq!(result.exit_code, Some(2));
    assert_eq!(result.output, "x\ny");
}
