#![cfg(unix)]

use std::error::Error;
use std::path::Path;
use std::time::{Duration, Instant};

use watchproc::config::load_from_str;
use watchproc::engine::Supervisor;
use watchproc::errors::WatchprocError;

type TestResult = Result<(), Box<dyn Error>>;

fn sh() -> &'static Path {
    Path::new("/bin/sh")
}

fn sh_args(script: &str) -> Vec<String> {
    vec!["-c".to_string(), script.to_string()]
}

#[tokio::test]
async fn child_exit_code_passes_through() -> TestResult {
    let cfg = load_from_str("{}")?;
    let supervisor = Supervisor::from_config(&cfg)?;

    let status = supervisor.run(sh(), &sh_args("exit 7")).await?;
    assert_eq!(status.code(), Some(7));
    assert_eq!(watchproc::exit_code(status), 7);
    Ok(())
}

#[tokio::test]
async fn stdout_match_dispatches_actions() -> TestResult {
    let cfg = load_from_str(
        r#"
stdout:
  "^READY$":
    - action: timer_start
      kwargs: { name: marker }
timers:
  marker:
    duration: { hours: 1 }
    actions:
      - action: print
        kwargs: { message: marker fired }
"#,
    )?;
    let supervisor = Supervisor::from_config(&cfg)?;

    let status = supervisor.run(sh(), &sh_args("echo READY")).await?;
    assert!(status.success());

    // The matched timer_start ran before the stream closed.
    let marker = supervisor
        .timers()
        .status("marker")
        .await
        .ok_or("marker missing")?;
    assert!(marker.is_running());
    Ok(())
}

#[tokio::test]
async fn heartbeat_timer_terminates_a_long_sleeper() -> TestResult {
    let cfg = load_from_str(
        r#"
timers:
  heartbeat:
    duration: { seconds: 1 }
    autostart: true
    actions:
      - action: exit_program
        kwargs: { kind_kill_timeout: 0 }
"#,
    )?;
    let supervisor = Supervisor::from_config(&cfg)?;

    let started = Instant::now();
    let status = supervisor.run(sh(), &sh_args("sleep 30")).await?;
    let elapsed = started.elapsed();

    assert!(!status.success());
    assert!(
        elapsed >= Duration::from_millis(900),
        "terminated before the heartbeat expired: {elapsed:?}"
    );
    assert!(
        elapsed < Duration::from_secs(10),
        "terminate/kill did not end the child promptly: {elapsed:?}"
    );

    // The heartbeat went dormant when it fired.
    let heartbeat = supervisor
        .timers()
        .status("heartbeat")
        .await
        .ok_or("heartbeat missing")?;
    assert!(!heartbeat.is_running());
    Ok(())
}

#[tokio::test]
async fn exit_program_ends_forked_descendants_too() -> TestResult {
    let cfg = load_from_str(
        r#"
timers:
  heartbeat:
    duration: { seconds: 1 }
    autostart: true
    actions:
      - action: exit_program
        kwargs: { kind_kill_timeout: 0 }
"#,
    )?;
    let supervisor = Supervisor::from_config(&cfg)?;

    // The grandchild inherits the pipe write ends; if only the direct child
    // were signalled, the watchers would block until the orphan exited on
    // its own.
    let started = Instant::now();
    let status = supervisor
        .run(sh(), &sh_args("sleep 30 & sleep 30"))
        .await?;

    assert!(!status.success());
    assert!(
        started.elapsed() < Duration::from_secs(10),
        "a forked descendant outlived the kill: {:?}",
        started.elapsed()
    );
    Ok(())
}

#[tokio::test]
async fn echoes_child_output_and_prints_on_match() -> TestResult {
    use std::io::Write;

    let mut config = tempfile::NamedTempFile::new()?;
    config.write_all(
        br#"
stdout:
  "^READY$":
    - action: print
      kwargs: { message: ok }
"#,
    )?;

    let output = tokio::process::Command::new(env!("CARGO_BIN_EXE_watchproc"))
        .arg(config.path())
        .arg("/bin/sh")
        .arg("-c")
        .arg("echo READY")
        .output()
        .await?;

    assert!(output.status.success());
    // Pass-through echo first, then the matched print, both on stdout.
    assert_eq!(String::from_utf8(output.stdout)?, "READY\nok\n");
    Ok(())
}

#[tokio::test]
async fn stderr_match_stops_a_running_timer() -> TestResult {
    let cfg = load_from_str(
        r#"
stderr:
  "FATAL":
    - action: timer_stop
      kwargs: { name: heartbeat }
    - action: print
      kwargs: { message: fatal seen }
timers:
  heartbeat:
    duration: { hours: 1 }
    autostart: true
    actions:
      - action: exit_program
"#,
    )?;
    let supervisor = Supervisor::from_config(&cfg)?;

    let status = supervisor
        .run(sh(), &sh_args("echo 'FATAL: disk full' >&2"))
        .await?;
    assert!(status.success());

    let heartbeat = supervisor
        .timers()
        .status("heartbeat")
        .await
        .ok_or("heartbeat missing")?;
    assert!(!heartbeat.is_running());
    Ok(())
}

#[tokio::test]
async fn spawn_failure_aborts_before_supervision() -> TestResult {
    let cfg = load_from_str("{}")?;
    let supervisor = Supervisor::from_config(&cfg)?;

    let err = supervisor
        .run(Path::new("/no/such/executable"), &[])
        .await
        .expect_err("spawning a missing executable must fail");
    assert!(format!("{err:#}").contains("spawning /no/such/executable"));
    Ok(())
}

#[tokio::test]
async fn reference_error_aborts_the_run_and_kills_the_child() -> TestResult {
    let cfg = load_from_str(
        r#"
stdout:
  "BOOM":
    - action: timer_start
      kwargs: { name: nope }
"#,
    )?;
    let supervisor = Supervisor::from_config(&cfg)?;

    let started = Instant::now();
    let err = supervisor
        .run(sh(), &sh_args("echo BOOM; sleep 30"))
        .await
        .expect_err("unknown timer reference must abort the run");
    let elapsed = started.elapsed();

    assert!(
        elapsed < Duration::from_secs(10),
        "child was not killed after the reference error: {elapsed:?}"
    );
    let reference = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<WatchprocError>());
    assert!(matches!(
        reference,
        Some(WatchprocError::UnknownTimer(name)) if name == "nope"
    ));
    Ok(())
}

#[tokio::test]
async fn run_ends_when_streams_close_even_without_rules() -> TestResult {
    let cfg = load_from_str(
        r#"
timers:
  idle:
    duration: { hours: 1 }
    actions:
      - action: print
"#,
    )?;
    let supervisor = Supervisor::from_config(&cfg)?;

    let started = Instant::now();
    let status = supervisor
        .run(sh(), &sh_args("echo out; echo err >&2; exit 0"))
        .await?;

    assert!(status.success());
    assert!(
        started.elapsed() < Duration::from_secs(10),
        "supervision did not wind down with the child"
    );
    Ok(())
}
