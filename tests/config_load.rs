use std::error::Error;
use std::io::Write;
use std::time::Duration;

use watchproc::config::{load_and_validate, load_from_str, to_yaml_string, validate_config};
use watchproc::errors::WatchprocError;
use watchproc::triggers::TriggerRegistry;

type TestResult = Result<(), Box<dyn Error>>;

const FULL_CONFIG: &str = r#"
stdout:
  "^READY$":
    - action: print
      kwargs: { message: ok }
  "progress":
    - action: timer_start
      kwargs: { name: heartbeat }
stderr:
  "FATAL":
    - action: timer_stop
      kwargs: { name: heartbeat }
    - action: print
      kwargs: { message: fatal seen }
timers:
  heartbeat:
    duration: { seconds: 1 }
    autostart: true
    actions:
      - action: exit_program
        kwargs: { kind_kill_timeout: 0 }
  shutdown:
    duration: { minutes: 1, seconds: 30 }
    actions:
      - action: print
"#;

#[test]
fn parses_full_config_with_defaults() -> TestResult {
    let cfg = load_from_str(FULL_CONFIG)?;
    validate_config(&cfg)?;

    assert_eq!(cfg.stdout.len(), 2);
    assert_eq!(cfg.stderr.len(), 1);
    assert_eq!(cfg.timers.len(), 2);

    let heartbeat = cfg.timers.get("heartbeat").ok_or("heartbeat missing")?;
    assert!(heartbeat.autostart);
    assert_eq!(heartbeat.duration.to_duration()?, Duration::from_secs(1));

    // autostart defaults to false; duration components are summed.
    let shutdown = cfg.timers.get("shutdown").ok_or("shutdown missing")?;
    assert!(!shutdown.autostart);
    assert_eq!(shutdown.duration.to_duration()?, Duration::from_secs(90));

    // print kwargs defaults are applied at build time, not parse time; the
    // raw invocation only carries what the author wrote.
    let fatal_actions = cfg.stderr.get("FATAL").ok_or("FATAL rule missing")?;
    assert_eq!(fatal_actions.len(), 2);
    assert_eq!(fatal_actions[0].action, "timer_stop");
    assert_eq!(fatal_actions[1].action, "print");

    Ok(())
}

#[test]
fn rule_order_is_document_order() -> TestResult {
    let cfg = load_from_str(FULL_CONFIG)?;
    let patterns: Vec<&str> = cfg.stdout.keys().collect();
    assert_eq!(patterns, vec!["^READY$", "progress"]);
    Ok(())
}

#[test]
fn empty_config_is_valid() -> TestResult {
    let cfg = load_from_str("{}")?;
    validate_config(&cfg)?;
    assert!(cfg.stdout.is_empty());
    assert!(cfg.stderr.is_empty());
    assert!(cfg.timers.is_empty());
    Ok(())
}

#[test]
fn unknown_action_identifier_is_rejected_by_name() -> TestResult {
    let cfg = load_from_str(
        r#"
stdout:
  "x":
    - action: frobnicate
"#,
    )?;

    let err = validate_config(&cfg).expect_err("unknown action must fail validation");
    assert!(format!("{err:#}").contains("\"frobnicate\" is not a known action"));

    let reference = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<WatchprocError>());
    assert!(matches!(
        reference,
        Some(WatchprocError::UnknownAction(name)) if name == "frobnicate"
    ));

    Ok(())
}

#[test]
fn missing_timer_duration_is_rejected() {
    let err = load_from_str(
        r#"
timers:
  heartbeat:
    actions: []
"#,
    )
    .expect_err("timer without duration must fail to parse");
    assert!(format!("{err:#}").contains("duration"));
}

#[test]
fn malformed_kwargs_are_rejected_at_load() -> TestResult {
    let cfg = load_from_str(
        r#"
stdout:
  "x":
    - action: print
      kwargs: { colour: red }
"#,
    )?;

    let err = validate_config(&cfg).expect_err("unknown kwarg must fail validation");
    assert!(format!("{err:#}").contains("invalid kwargs for action \"print\""));
    Ok(())
}

#[test]
fn missing_required_kwarg_is_rejected() -> TestResult {
    let cfg = load_from_str(
        r#"
stdout:
  "x":
    - action: timer_start
"#,
    )?;

    let err = validate_config(&cfg).expect_err("timer_start without name must fail");
    assert!(format!("{err:#}").contains("invalid kwargs for action \"timer_start\""));
    Ok(())
}

#[test]
fn invalid_pattern_is_rejected() -> TestResult {
    let cfg = load_from_str(
        r#"
stderr:
  "[":
    - action: print
"#,
    )?;

    let err = validate_config(&cfg).expect_err("invalid regex must fail validation");
    assert!(format!("{err:#}").contains("invalid pattern"));
    Ok(())
}

#[test]
fn negative_duration_is_rejected() -> TestResult {
    let cfg = load_from_str(
        r#"
timers:
  t:
    duration: { seconds: -1 }
"#,
    )?;

    let err = validate_config(&cfg).expect_err("negative duration must fail validation");
    assert!(format!("{err:#}").contains("non-negative"));
    Ok(())
}

#[test]
fn negative_kill_timeout_is_rejected() -> TestResult {
    let cfg = load_from_str(
        r#"
timers:
  t:
    duration: { seconds: 1 }
    actions:
      - action: exit_program
        kwargs: { kind_kill_timeout: -2 }
"#,
    )?;

    let err = validate_config(&cfg).expect_err("negative kill timeout must fail validation");
    assert!(format!("{err:#}").contains("kind_kill_timeout"));
    Ok(())
}

#[test]
fn unknown_top_level_key_is_rejected() {
    let err = load_from_str("triggers: {}\n").expect_err("unknown key must fail to parse");
    assert!(format!("{err:#}").contains("triggers"));
}

#[test]
fn loads_and_validates_from_a_file() -> TestResult {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(FULL_CONFIG.as_bytes())?;

    let cfg = load_and_validate(file.path())?;
    assert_eq!(cfg.timers.len(), 2);
    Ok(())
}

#[test]
fn missing_config_file_names_the_path() {
    let err = load_and_validate("/no/such/config.yaml").expect_err("missing file must fail");
    assert!(format!("{err:#}").contains("/no/such/config.yaml"));
}

#[test]
fn yaml_round_trip_preserves_rules_and_timers() -> TestResult {
    let cfg = load_from_str(FULL_CONFIG)?;
    let rendered = to_yaml_string(&cfg)?;
    let reloaded = load_from_str(&rendered)?;

    assert_eq!(cfg, reloaded);

    // Same compiled match behaviour on both sides.
    let before = TriggerRegistry::compile(&cfg.stdout)?;
    let after = TriggerRegistry::compile(&reloaded.stdout)?;
    for line in ["READY", "progress: 42%", "nothing here"] {
        assert_eq!(
            before.matched_actions(line).len(),
            after.matched_actions(line).len(),
            "match behaviour diverged on {line:?}"
        );
    }

    Ok(())
}
