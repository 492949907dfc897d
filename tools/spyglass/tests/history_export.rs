use serde_json::{json, Value};
use spyglass::config::{load_config, parse_config};
use spyglass::recording::export::{parse_jsonl, write_jsonl};
use spyglass::runtime::{FakeClock, FakeFileSystem, ProductionFileSystem};
use spyglass::{
    timeline_of, CallError, GlobalSequenceCounter, InfoKind, MockBuilder, MockError, MockHandle,
    Setup,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// ── helpers ───────────────────────────────────────────────────────────────────

fn read_events(path: &Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .expect("read log")
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect()
}

fn repository(counter: &GlobalSequenceCounter, clock: &FakeClock) -> MockHandle {
    MockBuilder::new()
        .counter(counter.clone())
        .clock(Arc::new(clock.clone()))
        .setup(
            &Setup::new()
                .method("find", |args| Ok(Some(json!({ "id": args[0] }))))
                .setter("limit", |_| Ok(())),
        )
        .build()
        .expect("repository mock")
}

// ── timeline ──────────────────────────────────────────────────────────────────

#[test]
fn shared_counter_orders_calls_across_mocks() {
    let counter = GlobalSequenceCounter::isolated();
    let clock = FakeClock::default();
    let repo = repository(&counter, &clock);
    let cache = MockBuilder::new()
        .counter(counter.clone())
        .clock(Arc::new(clock.clone()))
        .setup(&Setup::new().getter("hits", || Ok(json!(3))))
        .build()
        .expect("cache mock");

    repo.subject().set("limit", 10).expect("set");
    clock.advance(Duration::from_nanos(5));
    cache.subject().get("hits").expect("get");
    clock.advance(Duration::from_nanos(5));
    repo.subject().call("find", &[json!(7)]).expect("find");

    let timeline = timeline_of(&[&repo, &cache]);
    let summary = timeline
        .iter()
        .map(|entry| (entry.member.as_str(), entry.kind, entry.record.global_no()))
        .collect::<Vec<_>>();
    assert_eq!(
        summary,
        vec![
            ("limit", InfoKind::PropertySetter, 0),
            ("hits", InfoKind::PropertyGetter, 1),
            ("find", InfoKind::Method, 2),
        ]
    );
    let stamps = timeline
        .iter()
        .map(|entry| entry.record.timestamp_ns())
        .collect::<Vec<_>>();
    assert_eq!(stamps, vec![0, 5, 10]);
}

#[test]
fn cleared_records_drop_out_of_the_timeline() {
    let counter = GlobalSequenceCounter::isolated();
    let repo = repository(&counter, &FakeClock::default());
    repo.subject().call("find", &[json!(1)]).expect("find");
    repo.subject().set("limit", 1).expect("set");
    repo.method("find").expect("find recorder").clear();

    let timeline = repo.timeline();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].member, "limit");
    assert_eq!(timeline[0].record.global_no(), 1);
}

// ── export ────────────────────────────────────────────────────────────────────

#[test]
fn export_round_trips_through_a_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("out").join("calls.jsonl");
    let counter = GlobalSequenceCounter::isolated();
    let repo = repository(&counter, &FakeClock::default());
    repo.subject().call("find", &[json!(42)]).expect("find");
    repo.subject().set("limit", Value::Null).expect("set");

    write_jsonl(&ProductionFileSystem, &path, &repo.timeline(), 1024).expect("write export");
    let text = std::fs::read_to_string(&path).expect("read export");
    assert_eq!(text, repo.export_jsonl().expect("export"));

    let parsed = parse_jsonl(&text).expect("parse export");
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].member, "find");
    assert_eq!(parsed[0].arguments, vec![json!(42)]);
    assert_eq!(parsed[0].result, Some(json!({ "id": 42 })));
    assert_eq!(parsed[1].kind, InfoKind::PropertySetter);
    assert_eq!(parsed[1].arguments, vec![Value::Null]);
    assert_eq!(parsed[1].result, None);
}

#[test]
fn export_limit_comes_from_config() {
    let config = parse_config("[export]\nmax_value_bytes = 32\n").expect("config");
    let handle = MockBuilder::from_config(config)
        .counter(GlobalSequenceCounter::isolated())
        .setup(&Setup::new().method("echo", |args| Ok(args.first().cloned())))
        .build()
        .expect("mock");
    handle
        .subject()
        .call("echo", &[json!("y".repeat(100))])
        .expect("echo");

    let parsed = parse_jsonl(&handle.export_jsonl().expect("export")).expect("parse");
    assert!(parsed[0].truncated);
    let marker = parsed[0].arguments[0].as_str().expect("marker");
    assert!(marker.starts_with("<hash:sha256:"));
    assert_eq!(parsed[0].result, Some(json!(marker)));
}

// ── configuration ─────────────────────────────────────────────────────────────

#[test]
fn config_file_enables_failure_recording_and_logging() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log_path = dir.path().join("mock-events.jsonl");
    let config_path = dir.path().join("spyglass.toml");
    let fs = FakeFileSystem::with_file(
        &config_path,
        format!(
            "[recording]\nrecord_failures = true\n\n[log]\npath = {:?}\n",
            log_path.display().to_string()
        ),
    );
    let config = load_config(Some(&config_path), &fs).expect("load config");
    assert!(config.recording.record_failures);

    let handle = MockBuilder::from_config(config)
        .counter(GlobalSequenceCounter::isolated())
        .setup(
            &Setup::new()
                .method("fail", |_| Err(CallError::new(json!({ "code": 7 }))))
                .method("ok", |_| Ok(None)),
        )
        .build()
        .expect("mock");

    let err = handle.subject().call("fail", &[json!(1)]).expect_err("raised");
    assert_eq!(err, MockError::Raised(CallError::new(json!({ "code": 7 }))));
    handle.subject().call("ok", &[]).expect("ok");

    let failed = handle.method("fail").and_then(|m| m.get_data(0)).expect("failed call recorded");
    assert_eq!(failed.global_no(), 0);
    assert_eq!(failed.result(), None);
    assert_eq!(failed.raised().map(CallError::value), Some(&json!({ "code": 7 })));
    assert_eq!(
        handle.method("ok").and_then(|m| m.get_data(0)).map(|r| r.global_no()),
        Some(1)
    );

    let events = read_events(&log_path);
    let types = events
        .iter()
        .filter_map(|event| event["event_type"].as_str())
        .collect::<Vec<_>>();
    assert_eq!(types, vec!["mock_built", "invocation_raised", "invocation_recorded"]);
    assert_eq!(events[1]["payload"]["member"], "fail");
}

#[test]
fn default_config_does_not_record_failures() {
    let config = load_config(None, &FakeFileSystem::default()).expect("defaults");
    let handle = MockBuilder::from_config(config)
        .counter(GlobalSequenceCounter::isolated())
        .setup(&Setup::new().method("fail", |_| Err(CallError::new("boom"))))
        .build()
        .expect("mock");
    assert!(handle.subject().call("fail", &[]).is_err());
    assert_eq!(handle.method("fail").map(|m| m.count()), Some(0));
    assert_eq!(handle.counter().current(), 0);
}

#[test]
fn invalid_config_is_rejected() {
    assert!(matches!(
        parse_config("[export]\nmax_value_bytes = 0\n"),
        Err(MockError::InvalidConfig(_))
    ));
    assert!(matches!(
        parse_config("[recording]\nunknown = 1\n"),
        Err(MockError::ConfigParse(_))
    ));
}
