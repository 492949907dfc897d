//! Tests against the process-wide counter. They share one counter, so each
//! holds `SERIAL` for its whole body.

use serde_json::json;
use spyglass::{
    global_mock_invocation_no, mock, reset_global_mock_invocation_no, timeline_of,
    GlobalSequenceCounter, InfoKind, MockBuilder, Setup,
};
use std::sync::{Mutex, MutexGuard, PoisonError};

static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    let guard = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
    reset_global_mock_invocation_no();
    guard
}

fn contract_setup() -> Setup {
    Setup::new()
        .setter("property", |_| Ok(()))
        .getter("readonlyProperty", || Ok(json!("bar")))
        .method("voidMethod", |_| Ok(None))
        .method("returningMethod", |_| Ok(Some(json!({ "x": 0, "y": 0 }))))
}

#[test]
fn global_numbers_follow_call_order_across_members() {
    let _serial = serial();
    let handle = mock(&contract_setup()).expect("mock");
    let subject = handle.subject();

    subject.set("property", 0).expect("set");
    subject.call("voidMethod", &[]).expect("call");
    let read = subject.get("readonlyProperty").expect("get");
    let returned = subject.call("returningMethod", &[]).expect("call");

    assert_eq!(read, Some(json!("bar")));
    assert_eq!(returned, Some(json!({ "x": 0, "y": 0 })));

    let global_no = |name: &str| {
        handle
            .get_member_info(name)
            .and_then(|info| info.recorders().first().and_then(|r| r.get_data(0)))
            .map(|record| record.global_no())
    };
    assert_eq!(global_no("property"), Some(0));
    assert_eq!(global_no("voidMethod"), Some(1));
    assert_eq!(global_no("readonlyProperty"), Some(2));
    assert_eq!(global_no("returningMethod"), Some(3));
    assert_eq!(global_mock_invocation_no(), 4);
}

#[test]
fn global_numbers_interleave_across_independent_mocks() {
    let _serial = serial();
    let first = mock(&Setup::new().method("ping", |_| Ok(None))).expect("mock");
    let second = mock(&Setup::new().method("pong", |_| Ok(None))).expect("mock");

    for _ in 0..3 {
        first.subject().call("ping", &[]).expect("ping");
        second.subject().call("pong", &[]).expect("pong");
    }

    let timeline = timeline_of(&[&first, &second]);
    let order = timeline
        .iter()
        .map(|entry| (entry.member.as_str(), entry.record.no(), entry.record.global_no()))
        .collect::<Vec<_>>();
    assert_eq!(
        order,
        vec![
            ("ping", 0, 0),
            ("pong", 0, 1),
            ("ping", 1, 2),
            ("pong", 1, 3),
            ("ping", 2, 4),
            ("pong", 2, 5),
        ]
    );
    assert!(timeline.iter().all(|entry| entry.kind == InfoKind::Method));
    assert_eq!(global_mock_invocation_no(), 6);
}

#[test]
fn reset_restarts_numbering_at_zero() {
    let _serial = serial();
    let handle = mock(&Setup::new().method("tick", |_| Ok(None))).expect("mock");
    handle.subject().call("tick", &[]).expect("tick");
    handle.subject().call("tick", &[]).expect("tick");
    assert_eq!(global_mock_invocation_no(), 2);

    reset_global_mock_invocation_no();
    assert_eq!(global_mock_invocation_no(), 0);

    handle.subject().call("tick", &[]).expect("tick");
    let record = handle.method("tick").and_then(|m| m.get_data(2)).expect("third call");
    assert_eq!(record.no(), 2);
    assert_eq!(record.global_no(), 0);
}

#[test]
fn clearing_a_recorder_leaves_the_global_counter_alone() {
    let _serial = serial();
    let handle = mock(&Setup::new().method("tick", |_| Ok(None))).expect("mock");
    handle.subject().call("tick", &[]).expect("tick");
    handle.subject().call("tick", &[]).expect("tick");
    handle.method("tick").expect("method").clear();
    assert_eq!(global_mock_invocation_no(), 2);
}

#[test]
fn isolated_counters_do_not_touch_the_global_one() {
    let _serial = serial();
    let counter = GlobalSequenceCounter::isolated();
    let handle = MockBuilder::new()
        .counter(counter.clone())
        .setup(&Setup::new().method("tick", |_| Ok(None)))
        .build()
        .expect("mock");
    handle.subject().call("tick", &[]).expect("tick");
    assert_eq!(counter.current(), 1);
    assert_eq!(global_mock_invocation_no(), 0);
    assert!(!handle.counter().shares_state_with(&GlobalSequenceCounter::global()));
}

#[test]
fn concurrent_calls_produce_gapless_unique_numbers() {
    let _serial = serial();
    let handle = mock(
        &Setup::new()
            .method("left", |_| Ok(None))
            .method("right", |_| Ok(None)),
    )
    .expect("mock");

    std::thread::scope(|scope| {
        for name in ["left", "right", "left", "right"] {
            let subject = handle.subject().clone();
            scope.spawn(move || {
                for _ in 0..50 {
                    subject.call(name, &[]).expect("call");
                }
            });
        }
    });

    let mut global = handle
        .timeline()
        .iter()
        .map(|entry| entry.record.global_no())
        .collect::<Vec<_>>();
    global.sort_unstable();
    assert_eq!(global, (0..200).collect::<Vec<u64>>());

    for name in ["left", "right"] {
        let recorder = handle.method(name).expect("method");
        let local = recorder.records().iter().map(|r| r.no()).collect::<Vec<_>>();
        assert_eq!(local, (0..100).collect::<Vec<usize>>());
    }
}
