use crate::logging::JsonlLogger;
use crate::recording::record::InvocationRecord;
use crate::recording::recorder::MemberRecorder;
use crate::runtime::{Clock, SystemClock};
use crate::sequence::GlobalSequenceCounter;
use crate::setup::{CallResult, Callable};
use serde_json::{json, Value};
use std::sync::Arc;

/// Wraps raw callables so every call lands in a `MemberRecorder`.
#[derive(Clone)]
pub struct InstrumentationFactory {
    counter: GlobalSequenceCounter,
    clock: Arc<dyn Clock>,
    record_failures: bool,
    logger: Option<Arc<JsonlLogger>>,
}

impl InstrumentationFactory {
    pub fn new(counter: GlobalSequenceCounter) -> Self {
        Self {
            counter,
            clock: Arc::new(SystemClock),
            record_failures: false,
            logger: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_record_failures(mut self, record_failures: bool) -> Self {
        self.record_failures = record_failures;
        self
    }

    pub fn with_logger(mut self, logger: Option<Arc<JsonlLogger>>) -> Self {
        self.logger = logger;
        self
    }

    pub fn counter(&self) -> &GlobalSequenceCounter {
        &self.counter
    }

    /// The returned callable runs `original`, records the call into
    /// `recorder`, and hands back exactly what `original` returned.
    ///
    /// A failing call propagates its error untouched. It is recorded only
    /// when failure recording is enabled.
    pub fn wrap(&self, member: &str, original: Callable, recorder: MemberRecorder) -> Callable {
        let factory = self.clone();
        let member = member.to_string();
        Arc::new(move |args: &[Value]| {
            let outcome = original(args);
            factory.capture(&member, &recorder, args, &outcome);
            outcome
        })
    }

    fn capture(&self, member: &str, recorder: &MemberRecorder, args: &[Value], outcome: &CallResult) {
        let (result, raised) = match outcome {
            Ok(result) => (result.as_ref(), None),
            Err(error) if self.record_failures => (None, Some(error)),
            Err(error) => {
                self.log(
                    "warn",
                    "invocation_raised",
                    json!({
                        "member": member,
                        "kind": recorder.kind().as_str(),
                        "recorded": false,
                        "error": error.value(),
                    }),
                );
                return;
            }
        };

        let record = recorder.append_with(|no| {
            InvocationRecord::new(
                no,
                self.counter.next(),
                self.clock.timestamp_ns(),
                args,
                result,
                raised,
            )
        });

        let event_type = if raised.is_some() {
            "invocation_raised"
        } else {
            "invocation_recorded"
        };
        self.log(
            "debug",
            event_type,
            json!({
                "member": member,
                "kind": recorder.kind().as_str(),
                "no": record.no(),
                "global_no": record.global_no(),
                "argument_count": record.arguments().len(),
                "recorded": true,
            }),
        );
    }

    fn log(&self, level: &str, event_type: &str, payload: Value) {
        if let Some(logger) = &self.logger {
            logger.emit(level, event_type, payload);
        }
    }
}
