//! Turns a setup description into an instrumented subject.

use crate::config::MockConfig;
use crate::errors::MockError;
use crate::logging::JsonlLogger;
use crate::recording::export::to_jsonl;
use crate::recording::instrument::InstrumentationFactory;
use crate::recording::recorder::{MemberInfo, MemberRecorder, PropertyRecorder};
use crate::recording::timeline::{merge, TimelineEntry};
use crate::runtime::{Clock, SystemClock};
use crate::sequence::GlobalSequenceCounter;
use crate::setup::{Callable, MemberSource, SetupMember};
use crate::subject::Subject;
use crate::types::InfoKind;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

enum Target {
    Fresh,
    Existing(Option<Subject>),
}

pub struct MockBuilder {
    members: Option<Vec<(String, SetupMember)>>,
    target: Target,
    counter: GlobalSequenceCounter,
    clock: Arc<dyn Clock>,
    config: MockConfig,
    logger: Option<Arc<JsonlLogger>>,
}

impl Default for MockBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBuilder {
    /// Full mock: a fresh subject, frozen once built.
    pub fn new() -> Self {
        Self {
            members: None,
            target: Target::Fresh,
            counter: GlobalSequenceCounter::global(),
            clock: Arc::new(SystemClock),
            config: MockConfig::default(),
            logger: None,
        }
    }

    /// Partial mock: instruments the subject passed to [`MockBuilder::subject`].
    pub fn partial() -> Self {
        Self {
            target: Target::Existing(None),
            ..Self::new()
        }
    }

    /// Builder using `config`, logging to the configured path when one is set.
    pub fn from_config(config: MockConfig) -> Self {
        let logger = JsonlLogger::from_config(&config.log).map(Arc::new);
        Self {
            config,
            logger,
            ..Self::new()
        }
    }

    pub fn setup(mut self, source: &dyn MemberSource) -> Self {
        self.members = Some(source.own_members());
        self
    }

    /// Instruments `subject` in place instead of building a fresh one.
    pub fn subject(mut self, subject: &Subject) -> Self {
        self.target = Target::Existing(Some(subject.clone()));
        self
    }

    pub fn counter(mut self, counter: GlobalSequenceCounter) -> Self {
        self.counter = counter;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(mut self, config: MockConfig) -> Self {
        self.config = config;
        self
    }

    pub fn logger(mut self, logger: JsonlLogger) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    pub fn build(self) -> Result<MockHandle, MockError> {
        let existing = match &self.target {
            Target::Fresh => None,
            Target::Existing(None) => {
                return Err(self.reject("subject is required for a partial mock"));
            }
            Target::Existing(Some(subject)) => Some(subject.clone()),
        };
        let Some(members) = self.members.clone() else {
            return Err(self.reject("setup is required"));
        };
        let duplicate = {
            let mut seen = BTreeSet::new();
            members
                .iter()
                .find_map(|(name, _)| (!seen.insert(name.as_str())).then(|| name.clone()))
        };
        if let Some(name) = duplicate {
            return Err(self.reject(&format!("setup member {name} is defined more than once")));
        }
        if existing.as_ref().is_some_and(Subject::is_frozen) {
            return Err(self.reject("subject is frozen"));
        }

        let factory = InstrumentationFactory::new(self.counter.clone())
            .with_clock(Arc::clone(&self.clock))
            .with_record_failures(self.config.recording.record_failures)
            .with_logger(self.logger.clone());

        let mut mocked_members = BTreeSet::new();
        let mut infos = BTreeMap::new();
        let mut slots = Vec::with_capacity(members.len());
        for (name, member) in members {
            mocked_members.insert(name.clone());
            let slot = match member {
                SetupMember::Value(value) => SetupMember::Value(value),
                SetupMember::Method(method) => {
                    let recorder = MemberRecorder::new(InfoKind::Method);
                    let wrapped = factory.wrap(&name, method, recorder.clone());
                    infos.insert(name.clone(), MemberInfo::Method(recorder));
                    SetupMember::Method(wrapped)
                }
                SetupMember::Accessor { get, set } => {
                    let (get, get_recorder) =
                        instrument_side(&factory, &name, get, InfoKind::PropertyGetter);
                    let (set, set_recorder) =
                        instrument_side(&factory, &name, set, InfoKind::PropertySetter);
                    infos.insert(
                        name.clone(),
                        MemberInfo::Property(PropertyRecorder::new(get_recorder, set_recorder)),
                    );
                    SetupMember::Accessor { get, set }
                }
            };
            slots.push((name, slot));
        }

        let partial = existing.is_some();
        let subject = match existing {
            Some(subject) => {
                subject
                    .overlay(slots)
                    .map_err(|_| self.reject("subject is frozen"))?;
                subject
            }
            None => {
                let subject = Subject::new();
                subject.overlay(slots)?;
                subject.freeze();
                subject
            }
        };

        self.log(
            "info",
            if partial { "partial_mock_built" } else { "mock_built" },
            json!({
                "members": mocked_members.len(),
                "instrumented": infos.len(),
                "passthrough": mocked_members.len() - infos.len(),
            }),
        );

        Ok(MockHandle {
            subject,
            mocked_members,
            infos,
            counter: self.counter,
            max_value_bytes: self.config.export.max_value_bytes,
            logger: self.logger,
        })
    }

    fn reject(&self, reason: &str) -> MockError {
        self.log("warn", "mock_rejected", json!({ "reason": reason }));
        MockError::InvalidArgument(reason.to_string())
    }

    fn log(&self, level: &str, event_type: &str, payload: Value) {
        if let Some(logger) = &self.logger {
            logger.emit(level, event_type, payload);
        }
    }
}

fn instrument_side(
    factory: &InstrumentationFactory,
    name: &str,
    side: Option<Callable>,
    kind: InfoKind,
) -> (Option<Callable>, Option<MemberRecorder>) {
    match side {
        Some(callable) => {
            let recorder = MemberRecorder::new(kind);
            (
                Some(factory.wrap(name, callable, recorder.clone())),
                Some(recorder),
            )
        }
        None => (None, None),
    }
}

/// A built mock: the subject under test plus its recorded history.
///
/// Nothing on the handle can be changed after construction; only the
/// recorders it hands out accumulate (and can clear) history.
#[derive(Debug)]
pub struct MockHandle {
    subject: Subject,
    mocked_members: BTreeSet<String>,
    infos: BTreeMap<String, MemberInfo>,
    counter: GlobalSequenceCounter,
    max_value_bytes: usize,
    logger: Option<Arc<JsonlLogger>>,
}

impl MockHandle {
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// Every setup member name, instrumented or passthrough.
    pub fn mocked_members(&self) -> &BTreeSet<String> {
        &self.mocked_members
    }

    /// `None` for passthrough values and names the setup never mentioned.
    pub fn get_member_info(&self, name: &str) -> Option<&MemberInfo> {
        self.infos.get(name)
    }

    pub fn method(&self, name: &str) -> Option<&MemberRecorder> {
        self.infos.get(name).and_then(MemberInfo::as_method)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyRecorder> {
        self.infos.get(name).and_then(MemberInfo::as_property)
    }

    pub fn counter(&self) -> &GlobalSequenceCounter {
        &self.counter
    }

    /// Clears every recorder of this mock. Other mocks and the sequence
    /// counter are untouched.
    pub fn clear_all(&self) {
        for (name, info) in &self.infos {
            for recorder in info.recorders() {
                recorder.clear();
            }
            if let Some(logger) = &self.logger {
                logger.emit("debug", "recorder_cleared", json!({ "member": name }));
            }
        }
    }

    /// This mock's calls in global order.
    pub fn timeline(&self) -> Vec<TimelineEntry> {
        timeline_of(&[self])
    }

    pub fn export_jsonl(&self) -> Result<String, MockError> {
        to_jsonl(&self.timeline(), self.max_value_bytes)
    }
}

/// Calls of several mocks in global order. The mocks should share a counter.
pub fn timeline_of(handles: &[&MockHandle]) -> Vec<TimelineEntry> {
    merge(handles.iter().copied().flat_map(|handle| {
        handle
            .infos
            .iter()
            .map(|(name, info)| (name.as_str(), info))
    }))
}
