use crate::recording::record::InvocationRecord;
use crate::types::InfoKind;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// History of one intercepted callable: a method, or one side of an accessor.
///
/// Clones share the same history, so the copy held by the instrumented
/// callable and the copy handed out by a mock handle always agree.
#[derive(Debug, Clone)]
pub struct MemberRecorder {
    kind: InfoKind,
    history: Arc<Mutex<Vec<Arc<InvocationRecord>>>>,
}

impl MemberRecorder {
    pub(crate) fn new(kind: InfoKind) -> Self {
        Self {
            kind,
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn kind(&self) -> InfoKind {
        self.kind
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Record of call `index`, or `None` when no such call has been captured.
    pub fn get_data(&self, index: usize) -> Option<Arc<InvocationRecord>> {
        self.lock().get(index).cloned()
    }

    pub fn arguments(&self, index: usize) -> Option<Vec<Value>> {
        self.get_data(index)
            .map(|record| record.arguments().to_vec())
    }

    pub fn last(&self) -> Option<Arc<InvocationRecord>> {
        self.lock().last().cloned()
    }

    /// Snapshot of the full history at this moment.
    pub fn records(&self) -> Vec<Arc<InvocationRecord>> {
        self.lock().clone()
    }

    /// Drops every captured record. Later calls are numbered from 0 again;
    /// the global sequence is left alone.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn shares_history_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.history, &other.history)
    }

    /// Appends the record built by `build`, which receives the local index
    /// the record will occupy. Index assignment and append happen under one
    /// lock.
    pub(crate) fn append_with(
        &self,
        build: impl FnOnce(usize) -> InvocationRecord,
    ) -> Arc<InvocationRecord> {
        let mut history = self.lock();
        let record = Arc::new(build(history.len()));
        history.push(Arc::clone(&record));
        record
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<InvocationRecord>>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Getter and setter histories of one accessor. Either side may be missing.
#[derive(Debug, Clone)]
pub struct PropertyRecorder {
    get: Option<MemberRecorder>,
    set: Option<MemberRecorder>,
}

impl PropertyRecorder {
    pub(crate) fn new(get: Option<MemberRecorder>, set: Option<MemberRecorder>) -> Self {
        Self { get, set }
    }

    pub fn kind(&self) -> InfoKind {
        InfoKind::Property
    }

    pub fn get(&self) -> Option<&MemberRecorder> {
        self.get.as_ref()
    }

    pub fn set(&self) -> Option<&MemberRecorder> {
        self.set.as_ref()
    }
}

/// What a mock handle knows about one instrumented member.
#[derive(Debug, Clone)]
pub enum MemberInfo {
    Method(MemberRecorder),
    Property(PropertyRecorder),
}

impl MemberInfo {
    pub fn kind(&self) -> InfoKind {
        match self {
            Self::Method(recorder) => recorder.kind(),
            Self::Property(property) => property.kind(),
        }
    }

    pub fn as_method(&self) -> Option<&MemberRecorder> {
        match self {
            Self::Method(recorder) => Some(recorder),
            Self::Property(_) => None,
        }
    }

    pub fn as_property(&self) -> Option<&PropertyRecorder> {
        match self {
            Self::Method(_) => None,
            Self::Property(property) => Some(property),
        }
    }

    /// Every recorder behind this member: one for a method, up to two for a
    /// property.
    pub fn recorders(&self) -> Vec<&MemberRecorder> {
        match self {
            Self::Method(recorder) => vec![recorder],
            Self::Property(property) => property.get().into_iter().chain(property.set()).collect(),
        }
    }
}
