//! The object a test exercises: named value, method and accessor slots.
//!
//! A `Subject` is a shared handle; clones refer to the same object and
//! `ptr_eq` compares identity. Freezing follows object-freeze rules: no slot
//! can be added, replaced or reassigned afterwards, but accessor setters
//! still run.

use crate::errors::MockError;
use crate::setup::{CallResult, Callable, MemberSource, SetupMember};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct SubjectState {
    slots: BTreeMap<String, SetupMember>,
    frozen: bool,
}

#[derive(Clone, Default)]
pub struct Subject {
    state: Arc<Mutex<SubjectState>>,
}

impl Subject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unfrozen, uninstrumented subject holding every member of `source`.
    pub fn from_source(source: &dyn MemberSource) -> Self {
        let subject = Self::new();
        subject.lock().slots.extend(source.own_members());
        subject
    }

    pub fn get(&self, name: &str) -> Result<Option<Value>, MockError> {
        let getter = match self.slot(name)? {
            SetupMember::Value(value) => return Ok(Some(value)),
            SetupMember::Method(_) => return Err(MockError::NotReadable(name.to_string())),
            SetupMember::Accessor { get, .. } => get,
        };
        match getter {
            Some(getter) => invoke(&getter, &[]),
            None => Ok(None),
        }
    }

    /// Runs the accessor's setter when there is one. Otherwise stores `value`
    /// as a plain value, replacing a value or method slot, unless frozen.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), MockError> {
        let value = value.into();
        let setter = {
            let mut state = self.lock();
            let frozen = state.frozen;
            let setter = match state.slots.get(name) {
                Some(SetupMember::Accessor { set: Some(set), .. }) => Some(Arc::clone(set)),
                Some(SetupMember::Accessor { set: None, .. }) => {
                    return Err(MockError::NotWritable(name.to_string()));
                }
                Some(SetupMember::Value(_)) | Some(SetupMember::Method(_)) | None if frozen => {
                    return Err(MockError::Frozen(name.to_string()));
                }
                Some(SetupMember::Value(_)) | Some(SetupMember::Method(_)) | None => None,
            };
            match setter {
                Some(setter) => setter,
                None => {
                    state
                        .slots
                        .insert(name.to_string(), SetupMember::Value(value));
                    return Ok(());
                }
            }
        };
        invoke(&setter, &[value]).map(|_| ())
    }

    pub fn call(&self, name: &str, args: &[Value]) -> Result<Option<Value>, MockError> {
        match self.slot(name)? {
            SetupMember::Method(method) => invoke(&method, args),
            SetupMember::Value(_) | SetupMember::Accessor { .. } => {
                Err(MockError::NotCallable(name.to_string()))
            }
        }
    }

    pub fn define_value(&self, name: impl Into<String>, value: impl Into<Value>) -> Result<(), MockError> {
        self.define(name.into(), SetupMember::Value(value.into()))
    }

    pub fn define_method<F>(&self, name: impl Into<String>, f: F) -> Result<(), MockError>
    where
        F: Fn(&[Value]) -> CallResult + Send + Sync + 'static,
    {
        self.define(name.into(), SetupMember::Method(Arc::new(f)))
    }

    pub fn define_accessor(
        &self,
        name: impl Into<String>,
        get: Option<Callable>,
        set: Option<Callable>,
    ) -> Result<(), MockError> {
        self.define(name.into(), SetupMember::Accessor { get, set })
    }

    pub fn freeze(&self) {
        self.lock().frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.lock().frozen
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().slots.contains_key(name)
    }

    pub fn member_names(&self) -> Vec<String> {
        self.lock().slots.keys().cloned().collect()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Installs every slot, or none of them when the subject is frozen.
    pub(crate) fn overlay(&self, slots: Vec<(String, SetupMember)>) -> Result<(), MockError> {
        let mut state = self.lock();
        if state.frozen {
            return Err(MockError::Frozen("subject".to_string()));
        }
        state.slots.extend(slots);
        Ok(())
    }

    fn define(&self, name: String, member: SetupMember) -> Result<(), MockError> {
        let mut state = self.lock();
        if state.frozen {
            return Err(MockError::Frozen(name));
        }
        state.slots.insert(name, member);
        Ok(())
    }

    /// Clones the slot out so callables run without the subject locked.
    fn slot(&self, name: &str) -> Result<SetupMember, MockError> {
        self.lock()
            .slots
            .get(name)
            .cloned()
            .ok_or_else(|| MockError::UnknownMember(name.to_string()))
    }

    fn lock(&self) -> MutexGuard<'_, SubjectState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn invoke(callable: &Callable, args: &[Value]) -> Result<Option<Value>, MockError> {
    callable(args).map_err(MockError::Raised)
}

impl fmt::Debug for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Subject")
            .field("members", &state.slots)
            .field("frozen", &state.frozen)
            .finish()
    }
}
