//! Setup descriptions: which members a mock carries and how each behaves.

use crate::errors::CallError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// `Ok(None)` is a void return; `Ok(Some(Value::Null))` is a real null.
pub type CallResult = Result<Option<Value>, CallError>;

pub type Callable = Arc<dyn Fn(&[Value]) -> CallResult + Send + Sync>;

#[derive(Clone)]
pub enum SetupMember {
    Value(Value),
    Method(Callable),
    Accessor {
        get: Option<Callable>,
        set: Option<Callable>,
    },
}

impl fmt::Debug for SetupMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Method(_) => f.write_str("Method(..)"),
            Self::Accessor { get, set } => f
                .debug_struct("Accessor")
                .field("get", &get.is_some())
                .field("set", &set.is_some())
                .finish(),
        }
    }
}

/// Enumerates the own members of a setup description.
pub trait MemberSource {
    fn own_members(&self) -> Vec<(String, SetupMember)>;
}

/// Builder-style setup description.
///
/// Defining a getter and a setter under the same name yields one accessor.
/// Defining a name again with a different kind replaces the earlier member.
#[derive(Clone, Default, Debug)]
pub struct Setup {
    members: BTreeMap<String, SetupMember>,
}

impl Setup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members
            .insert(name.into(), SetupMember::Value(value.into()));
        self
    }

    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value]) -> CallResult + Send + Sync + 'static,
    {
        self.members
            .insert(name.into(), SetupMember::Method(Arc::new(f)));
        self
    }

    pub fn getter<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Result<Value, CallError> + Send + Sync + 'static,
    {
        let callable: Callable = Arc::new(move |_args: &[Value]| f().map(Some));
        let name = name.into();
        match self.members.get_mut(&name) {
            Some(SetupMember::Accessor { get, .. }) => *get = Some(callable),
            _ => {
                self.members.insert(
                    name,
                    SetupMember::Accessor {
                        get: Some(callable),
                        set: None,
                    },
                );
            }
        }
        self
    }

    pub fn setter<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value) -> Result<(), CallError> + Send + Sync + 'static,
    {
        let callable: Callable = Arc::new(move |args: &[Value]| {
            let value = args.first().cloned().unwrap_or(Value::Null);
            f(value).map(|()| None)
        });
        let name = name.into();
        match self.members.get_mut(&name) {
            Some(SetupMember::Accessor { set, .. }) => *set = Some(callable),
            _ => {
                self.members.insert(
                    name,
                    SetupMember::Accessor {
                        get: None,
                        set: Some(callable),
                    },
                );
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl MemberSource for Setup {
    fn own_members(&self) -> Vec<(String, SetupMember)> {
        self.members
            .iter()
            .map(|(name, member)| (name.clone(), member.clone()))
            .collect()
    }
}
