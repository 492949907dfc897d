use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error raised by a setup callable. Carries whatever value the callable
/// chose to raise; instrumentation hands it back to the caller untouched.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("callable raised: {0}")]
pub struct CallError(pub Value);

impl CallError {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &Value {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MockError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unknown member: {0}")]
    UnknownMember(String),
    #[error("member is not callable: {0}")]
    NotCallable(String),
    #[error("member is not readable: {0}")]
    NotReadable(String),
    #[error("member is not writable: {0}")]
    NotWritable(String),
    #[error("subject is frozen: cannot modify {0}")]
    Frozen(String),
    #[error(transparent)]
    Raised(#[from] CallError),
    #[error("io error: {0}")]
    Io(String),
    #[error("config parse error: {0}")]
    ConfigParse(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("export parse error: {0}")]
    ExportParse(String),
}
