use crate::errors::CallError;
use serde::Serialize;
use serde_json::Value;

/// One captured call. Fields are private: a record cannot change after it
/// has been appended, and the values it holds are copies taken at capture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationRecord {
    no: usize,
    global_no: u64,
    timestamp_ns: u64,
    arguments: Box<[Value]>,
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    raised: Option<CallError>,
}

impl InvocationRecord {
    pub(crate) fn new(
        no: usize,
        global_no: u64,
        timestamp_ns: u64,
        arguments: &[Value],
        result: Option<&Value>,
        raised: Option<&CallError>,
    ) -> Self {
        Self {
            no,
            global_no,
            timestamp_ns,
            arguments: arguments.to_vec().into_boxed_slice(),
            result: result.cloned(),
            raised: raised.cloned(),
        }
    }

    /// Position within the owning recorder's history.
    pub fn no(&self) -> usize {
        self.no
    }

    /// Position across every recorder sharing the same sequence counter.
    pub fn global_no(&self) -> u64 {
        self.global_no
    }

    pub fn timestamp_ns(&self) -> u64 {
        self.timestamp_ns
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    /// `None` when the call returned nothing (setters, void methods).
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// Error the callable raised. Only present when failures are recorded.
    pub fn raised(&self) -> Option<&CallError> {
        self.raised.as_ref()
    }
}
