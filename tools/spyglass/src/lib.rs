//! Recording test doubles.
//!
//! Describe the members a stand-in should carry with a [`Setup`], build it
//! with [`mock`] or graft it onto an existing [`Subject`] with
//! [`partial_mock`], exercise the subject, then read back what happened
//! through the recorders on the returned [`MockHandle`].

pub mod builder;
pub mod config;
pub mod errors;
pub mod logging;
pub mod recording;
pub mod runtime;
pub mod sequence;
pub mod setup;
pub mod subject;
pub mod types;

pub use builder::{timeline_of, MockBuilder, MockHandle};
pub use errors::{CallError, MockError};
pub use recording::record::InvocationRecord;
pub use recording::recorder::{MemberInfo, MemberRecorder, PropertyRecorder};
pub use sequence::GlobalSequenceCounter;
pub use setup::{CallResult, Callable, MemberSource, Setup, SetupMember};
pub use subject::Subject;
pub use types::InfoKind;

/// Builds a fresh, frozen subject from `setup`, numbered by the process-wide
/// counter.
pub fn mock(setup: &dyn MemberSource) -> Result<MockHandle, MockError> {
    MockBuilder::new().setup(setup).build()
}

/// Instruments `subject` in place with the members of `setup`.
///
/// Fails with [`MockError::InvalidArgument`] and leaves `subject` untouched
/// when it is already frozen.
pub fn partial_mock(subject: &Subject, setup: &dyn MemberSource) -> Result<MockHandle, MockError> {
    MockBuilder::partial().subject(subject).setup(setup).build()
}

/// Restarts the process-wide invocation numbering at 0.
pub fn reset_global_mock_invocation_no() {
    GlobalSequenceCounter::global().reset();
}

/// Number the next call captured against the process-wide counter will get.
pub fn global_mock_invocation_no() -> u64 {
    GlobalSequenceCounter::global().current()
}
