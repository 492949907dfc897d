//! Invocation recording.
//!
//! # Overview
//!
//! Every intercepted callable owns a `MemberRecorder`. The instrumentation
//! layer wraps the callable, and each successful call appends one immutable
//! `InvocationRecord` carrying two numbers:
//! 1. **no** – position in that recorder's own history
//! 2. **global_no** – position across every recorder sharing a sequence counter
//!
//! Accessors pair a getter recorder and a setter recorder under one
//! `PropertyRecorder`. The timeline and export modules merge histories back
//! into one globally ordered view.

pub mod export;
pub mod instrument;
pub mod record;
pub mod recorder;
pub mod timeline;
