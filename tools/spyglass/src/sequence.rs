//! Invocation numbering shared across mocks.
//!
//! Every captured call takes the next number from a `GlobalSequenceCounter`,
//! which orders calls across independent mock handles. Mocks use the
//! process-wide instance unless built against their own counter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

#[derive(Debug, Clone, Default)]
pub struct GlobalSequenceCounter {
    value: Arc<AtomicU64>,
}

static PROCESS_COUNTER: OnceLock<GlobalSequenceCounter> = OnceLock::new();

impl GlobalSequenceCounter {
    /// A fresh counter starting at 0, independent of the process-wide one.
    pub fn isolated() -> Self {
        Self::default()
    }

    /// The process-wide counter. Clones share its state.
    pub fn global() -> Self {
        PROCESS_COUNTER.get_or_init(Self::default).clone()
    }

    /// Returns the current number and advances the counter by one.
    pub fn next(&self) -> u64 {
        self.value.fetch_add(1, Ordering::SeqCst)
    }

    /// Number the next captured call will receive.
    pub fn current(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.value.store(0, Ordering::SeqCst);
    }

    pub fn shares_state_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}
