use crate::recording::record::InvocationRecord;
use crate::recording::recorder::MemberInfo;
use crate::types::InfoKind;
use std::sync::Arc;

/// One record placed on the merged timeline.
#[derive(Debug, Clone)]
pub struct TimelineEntry {
    pub member: String,
    /// `Method`, `PropertyGetter` or `PropertySetter`.
    pub kind: InfoKind,
    pub record: Arc<InvocationRecord>,
}

/// Merges the histories of `members` into one list ordered by `global_no`.
///
/// Only meaningful for recorders numbered by the same sequence counter.
pub fn merge<'a>(members: impl IntoIterator<Item = (&'a str, &'a MemberInfo)>) -> Vec<TimelineEntry> {
    let mut entries = Vec::new();
    for (name, info) in members {
        for recorder in info.recorders() {
            entries.extend(recorder.records().into_iter().map(|record| TimelineEntry {
                member: name.to_string(),
                kind: recorder.kind(),
                record,
            }));
        }
    }
    entries.sort_by_key(|entry| entry.record.global_no());
    entries
}
