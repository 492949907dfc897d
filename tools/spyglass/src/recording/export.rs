//! JSONL export of a merged invocation timeline.
//!
//! One `ExportedInvocation` per line, in global order. Values whose JSON
//! rendering is larger than the configured limit are replaced by a short
//! sha256 marker so exports of chatty mocks stay small.

use crate::errors::MockError;
use crate::recording::timeline::TimelineEntry;
use crate::runtime::FileSystem;
use crate::types::InfoKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedInvocation {
    pub member: String,
    pub kind: InfoKind,
    pub no: usize,
    pub global_no: u64,
    pub timestamp_ns: u64,
    pub arguments: Vec<Value>,
    /// Absent for void calls; a JSON `null` result stays `Some(Value::Null)`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_value"
    )]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raised: Option<Value>,
    /// Set when at least one value was replaced by a hash marker.
    #[serde(default)]
    pub truncated: bool,
}

impl ExportedInvocation {
    pub fn from_entry(entry: &TimelineEntry, max_value_bytes: usize) -> Self {
        let record = &entry.record;
        let mut truncated = false;
        let mut clamp = |value: &Value| {
            let (value, cut) = clamp_value(value, max_value_bytes);
            truncated |= cut;
            value
        };
        let arguments = record.arguments().iter().map(&mut clamp).collect();
        let result = record.result().map(&mut clamp);
        let raised = record.raised().map(|error| clamp(error.value()));
        Self {
            member: entry.member.clone(),
            kind: entry.kind,
            no: record.no(),
            global_no: record.global_no(),
            timestamp_ns: record.timestamp_ns(),
            arguments,
            result,
            raised,
            truncated,
        }
    }
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn clamp_value(value: &Value, max_bytes: usize) -> (Value, bool) {
    let rendered = serde_json::to_string(value).unwrap_or_default();
    if rendered.len() <= max_bytes {
        return (value.clone(), false);
    }
    use sha2::{Digest, Sha256};
    let hash = Sha256::digest(rendered.as_bytes());
    // First 8 bytes, 16 hex chars.
    let prefix = hex_bytes(&hash[..8]);
    (Value::String(format!("<hash:sha256:{prefix}>")), true)
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub fn to_jsonl(entries: &[TimelineEntry], max_value_bytes: usize) -> Result<String, MockError> {
    let mut out = String::new();
    for entry in entries {
        let line = serde_json::to_string(&ExportedInvocation::from_entry(entry, max_value_bytes))
            .map_err(|e| MockError::Io(e.to_string()))?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

pub fn write_jsonl(
    fs: &dyn FileSystem,
    path: &Path,
    entries: &[TimelineEntry],
    max_value_bytes: usize,
) -> Result<(), MockError> {
    let text = to_jsonl(entries, max_value_bytes)?;
    fs.write_string(path, &text)
}

pub fn parse_jsonl(text: &str) -> Result<Vec<ExportedInvocation>, MockError> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(|e| MockError::ExportParse(e.to_string())))
        .collect()
}
