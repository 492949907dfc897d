use crate::config::LogConfig;
use crate::errors::MockError;
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 4096;

#[derive(Debug)]
pub struct JsonlLogger {
    pub path: PathBuf,
    pub max_payload_bytes: usize,
    write_lock: Mutex<()>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent<'a> {
    pub level: &'a str,
    pub event_type: &'a str,
    pub payload: Value,
}

impl JsonlLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            write_lock: Mutex::new(()),
        }
    }

    /// Logger for `config`, or `None` when no log path is configured.
    pub fn from_config(config: &LogConfig) -> Option<Self> {
        config.path.as_ref().map(|path| {
            let mut logger = Self::new(path);
            logger.max_payload_bytes = config.max_payload_bytes;
            logger
        })
    }

    pub fn append(&self, event: &LogEvent<'_>) -> Result<(), MockError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| MockError::Io(e.to_string()))?;
        }
        let truncated = truncate_json(event.payload.clone(), self.max_payload_bytes);
        let line = serde_json::to_string(&LogEvent {
            level: event.level,
            event_type: event.event_type,
            payload: truncated,
        })
        .map_err(|e| MockError::Io(e.to_string()))?;

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| MockError::Io(e.to_string()))?;
        file.write_all(line.as_bytes())
            .map_err(|e| MockError::Io(e.to_string()))?;
        file.write_all(b"\n")
            .map_err(|e| MockError::Io(e.to_string()))
    }

    /// Best-effort append; a failed write never disturbs the mock.
    pub fn emit(&self, level: &str, event_type: &str, payload: Value) {
        let _ = self.append(&LogEvent {
            level,
            event_type,
            payload,
        });
    }
}

fn truncate_json(value: Value, max_bytes: usize) -> Value {
    let rendered = serde_json::to_string(&value).unwrap_or_default();
    if rendered.len() <= max_bytes {
        return value;
    }
    let mut cut = max_bytes.saturating_sub(3);
    while !rendered.is_char_boundary(cut) {
        cut -= 1;
    }
    Value::String(format!("{}...", &rendered[..cut]))
}
