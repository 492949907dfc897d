use crate::errors::MockError;
use crate::logging::DEFAULT_MAX_PAYLOAD_BYTES;
use crate::runtime::FileSystem;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_VALUE_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MockConfig {
    pub recording: RecordingConfig,
    pub export: ExportConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RecordingConfig {
    /// Append a record (with the raised error) when a callable fails.
    pub record_failures: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportConfig {
    pub max_value_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub path: Option<PathBuf>,
    pub max_payload_bytes: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_value_bytes: DEFAULT_MAX_VALUE_BYTES,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialMockConfig {
    recording: Option<PartialRecordingConfig>,
    export: Option<PartialExportConfig>,
    log: Option<PartialLogConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialRecordingConfig {
    record_failures: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialExportConfig {
    max_value_bytes: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialLogConfig {
    path: Option<PathBuf>,
    max_payload_bytes: Option<usize>,
}

/// Defaults, overlaid with the TOML file at `path` when one is given.
pub fn load_config(path: Option<&Path>, fs: &dyn FileSystem) -> Result<MockConfig, MockError> {
    let mut cfg = MockConfig::default();
    if let Some(path) = path {
        let file_contents = fs.read_to_string(path)?;
        let partial: PartialMockConfig = toml::from_str(&file_contents)
            .map_err(|e| MockError::ConfigParse(e.to_string()))?;
        merge_partial_config(&mut cfg, partial);
    }
    validate_config(&cfg)?;
    Ok(cfg)
}

pub fn parse_config(text: &str) -> Result<MockConfig, MockError> {
    let partial: PartialMockConfig =
        toml::from_str(text).map_err(|e| MockError::ConfigParse(e.to_string()))?;
    let mut cfg = MockConfig::default();
    merge_partial_config(&mut cfg, partial);
    validate_config(&cfg)?;
    Ok(cfg)
}

fn merge_partial_config(cfg: &mut MockConfig, partial: PartialMockConfig) {
    if let Some(recording) = partial.recording {
        if let Some(record_failures) = recording.record_failures {
            cfg.recording.record_failures = record_failures;
        }
    }

    if let Some(export) = partial.export {
        if let Some(max_value_bytes) = export.max_value_bytes {
            cfg.export.max_value_bytes = max_value_bytes;
        }
    }

    if let Some(log) = partial.log {
        if let Some(path) = log.path {
            cfg.log.path = Some(path);
        }
        if let Some(max_payload_bytes) = log.max_payload_bytes {
            cfg.log.max_payload_bytes = max_payload_bytes;
        }
    }
}

pub fn validate_config(cfg: &MockConfig) -> Result<(), MockError> {
    if cfg.export.max_value_bytes == 0 {
        return Err(MockError::InvalidConfig(
            "export.max_value_bytes must be greater than zero".to_string(),
        ));
    }
    if cfg.log.max_payload_bytes == 0 {
        return Err(MockError::InvalidConfig(
            "log.max_payload_bytes must be greater than zero".to_string(),
        ));
    }
    if cfg
        .log
        .path
        .as_ref()
        .is_some_and(|path| path.as_os_str().is_empty())
    {
        return Err(MockError::InvalidConfig("log.path must not be empty".to_string()));
    }
    Ok(())
}
