use crate::error::ConfigError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fs;

/// Named on/off switches consulted by `feature_branch` action nodes, such as
/// whether to include the extended exam section.
///
/// Serialized as a plain JSON object: `{ "extended_exam": true }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuntimeFlags {
    flags: AHashMap<String, bool>,
}

impl RuntimeFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style flag setter.
    pub fn with(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.set(name, enabled);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, enabled: bool) {
        self.flags.insert(name.into(), enabled);
    }

    /// Unknown flags are disabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::JsonParseError(e.to_string()))
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }
}

/// Default cap on node transitions within a single engine operation.
pub const DEFAULT_MAX_TRANSITIONS: usize = 10_000;

/// Limits applied by the engine controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Upper bound on nodes visited while settling one answer (action
    /// unwinding, auto-skips and loop iterations included). Reaching it
    /// finishes the flow instead of spinning forever.
    #[serde(default = "EngineConfig::default_max_transitions")]
    pub max_transitions: usize,
}

impl EngineConfig {
    fn default_max_transitions() -> usize {
        DEFAULT_MAX_TRANSITIONS
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::JsonParseError(e.to_string()))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_transitions: DEFAULT_MAX_TRANSITIONS,
        }
    }
}
