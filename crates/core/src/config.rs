//! Configuration for the simulation core.
//!
//! This module defines the settings that parameterize a run. It provides:
//! 1. **Defaults:** Baseline constants for stacks, scheduling and drive strengths.
//! 2. **Structures:** Hierarchical config for general, VM and network settings.
//! 3. **Loading:** JSON parsing from a string or a file.
//!
//! Every field has a default, so an empty JSON object is a valid configuration.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::error::ConfigError;
use crate::logic::Strength;

/// Default configuration constants.
mod defaults {
    use crate::logic::Strength;

    /// Entries reserved up front in each of a thread's four value stacks.
    pub const STACK_CAPACITY: usize = 32;

    /// Zero-delay forked children go ahead of already queued events.
    pub const FORK_PUSH_PRIORITY: bool = true;

    /// Instructions per quantum before a thread yields; zero means no limit.
    pub const MAX_INSTRUCTIONS_PER_QUANTUM: u64 = 0;

    /// Strength of a driven `0` when a 4-state value enters a strength-aware node.
    pub const DRIVE0: Strength = Strength::Strong;

    /// Strength of a driven `1` when a 4-state value enters a strength-aware node.
    pub const DRIVE1: Strength = Strength::Strong;
}

/// Root configuration.
///
/// # Examples
///
/// ```
/// use vsim_core::config::Config;
///
/// let json = r#"{
///     "general": { "trace_instructions": true, "stop_time": 1000 },
///     "vm": { "max_instructions_per_quantum": 4096 },
///     "network": { "drive0": "pull" }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert!(config.general.trace_instructions);
/// assert_eq!(config.general.stop_time, Some(1000));
/// assert_eq!(config.vm.stack_capacity, 32);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Tracing and run limits.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Thread engine settings.
    #[serde(default)]
    pub vm: VmConfig,
    /// Signal network settings.
    #[serde(default)]
    pub network: NetworkConfig,
}

impl Config {
    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] if the text is not valid for the schema.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, [`ConfigError::Parse`] if it is not
    /// valid JSON for the schema.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Tracing and run limits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GeneralConfig {
    /// Emit a `trace!` event for every executed instruction.
    #[serde(default)]
    pub trace_instructions: bool,

    /// Emit a `trace!` event for every value delivered through the network.
    #[serde(default)]
    pub trace_propagation: bool,

    /// Simulated time at which `run` returns even if events remain.
    #[serde(default)]
    pub stop_time: Option<u64>,
}

/// Thread engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VmConfig {
    /// Initial capacity of each value stack.
    #[serde(default = "VmConfig::default_stack_capacity")]
    pub stack_capacity: usize,

    /// Schedule zero-delay forked children ahead of queued events.
    #[serde(default = "VmConfig::default_fork_push_priority")]
    pub fork_push_priority: bool,

    /// Instructions a thread may execute before yielding; zero disables the limit.
    #[serde(default = "VmConfig::default_max_instructions_per_quantum")]
    pub max_instructions_per_quantum: u64,
}

impl VmConfig {
    fn default_stack_capacity() -> usize {
        defaults::STACK_CAPACITY
    }

    fn default_fork_push_priority() -> bool {
        defaults::FORK_PUSH_PRIORITY
    }

    fn default_max_instructions_per_quantum() -> u64 {
        defaults::MAX_INSTRUCTIONS_PER_QUANTUM
    }
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            stack_capacity: defaults::STACK_CAPACITY,
            fork_push_priority: defaults::FORK_PUSH_PRIORITY,
            max_instructions_per_quantum: defaults::MAX_INSTRUCTIONS_PER_QUANTUM,
        }
    }
}

/// Signal network settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NetworkConfig {
    /// Strength given to driven `0` bits.
    #[serde(default = "NetworkConfig::default_drive0")]
    pub drive0: Strength,

    /// Strength given to driven `1` bits.
    #[serde(default = "NetworkConfig::default_drive1")]
    pub drive1: Strength,
}

impl NetworkConfig {
    fn default_drive0() -> Strength {
        defaults::DRIVE0
    }

    fn default_drive1() -> Strength {
        defaults::DRIVE1
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self { drive0: defaults::DRIVE0, drive1: defaults::DRIVE1 }
    }
}
