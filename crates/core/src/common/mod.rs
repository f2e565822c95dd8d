//! Common types shared by every layer of the simulation core.
//!
//! This module provides:
//! 1. **Errors:** Build-time, configuration and run-level error enums plus the fatal abort path.
//! 2. **Time:** Simulated time and the `(high, low)` split exposed to foreign callers.
//! 3. **Handles:** Stable arena indices for nets, threads, scopes, arrays and call sites.

/// Error taxonomy and the fatal invariant-violation entry point.
pub mod error;

/// Arena handles used across the network and the VM.
pub mod handle;

/// Simulated time representation.
pub mod time;

pub use error::{BuildError, ConfigError, Fatal, SimError, fatal};
pub use handle::{ArrayId, CallSiteId, ContextId, NetId, PortRef, ScopeId, ThreadId};
pub use time::SimTime;
