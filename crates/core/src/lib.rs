//! Verilog simulation core library.
//!
//! This crate implements the execution core of an event-driven Verilog simulator:
//! 1. **Logic:** 4-state and strength-aware bit vectors and the operator algebra over them.
//! 2. **Network:** A graph of functor nodes that propagate values along fan-out edges, with
//!    force/assign filters, delays, events and word arrays.
//! 3. **Resolution:** Multi-driver resolution trees for tri-state and wired nets.
//! 4. **VM:** Cooperative bytecode threads with fork/join, contexts for automatic scopes and
//!    foreign calls.
//! 5. **Simulation:** The scheduler contract, a reference event queue, configuration and
//!    statistics.

/// Common types (errors, time, arena handles).
pub mod common;
/// Run configuration (defaults, hierarchical config structures, JSON loading).
pub mod config;
/// Bit-vector algebra (4-state and strength values, literals, ALU).
pub mod logic;
/// Signal network (nodes, functors, filters, delays, events, arrays).
pub mod net;
/// Multi-driver resolution (trees, tri-state, wired logic).
pub mod resolv;
/// Scheduler contract between the core and the event queue.
pub mod sched;
/// Reference event queue and simulation driver.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;
/// Procedural bytecode VM (code space, threads, opcode handlers).
pub mod vm;

/// Root configuration type; use `Config::default()` or load it from JSON.
pub use crate::config::Config;
/// The signal graph; build it with `Network::add` and `Network::link`.
pub use crate::net::Network;
/// Top-level driver owning the network, the VM and the event queue.
pub use crate::sim::{RunOutcome, Simulator};
/// Assembler for VM programs.
pub use crate::vm::{CodeBuilder, ForeignTable, Program};
