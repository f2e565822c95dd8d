//! Reference scheduler and simulation driver.
//!
//! The network and VM only see the [`crate::sched::Scheduler`] contract. This module supplies
//! the implementation used to actually run a design:
//! 1. **Queue:** [`EventQueue`] orders work by simulated time, with an active region and a
//!    non-blocking-assignment region per time step.
//! 2. **Driver:** [`Simulator`] owns the network, the VM and the queue, and dispatches events
//!    until the design finishes, stops, runs out of work or reaches the time limit.

/// Time-ordered event queue.
pub mod queue;

/// Simulation driver.
pub mod simulator;

pub use queue::{Control, Event, EventQueue};
pub use simulator::{RunOutcome, Simulator};
