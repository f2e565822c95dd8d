//! The scheduler contract.
//!
//! The core never owns an event queue. Both the network and the VM enqueue work through the
//! [`Scheduler`] trait and are called back by whoever drives simulated time:
//! 1. **Threads:** [`Scheduler::schedule_thread`] resumes a VM thread after a delay.
//! 2. **Propagation:** [`Scheduler::schedule_propagate`] sends a value out of a net later.
//! 3. **Assignments:** [`Scheduler::schedule_assign`] performs a non-blocking write into a port.
//! 4. **Generic events:** [`Scheduler::schedule_generic_event`] runs a functor timer or a callback.
//! 5. **Control:** `$finish` / `$stop` requests and the current time.
//!
//! [`crate::sim::EventQueue`] is the reference implementation used by [`crate::sim::Simulator`].

use std::fmt;

use crate::common::{NetId, PortRef, SimTime, ThreadId};
use crate::logic::Vec4;
use crate::net::{Network, Value};

/// A part-select destination: `wid` bits written at offset `base` of a `vwid`-bit target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartSelect {
    /// Offset of the first written bit.
    pub base: u32,
    /// Full width of the target vector.
    pub vwid: u32,
}

/// Deferred callback run against the network.
pub type Callback = Box<dyn FnOnce(&mut Network, &mut dyn Scheduler)>;

/// Work queued through [`Scheduler::schedule_generic_event`].
pub enum GenericEvent {
    /// Wake the pending-output queue of a delay functor.
    FunctorTimer(NetId),
    /// Run an arbitrary callback.
    Callback(Callback),
}

impl fmt::Debug for GenericEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FunctorTimer(net) => f.debug_tuple("FunctorTimer").field(net).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// Call contract the core expects from the discrete-event scheduler.
pub trait Scheduler {
    /// Resumes `thread` after `delay` ticks. With `push` set, a zero-delay wake-up is placed
    /// ahead of already queued events of the current time step.
    fn schedule_thread(&mut self, thread: ThreadId, delay: u64, push: bool);

    /// Runs `event` after `delay` ticks.
    fn schedule_generic_event(&mut self, event: GenericEvent, delay: u64);

    /// Sends `value` out of `net` after `delay` ticks.
    fn schedule_propagate(&mut self, net: NetId, delay: u64, value: Value);

    /// Non-blocking assignment of `value` into `target` after `delay` ticks, optionally into
    /// a part of the target.
    fn schedule_assign(&mut self, target: PortRef, delay: u64, value: Vec4, part: Option<PartSelect>);

    /// The current simulated time.
    fn current_time(&self) -> SimTime;

    /// Requests an orderly end of simulation (`$finish`).
    fn request_finish(&mut self, code: i32);

    /// Requests a pause of simulation (`$stop`).
    fn request_stop(&mut self, code: i32);

    /// True once `$finish` or `$stop` has been requested.
    fn is_finished(&self) -> bool;
}
