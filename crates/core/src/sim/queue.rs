//! Time-ordered event queue.
//!
//! Each time slot holds two regions. The active region runs thread wake-ups, propagations and
//! generic events in FIFO order, except that pushed zero-delay thread wake-ups go to the front.
//! The non-blocking-assignment region is only opened once the active region of the slot is
//! empty; its events then move to the active region as a batch, so anything they trigger in the
//! same time step runs after every assignment of the batch has been applied.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use tracing::debug;

use crate::common::{NetId, PortRef, SimTime, ThreadId};
use crate::logic::Vec4;
use crate::net::Value;
use crate::sched::{GenericEvent, PartSelect, Scheduler};

/// A unit of scheduled work.
pub enum Event {
    /// Resume a VM thread.
    Thread(ThreadId),
    /// Send a value out of a net.
    Propagate {
        /// Source net.
        net: NetId,
        /// Value to send.
        value: Value,
    },
    /// Functor timer or callback.
    Generic(GenericEvent),
    /// Non-blocking assignment.
    Assign {
        /// Destination port.
        target: PortRef,
        /// Assigned bits.
        value: Vec4,
        /// Part of the destination written, if not all of it.
        part: Option<PartSelect>,
    },
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thread(id) => f.debug_tuple("Thread").field(id).finish(),
            Self::Propagate { net, value } => f.debug_struct("Propagate").field("net", net).field("value", value).finish(),
            Self::Generic(ev) => f.debug_tuple("Generic").field(ev).finish(),
            Self::Assign { target, value, part } => {
                f.debug_struct("Assign").field("target", target).field("value", value).field("part", part).finish()
            }
        }
    }
}

/// A pending `$finish` or `$stop` request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    /// `$finish` with its exit code.
    Finish(i32),
    /// `$stop` with its exit code.
    Stop(i32),
}

#[derive(Default)]
struct Slot {
    active: VecDeque<Event>,
    nba: VecDeque<Event>,
}

impl Slot {
    fn is_empty(&self) -> bool {
        self.active.is_empty() && self.nba.is_empty()
    }
}

/// Discrete-event queue implementing [`Scheduler`].
#[derive(Default)]
pub struct EventQueue {
    now: SimTime,
    slots: BTreeMap<u64, Slot>,
    control: Option<Control>,
    pending: usize,
}

impl fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue")
            .field("now", &self.now)
            .field("slots", &self.slots.len())
            .field("pending", &self.pending)
            .field("control", &self.control)
            .finish()
    }
}

impl EventQueue {
    /// Creates an empty queue at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time.
    pub const fn now(&self) -> SimTime {
        self.now
    }

    /// Number of queued events.
    pub const fn len(&self) -> usize {
        self.pending
    }

    /// True if nothing is queued.
    pub const fn is_empty(&self) -> bool {
        self.pending == 0
    }

    /// Time of the earliest queued event.
    pub fn next_time(&self) -> Option<SimTime> {
        self.slots.keys().next().map(|&t| SimTime(t))
    }

    /// The pending `$finish`/`$stop` request, if any.
    pub const fn control(&self) -> Option<Control> {
        self.control
    }

    /// Clears and returns the pending request, letting a stopped run resume.
    pub const fn take_control(&mut self) -> Option<Control> {
        self.control.take()
    }

    fn slot(&mut self, delay: u64) -> &mut Slot {
        self.pending += 1;
        self.slots.entry(self.now.0.saturating_add(delay)).or_default()
    }

    /// Queues `event` in the active region `delay` ticks from now.
    pub fn push_active(&mut self, delay: u64, event: Event) {
        self.slot(delay).active.push_back(event);
    }

    /// Queues `event` in the non-blocking-assignment region `delay` ticks from now.
    pub fn push_nba(&mut self, delay: u64, event: Event) {
        self.slot(delay).nba.push_back(event);
    }

    /// Removes the next event and advances time to its slot.
    pub fn pop(&mut self) -> Option<Event> {
        loop {
            let mut entry = self.slots.first_entry()?;
            let time = *entry.key();
            let slot = entry.get_mut();
            if slot.active.is_empty() && !slot.nba.is_empty() {
                let batch = std::mem::take(&mut slot.nba);
                slot.active = batch;
            }
            let Some(event) = slot.active.pop_front() else {
                let _ = entry.remove();
                continue;
            };
            if slot.is_empty() {
                let _ = entry.remove();
            }
            self.pending -= 1;
            self.now = SimTime(time);
            return Some(event);
        }
    }
}

impl Scheduler for EventQueue {
    fn schedule_thread(&mut self, thread: ThreadId, delay: u64, push: bool) {
        let slot = self.slot(delay);
        if push && delay == 0 {
            slot.active.push_front(Event::Thread(thread));
        } else {
            slot.active.push_back(Event::Thread(thread));
        }
    }

    fn schedule_generic_event(&mut self, event: GenericEvent, delay: u64) {
        self.push_active(delay, Event::Generic(event));
    }

    fn schedule_propagate(&mut self, net: NetId, delay: u64, value: Value) {
        self.push_active(delay, Event::Propagate { net, value });
    }

    fn schedule_assign(&mut self, target: PortRef, delay: u64, value: Vec4, part: Option<PartSelect>) {
        self.push_nba(delay, Event::Assign { target, value, part });
    }

    fn current_time(&self) -> SimTime {
        self.now
    }

    fn request_finish(&mut self, code: i32) {
        debug!(target: "vsim::sched", time = self.now.0, code, "finish requested");
        self.control = Some(Control::Finish(code));
    }

    fn request_stop(&mut self, code: i32) {
        debug!(target: "vsim::sched", time = self.now.0, code, "stop requested");
        if !matches!(self.control, Some(Control::Finish(_))) {
            self.control = Some(Control::Stop(code));
        }
    }

    fn is_finished(&self) -> bool {
        self.control.is_some()
    }
}
