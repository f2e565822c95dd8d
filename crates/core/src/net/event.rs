//! Event functors.
//!
//! An [`EventFun`] watches up to four inputs and *fires* when its [`EdgeKind`] condition is met.
//! Firing schedules every thread blocked on the node with zero delay, clears the waiter list
//! and sends a one-bit token onward so that event-or chains fire too.

use tracing::debug;

use super::functor::{Output, Receive};
use super::value::{ObjectRef, Value};
use crate::common::ThreadId;
use crate::common::error::{Fatal, fatal};
use crate::logic::{Bit4, Vec4, Vec8};

/// Condition under which an event node fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeKind {
    /// Least significant bit rises (`0->1/x/z`, `x/z->1`).
    Pos,
    /// Least significant bit falls (`1->0/x/z`, `x/z->0`).
    Neg,
    /// Least significant bit changes.
    Edge,
    /// Any change of the whole value.
    AnyChange,
    /// Fires on every input; used for named events and event-or.
    Any,
}

impl EdgeKind {
    /// True if `from -> to` is an edge of this kind.
    pub const fn matches(self, from: Bit4, to: Bit4) -> bool {
        use Bit4::{One, X, Z, Zero};
        match self {
            Self::Pos => matches!((from, to), (Zero, One | X | Z) | (X | Z, One)),
            Self::Neg => matches!((from, to), (One, Zero | X | Z) | (X | Z, Zero)),
            Self::Edge => !matches!((from, to), (Zero, Zero) | (One, One) | (X, X) | (Z, Z)),
            Self::AnyChange | Self::Any => true,
        }
    }
}

/// Edge detector / named event.
#[derive(Clone, Debug)]
pub struct EventFun {
    kind: EdgeKind,
    last: [Option<Value>; 4],
    waiters: Vec<ThreadId>,
    fired: u64,
}

impl EventFun {
    /// Creates an event node.
    pub const fn new(kind: EdgeKind) -> Self {
        Self { kind, last: [None, None, None, None], waiters: Vec::new(), fired: 0 }
    }

    /// A named event triggered by `%event`.
    pub const fn named() -> Self {
        Self::new(EdgeKind::Any)
    }

    /// The firing condition.
    pub const fn kind(&self) -> EdgeKind {
        self.kind
    }

    /// Number of times the node has fired.
    pub const fn fired(&self) -> u64 {
        self.fired
    }

    /// Threads currently blocked on the node.
    pub fn waiters(&self) -> &[ThreadId] {
        &self.waiters
    }

    pub(crate) fn add_waiter(&mut self, thread: ThreadId) {
        self.waiters.push(thread);
    }

    fn triggers(&self, port: usize, value: &Value) -> bool {
        let Some(old) = &self.last[port] else {
            // The first value counts as a change from `X`.
            return match self.kind {
                EdgeKind::Pos | EdgeKind::Neg | EdgeKind::Edge => self.kind.matches(Bit4::X, value.lsb()),
                EdgeKind::AnyChange | EdgeKind::Any => true,
            };
        };
        match self.kind {
            EdgeKind::Pos | EdgeKind::Neg | EdgeKind::Edge => self.kind.matches(old.lsb(), value.lsb()),
            EdgeKind::AnyChange => !old.eeq(value),
            EdgeKind::Any => true,
        }
    }

    fn accept(&mut self, port: u32, value: Value, out: &mut Output<'_>) {
        let Some(slot) = usize::try_from(port).ok().filter(|&p| p < self.last.len()) else {
            fatal(Fatal::BadPort { functor: Self::NAME, port });
        };
        let fire = self.triggers(slot, &value);
        self.last[slot] = Some(value);
        if fire {
            self.fire(out);
        }
    }

    fn fire(&mut self, out: &mut Output<'_>) {
        self.fired += 1;
        let waiters = std::mem::take(&mut self.waiters);
        if !waiters.is_empty() {
            debug!(target: "vsim::net", net = %out.net(), count = waiters.len(), "event wakes threads");
        }
        out.network().stats.event_wakeups += waiters.len() as u64;
        for thread in waiters {
            out.scheduler().schedule_thread(thread, 0, false);
        }
        out.send_vec4(Vec4::from(Bit4::One));
    }
}

impl Receive for EventFun {
    const NAME: &'static str = "event";

    fn recv_vec4(&mut self, port: u32, bits: &Vec4, out: &mut Output<'_>) {
        self.accept(port, Value::Vec4(bits.clone()), out);
    }

    fn recv_vec8(&mut self, port: u32, bits: &Vec8, out: &mut Output<'_>) {
        self.accept(port, Value::Vec8(bits.clone()), out);
    }

    fn recv_real(&mut self, port: u32, value: f64, out: &mut Output<'_>) {
        self.accept(port, Value::Real(value), out);
    }

    fn recv_string(&mut self, port: u32, value: &str, out: &mut Output<'_>) {
        self.accept(port, Value::Str(value.to_owned()), out);
    }

    fn recv_object(&mut self, port: u32, value: &ObjectRef, out: &mut Output<'_>) {
        self.accept(port, Value::Object(value.clone()), out);
    }
}
