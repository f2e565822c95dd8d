//! The node graph and the propagation protocol.
//!
//! A [`Network`] is an arena of [`Net`]s. Each net owns an optional [`Functor`], an optional
//! force [`Filter`] and an owned fan-out list of downstream ports. Propagation is synchronous
//! and depth-first: [`Network::send`] does not return until every downstream functor has
//! reacted, unless a functor defers its own output through the [`Scheduler`].
//!
//! While a functor handles a value it is moved out of its net. A value arriving at a net whose
//! functor is absent for that reason is a re-entrant propagation, which is reported through
//! [`fatal`].

use tracing::trace;

use super::array::VArray;
use super::filter::{Filter, FilterResult};
use super::functor::{Functor, Output};
use super::signal::SignalFun;
use super::value::Value;
use crate::common::error::{BuildError, Fatal, fatal};
use crate::common::{ArrayId, NetId, PortRef, ThreadId};
use crate::logic::{Strength, Vec4, Vec8};
use crate::sched::{PartSelect, Scheduler};

/// Number of input ports on an ordinary net.
pub const NET_PORTS: u8 = 4;

/// One vertex of the signal graph.
#[derive(Debug, Default)]
pub struct Net {
    functor: Option<Functor>,
    filter: Option<Filter>,
    fanout: Vec<PortRef>,
    busy: bool,
}

impl Net {
    /// The attached functor, unless it is currently handling a value.
    pub const fn functor(&self) -> Option<&Functor> {
        self.functor.as_ref()
    }

    /// The attached force filter.
    pub const fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    /// Downstream ports, in link order.
    pub fn fanout(&self) -> &[PortRef] {
        &self.fanout
    }
}

/// Propagation counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct NetStats {
    /// Values delivered into functors.
    pub deliveries: u64,
    /// Values dropped or replaced by force filters.
    pub filtered: u64,
    /// Resolver leaf updates.
    pub resolver_updates: u64,
    /// Resolver updates that stopped below the root because a level did not change.
    pub resolver_short_circuits: u64,
    /// Threads woken by event functors.
    pub event_wakeups: u64,
}

/// The signal propagation graph.
#[derive(Debug)]
pub struct Network {
    nets: Vec<Net>,
    arrays: Vec<VArray>,
    /// Propagation counters.
    pub stats: NetStats,
    trace: bool,
    drive: (Strength, Strength),
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

enum Payload<'v> {
    Full(&'v Value),
    Vec4Part(&'v Vec4, PartSelect),
    Vec8Part(&'v Vec8, PartSelect),
}

impl Network {
    /// Creates an empty network with strong default drive.
    pub fn new() -> Self {
        Self {
            nets: Vec::new(),
            arrays: Vec::new(),
            stats: NetStats::default(),
            trace: false,
            drive: (Strength::Strong, Strength::Strong),
        }
    }

    /// Enables per-delivery trace logging.
    pub const fn set_trace(&mut self, on: bool) {
        self.trace = on;
    }

    /// Sets the strengths used when a 4-state value enters a strength-aware node.
    pub const fn set_drive(&mut self, drive0: Strength, drive1: Strength) {
        self.drive = (drive0, drive1);
    }

    /// Default `(drive0, drive1)` strengths.
    pub const fn drive(&self) -> (Strength, Strength) {
        self.drive
    }

    /// Number of nets.
    pub fn len(&self) -> usize {
        self.nets.len()
    }

    /// True if the network has no nets.
    pub fn is_empty(&self) -> bool {
        self.nets.is_empty()
    }

    /// Adds a net with a functor.
    pub fn add(&mut self, functor: impl Into<Functor>) -> NetId {
        let id = NetId(self.nets.len() as u32);
        self.nets.push(Net { functor: Some(functor.into()), ..Net::default() });
        id
    }

    /// Adds a net without a functor: a pure source driven only by [`Network::send`].
    pub fn add_source(&mut self) -> NetId {
        let id = NetId(self.nets.len() as u32);
        self.nets.push(Net::default());
        id
    }

    fn slot(&self, net: NetId) -> &Net {
        self.nets.get(net.index()).unwrap_or_else(|| fatal(Fatal::StaleHandle { kind: "net", index: net.0 }))
    }

    fn slot_mut(&mut self, net: NetId) -> &mut Net {
        self.nets.get_mut(net.index()).unwrap_or_else(|| fatal(Fatal::StaleHandle { kind: "net", index: net.0 }))
    }

    /// Borrows a net.
    pub fn net(&self, net: NetId) -> &Net {
        self.slot(net)
    }

    /// The functor of `net`.
    pub fn functor(&self, net: NetId) -> Option<&Functor> {
        self.slot(net).functor.as_ref()
    }

    /// Mutable access to the functor of `net`.
    pub fn functor_mut(&mut self, net: NetId) -> Option<&mut Functor> {
        self.slot_mut(net).functor.as_mut()
    }

    /// The filter of `net`.
    pub fn filter(&self, net: NetId) -> Option<&Filter> {
        self.slot(net).filter.as_ref()
    }

    /// The filter of `net`, created on first use.
    pub fn filter_mut(&mut self, net: NetId) -> &mut Filter {
        self.slot_mut(net).filter.get_or_insert_with(Filter::default)
    }

    /// Downstream ports of `net`.
    pub fn fanout(&self, net: NetId) -> &[PortRef] {
        &self.slot(net).fanout
    }

    /// Links the output of `from` to input `to`.
    ///
    /// The target must carry a functor and the port must exist.
    pub fn link(&mut self, from: NetId, to: PortRef) -> Result<(), BuildError> {
        if from.index() >= self.nets.len() || to.net.index() >= self.nets.len() {
            return Err(BuildError::MissingFunctor(to.net.0));
        }
        if to.port >= NET_PORTS {
            return Err(BuildError::PortOutOfRange { net: to.net.0, port: u32::from(to.port) });
        }
        if self.nets[to.net.index()].functor.is_none() {
            return Err(BuildError::MissingFunctor(to.net.0));
        }
        self.nets[from.index()].fanout.push(to);
        Ok(())
    }

    /// Removes one `from -> to` edge. Returns `false` if there was none.
    pub fn unlink(&mut self, from: NetId, to: PortRef) -> bool {
        let fanout = &mut self.slot_mut(from).fanout;
        match fanout.iter().position(|&p| p == to) {
            Some(pos) => {
                let _ = fanout.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Adds a word array.
    pub fn add_array(&mut self, array: VArray) -> ArrayId {
        let id = ArrayId(self.arrays.len() as u32);
        self.arrays.push(array);
        id
    }

    /// Borrows an array.
    pub fn array(&self, id: ArrayId) -> &VArray {
        self.arrays.get(id.0 as usize).unwrap_or_else(|| fatal(Fatal::StaleHandle { kind: "array", index: id.0 }))
    }

    /// Mutably borrows an array.
    pub fn array_mut(&mut self, id: ArrayId) -> &mut VArray {
        self.arrays
            .get_mut(id.0 as usize)
            .unwrap_or_else(|| fatal(Fatal::StaleHandle { kind: "array", index: id.0 }))
    }

    // ── Propagation ──────────────────────────────────────────────────────

    /// Sends `value` out of `from` to every downstream port, through the net's filter.
    pub fn send(&mut self, from: NetId, value: &Value, sched: &mut dyn Scheduler) {
        let result = match self.slot_mut(from).filter.as_mut() {
            Some(filter) => filter.apply(value),
            None => FilterResult::Prop,
        };
        match result {
            FilterResult::Prop => self.fan_out(from, &Payload::Full(value), sched),
            FilterResult::Stop => self.stats.filtered += 1,
            FilterResult::Repl(v) => {
                self.stats.filtered += 1;
                self.fan_out(from, &Payload::Full(&v), sched);
            }
        }
    }

    /// Sends `value` out of `from`, bypassing the filter.
    pub fn send_raw(&mut self, from: NetId, value: &Value, sched: &mut dyn Scheduler) {
        self.fan_out(from, &Payload::Full(value), sched);
    }

    /// Sends a part of a wider vector out of `from`.
    pub fn send_vec4_pv(&mut self, from: NetId, bits: &Vec4, part: PartSelect, sched: &mut dyn Scheduler) {
        let forced = self.slot(from).filter.as_ref().is_some_and(Filter::is_forced);
        if forced {
            let result = self.slot_mut(from).filter.as_mut().map(|f| f.apply_part(bits, part));
            match result {
                Some(FilterResult::Stop) => {
                    self.stats.filtered += 1;
                    return;
                }
                Some(FilterResult::Repl(Value::Vec4(v))) => {
                    self.stats.filtered += 1;
                    self.fan_out(from, &Payload::Vec4Part(&v, part), sched);
                    return;
                }
                _ => {}
            }
        }
        self.fan_out(from, &Payload::Vec4Part(bits, part), sched);
    }

    /// Sends a part of a wider strength vector out of `from`.
    pub fn send_vec8_pv(&mut self, from: NetId, bits: &Vec8, part: PartSelect, sched: &mut dyn Scheduler) {
        self.fan_out(from, &Payload::Vec8Part(bits, part), sched);
    }

    fn fan_out(&mut self, from: NetId, payload: &Payload<'_>, sched: &mut dyn Scheduler) {
        let mut i = 0;
        while let Some(&to) = self.slot(from).fanout.get(i) {
            if self.trace {
                trace!(target: "vsim::net", %from, %to, "deliver");
            }
            self.dispatch(to.net, u32::from(to.port), payload, sched);
            i += 1;
        }
    }

    /// Delivers `value` directly into one input port.
    pub fn deliver(&mut self, to: PortRef, value: &Value, sched: &mut dyn Scheduler) {
        self.dispatch(to.net, u32::from(to.port), &Payload::Full(value), sched);
    }

    /// Delivers a part-select directly into one input port.
    pub fn deliver_vec4_pv(&mut self, to: PortRef, bits: &Vec4, part: PartSelect, sched: &mut dyn Scheduler) {
        self.dispatch(to.net, u32::from(to.port), &Payload::Vec4Part(bits, part), sched);
    }

    /// Delivers into a wide core port (`port` may exceed the ordinary four).
    pub(crate) fn deliver_wide(&mut self, core: NetId, port: u32, value: &Value, sched: &mut dyn Scheduler) {
        self.dispatch(core, port, &Payload::Full(value), sched);
    }

    pub(crate) fn deliver_wide_vec4_pv(
        &mut self,
        core: NetId,
        port: u32,
        bits: &Vec4,
        part: PartSelect,
        sched: &mut dyn Scheduler,
    ) {
        self.dispatch(core, port, &Payload::Vec4Part(bits, part), sched);
    }

    fn dispatch(&mut self, net: NetId, port: u32, payload: &Payload<'_>, sched: &mut dyn Scheduler) {
        let slot = self.slot_mut(net);
        let Some(mut functor) = slot.functor.take() else {
            if slot.busy {
                fatal(Fatal::Reentrant(net.0));
            }
            fatal(Fatal::WrongFunctor { net: net.0, expected: "functor" });
        };
        slot.busy = true;
        self.stats.deliveries += 1;
        {
            let mut out = Output::new(self, sched, net);
            match payload {
                Payload::Full(value) => functor.recv(port, value, &mut out),
                Payload::Vec4Part(bits, part) => functor.recv_vec4_pv(port, bits, *part, &mut out),
                Payload::Vec8Part(bits, part) => functor.recv_vec8_pv(port, bits, *part, &mut out),
            }
        }
        let slot = self.slot_mut(net);
        slot.functor = Some(functor);
        slot.busy = false;
    }

    /// Sends the undriven value of every resolver to its fan-out.
    ///
    /// Receivers of a net none of whose drivers has delivered yet otherwise keep their
    /// initial value. Run once before any thread.
    pub fn settle_resolvers(&mut self, sched: &mut dyn Scheduler) {
        for index in 0..self.nets.len() {
            let net = NetId(index as u32);
            let initial = match self.slot_mut(net).functor.as_mut() {
                Some(Functor::Tri(tri)) => Value::Vec8(tri.settle()),
                Some(Functor::Wired(wired)) => Value::Vec4(wired.output().clone()),
                _ => continue,
            };
            trace!(target: "vsim::net", %net, "settle resolver");
            self.send(net, &initial, sched);
        }
    }

    /// Runs the pending-output queue of a delay functor; called for
    /// [`crate::sched::GenericEvent::FunctorTimer`].
    pub fn run_timer(&mut self, net: NetId, sched: &mut dyn Scheduler) {
        let now = sched.current_time();
        let due = match self.functor_mut(net) {
            Some(Functor::Delay(delay)) => delay.take_due(now),
            _ => fatal(Fatal::WrongFunctor { net: net.0, expected: "delay functor" }),
        };
        for value in due {
            self.send(net, &value, sched);
        }
    }

    // ── Signal access for the VM ─────────────────────────────────────────

    fn signal(&self, net: NetId) -> &SignalFun {
        match self.functor(net) {
            Some(Functor::Signal(sig)) => sig,
            _ => fatal(Fatal::WrongFunctor { net: net.0, expected: "signal" }),
        }
    }

    /// Current value of a signal as seen by readers (force applied).
    pub fn read(&self, net: NetId) -> Value {
        let value = self.signal(net).value();
        match self.filter(net) {
            Some(filter) => filter.filtered(value),
            None => value.clone(),
        }
    }

    /// Current 4-state value of a vector signal.
    pub fn read_vec4(&self, net: NetId) -> Vec4 {
        self.read(net).to_vec4().unwrap_or_else(|| fatal(Fatal::WrongFunctor { net: net.0, expected: "vector signal" }))
    }

    /// Width of a vector signal (zero for scalar kinds).
    pub fn signal_width(&self, net: NetId) -> u32 {
        self.signal(net).width()
    }

    /// Connects `src` as the continuous-assign driver of `dst`, replacing any previous one.
    pub fn cassign_link(&mut self, dst: NetId, src: NetId) -> Result<(), BuildError> {
        if let Some(old) = self.signal_mut(dst).cassign_src.take() {
            let _ = self.unlink(old, dst.port(1));
        }
        self.link(src, dst.port(1))?;
        self.signal_mut(dst).cassign_src = Some(src);
        Ok(())
    }

    /// Connects `src` as the force driver of `dst`, replacing any previous one.
    pub fn force_link(&mut self, dst: NetId, src: NetId) -> Result<(), BuildError> {
        if let Some(old) = self.signal_mut(dst).force_src.take() {
            let _ = self.unlink(old, dst.port(2));
        }
        self.link(src, dst.port(2))?;
        self.signal_mut(dst).force_src = Some(src);
        Ok(())
    }

    fn signal_mut(&mut self, net: NetId) -> &mut SignalFun {
        match self.functor_mut(net) {
            Some(Functor::Signal(sig)) => sig,
            _ => fatal(Fatal::WrongFunctor { net: net.0, expected: "signal" }),
        }
    }

    /// Ends a procedural continuous assignment on bits `[base, base + wid)`.
    ///
    /// The variable keeps its current value until the next ordinary write.
    pub fn deassign(&mut self, net: NetId, base: u32, wid: u32) {
        let full = {
            let sig = self.signal_mut(net);
            sig.release_assign(base, wid)
        };
        if full && let Some(src) = self.signal_mut(net).cassign_src.take() {
            let _ = self.unlink(src, net.port(1));
        }
    }

    /// Releases a force on bits `[base, base + wid)`.
    ///
    /// A net (`is_net`) falls back to its driven value; a variable keeps the forced value as
    /// its stored value.
    pub fn release(&mut self, net: NetId, base: u32, wid: u32, is_net: bool, sched: &mut dyn Scheduler) {
        let Some(forced) = self.filter(net).map(|f| f.filtered(self.signal(net).value())) else {
            return;
        };
        if !is_net {
            self.signal_mut(net).absorb_forced(&forced, base, wid);
        }
        let now_clear = self.filter_mut(net).release(base, wid);
        if now_clear && let Some(src) = self.signal_mut(net).force_src.take() {
            let _ = self.unlink(src, net.port(2));
        }
        let shown = self.read(net);
        self.send_raw(net, &shown, sched);
    }

    /// Registers a thread to be woken when the event functor on `net` fires.
    pub fn add_waiter(&mut self, net: NetId, thread: ThreadId) {
        match self.functor_mut(net) {
            Some(Functor::Event(ev)) => ev.add_waiter(thread),
            _ => fatal(Fatal::WrongFunctor { net: net.0, expected: "event functor" }),
        }
    }
}
