//! Functor dispatch.
//!
//! This module defines the [`Receive`] trait implemented by every node behavior and the closed
//! [`Functor`] enum that the network stores. It provides:
//! 1. **Capabilities:** One `recv_*` method per value kind, with defaults that adapt partial
//!    vectors to full-width ones and strength vectors to 4-state ones.
//! 2. **Dispatch:** [`Functor`] matches on its variant and forwards to the concrete type.
//! 3. **Output:** The [`Output`] handle a functor uses to send its result onward or to reach
//!    the scheduler while it is being called.

use super::arith::{AbsFun, ArithFun, RealArithFun};
use super::delay::DelayFun;
use super::event::EventFun;
use super::logic::{BufIfFun, LogicFun, ReduceFun};
use super::network::Network;
use super::select::{CastFun, ConcatFun, DriveFun, PartFun, SextFun};
use super::signal::{AutoVar, SignalFun};
use super::value::{ObjectRef, Value};
use super::wide::{ExtendFun, WideFun};
use crate::common::error::{Fatal, fatal};
use crate::common::{NetId, SimTime};
use crate::logic::{Strength, Vec4, Vec8};
use crate::resolv::{TriFun, WiredFun};
use crate::sched::{PartSelect, Scheduler};

/// Handle through which a functor emits values while it handles an input.
pub struct Output<'a> {
    network: &'a mut Network,
    sched: &'a mut dyn Scheduler,
    net: NetId,
}

impl std::fmt::Debug for Output<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Output").field("net", &self.net).finish_non_exhaustive()
    }
}

impl<'a> Output<'a> {
    pub(crate) fn new(network: &'a mut Network, sched: &'a mut dyn Scheduler, net: NetId) -> Self {
        Self { network, sched, net }
    }

    /// The net whose functor is running.
    pub const fn net(&self) -> NetId {
        self.net
    }

    /// Sends a value out of the running net through its filter.
    pub fn send(&mut self, value: &Value) {
        self.network.send(self.net, value, &mut *self.sched);
    }

    /// Sends a value out of the running net, bypassing its filter.
    pub fn send_raw(&mut self, value: &Value) {
        self.network.send_raw(self.net, value, &mut *self.sched);
    }

    /// Sends a 4-state vector.
    pub fn send_vec4(&mut self, v: Vec4) {
        self.send(&Value::Vec4(v));
    }

    /// Sends a strength vector.
    pub fn send_vec8(&mut self, v: Vec8) {
        self.send(&Value::Vec8(v));
    }

    /// Sends a real.
    pub fn send_real(&mut self, r: f64) {
        self.send(&Value::Real(r));
    }

    /// Sends a part of a wider vector.
    pub fn send_vec4_pv(&mut self, bits: &Vec4, part: PartSelect) {
        self.network.send_vec4_pv(self.net, bits, part, &mut *self.sched);
    }

    /// Sends a part of a wider strength vector.
    pub fn send_vec8_pv(&mut self, bits: &Vec8, part: PartSelect) {
        self.network.send_vec8_pv(self.net, bits, part, &mut *self.sched);
    }

    /// Forwards into a port of a wide core node.
    pub(crate) fn forward_wide(&mut self, core: NetId, port: u32, value: &Value) {
        self.network.deliver_wide(core, port, value, &mut *self.sched);
    }

    pub(crate) fn forward_wide_vec4_pv(&mut self, core: NetId, port: u32, bits: &Vec4, part: PartSelect) {
        self.network.deliver_wide_vec4_pv(core, port, bits, part, &mut *self.sched);
    }

    /// Current simulated time.
    pub fn now(&self) -> SimTime {
        self.sched.current_time()
    }

    /// The scheduler driving this propagation.
    pub fn scheduler(&mut self) -> &mut dyn Scheduler {
        &mut *self.sched
    }

    /// The network, for filter and counter access.
    pub fn network(&mut self) -> &mut Network {
        &mut *self.network
    }

    /// Default `(drive0, drive1)` strengths.
    pub fn drive(&self) -> (Strength, Strength) {
        self.network.drive()
    }
}

/// Value-receiving behavior of a node.
///
/// Only `recv_vec4` is commonly overridden. Partial vectors are widened with `Z` outside the
/// written range, and strength vectors are stripped to 4-state values, before reaching it.
/// Kinds a functor does not accept are internal violations.
pub trait Receive {
    /// Name used in diagnostics.
    const NAME: &'static str;

    /// Receives a full-width 4-state vector on `port`.
    fn recv_vec4(&mut self, port: u32, bits: &Vec4, out: &mut Output<'_>) {
        let _ = (port, bits, out);
        fatal(Fatal::UnsupportedValue { functor: Self::NAME, kind: "vec4" });
    }

    /// Receives `bits` written at `part.base` of a `part.vwid`-bit value.
    fn recv_vec4_pv(&mut self, port: u32, bits: &Vec4, part: PartSelect, out: &mut Output<'_>) {
        let mut full = Vec4::zs(part.vwid);
        let _ = full.set_vec(part.base, bits);
        self.recv_vec4(port, &full, out);
    }

    /// Receives a strength vector.
    fn recv_vec8(&mut self, port: u32, bits: &Vec8, out: &mut Output<'_>) {
        self.recv_vec4(port, &bits.to_vec4(), out);
    }

    /// Receives a partial strength vector.
    fn recv_vec8_pv(&mut self, port: u32, bits: &Vec8, part: PartSelect, out: &mut Output<'_>) {
        let mut full = Vec8::hiz(part.vwid);
        full.set_vec(part.base, bits);
        self.recv_vec8(port, &full, out);
    }

    /// Receives a real.
    fn recv_real(&mut self, port: u32, value: f64, out: &mut Output<'_>) {
        let _ = (port, value, out);
        fatal(Fatal::UnsupportedValue { functor: Self::NAME, kind: "real" });
    }

    /// Receives a string.
    fn recv_string(&mut self, port: u32, value: &str, out: &mut Output<'_>) {
        let _ = (port, value, out);
        fatal(Fatal::UnsupportedValue { functor: Self::NAME, kind: "string" });
    }

    /// Receives an object reference.
    fn recv_object(&mut self, port: u32, value: &ObjectRef, out: &mut Output<'_>) {
        let _ = (port, value, out);
        fatal(Fatal::UnsupportedValue { functor: Self::NAME, kind: "object" });
    }

    /// Routes a value to the method for its kind.
    fn recv_value(&mut self, port: u32, value: &Value, out: &mut Output<'_>) {
        match value {
            Value::Vec4(v) => self.recv_vec4(port, v, out),
            Value::Vec8(v) => self.recv_vec8(port, v, out),
            Value::Real(r) => self.recv_real(port, *r, out),
            Value::Str(s) => self.recv_string(port, s, out),
            Value::Object(o) => self.recv_object(port, o, out),
        }
    }
}

macro_rules! functors {
    ($($(#[$doc:meta])* $variant:ident($ty:ty)),* $(,)?) => {
        /// Closed set of node behaviors.
        #[derive(Debug)]
        pub enum Functor {
            $($(#[$doc])* $variant($ty),)*
        }

        $(impl From<$ty> for Functor {
            fn from(f: $ty) -> Self {
                Self::$variant(f)
            }
        })*

        impl Functor {
            /// Diagnostic name of the variant.
            pub const fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => <$ty as Receive>::NAME,)*
                }
            }

            pub(crate) fn recv(&mut self, port: u32, value: &Value, out: &mut Output<'_>) {
                match self {
                    $(Self::$variant(f) => f.recv_value(port, value, out),)*
                }
            }

            pub(crate) fn recv_vec4_pv(&mut self, port: u32, bits: &Vec4, part: PartSelect, out: &mut Output<'_>) {
                match self {
                    $(Self::$variant(f) => f.recv_vec4_pv(port, bits, part, out),)*
                }
            }

            pub(crate) fn recv_vec8_pv(&mut self, port: u32, bits: &Vec8, part: PartSelect, out: &mut Output<'_>) {
                match self {
                    $(Self::$variant(f) => f.recv_vec8_pv(port, bits, part, out),)*
                }
            }
        }
    };
}

functors! {
    /// Variable or net storage.
    Signal(SignalFun),
    /// Automatic variable stored in the running thread's context.
    AutoVar(AutoVar),
    /// Vector arithmetic, shift or comparison.
    Arith(ArithFun),
    /// Real arithmetic or comparison.
    ArithReal(RealArithFun),
    /// Absolute value.
    Abs(AbsFun),
    /// Logic gate.
    Logic(LogicFun),
    /// Conditional buffer.
    BufIf(BufIfFun),
    /// Reduction.
    Reduce(ReduceFun),
    /// Part-select.
    Part(PartFun),
    /// Concatenation.
    Concat(ConcatFun),
    /// Sign extension.
    Sext(SextFun),
    /// 4-state to strength conversion.
    Drive(DriveFun),
    /// Real/vector conversion.
    Cast(CastFun),
    /// Transport/inertial delay.
    Delay(DelayFun),
    /// Edge and named-event detection.
    Event(EventFun),
    /// Extra inputs of a wide node.
    Extend(ExtendFun),
    /// Core of a wide logic or concat node.
    Wide(WideFun),
    /// Tri-state resolver.
    Tri(TriFun),
    /// Wired-AND / wired-OR resolver.
    Wired(WiredFun),
}
