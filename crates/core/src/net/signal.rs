//! Variable and net storage nodes.
//!
//! A [`SignalFun`] stores the current value of a variable or net and propagates it whenever it
//! changes. Its input ports are:
//! 1. **Port 0:** Ordinary writes. Bits under a procedural continuous assignment ignore them.
//! 2. **Port 1:** Procedural continuous assignment (`assign`); marks the written bits.
//! 3. **Port 2:** Force. The value goes to the net's [`super::filter::Filter`] instead of storage.
//!
//! [`AutoVar`] stands in for a variable of an automatic scope. Its storage lives in the
//! context of the running thread, so the VM reads and writes it directly.

use super::functor::{Output, Receive};
use super::value::{ObjectRef, Value};
use crate::common::NetId;
use crate::common::error::{Fatal, fatal};
use crate::logic::{Bit4, Vec4, Vec8};
use crate::sched::PartSelect;

/// Whether the node models a variable or a net.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalKind {
    /// Procedurally written storage; starts as `X`.
    Variable,
    /// Driven wire; starts as `Z`.
    Net,
}

/// Storage node for one variable or net.
#[derive(Clone, Debug)]
pub struct SignalFun {
    kind: SignalKind,
    value: Value,
    assigned: Vec<bool>,
    needs_init: bool,
    pub(crate) cassign_src: Option<NetId>,
    pub(crate) force_src: Option<NetId>,
}

impl SignalFun {
    fn with(kind: SignalKind, value: Value, slots: usize) -> Self {
        Self { kind, value, assigned: vec![false; slots], needs_init: true, cassign_src: None, force_src: None }
    }

    /// A 4-state variable of `width` bits, initially all `X`.
    pub fn variable_vec4(width: u32) -> Self {
        Self::with(SignalKind::Variable, Value::Vec4(Vec4::xs(width)), width as usize)
    }

    /// A 4-state net of `width` bits, initially all `Z`.
    pub fn net_vec4(width: u32) -> Self {
        Self::with(SignalKind::Net, Value::Vec4(Vec4::zs(width)), width as usize)
    }

    /// A strength-valued net of `width` bits, initially high impedance.
    pub fn net_vec8(width: u32) -> Self {
        Self::with(SignalKind::Net, Value::Vec8(Vec8::hiz(width)), width as usize)
    }

    /// A real variable, initially `0.0`.
    pub fn variable_real() -> Self {
        Self::with(SignalKind::Variable, Value::Real(0.0), 1)
    }

    /// A string variable, initially empty.
    pub fn variable_str() -> Self {
        Self::with(SignalKind::Variable, Value::Str(String::new()), 1)
    }

    /// An object variable, initially null.
    pub fn variable_obj() -> Self {
        Self::with(SignalKind::Variable, Value::Object(ObjectRef::null()), 1)
    }

    /// Variable or net.
    pub const fn kind(&self) -> SignalKind {
        self.kind
    }

    /// The stored value (before any force).
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Vector width, or zero for scalar kinds.
    pub fn width(&self) -> u32 {
        match &self.value {
            Value::Vec4(v) => v.width(),
            Value::Vec8(v) => v.width(),
            _ => 0,
        }
    }

    /// True while any bit is under procedural continuous assignment.
    pub fn is_assigned(&self) -> bool {
        self.assigned.iter().any(|&a| a)
    }

    fn coerce(&self, incoming: &Value, out: &Output<'_>) -> Value {
        match (&self.value, incoming) {
            (Value::Vec4(_), Value::Vec8(v)) => Value::Vec4(v.to_vec4()),
            (Value::Vec8(_), Value::Vec4(v)) => {
                let (s0, s1) = out.drive();
                Value::Vec8(Vec8::from_vec4(v, s0, s1))
            }
            (cur, new) if std::mem::discriminant(cur) == std::mem::discriminant(new) => new.clone(),
            (_, new) => fatal(Fatal::UnsupportedValue { functor: Self::NAME, kind: new.kind() }),
        }
    }

    /// Writes `incoming` into storage. Returns `true` if any stored bit changed.
    fn write(&mut self, incoming: &Value, part: Option<PartSelect>, honor_assign: bool, set_assign: bool) -> bool {
        let base = part.map_or(0, |p| p.base);
        let mut changed = false;
        match (&mut self.value, incoming) {
            (Value::Vec4(cur), Value::Vec4(bits)) => {
                check_width(cur.width(), bits.width(), part);
                if part.is_none() && !set_assign && !(honor_assign && self.assigned.iter().any(|&a| a)) {
                    if cur.eeq(bits) {
                        return false;
                    }
                    *cur = bits.clone();
                    return true;
                }
                for i in 0..bits.width() {
                    let idx = base + i;
                    let Some(slot) = self.assigned.get_mut(idx as usize) else { break };
                    if honor_assign && *slot {
                        continue;
                    }
                    if set_assign {
                        *slot = true;
                    }
                    let b = bits.bit(i);
                    if cur.bit(idx) != b {
                        cur.set_bit(idx, b);
                        changed = true;
                    }
                }
            }
            (Value::Vec8(cur), Value::Vec8(bits)) => {
                check_width(cur.width(), bits.width(), part);
                for i in 0..bits.width() {
                    let idx = base + i;
                    let Some(slot) = self.assigned.get_mut(idx as usize) else { break };
                    if honor_assign && *slot {
                        continue;
                    }
                    if set_assign {
                        *slot = true;
                    }
                    let s = bits.value(i);
                    if cur.value(idx) != s {
                        cur.set_value(idx, s);
                        changed = true;
                    }
                }
            }
            (cur, new) => {
                let masked = self.assigned.first().copied().unwrap_or(false);
                if honor_assign && masked {
                    return false;
                }
                if set_assign && let Some(slot) = self.assigned.first_mut() {
                    *slot = true;
                }
                if !cur.eeq(new) {
                    *cur = new.clone();
                    changed = true;
                }
            }
        }
        changed
    }

    fn store(&mut self, port: u32, incoming: &Value, part: Option<PartSelect>, out: &mut Output<'_>) {
        let value = self.coerce(incoming, out);
        match port {
            0 | 1 => {
                let changed = self.write(&value, part, port == 0, port == 1);
                if changed || self.needs_init {
                    self.needs_init = false;
                    out.send(&self.value);
                }
            }
            2 => {
                let net = out.net();
                out.network().filter_mut(net).force(&value, part);
                let shown = out.network().filter_mut(net).filtered(&self.value);
                out.send_raw(&shown);
            }
            _ => fatal(Fatal::BadPort { functor: Self::NAME, port }),
        }
    }

    /// Clears the continuous-assign mark on `[base, base + wid)`. Returns `true` when no bit
    /// remains assigned.
    pub(crate) fn release_assign(&mut self, base: u32, wid: u32) -> bool {
        let end = (base.saturating_add(wid) as usize).min(self.assigned.len());
        for a in &mut self.assigned[(base as usize).min(end)..end] {
            *a = false;
        }
        !self.is_assigned()
    }

    /// Copies forced bits `[base, base + wid)` into storage, as a variable does on release.
    pub(crate) fn absorb_forced(&mut self, forced: &Value, base: u32, wid: u32) {
        match (&mut self.value, forced) {
            (Value::Vec4(cur), Value::Vec4(f)) => {
                let _ = cur.set_vec(base, &f.subvalue(base, wid));
            }
            (Value::Vec8(cur), Value::Vec8(f)) => cur.set_vec(base, &f.subvalue(base, wid)),
            (cur, f) => *cur = f.clone(),
        }
    }
}

fn check_width(width: u32, incoming: u32, part: Option<PartSelect>) {
    match part {
        None if incoming != width => {
            fatal(Fatal::WidthMismatch { context: "signal store", left: width, right: incoming });
        }
        Some(p) if p.vwid != width => {
            fatal(Fatal::WidthMismatch { context: "signal part store", left: width, right: p.vwid });
        }
        _ => {}
    }
}

impl Receive for SignalFun {
    const NAME: &'static str = "signal";

    fn recv_vec4(&mut self, port: u32, bits: &Vec4, out: &mut Output<'_>) {
        self.store(port, &Value::Vec4(bits.clone()), None, out);
    }

    fn recv_vec4_pv(&mut self, port: u32, bits: &Vec4, part: PartSelect, out: &mut Output<'_>) {
        self.store(port, &Value::Vec4(bits.clone()), Some(part), out);
    }

    fn recv_vec8(&mut self, port: u32, bits: &Vec8, out: &mut Output<'_>) {
        self.store(port, &Value::Vec8(bits.clone()), None, out);
    }

    fn recv_vec8_pv(&mut self, port: u32, bits: &Vec8, part: PartSelect, out: &mut Output<'_>) {
        self.store(port, &Value::Vec8(bits.clone()), Some(part), out);
    }

    fn recv_real(&mut self, port: u32, value: f64, out: &mut Output<'_>) {
        self.store(port, &Value::Real(value), None, out);
    }

    fn recv_string(&mut self, port: u32, value: &str, out: &mut Output<'_>) {
        self.store(port, &Value::Str(value.to_owned()), None, out);
    }

    fn recv_object(&mut self, port: u32, value: &ObjectRef, out: &mut Output<'_>) {
        self.store(port, &Value::Object(value.clone()), None, out);
    }
}

/// Placeholder node for a variable of an automatic scope.
///
/// `slot` indexes the item list of the thread's context. The node itself never stores a value.
#[derive(Clone, Debug)]
pub struct AutoVar {
    slot: usize,
    init: Value,
}

impl AutoVar {
    /// A vector item initialised to `X`.
    pub fn vec4(slot: usize, width: u32) -> Self {
        Self { slot, init: Value::Vec4(Vec4::new(width, Bit4::X)) }
    }

    /// A real item initialised to `0.0`.
    pub const fn real(slot: usize) -> Self {
        Self { slot, init: Value::Real(0.0) }
    }

    /// A string item initialised to the empty string.
    pub const fn string(slot: usize) -> Self {
        Self { slot, init: Value::Str(String::new()) }
    }

    /// Index of the item in the context.
    pub const fn slot(&self) -> usize {
        self.slot
    }

    /// Value of the item in a freshly allocated context.
    pub const fn init(&self) -> &Value {
        &self.init
    }
}

impl Receive for AutoVar {
    const NAME: &'static str = "automatic variable";
}
