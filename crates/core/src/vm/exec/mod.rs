//! Opcode handlers.
//!
//! Every handler has the signature [`Handler`]: it receives the execution state of the running
//! thread and the instruction, and returns `true` to keep fetching or `false` to end the
//! quantum. Handlers are grouped by family:
//! - [`vector`]:  vector stack, loads, stores and part selects
//! - [`arith`]:   vector arithmetic, bitwise operators, reductions and comparisons
//! - [`flags`]:   flag and index register manipulation
//! - [`control`]: jumps, delays, events, fork/join, disable and contexts
//! - [`assign`]:  non-blocking, continuous and forced assignment
//! - [`real`]:    real stack and conversions
//! - [`string`]:  string stack
//! - [`object`]:  object stack and dynamic arrays
//! - [`call`]:    foreign calls

/// Vector arithmetic, logic and comparison.
pub mod arith;

/// Non-blocking, continuous and forced assignment.
pub mod assign;

/// Foreign calls.
pub mod call;

/// Control flow and thread lifecycle.
pub mod control;

/// Flags and index registers.
pub mod flags;

/// Object stack and dynamic arrays.
pub mod object;

/// Real stack.
pub mod real;

/// String stack.
pub mod string;

/// Vector stack.
pub mod vector;

use std::fmt;

use crate::common::error::{Fatal, fatal};
use crate::common::{ContextId, NetId, ThreadId};
use crate::logic::{Bit4, Vec4};
use crate::net::{Functor, Network, Value};
use crate::sched::{PartSelect, Scheduler};
use crate::vm::VmCore;
use crate::vm::code::Instruction;
use crate::vm::thread::{FLAG_EQ, VThread};

/// Signature of every opcode handler.
pub type Handler = fn(&mut Exec<'_>, &Instruction) -> bool;

/// Execution state handed to a handler.
pub struct Exec<'a> {
    pub(crate) core: &'a mut VmCore,
    pub(crate) net: &'a mut Network,
    pub(crate) sched: &'a mut dyn Scheduler,
    pub(crate) id: ThreadId,
}

impl fmt::Debug for Exec<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exec").field("thread", &self.id).finish_non_exhaustive()
    }
}

impl Exec<'_> {
    /// The running thread's handle.
    pub const fn thread_id(&self) -> ThreadId {
        self.id
    }

    /// The running thread.
    #[inline]
    pub fn thr(&mut self) -> &mut VThread {
        self.core.thread_mut(self.id)
    }

    /// The network.
    pub fn network(&mut self) -> &mut Network {
        self.net
    }

    /// Index register `reg`.
    #[inline]
    pub(crate) fn index(&mut self, reg: u32) -> i64 {
        self.thr().word(reg as usize)
    }

    /// True if the last index computation had an undefined source.
    #[inline]
    pub(crate) fn undefined(&mut self) -> bool {
        self.thr().flag(FLAG_EQ) == Bit4::One
    }

    fn auto_slot(&self, net: NetId) -> Option<usize> {
        match self.net.functor(net) {
            Some(Functor::AutoVar(var)) => Some(var.slot()),
            _ => None,
        }
    }

    fn read_context(&mut self) -> ContextId {
        let id = self.id;
        self.thr()
            .rd_context
            .unwrap_or_else(|| fatal(Fatal::ThreadState { thread: id.index, reason: "automatic read without a context" }))
    }

    fn write_context(&mut self) -> ContextId {
        let id = self.id;
        self.thr()
            .wt_context
            .unwrap_or_else(|| fatal(Fatal::ThreadState { thread: id.index, reason: "automatic write without a context" }))
    }

    /// Current value of the variable on `net`, from the thread's context for automatic
    /// variables.
    pub(crate) fn read_var(&mut self, net: NetId) -> Value {
        match self.auto_slot(net) {
            Some(slot) => {
                let ctx = self.read_context();
                self.core.scopes.context(ctx).item(slot).clone()
            }
            None => self.net.read(net),
        }
    }

    /// Current 4-state value of the vector variable on `net`.
    pub(crate) fn read_vec4(&mut self, net: NetId) -> Vec4 {
        self.read_var(net)
            .to_vec4()
            .unwrap_or_else(|| fatal(Fatal::WrongFunctor { net: net.0, expected: "vector signal" }))
    }

    /// Width of the vector variable on `net`.
    pub(crate) fn var_width(&mut self, net: NetId) -> u32 {
        match self.auto_slot(net) {
            Some(_) => self.read_vec4(net).width(),
            None => self.net.signal_width(net),
        }
    }

    /// Writes a whole value into the variable on `net`.
    pub(crate) fn write_var(&mut self, net: NetId, value: Value) {
        match self.auto_slot(net) {
            Some(slot) => {
                let ctx = self.write_context();
                self.core.scopes.context_mut(ctx).set_item(slot, value.clone());
                self.net.send(net, &value, self.sched);
            }
            None => self.net.deliver(net.port(0), &value, self.sched),
        }
    }

    /// Writes `bits` at offset `base` of the vector variable on `net`.
    pub(crate) fn write_var_part(&mut self, net: NetId, bits: &Vec4, base: u32) {
        match self.auto_slot(net) {
            Some(slot) => {
                let ctx = self.write_context();
                let mut cur = self
                    .core
                    .scopes
                    .context(ctx)
                    .item(slot)
                    .to_vec4()
                    .unwrap_or_else(|| fatal(Fatal::WrongFunctor { net: net.0, expected: "vector signal" }));
                let _ = cur.set_vec(base, bits);
                let value = Value::Vec4(cur);
                self.core.scopes.context_mut(ctx).set_item(slot, value.clone());
                self.net.send(net, &value, self.sched);
            }
            None => {
                let vwid = self.net.signal_width(net);
                self.net.deliver_vec4_pv(net.port(0), bits, PartSelect { base, vwid }, self.sched);
            }
        }
    }
}

/// Clips a write of `value` at signed offset `off` into a `width`-bit target.
///
/// Returns the in-range offset and the bits that land inside the target, or `None` when
/// nothing does.
pub(crate) fn clip_part(off: i64, value: &Vec4, width: u32) -> Option<(u32, Vec4)> {
    let wid = i64::from(value.width());
    let (off, val) = if off < 0 {
        if off + wid <= 0 {
            return None;
        }
        (0, value.subvalue((-off) as u32, (wid + off) as u32))
    } else {
        (off, value.clone())
    };
    if off >= i64::from(width) {
        return None;
    }
    let room = (i64::from(width) - off) as u32;
    let val = if val.width() > room { val.subvalue(0, room) } else { val };
    Some((off as u32, val))
}

/// Reads `wid` bits of `v` starting at the signed position `base`; positions outside `v`
/// read as `X`.
pub(crate) fn select(v: &Vec4, base: i64, wid: u32) -> Vec4 {
    if base >= 0 && base <= i64::from(u32::MAX) {
        return v.subvalue(base as u32, wid);
    }
    let mut out = Vec4::xs(wid);
    for i in 0..wid {
        let src = base + i64::from(i);
        if (0..i64::from(v.width())).contains(&src) {
            out.set_bit(i, v.bit(src as u32));
        }
    }
    out
}
