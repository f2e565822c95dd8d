//! Non-blocking, continuous and forced assignment handlers.
//!
//! Signal port 1 carries procedural continuous assignments and port 2 forces; releasing and
//! deassigning go through the network so the override filter and driver links stay in step.

use tracing::error;

use super::{Exec, clip_part};
use crate::common::NetId;
use crate::common::error::{Fatal, fatal};
use crate::net::{Functor, Value};
use crate::sched::PartSelect;
use crate::vm::code::Instruction;

const CASSIGN_PORT: u8 = 1;
const FORCE_PORT: u8 = 2;

fn schedule_full(ex: &mut Exec<'_>, net: NetId, delay: u64) -> bool {
    let value = ex.thr().vec4.pop();
    ex.sched.schedule_assign(net.port(0), delay, value, None);
    true
}

/// `%assign/vec4 net, delay`: non-blocking assignment after an immediate delay.
pub fn assign_vec4(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    schedule_full(ex, inst.net(0), u64::from(inst.bit(1)))
}

/// `%assign/vec4/d net, reg`: non-blocking assignment after the delay in an index register.
pub fn assign_vec4_d(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let delay = u64::try_from(ex.index(inst.bit(1))).unwrap_or(0);
    schedule_full(ex, inst.net(0), delay)
}

/// `%assign/vec4/off/d net, off, delay`: non-blocking part assignment.
///
/// An undefined offset skips the write; bits outside the target are dropped.
pub fn assign_vec4_off_d(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let net = inst.net(0);
    let value = ex.thr().vec4.pop();
    if ex.undefined() {
        return true;
    }
    let off = ex.index(inst.bit(1));
    let delay = u64::try_from(ex.index(inst.bit(2))).unwrap_or(0);
    let vwid = ex.net.signal_width(net);
    if let Some((base, bits)) = clip_part(off, &value, vwid) {
        ex.sched.schedule_assign(net.port(0), delay, bits, Some(PartSelect { base, vwid }));
    }
    true
}

/// `%cassign/vec4 net`: procedural continuous assignment of a constant.
pub fn cassign_vec4(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let value = Value::Vec4(ex.thr().vec4.pop());
    ex.net.deliver(inst.net(0).port(CASSIGN_PORT), &value, ex.sched);
    true
}

/// `%force/vec4 net`: forces a constant.
pub fn force_vec4(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let value = Value::Vec4(ex.thr().vec4.pop());
    ex.net.deliver(inst.net(0).port(FORCE_PORT), &value, ex.sched);
    true
}

fn link_driver(ex: &mut Exec<'_>, dst: NetId, src: NetId, port: u8) -> bool {
    let linked = match port {
        CASSIGN_PORT => ex.net.cassign_link(dst, src),
        _ => ex.net.force_link(dst, src),
    };
    if let Err(err) = linked {
        error!(target: "vsim::vm", dst = %dst, src = %src, %err, "driver link failed");
        fatal(Fatal::BadPort { functor: "signal", port: u32::from(port) });
    }
    // A signal source already holds a value; anything else delivers on its next change.
    if matches!(ex.net.functor(src), Some(Functor::Signal(_))) {
        let current = ex.net.read(src);
        ex.net.deliver(dst.port(port), &current, ex.sched);
    }
    true
}

/// `%cassign/link dst, src`: makes `src` the continuous-assign driver of `dst`.
pub fn cassign_link(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    link_driver(ex, inst.net(0), inst.net(1), CASSIGN_PORT)
}

/// `%force/link dst, src`: makes `src` the force driver of `dst`.
pub fn force_link(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    link_driver(ex, inst.net(0), inst.net(1), FORCE_PORT)
}

/// `%deassign net, base, wid`
pub fn deassign(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    ex.net.deassign(inst.net(0), inst.bit(1), inst.bit(2));
    true
}

/// `%release/net net, base, wid`: the net falls back to its drivers.
pub fn release_net(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    ex.net.release(inst.net(0), inst.bit(1), inst.bit(2), true, ex.sched);
    true
}

/// `%release/reg net, base, wid`: the variable keeps the forced value.
pub fn release_reg(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    ex.net.release(inst.net(0), inst.bit(1), inst.bit(2), false, ex.sched);
    true
}
