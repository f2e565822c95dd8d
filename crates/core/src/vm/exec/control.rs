//! Control flow and thread lifecycle handlers.
//!
//! Handlers that suspend the running thread record why in its state and return `false` so the
//! fetch loop ends the quantum. Whatever wakes the thread again goes through the scheduler.

use tracing::trace;

use super::Exec;
use crate::common::error::{Fatal, fatal};
use crate::logic::{Bit4, Vec4};
use crate::net::Value;
use crate::vm::code::Instruction;
use crate::vm::thread::Wait;

/// `%noop`
pub fn noop(_ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    true
}

/// `%jmp label`
pub fn jmp(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    ex.thr().pc = inst.code(0);
    true
}

fn jump_if(ex: &mut Exec<'_>, inst: &Instruction, taken: impl FnOnce(Bit4) -> bool) -> bool {
    let thr = ex.thr();
    if taken(thr.flag(inst.bit(1) as usize)) {
        thr.pc = inst.code(0);
    }
    true
}

/// `%jmp/0 label, flag`: jumps if the flag is `0`.
pub fn jmp_0(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    jump_if(ex, inst, |f| f == Bit4::Zero)
}

/// `%jmp/0xz label, flag`: jumps unless the flag is `1`.
pub fn jmp_0xz(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    jump_if(ex, inst, |f| f != Bit4::One)
}

/// `%jmp/1 label, flag`
pub fn jmp_1(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    jump_if(ex, inst, |f| f == Bit4::One)
}

/// `%jmp/1xz label, flag`: jumps unless the flag is `0`.
pub fn jmp_1xz(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    jump_if(ex, inst, |f| f != Bit4::Zero)
}

fn suspend_for(ex: &mut Exec<'_>, delay: u64) -> bool {
    let id = ex.id;
    trace!(target: "vsim::vm", thread = %id, delay, "delay");
    ex.sched.schedule_thread(id, delay, false);
    ex.core.block(id, Wait::Delay);
    false
}

/// `%delay low, high`: suspends for the 64-bit delay `high:low`.
pub fn delay(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let d = (inst.number(1) << 32) | (inst.number(0) & 0xffff_ffff);
    suspend_for(ex, d)
}

/// `%delayx reg`: suspends for the delay held in an index register.
///
/// Negative delays count as zero.
pub fn delayx(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let d = ex.index(inst.bit(0));
    suspend_for(ex, u64::try_from(d).unwrap_or(0))
}

/// `%wait net`: blocks until the event functor on `net` fires.
pub fn wait(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let id = ex.id;
    ex.net.add_waiter(inst.net(0), id);
    ex.core.block(id, Wait::Event);
    false
}

/// `%event net`: triggers a named event.
pub fn event(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let token = Value::Vec4(Vec4::from(Bit4::One));
    ex.net.deliver(inst.net(0).port(0), &token, ex.sched);
    true
}

/// `%fork label, scope`: creates a child at `label` and schedules it.
///
/// A child in an automatic scope reads and writes the context most recently allocated by the
/// parent.
pub fn fork(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let (pc, scope) = (inst.code(0), inst.scope(1));
    let parent = ex.id;
    let child = ex.core.spawn(pc, scope, Some(parent));
    if ex.core.scopes.info(scope).automatic {
        let ctx = ex.thr().wt_context;
        let thr = ex.core.thread_mut(child);
        thr.wt_context = ctx;
        thr.rd_context = ctx;
        thr.inherited_context = ctx;
    }
    let push = ex.core.config.fork_push_priority;
    ex.core.wake(child, 0, push, ex.sched);
    true
}

/// `%join`
pub fn join(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    ex.core.join(ex.id)
}

/// `%join/detach count`
pub fn join_detach(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    ex.core.join_detach(ex.id, inst.number(0) as usize);
    true
}

/// `%wait/fork`: blocks until every detached child has ended.
pub fn wait_fork(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    ex.core.wait_fork(ex.id)
}

/// `%disable/fork`
pub fn disable_fork(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    ex.core.disable_fork(ex.id, ex.sched);
    true
}

/// `%disable scope`: disables every thread in `scope`, possibly including the caller.
pub fn disable(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    ex.core.disable_scope(inst.scope(0), ex.id, ex.sched)
}

/// `%end`
pub fn end(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    ex.core.end(ex.id, ex.sched);
    false
}

/// `%alloc scope`: pushes a fresh context for `scope` onto the write stack.
pub fn alloc(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let ctx = ex.core.scopes.alloc(inst.scope(0));
    let below = ex.thr().wt_context;
    ex.core.scopes.context_mut(ctx).stacked = below;
    ex.thr().wt_context = Some(ctx);
    true
}

/// `%free scope`: pops the read stack and returns the context to its scope.
pub fn free(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    let id = ex.id;
    let ctx = ex
        .thr()
        .rd_context
        .unwrap_or_else(|| fatal(Fatal::ThreadState { thread: id.index, reason: "%free without a context" }));
    let below = ex.core.scopes.context(ctx).stacked;
    ex.thr().rd_context = below;
    ex.core.scopes.free(ctx);
    true
}
