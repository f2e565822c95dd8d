//! Foreign call handlers.

use tracing::trace;

use super::Exec;
use crate::common::error::{Fatal, fatal};
use crate::logic::{Bit4, Vec4};
use crate::net::{ObjectRef, Value};
use crate::vm::code::{Instruction, Return};
use crate::vm::foreign::{ForeignCall, ForeignOutcome};
use crate::vm::thread::Wait;

fn invoke(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let id = ex.id;
    let site_id = inst.call(0);
    let core = &mut *ex.core;
    let idx = site_id.0 as usize;
    let (Some(site), Some(&proc_idx)) = (core.sites.get(idx), core.site_procs.get(idx)) else {
        fatal(Fatal::Operand { mnemonic: inst.mnemonic(), index: 0, expected: "a call site" });
    };
    let (args, ret_kind) = (site.args, site.ret);
    trace!(target: "vsim::vm", thread = %id, name = %site.name, "foreign call");

    let thread = core
        .threads
        .get_mut(id)
        .unwrap_or_else(|| fatal(Fatal::StaleHandle { kind: "thread", index: id.index }));
    let procedure = core.foreign.get_mut(proc_idx);
    let mut call = ForeignCall { thread, id, site, network: &mut *ex.net, sched: &mut *ex.sched, ret: None };
    let outcome = procedure.call(&mut call);
    let ret = call.ret.take();

    let thr = ex.thr();
    thr.vec4.pop_n(args.vec4);
    thr.real.pop_n(args.real);
    thr.string.pop_n(args.string);
    thr.object.pop_n(args.object);
    match ret_kind {
        Return::None => {}
        Return::Vec4(width) => {
            let v = ret.and_then(|r| r.to_vec4()).map_or_else(|| Vec4::xs(width), |v| v.resize(width, Bit4::Zero));
            thr.vec4.push(v);
        }
        Return::Real => thr.real.push(match ret {
            Some(Value::Real(r)) => r,
            _ => 0.0,
        }),
        Return::Str => thr.string.push(match ret {
            Some(Value::Str(s)) => s,
            _ => String::new(),
        }),
        Return::Object => thr.object.push(match ret {
            Some(Value::Object(o)) => o,
            _ => ObjectRef::null(),
        }),
    }

    match outcome {
        ForeignOutcome::Complete => true,
        ForeignOutcome::Yield(delay) => {
            ex.sched.schedule_thread(id, delay, false);
            ex.core.block(id, Wait::Foreign);
            false
        }
        ForeignOutcome::Block => {
            ex.core.block(id, Wait::Foreign);
            false
        }
    }
}

/// `%vpi_call site`: calls a system task.
pub fn vpi_call(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    invoke(ex, inst)
}

/// `%vpi_func site`: calls a system function returning a vector.
pub fn vpi_func(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    invoke(ex, inst)
}

/// `%vpi_func/o site`: calls a system function returning an object handle.
pub fn vpi_func_o(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    invoke(ex, inst)
}

/// `%vpi_func/r site`: calls a system function returning a real.
pub fn vpi_func_r(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    invoke(ex, inst)
}

/// `%vpi_func/s site`: calls a system function returning a string.
pub fn vpi_func_s(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    invoke(ex, inst)
}
