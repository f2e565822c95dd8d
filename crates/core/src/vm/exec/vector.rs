//! Vector stack handlers.

use tracing::warn;

use super::{Exec, clip_part, select};
use crate::common::error::{Fatal, fatal};
use crate::logic::alu::logic::blend as blend_bits;
use crate::logic::{Bit4, Vec4};
use crate::net::Value;
use crate::vm::code::Instruction;

/// Builds an immediate vector from its two 32-bit planes.
///
/// Bit `i` of `vala`/`valb` encodes bit `i` of the result (`00`=0, `10`=1, `01`=Z, `11`=X as
/// `a`,`b` pairs). Above bit 31 the result is filled with the state shared by every low bit
/// when both planes are uniform, otherwise with zeros.
pub fn immediate(vala: u32, valb: u32, wid: u32) -> Vec4 {
    let uniform = |p: u32| p == 0 || p == u32::MAX;
    if uniform(vala) && uniform(valb) {
        return Vec4::new(wid, Bit4::from_planes(vala != 0, valb != 0));
    }
    let mut out = Vec4::zeros(wid);
    for i in 0..wid.min(32) {
        out.set_bit(i, Bit4::from_planes((vala >> i) & 1 != 0, (valb >> i) & 1 != 0));
    }
    out
}

/// `%pushi/vec4 vala, valb, wid`
pub fn pushi_vec4(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let v = immediate(inst.bit(0), inst.bit(1), inst.number(2) as u32);
    ex.thr().vec4.push(v);
    true
}

/// `%concati/vec4 vala, valb, wid`: appends an immediate below the top of stack.
pub fn concati_vec4(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let imm = immediate(inst.bit(0), inst.bit(1), inst.number(2) as u32);
    let top = ex.thr().vec4.peek_mut(0);
    let joined = Vec4::concat(top, &imm);
    *top = joined;
    true
}

/// `%load/vec4 net`
pub fn load_vec4(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let v = ex.read_vec4(inst.net(0));
    ex.thr().vec4.push(v);
    true
}

/// `%load/vec4a arr, idx`: an undefined or negative address reads `X`.
pub fn load_vec4a(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let arr = inst.array(0);
    let adr = ex.index(inst.bit(1));
    let undefined = ex.undefined();
    let array = ex.net.array(arr);
    let v = if undefined || adr < 0 { Vec4::xs(array.width()) } else { array.get_vec4(adr as u64) };
    ex.thr().vec4.push(v);
    true
}

/// `%store/vec4 net, off, wid`: pops a `wid`-bit value and writes it at the offset held in
/// index register `off` (register 0 means offset zero).
pub fn store_vec4(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let net = inst.net(0);
    let off_reg = inst.bit(1);
    let wid = inst.bit(2);
    let val = ex.thr().vec4.pop();
    if val.width() != wid {
        fatal(Fatal::WidthMismatch { context: "%store/vec4", left: wid, right: val.width() });
    }
    let off = if off_reg == 0 {
        0
    } else {
        if ex.undefined() {
            warn!(target: "vsim::vm", thread = %ex.id, net = %net, "store with undefined offset skipped");
            return true;
        }
        ex.index(off_reg)
    };
    let sig_wid = ex.var_width(net);
    if off == 0 && wid == sig_wid {
        ex.write_var(net, Value::Vec4(val));
        return true;
    }
    if let Some((base, bits)) = clip_part(off, &val, sig_wid) {
        ex.write_var_part(net, &bits, base);
    }
    true
}

/// `%store/vec4a arr, adr, off`
pub fn store_vec4a(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let arr = inst.array(0);
    let val = ex.thr().vec4.pop();
    if ex.undefined() {
        warn!(target: "vsim::vm", thread = %ex.id, array = arr.0, "array store with undefined address skipped");
        return true;
    }
    let adr = ex.index(inst.bit(1));
    let off_reg = inst.bit(2);
    let off = if off_reg == 0 { 0 } else { ex.index(off_reg) };
    if adr < 0 {
        return true;
    }
    let width = ex.net.array(arr).width();
    if let Some((base, bits)) = clip_part(off, &val, width) {
        let _ = ex.net.array_mut(arr).set_vec4(adr as u64, base, &bits);
    }
    true
}

/// `%pop/vec4 n`
pub fn pop_vec4(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    ex.thr().vec4.pop_n(inst.number(0) as usize);
    true
}

/// `%dup/vec4`
pub fn dup_vec4(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    let stack = &mut ex.thr().vec4;
    let top = stack.peek(0).clone();
    stack.push(top);
    true
}

/// `%concat/vec4`: pops the low part and appends it below the new top.
pub fn concat_vec4(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    let stack = &mut ex.thr().vec4;
    let lsb = stack.pop();
    let top = stack.peek_mut(0);
    let joined = Vec4::concat(top, &lsb);
    *top = joined;
    true
}

/// `%pad/s wid`
pub fn pad_s(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let wid = inst.number(0) as u32;
    let top = ex.thr().vec4.peek_mut(0);
    *top = top.sign_extend(wid);
    true
}

/// `%pad/u wid`
pub fn pad_u(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let wid = inst.number(0) as u32;
    let top = ex.thr().vec4.peek_mut(0);
    *top = top.resize(wid, Bit4::Zero);
    true
}

fn part(ex: &mut Exec<'_>, wid: u32, signed: bool) -> bool {
    let stack = &mut ex.thr().vec4;
    let base = stack.pop();
    let top = stack.peek_mut(0);
    let base = if signed { base.to_i64() } else { base.to_u64().and_then(|b| i64::try_from(b).ok()) };
    *top = match base {
        Some(b) => select(top, b, wid),
        None => Vec4::xs(wid),
    };
    true
}

/// `%part/s wid`: pops a signed base and selects `wid` bits of the new top.
pub fn part_s(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    part(ex, inst.number(0) as u32, true)
}

/// `%part/u wid`
pub fn part_u(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    part(ex, inst.number(0) as u32, false)
}

/// `%parti/s wid, base, base_wid`: the immediate base is sign-extended from `base_wid` bits.
pub fn parti_s(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let wid = inst.number(0) as u32;
    let raw = inst.bit(1);
    let base_wid = inst.bit(2).clamp(1, 32);
    let shift = 32 - base_wid;
    let base = i64::from(((raw << shift) as i32) >> shift);
    let top = ex.thr().vec4.peek_mut(0);
    *top = select(top, base, wid);
    true
}

/// `%parti/u wid, base, base_wid`
pub fn parti_u(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let wid = inst.number(0) as u32;
    let base = i64::from(inst.bit(1));
    let top = ex.thr().vec4.peek_mut(0);
    *top = select(top, base, wid);
    true
}

/// `%replicate n`
pub fn replicate(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let count = inst.number(0);
    let top = ex.thr().vec4.peek_mut(0);
    let unit = top.clone();
    let mut out = Vec4::zeros(0);
    for _ in 0..count {
        out = Vec4::concat(&out, &unit);
    }
    *top = out;
    true
}

/// `%split/vec4 wid`: replaces the top with its high part, then pushes its low `wid` bits.
pub fn split_vec4(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let wid = inst.number(0) as u32;
    let stack = &mut ex.thr().vec4;
    let val = stack.pop();
    if wid > val.width() {
        fatal(Fatal::WidthMismatch { context: "%split/vec4", left: wid, right: val.width() });
    }
    stack.push(val.subvalue(wid, val.width() - wid));
    stack.push(val.subvalue(0, wid));
    true
}

/// `%blend`: bits equal in both operands pass, the rest become `X`.
pub fn blend(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    let stack = &mut ex.thr().vec4;
    let b = stack.pop();
    let top = stack.peek_mut(0);
    *top = blend_bits(top, &b);
    true
}
