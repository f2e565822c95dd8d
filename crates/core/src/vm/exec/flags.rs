//! Flag and index register handlers.
//!
//! Index loads that read a vector report an undefined source through flag 4, which the next
//! addressed load or store consults before using the register.

use super::Exec;
use crate::logic::{Bit4, Vec4};
use crate::vm::code::Instruction;
use crate::vm::thread::FLAG_EQ;

fn flag_of(ex: &mut Exec<'_>, idx: u32) -> Bit4 {
    ex.thr().flag(idx as usize)
}

fn set_flag(ex: &mut Exec<'_>, idx: u32, value: Bit4) -> bool {
    ex.thr().set_flag(idx as usize, value);
    true
}

/// `%flag_and dst, src`
pub fn flag_and(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let (dst, src) = (inst.bit(0), inst.bit(1));
    let v = flag_of(ex, dst) & flag_of(ex, src);
    set_flag(ex, dst, v)
}

/// `%flag_or dst, src`
pub fn flag_or(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let (dst, src) = (inst.bit(0), inst.bit(1));
    let v = flag_of(ex, dst) | flag_of(ex, src);
    set_flag(ex, dst, v)
}

/// `%flag_mov dst, src`
pub fn flag_mov(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let v = flag_of(ex, inst.bit(1));
    set_flag(ex, inst.bit(0), v)
}

/// `%flag_inv flag`
pub fn flag_inv(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let v = !flag_of(ex, inst.bit(0));
    set_flag(ex, inst.bit(0), v)
}

/// `%flag_set/imm flag, value`: `0`, `1`, `2` (`Z`) or `3` (`X`).
pub fn flag_set_imm(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let v = match inst.bit(1) {
        0 => Bit4::Zero,
        1 => Bit4::One,
        2 => Bit4::Z,
        _ => Bit4::X,
    };
    set_flag(ex, inst.bit(0), v)
}

/// `%flag_get/vec4 flag`: pushes the flag as a 1-bit vector.
pub fn flag_get_vec4(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let v = flag_of(ex, inst.bit(0));
    ex.thr().vec4.push(Vec4::new(1, v));
    true
}

/// `%flag_set/vec4 flag`: pops a vector and stores its low bit.
pub fn flag_set_vec4(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let v = ex.thr().vec4.pop();
    let bit = if v.width() == 0 { Bit4::X } else { v.bit(0) };
    set_flag(ex, inst.bit(0), bit)
}

fn immediate(inst: &Instruction) -> i64 {
    let low = inst.number(1) & 0xffff_ffff;
    let high = u64::from(inst.bit(2));
    ((high << 32) | low) as i64
}

fn update(ex: &mut Exec<'_>, reg: u32, f: impl FnOnce(i64) -> i64) -> bool {
    let thr = ex.thr();
    let cur = thr.word(reg as usize);
    thr.set_word(reg as usize, f(cur));
    true
}

/// `%ix/load reg, low, high`
pub fn ix_load(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let v = immediate(inst);
    update(ex, inst.bit(0), |_| v)
}

/// `%ix/add reg, low, high`
pub fn ix_add(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let v = immediate(inst);
    update(ex, inst.bit(0), |cur| cur.wrapping_add(v))
}

/// `%ix/sub reg, low, high`
pub fn ix_sub(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let v = immediate(inst);
    update(ex, inst.bit(0), |cur| cur.wrapping_sub(v))
}

/// `%ix/mul reg, low, high`
pub fn ix_mul(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let v = immediate(inst);
    update(ex, inst.bit(0), |cur| cur.wrapping_mul(v))
}

/// `%ix/mov dst, src`
pub fn ix_mov(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let v = ex.index(inst.bit(1));
    update(ex, inst.bit(0), |_| v)
}

fn load_index(ex: &mut Exec<'_>, reg: u32, v: &Vec4, signed: bool) -> bool {
    let value = if signed { v.to_i64() } else { v.to_u64().map(|u| u as i64) };
    let thr = ex.thr();
    thr.set_word(reg as usize, value.unwrap_or(0));
    thr.set_flag(FLAG_EQ, Bit4::from_bool(value.is_none()));
    true
}

/// `%ix/vec4 reg`: pops an unsigned vector into an index register.
pub fn ix_vec4(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let v = ex.thr().vec4.pop();
    load_index(ex, inst.bit(0), &v, false)
}

/// `%ix/vec4/s reg`
pub fn ix_vec4_s(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let v = ex.thr().vec4.pop();
    load_index(ex, inst.bit(0), &v, true)
}

/// `%ix/getv reg, net`: loads an index register straight from a variable.
pub fn ix_getv(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let v = ex.read_vec4(inst.net(1));
    load_index(ex, inst.bit(0), &v, false)
}

/// `%ix/getv/s reg, net`
pub fn ix_getv_s(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let v = ex.read_vec4(inst.net(1));
    load_index(ex, inst.bit(0), &v, true)
}
