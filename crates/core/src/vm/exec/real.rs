//! Real stack handlers and conversions between reals, vectors and index registers.

use super::Exec;
use crate::common::NetId;
use crate::common::error::{Fatal, fatal};
use crate::logic::literal::decode_real;
use crate::logic::{Bit4, Vec4};
use crate::net::Value;
use crate::vm::code::Instruction;
use crate::vm::thread::{FLAG_EQ, FLAG_LT};

fn read_real(ex: &mut Exec<'_>, net: NetId) -> f64 {
    match ex.read_var(net) {
        Value::Real(r) => r,
        _ => fatal(Fatal::WrongFunctor { net: net.0, expected: "real signal" }),
    }
}

fn binary(ex: &mut Exec<'_>, f: impl FnOnce(f64, f64) -> f64) -> bool {
    let stack = &mut ex.thr().real;
    let r = stack.pop();
    let top = stack.peek_mut(0);
    *top = f(*top, r);
    true
}

/// `%pushi/real mant, exp`: pushes a real encoded as a mantissa and a biased exponent.
pub fn pushi_real(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let value = decode_real(inst.number(0), inst.bit(1));
    ex.thr().real.push(value);
    true
}

/// `%load/real net`
pub fn load_real(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let value = read_real(ex, inst.net(0));
    ex.thr().real.push(value);
    true
}

/// `%store/real net`
pub fn store_real(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let value = ex.thr().real.pop();
    ex.write_var(inst.net(0), Value::Real(value));
    true
}

/// `%load/ar arr, idx`: an undefined or negative address reads `0.0`.
pub fn load_ar(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let adr = ex.index(inst.bit(1));
    let value = if ex.undefined() || adr < 0 { 0.0 } else { ex.net.array(inst.array(0)).get_real(adr as u64) };
    ex.thr().real.push(value);
    true
}

/// `%store/reala arr, idx`
pub fn store_reala(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let value = ex.thr().real.pop();
    let adr = ex.index(inst.bit(1));
    if !ex.undefined() && adr >= 0 {
        let _ = ex.net.array_mut(inst.array(0)).set_real(adr as u64, value);
    }
    true
}

/// `%pop/real n`
pub fn pop_real(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    ex.thr().real.pop_n(inst.number(0) as usize);
    true
}

/// `%dup/real`
pub fn dup_real(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    let stack = &mut ex.thr().real;
    let top = *stack.peek(0);
    stack.push(top);
    true
}

/// `%add/wr`
pub fn add_wr(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    binary(ex, |l, r| l + r)
}

/// `%sub/wr`
pub fn sub_wr(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    binary(ex, |l, r| l - r)
}

/// `%mul/wr`
pub fn mul_wr(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    binary(ex, |l, r| l * r)
}

/// `%div/wr`
pub fn div_wr(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    binary(ex, |l, r| l / r)
}

/// `%mod/wr`
pub fn mod_wr(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    binary(ex, |l, r| l % r)
}

/// `%pow/wr`
pub fn pow_wr(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    binary(ex, f64::powf)
}

/// `%max/wr`: a NaN operand yields the other one.
pub fn max_wr(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    binary(ex, f64::max)
}

/// `%min/wr`
pub fn min_wr(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    binary(ex, f64::min)
}

/// `%abs/wr`
pub fn abs_wr(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    let top = ex.thr().real.peek_mut(0);
    *top = top.abs();
    true
}

/// `%cmp/wr`: sets flag 4 to `l == r` and flag 5 to `l < r`.
pub fn cmp_wr(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    let thr = ex.thr();
    let r = thr.real.pop();
    let l = thr.real.pop();
    thr.set_flag(FLAG_EQ, Bit4::from_bool(l == r));
    thr.set_flag(FLAG_LT, Bit4::from_bool(l < r));
    true
}

/// `%cvt/rv`: pops an unsigned vector and pushes it as a real.
pub fn cvt_rv(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    let thr = ex.thr();
    let v = thr.vec4.pop();
    thr.real.push(v.to_f64(false));
    true
}

/// `%cvt/rv/s`
pub fn cvt_rv_s(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    let thr = ex.thr();
    let v = thr.vec4.pop();
    thr.real.push(v.to_f64(true));
    true
}

/// `%cvt/vr wid`: pops a real and pushes it rounded to a `wid`-bit vector.
pub fn cvt_vr(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let wid = inst.number(0) as u32;
    let thr = ex.thr();
    let r = thr.real.pop();
    thr.vec4.push(Vec4::from_f64(wid, r));
    true
}

/// `%cvt/sr reg`: pops a real into an index register, rounded.
pub fn cvt_sr(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let thr = ex.thr();
    let r = thr.real.pop();
    thr.set_word(inst.bit(0) as usize, r.round() as i64);
    true
}

/// `%cvt/ur reg`
pub fn cvt_ur(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let thr = ex.thr();
    let r = thr.real.pop();
    thr.set_word(inst.bit(0) as usize, r.round() as u64 as i64);
    true
}
