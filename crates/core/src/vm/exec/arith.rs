//! Vector arithmetic, bitwise operators, reductions and comparisons.
//!
//! Binary operators pop the right operand and replace the new top of stack with the result.
//! Comparisons pop both operands and report through the flag registers:
//! - flag 4: equality (or the operator's own match result)
//! - flag 5: less-than, for the magnitude comparisons
//! - flag 6: exact (`===`) equality, for the magnitude comparisons

use std::cmp::Ordering;

use super::Exec;
use super::vector::immediate;
use crate::logic::alu::logic::{self as bitwise, LogicOp};
use crate::logic::alu::{Alu, ArithOp, CompareOp, compare, shifts};
use crate::logic::{Bit4, Vec4};
use crate::vm::code::Instruction;
use crate::vm::thread::{FLAG_EEQ, FLAG_EQ, FLAG_LT};

fn binary(ex: &mut Exec<'_>, op: ArithOp) -> bool {
    let stack = &mut ex.thr().vec4;
    let b = stack.pop();
    let top = stack.peek_mut(0);
    *top = Alu::execute(op, top, &b);
    true
}

fn binary_imm(ex: &mut Exec<'_>, inst: &Instruction, op: ArithOp) -> bool {
    let imm = immediate(inst.bit(0), inst.bit(1), inst.number(2) as u32);
    let top = ex.thr().vec4.peek_mut(0);
    *top = Alu::execute(op, top, &imm);
    true
}

fn bitwise_op(ex: &mut Exec<'_>, op: LogicOp) -> bool {
    let stack = &mut ex.thr().vec4;
    let b = stack.pop();
    let top = stack.peek_mut(0);
    *top = bitwise::apply(op, top, &b);
    true
}

fn reduction(ex: &mut Exec<'_>, op: LogicOp) -> bool {
    let top = ex.thr().vec4.peek_mut(0);
    *top = Vec4::new(1, bitwise::reduce(op, top));
    true
}

/// `%add`
pub fn add(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    binary(ex, ArithOp::Add)
}

/// `%sub`
pub fn sub(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    binary(ex, ArithOp::Sub)
}

/// `%mul`
pub fn mul(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    binary(ex, ArithOp::Mul)
}

/// `%div`
pub fn div(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    binary(ex, ArithOp::Div)
}

/// `%div/s`
pub fn div_s(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    binary(ex, ArithOp::DivS)
}

/// `%mod`
pub fn modulo(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    binary(ex, ArithOp::Mod)
}

/// `%mod/s`
pub fn mod_s(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    binary(ex, ArithOp::ModS)
}

/// `%pow`
pub fn pow(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    binary(ex, ArithOp::Pow)
}

/// `%pow/s`
pub fn pow_s(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    binary(ex, ArithOp::PowS)
}

/// `%addi vala, valb, wid`
pub fn addi(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    binary_imm(ex, inst, ArithOp::Add)
}

/// `%subi vala, valb, wid`
pub fn subi(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    binary_imm(ex, inst, ArithOp::Sub)
}

/// `%muli vala, valb, wid`
pub fn muli(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    binary_imm(ex, inst, ArithOp::Mul)
}

/// `%and`
pub fn and(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    bitwise_op(ex, LogicOp::And)
}

/// `%or`
pub fn or(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    bitwise_op(ex, LogicOp::Or)
}

/// `%xor`
pub fn xor(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    bitwise_op(ex, LogicOp::Xor)
}

/// `%nand`
pub fn nand(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    bitwise_op(ex, LogicOp::Nand)
}

/// `%nor`
pub fn nor(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    bitwise_op(ex, LogicOp::Nor)
}

/// `%xnor`
pub fn xnor(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    bitwise_op(ex, LogicOp::Xnor)
}

/// `%inv`
pub fn inv(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    ex.thr().vec4.peek_mut(0).invert();
    true
}

/// `%and/r`
pub fn and_r(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    reduction(ex, LogicOp::And)
}

/// `%or/r`
pub fn or_r(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    reduction(ex, LogicOp::Or)
}

/// `%xor/r`
pub fn xor_r(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    reduction(ex, LogicOp::Xor)
}

/// `%nand/r`
pub fn nand_r(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    reduction(ex, LogicOp::Nand)
}

/// `%nor/r`
pub fn nor_r(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    reduction(ex, LogicOp::Nor)
}

/// `%xnor/r`
pub fn xnor_r(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    reduction(ex, LogicOp::Xnor)
}

#[derive(Clone, Copy)]
enum Shift {
    Left,
    Right,
    RightSigned,
}

fn shift(ex: &mut Exec<'_>, inst: &Instruction, dir: Shift) -> bool {
    let amount = ex.index(inst.bit(0));
    let undefined = ex.undefined();
    let top = ex.thr().vec4.peek_mut(0);
    let n = amount.unsigned_abs();
    // A negative amount shifts the other way.
    *top = match (dir, amount < 0) {
        (Shift::Left, false) | (Shift::Right | Shift::RightSigned, true) => shifts::shift_left(top, n, undefined),
        (Shift::Left, true) | (Shift::Right, false) => shifts::shift_right(top, n, undefined),
        (Shift::RightSigned, false) => shifts::shift_right_signed(top, n, undefined),
    };
    true
}

/// `%shiftl idx`: shifts the top left by index register `idx`.
pub fn shiftl(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    shift(ex, inst, Shift::Left)
}

/// `%shiftr idx`
pub fn shiftr(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    shift(ex, inst, Shift::Right)
}

/// `%shiftr/s idx`
pub fn shiftr_s(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    shift(ex, inst, Shift::RightSigned)
}

fn pop_pair(ex: &mut Exec<'_>) -> (Vec4, Vec4) {
    let stack = &mut ex.thr().vec4;
    let r = stack.pop();
    let l = stack.pop();
    (l, r)
}

fn set_eq(ex: &mut Exec<'_>, value: Bit4) -> bool {
    ex.thr().set_flag(FLAG_EQ, value);
    true
}

fn magnitude_flags(ex: &mut Exec<'_>, l: &Vec4, r: &Vec4, signed: bool) -> bool {
    let (eq, lt) = match compare::magnitude(l, r, signed) {
        Some(ord) => (Bit4::from_bool(ord == Ordering::Equal), Bit4::from_bool(ord == Ordering::Less)),
        None => (Bit4::X, Bit4::X),
    };
    let eeq = compare::eeq(l, r);
    let thr = ex.thr();
    thr.set_flag(FLAG_EQ, eq);
    thr.set_flag(FLAG_LT, lt);
    thr.set_flag(FLAG_EEQ, eeq);
    true
}

/// `%cmp/e`: flag 4 gets `l == r`.
pub fn cmp_e(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    let (l, r) = pop_pair(ex);
    set_eq(ex, Alu::compare(CompareOp::Eq, &l, &r))
}

/// `%cmp/ne`
pub fn cmp_ne(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    let (l, r) = pop_pair(ex);
    set_eq(ex, Alu::compare(CompareOp::Ne, &l, &r))
}

/// `%cmp/we`: wildcard equality, `X`/`Z` bits of `r` match anything.
pub fn cmp_we(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    let (l, r) = pop_pair(ex);
    set_eq(ex, Alu::compare(CompareOp::Weq, &l, &r))
}

/// `%cmp/wne`
pub fn cmp_wne(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    let (l, r) = pop_pair(ex);
    set_eq(ex, Alu::compare(CompareOp::Wne, &l, &r))
}

/// `%cmp/x`: casex match.
pub fn cmp_x(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    let (l, r) = pop_pair(ex);
    set_eq(ex, Alu::compare(CompareOp::Eqx, &l, &r))
}

/// `%cmp/z`: casez match.
pub fn cmp_z(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    let (l, r) = pop_pair(ex);
    set_eq(ex, Alu::compare(CompareOp::Eqz, &l, &r))
}

/// `%cmp/u`: unsigned magnitude comparison into flags 4, 5 and 6.
pub fn cmp_u(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    let (l, r) = pop_pair(ex);
    magnitude_flags(ex, &l, &r, false)
}

/// `%cmp/s`: signed magnitude comparison into flags 4, 5 and 6.
pub fn cmp_s(ex: &mut Exec<'_>, _inst: &Instruction) -> bool {
    let (l, r) = pop_pair(ex);
    magnitude_flags(ex, &l, &r, true)
}

fn pop_with_imm(ex: &mut Exec<'_>, inst: &Instruction) -> (Vec4, Vec4) {
    let l = ex.thr().vec4.pop();
    (l, immediate(inst.bit(0), inst.bit(1), inst.number(2) as u32))
}

/// `%cmpi/e vala, valb, wid`
pub fn cmpi_e(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let (l, r) = pop_with_imm(ex, inst);
    set_eq(ex, Alu::compare(CompareOp::Eq, &l, &r))
}

/// `%cmpi/ne vala, valb, wid`
pub fn cmpi_ne(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let (l, r) = pop_with_imm(ex, inst);
    set_eq(ex, Alu::compare(CompareOp::Ne, &l, &r))
}

/// `%cmpi/u vala, valb, wid`
pub fn cmpi_u(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let (l, r) = pop_with_imm(ex, inst);
    magnitude_flags(ex, &l, &r, false)
}

/// `%cmpi/s vala, valb, wid`
pub fn cmpi_s(ex: &mut Exec<'_>, inst: &Instruction) -> bool {
    let (l, r) = pop_with_imm(ex, inst);
    magnitude_flags(ex, &l, &r, true)
}
