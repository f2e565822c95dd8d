//! # ALU Tests
//!
//! Arithmetic, bitwise, shift and comparison operators with 4-state semantics.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use vsim_core::logic::alu::arithmetic::add_ripple;
use vsim_core::logic::alu::logic::{LogicOp, apply, blend, reduce};
use vsim_core::logic::alu::{Alu, ArithOp, CompareOp};
use vsim_core::logic::{Bit4, Vec4};

use crate::common::harness::vec;

fn exec(op: ArithOp, a: &str, b: &str) -> String {
    Alu::execute(op, &vec(a), &vec(b)).to_string()
}

fn cmp(op: CompareOp, a: &str, b: &str) -> Bit4 {
    Alu::compare(op, &vec(a), &vec(b))
}

#[rstest]
#[case(ArithOp::Add, "0001", "0010", "0011")]
#[case(ArithOp::Add, "1111", "0001", "0000")]
#[case(ArithOp::Sub, "0001", "0010", "1111")]
#[case(ArithOp::Mul, "0011", "0101", "1111")]
#[case(ArithOp::Div, "1110", "0011", "0100")]
#[case(ArithOp::Mod, "1110", "0011", "0010")]
#[case(ArithOp::DivS, "1110", "0001", "1110")]
#[case(ArithOp::ModS, "1001", "0010", "1111")]
#[case(ArithOp::Pow, "0011", "0010", "1001")]
fn test_defined_arithmetic(#[case] op: ArithOp, #[case] a: &str, #[case] b: &str, #[case] expected: &str) {
    assert_eq!(exec(op, a, b), expected);
}

#[rstest]
#[case(ArithOp::Add)]
#[case(ArithOp::Sub)]
#[case(ArithOp::Mul)]
#[case(ArithOp::Div)]
#[case(ArithOp::Mod)]
#[case(ArithOp::Pow)]
fn test_undefined_operand_gives_all_x(#[case] op: ArithOp) {
    assert_eq!(exec(op, "001x", "0001"), "xxxx");
    assert_eq!(exec(op, "0011", "z001"), "xxxx");
}

#[test]
fn test_division_by_zero_is_x() {
    assert_eq!(exec(ArithOp::Div, "0110", "0000"), "xxxx");
    assert_eq!(exec(ArithOp::ModS, "0110", "0000"), "xxxx");
}

#[test]
fn test_signed_min_divided_by_minus_one_wraps() {
    assert_eq!(exec(ArithOp::DivS, "1000", "1111"), "1000");
    assert_eq!(exec(ArithOp::ModS, "1000", "1111"), "0000");
}

#[rstest]
#[case("0000", "1111", "xxxx")]
#[case("0001", "1111", "0001")]
#[case("1111", "1111", "1111")]
#[case("1111", "1110", "0001")]
#[case("0010", "1111", "0000")]
fn test_signed_pow_negative_exponent(#[case] base: &str, #[case] exp: &str, #[case] expected: &str) {
    assert_eq!(exec(ArithOp::PowS, base, exp), expected);
}

#[test]
fn test_ripple_add_matches_add_when_defined() {
    assert_eq!(add_ripple(&vec("0110"), &vec("0011")).to_string(), "1001");
    assert_eq!(add_ripple(&vec("0110"), &vec("00x1")).to_string(), "xxxx");
}

#[rstest]
#[case(ArithOp::ShiftL, "0011", "01", "0110")]
#[case(ArithOp::ShiftR, "1100", "10", "0011")]
#[case(ArithOp::ShiftRS, "1000", "10", "1110")]
#[case(ArithOp::ShiftL, "0011", "111", "0000")]
#[case(ArithOp::ShiftRS, "1000", "111", "1111")]
#[case(ArithOp::ShiftL, "0011", "0x", "xxxx")]
#[case(ArithOp::ShiftR, "x100", "01", "0x10")]
fn test_shifts(#[case] op: ArithOp, #[case] a: &str, #[case] amount: &str, #[case] expected: &str) {
    assert_eq!(exec(op, a, amount), expected);
}

#[rstest]
#[case(LogicOp::And, "01xz", "1111", "01xx")]
#[case(LogicOp::And, "01xz", "0000", "0000")]
#[case(LogicOp::Or, "01xz", "1111", "1111")]
#[case(LogicOp::Xor, "01xz", "0101", "00xx")]
#[case(LogicOp::Nand, "1100", "1010", "0111")]
#[case(LogicOp::Nor, "1100", "1010", "0001")]
#[case(LogicOp::Xnor, "1100", "1010", "1001")]
fn test_bitwise(#[case] op: LogicOp, #[case] a: &str, #[case] b: &str, #[case] expected: &str) {
    assert_eq!(apply(op, &vec(a), &vec(b)).to_string(), expected);
}

#[rstest]
#[case(LogicOp::And, "1111", Bit4::One)]
#[case(LogicOp::And, "1x01", Bit4::Zero)]
#[case(LogicOp::And, "1x11", Bit4::X)]
#[case(LogicOp::Or, "000z", Bit4::X)]
#[case(LogicOp::Or, "0z10", Bit4::One)]
#[case(LogicOp::Xor, "0111", Bit4::One)]
#[case(LogicOp::Nor, "0000", Bit4::One)]
#[case(LogicOp::Xnor, "01", Bit4::Zero)]
fn test_reductions(#[case] op: LogicOp, #[case] v: &str, #[case] expected: Bit4) {
    assert_eq!(reduce(op, &vec(v)), expected);
}

#[test]
fn test_blend_marks_differing_bits() {
    assert_eq!(blend(&vec("1100"), &vec("1010")).to_string(), "1xx0");
}

#[test]
fn test_equality_families_on_undefined_bits() {
    // 4'b10xz against itself: === is true, == is X, ==? is true.
    assert_eq!(cmp(CompareOp::Eeq, "10xz", "10xz"), Bit4::One);
    assert_eq!(cmp(CompareOp::Eq, "10xz", "10xz"), Bit4::X);
    assert_eq!(cmp(CompareOp::Weq, "10xz", "10xz"), Bit4::One);
    assert_eq!(cmp(CompareOp::Nee, "10xz", "10xz"), Bit4::Zero);
    assert_eq!(cmp(CompareOp::Ne, "10xz", "10xz"), Bit4::X);
}

#[test]
fn test_logical_equality_defined_mismatch_wins() {
    assert_eq!(cmp(CompareOp::Eq, "0x", "1x"), Bit4::Zero);
    assert_eq!(cmp(CompareOp::Ne, "0x", "1x"), Bit4::One);
}

#[test]
fn test_wildcard_equality() {
    assert_eq!(cmp(CompareOp::Weq, "1011", "1x1z"), Bit4::One);
    assert_eq!(cmp(CompareOp::Weq, "0011", "1x1z"), Bit4::Zero);
    assert_eq!(cmp(CompareOp::Weq, "x011", "1x1z"), Bit4::X);
    assert_eq!(cmp(CompareOp::Wne, "1011", "1x1z"), Bit4::Zero);
}

#[test]
fn test_casex_and_casez() {
    assert_eq!(cmp(CompareOp::Eqx, "1x0", "110"), Bit4::One);
    assert_eq!(cmp(CompareOp::Eqz, "1x0", "110"), Bit4::Zero);
    assert_eq!(cmp(CompareOp::Eqz, "1z0", "110"), Bit4::One);
}

#[rstest]
#[case(CompareOp::Gt, "1000", "0111", Bit4::One)]
#[case(CompareOp::GtS, "1000", "0111", Bit4::Zero)]
#[case(CompareOp::Ge, "0101", "0101", Bit4::One)]
#[case(CompareOp::GeS, "1111", "1110", Bit4::One)]
#[case(CompareOp::Gt, "1x00", "0111", Bit4::X)]
fn test_magnitude(#[case] op: CompareOp, #[case] a: &str, #[case] b: &str, #[case] expected: Bit4) {
    assert_eq!(cmp(op, a, b), expected);
}

proptest! {
    #[test]
    fn prop_add_matches_wrapping_add(a in any::<u32>(), b in any::<u32>()) {
        let sum = Alu::execute(ArithOp::Add, &Vec4::from_u64(32, u64::from(a)), &Vec4::from_u64(32, u64::from(b)));
        prop_assert_eq!(sum.to_u64(), Some(u64::from(a.wrapping_add(b))));
    }

    #[test]
    fn prop_sub_then_add_is_identity(a in any::<u64>(), b in any::<u64>()) {
        let (va, vb) = (Vec4::from_u64(64, a), Vec4::from_u64(64, b));
        let diff = Alu::execute(ArithOp::Sub, &va, &vb);
        prop_assert_eq!(Alu::execute(ArithOp::Add, &diff, &vb), va);
    }

    #[test]
    fn prop_wide_mul_low_word(a in any::<u64>(), b in any::<u64>()) {
        let prod = Alu::execute(ArithOp::Mul, &Vec4::from_u64(128, a), &Vec4::from_u64(128, b));
        let expected = u128::from(a) * u128::from(b);
        prop_assert_eq!(prod.to_u64(), Some(expected as u64));
        prop_assert_eq!(prod.subvalue(64, 64).to_u64(), Some((expected >> 64) as u64));
    }

    #[test]
    fn prop_signed_division_truncates(a in any::<i32>(), b in any::<i32>().prop_filter("non-zero", |b| *b != 0)) {
        prop_assume!(!(a == i32::MIN && b == -1));
        let (va, vb) = (Vec4::from_i64(32, i64::from(a)), Vec4::from_i64(32, i64::from(b)));
        prop_assert_eq!(Alu::execute(ArithOp::DivS, &va, &vb).to_i64(), Some(i64::from(a / b)));
        prop_assert_eq!(Alu::execute(ArithOp::ModS, &va, &vb).to_i64(), Some(i64::from(a % b)));
    }

    #[test]
    fn prop_equality_is_reflexive_when_defined(a in any::<u64>()) {
        let v = Vec4::from_u64(64, a);
        prop_assert_eq!(Alu::compare(CompareOp::Eq, &v, &v), Bit4::One);
        prop_assert_eq!(Alu::compare(CompareOp::Eeq, &v, &v), Bit4::One);
    }
}
