//! # Vec4 Tests
//!
//! Construction, bit access, slicing, resizing and numeric conversion of 4-state vectors.

use proptest::prelude::*;
use vsim_core::logic::{Bit4, Vec4};

use crate::common::harness::vec;

#[test]
fn test_fill_constructors() {
    assert_eq!(Vec4::zeros(3).to_string(), "000");
    assert_eq!(Vec4::xs(2).to_string(), "xx");
    assert_eq!(Vec4::zs(4).to_string(), "zzzz");
    assert!(Vec4::xs(70).is_all(Bit4::X));
    assert!(!Vec4::zeros(70).has_xz());
}

#[test]
fn test_bit_order() {
    let v = vec("10xz");
    assert_eq!(v.width(), 4);
    assert_eq!(v.bit(0), Bit4::Z);
    assert_eq!(v.bit(1), Bit4::X);
    assert_eq!(v.bit(3), Bit4::One);
    assert_eq!(v.msb(), Bit4::One);
    assert_eq!(format!("{v:?}"), "4'b10xz");
}

#[test]
fn test_set_bit_across_words() {
    let mut v = Vec4::zeros(130);
    v.set_bit(129, Bit4::One);
    v.set_bit(64, Bit4::Z);
    assert_eq!(v.bit(129), Bit4::One);
    assert_eq!(v.bit(64), Bit4::Z);
    assert_eq!(v.bit(63), Bit4::Zero);
    assert!(v.has_xz());
}

#[test]
fn test_integer_conversions() {
    let v = Vec4::from_u64(8, 0x1ff);
    assert_eq!(v.to_u64(), Some(0xff));
    assert_eq!(Vec4::from_i64(8, -2).to_string(), "11111110");
    assert_eq!(vec("1110").to_i64(), Some(-2));
    assert_eq!(vec("1x").to_u64(), None);
}

#[test]
fn test_real_conversions() {
    assert_eq!(Vec4::from_f64(8, 2.5).to_u64(), Some(3));
    assert_eq!(Vec4::from_f64(8, -2.5).to_i64(), Some(-3));
    assert!(Vec4::from_f64(4, f64::NAN).is_all(Bit4::X));
    assert_eq!(vec("1111").to_f64(true), -1.0);
    assert_eq!(vec("1111").to_f64(false), 15.0);
    assert_eq!(vec("1x1").to_f64(false), 5.0);
}

#[test]
fn test_subvalue_reads_x_past_the_end() {
    let v = vec("1010");
    assert_eq!(v.subvalue(1, 2).to_string(), "01");
    assert_eq!(v.subvalue(2, 4).to_string(), "xx10");
}

#[test]
fn test_set_vec_reports_change_and_clips() {
    let mut v = Vec4::zeros(4);
    assert!(v.set_vec(2, &vec("111")));
    assert_eq!(v.to_string(), "1100");
    assert!(!v.set_vec(2, &vec("11")));
}

#[test]
fn test_resize_and_sign_extend() {
    assert_eq!(vec("10").resize(4, Bit4::Zero).to_string(), "0010");
    assert_eq!(vec("10").sign_extend(4).to_string(), "1110");
    assert_eq!(vec("x0").sign_extend(3).to_string(), "xx0");
    assert_eq!(vec("1100").resize(2, Bit4::Zero).to_string(), "00");
}

#[test]
fn test_concat() {
    assert_eq!(Vec4::concat(&vec("1z"), &vec("0x0")).to_string(), "1z0x0");
}

#[test]
fn test_z_to_x_and_invert() {
    let mut v = vec("01xz");
    v.z_to_x();
    assert_eq!(v.to_string(), "01xx");
    let mut w = vec("01xz");
    w.invert();
    assert_eq!(w.to_string(), "10xx");
}

#[test]
fn test_parse_round_trip_display() {
    let v: Vec4 = "C4<0z1x>".parse().unwrap();
    assert_eq!(v.to_string(), "0z1x");
}

proptest! {
    #[test]
    fn prop_u64_round_trip(value in any::<u64>(), width in 1u32..=64) {
        let v = Vec4::from_u64(width, value);
        let mask = if width == 64 { u64::MAX } else { (1u64 << width) - 1 };
        prop_assert_eq!(v.to_u64(), Some(value & mask));
    }

    #[test]
    fn prop_sign_extend_preserves_value(value in any::<i16>()) {
        let v = Vec4::from_i64(16, i64::from(value));
        prop_assert_eq!(v.sign_extend(64).to_i64(), Some(i64::from(value)));
    }

    #[test]
    fn prop_subvalue_of_concat(hi in any::<u32>(), lo in any::<u32>()) {
        let joined = Vec4::concat(&Vec4::from_u64(32, u64::from(hi)), &Vec4::from_u64(32, u64::from(lo)));
        prop_assert_eq!(joined.subvalue(32, 32).to_u64(), Some(u64::from(hi)));
        prop_assert_eq!(joined.subvalue(0, 32).to_u64(), Some(u64::from(lo)));
    }
}
