//! # Strength Resolution Tests
//!
//! Verifies scalar resolution between drivers of differing strength and the vector
//! conversions used by tri-state nets.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use vsim_core::logic::{Bit4, Scalar, Strength, Vec8};

use crate::common::harness::vec;

fn drive(val: Bit4, strength: Strength) -> Scalar {
    Scalar::new(val, strength, strength)
}

#[test]
fn test_strong_beats_pull() {
    let strong1 = drive(Bit4::One, Strength::Strong);
    let pull0 = drive(Bit4::Zero, Strength::Pull);
    assert_eq!(Scalar::resolve(strong1, pull0), strong1);
    assert_eq!(Scalar::resolve(pull0, strong1), strong1);
}

#[test]
fn test_equal_strength_conflict_is_x() {
    let out = Scalar::resolve(drive(Bit4::Zero, Strength::Strong), drive(Bit4::One, Strength::Strong));
    assert_eq!(out.value(), Bit4::X);
    assert_eq!(out.strength0(), Strength::Strong.level());
    assert_eq!(out.strength1(), Strength::Strong.level());
    assert!(!out.is_unambiguous());
}

#[test]
fn test_hiz_is_identity() {
    let weak1 = drive(Bit4::One, Strength::Weak);
    assert_eq!(Scalar::resolve(Scalar::HIZ, weak1), weak1);
    assert_eq!(Scalar::resolve(weak1, Scalar::HIZ), weak1);
    assert_eq!(Scalar::resolve(Scalar::HIZ, Scalar::HIZ).value(), Bit4::Z);
}

#[test]
fn test_unambiguous_sweeps_weaker_ambiguous_range() {
    let pull_x = drive(Bit4::X, Strength::Pull);
    let strong1 = drive(Bit4::One, Strength::Strong);
    assert_eq!(Scalar::resolve(pull_x, strong1), strong1);
}

#[test]
fn test_ambiguous_ranges_union() {
    let weak_x = drive(Bit4::X, Strength::Weak);
    let strong_x = drive(Bit4::X, Strength::Strong);
    let out = Scalar::resolve(weak_x, strong_x);
    assert_eq!(out.value(), Bit4::X);
    assert_eq!(out.strength0(), Strength::Strong.level());
    assert_eq!(out.strength1(), Strength::Strong.level());
}

#[rstest]
#[case(Bit4::Zero)]
#[case(Bit4::One)]
#[case(Bit4::X)]
fn test_strong_scalar_round_trips_value(#[case] val: Bit4) {
    assert_eq!(Scalar::strong(val).value(), val);
    assert_eq!(Scalar::from_raw(Scalar::strong(val).raw()), Scalar::strong(val));
}

#[test]
fn test_z_scalar_is_hiz() {
    assert!(Scalar::strong(Bit4::Z).is_hiz());
    assert!(Scalar::new(Bit4::One, Strength::Strong, Strength::HiZ).is_hiz());
}

#[test]
fn test_vec8_from_vec4_keeps_values() {
    let v = Vec8::from_vec4(&vec("01xz"), Strength::Pull, Strength::Strong);
    assert_eq!(v.width(), 4);
    assert_eq!(v.to_vec4(), vec("01xz"));
    assert_eq!(v.value(2), drive(Bit4::One, Strength::Strong));
    assert_eq!(v.value(3), drive(Bit4::Zero, Strength::Pull));
    assert!(v.value(0).is_hiz());
}

#[test]
fn test_vec8_out_of_range_reads_strong_x() {
    let v = Vec8::hiz(2);
    assert_eq!(v.value(5), Scalar::strong(Bit4::X));
}

#[test]
fn test_vec8_part_select() {
    let mut v = Vec8::hiz(4);
    v.set_vec(1, &Vec8::from_vec4(&vec("11"), Strength::Strong, Strength::Strong));
    assert_eq!(v.to_vec4(), vec("z11z"));
    assert_eq!(v.subvalue(1, 2).to_vec4(), vec("11"));
}

#[test]
fn test_vec8_resolve_per_bit() {
    let a = Vec8::from_vec4(&vec("10z"), Strength::Strong, Strength::Strong);
    let b = Vec8::from_vec4(&vec("0z1"), Strength::Strong, Strength::Strong);
    assert_eq!(Vec8::resolve(&a, &b).to_vec4(), vec("x01"));
}

#[test]
#[should_panic(expected = "fatal:")]
fn test_vec8_resolve_width_mismatch_is_fatal() {
    let _ = Vec8::resolve(&Vec8::hiz(2), &Vec8::hiz(3));
}

fn any_scalar() -> impl Strategy<Value = Scalar> {
    let bit = prop_oneof![Just(Bit4::Zero), Just(Bit4::One), Just(Bit4::X), Just(Bit4::Z)];
    let strength = (0u8..8).prop_map(|level| match level {
        0 => Strength::HiZ,
        1 => Strength::Small,
        2 => Strength::Medium,
        3 => Strength::Weak,
        4 => Strength::Large,
        5 => Strength::Pull,
        6 => Strength::Strong,
        _ => Strength::Supply,
    });
    (bit, strength.clone(), strength).prop_map(|(b, s0, s1)| Scalar::new(b, s0, s1))
}

proptest! {
    #[test]
    fn prop_resolve_commutes(a in any_scalar(), b in any_scalar()) {
        prop_assert_eq!(Scalar::resolve(a, b), Scalar::resolve(b, a));
    }

    #[test]
    fn prop_resolve_idempotent(a in any_scalar()) {
        prop_assert_eq!(Scalar::resolve(a, a), a);
    }
}
