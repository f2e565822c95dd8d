//! # Literal Encoding Tests
//!
//! Covers the `C4<>`, `C8<>` and `Cr<>` constant forms and their error reporting.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use vsim_core::common::error::BuildError;
use vsim_core::logic::literal::{
    REAL_EXP_BIAS, REAL_EXP_INF, REAL_EXP_NEG_INF, REAL_SIGN_BIT, decode_real, encode_real, format_cr, parse_bits,
    parse_c4, parse_c8, parse_cr,
};
use vsim_core::logic::{Bit4, Scalar, Strength, Vec4};

#[test]
fn test_c4_is_msb_first() {
    let v = parse_c4("C4<10xz>").unwrap();
    assert_eq!(v.width(), 4);
    assert_eq!(v.bit(3), Bit4::One);
    assert_eq!(v.bit(0), Bit4::Z);
    assert_eq!("C4<10xz>".parse::<Vec4>().unwrap(), "10xz".parse::<Vec4>().unwrap());
}

#[test]
fn test_c8_strength_triples() {
    let v = parse_c8("C8<661550>").unwrap();
    assert_eq!(v.width(), 2);
    assert_eq!(v.value(1), Scalar::strong(Bit4::One));
    assert_eq!(v.value(0), Scalar::new(Bit4::Zero, Strength::Pull, Strength::Pull));
}

#[rstest]
#[case("C4<01", "missing literal delimiters")]
#[case("C4<012>", "expected one of 0 1 x z")]
fn test_c4_errors(#[case] text: &str, #[case] expected: &str) {
    match parse_c4(text) {
        Err(BuildError::InvalidLiteral { reason, .. }) => assert_eq!(reason, expected),
        other => panic!("unexpected result {other:?}"),
    }
}

#[rstest]
#[case("C8<66>", "strength literal needs three characters per bit")]
#[case("C8<891>", "strength digit must be 0-7")]
#[case("C8<66q>", "expected one of 0 1 x z")]
fn test_c8_errors(#[case] text: &str, #[case] expected: &str) {
    match parse_c8(text) {
        Err(BuildError::InvalidLiteral { reason, .. }) => assert_eq!(reason, expected),
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn test_bare_bits_reject_garbage() {
    assert!(parse_bits("01a").is_err());
    assert_eq!(parse_bits("").unwrap().width(), 0);
}

#[test]
fn test_real_encoding_layout() {
    assert_eq!(encode_real(1.0), (1, REAL_EXP_BIAS as u32));
    assert_eq!(encode_real(-2.5), (5, (REAL_EXP_BIAS - 1) as u32 | REAL_SIGN_BIT));
    assert_eq!(encode_real(0.0), (0, REAL_EXP_BIAS as u32));
    assert_eq!(encode_real(f64::INFINITY), (0, REAL_EXP_INF));
    assert_eq!(encode_real(f64::NEG_INFINITY), (0, REAL_EXP_NEG_INF));
}

#[test]
fn test_real_special_values() {
    assert_eq!(decode_real(0, REAL_EXP_INF), f64::INFINITY);
    assert_eq!(decode_real(0, REAL_EXP_NEG_INF), f64::NEG_INFINITY);
    assert!(decode_real(1, REAL_EXP_INF).is_nan());
    assert!(decode_real(encode_real(f64::NAN).0, encode_real(f64::NAN).1).is_nan());
}

#[test]
fn test_cr_text_form() {
    assert_eq!(format_cr(1.0), "Cr<m1g1000>");
    assert_eq!(format_cr(-2.5), "Cr<m5g4fff>");
    assert_eq!(parse_cr("Cr<m5g4fff>").unwrap(), -2.5);
    assert_eq!(parse_cr("Cr<m3g1002>").unwrap(), 12.0);
}

#[rstest]
#[case("Cr<5g1000>")]
#[case("Cr<m5>")]
#[case("Cr<mqg1000>")]
#[case("m5g1000")]
fn test_cr_errors(#[case] text: &str) {
    assert!(matches!(parse_cr(text), Err(BuildError::InvalidLiteral { .. })));
}

proptest! {
    #[test]
    fn prop_real_encoding_is_exact(x in any::<f64>().prop_filter("finite", |x| x.is_finite())) {
        let (mant, exp) = encode_real(x);
        prop_assert_eq!(decode_real(mant, exp), x);
        prop_assert!(mant < (1u64 << 53));
    }
}
