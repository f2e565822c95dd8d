//! # Bit4 Truth Tables

use rstest::rstest;
use vsim_core::logic::Bit4;
use vsim_core::logic::Bit4::{One, X, Z, Zero};

#[rstest]
#[case(Zero, Zero, Zero)]
#[case(Zero, X, Zero)]
#[case(One, One, One)]
#[case(One, X, X)]
#[case(One, Z, X)]
#[case(Z, Zero, Zero)]
#[case(X, Z, X)]
fn test_and(#[case] a: Bit4, #[case] b: Bit4, #[case] expected: Bit4) {
    assert_eq!(a & b, expected);
    assert_eq!(b & a, expected);
}

#[rstest]
#[case(One, X, One)]
#[case(Zero, Zero, Zero)]
#[case(Zero, Z, X)]
#[case(X, X, X)]
#[case(Z, One, One)]
fn test_or(#[case] a: Bit4, #[case] b: Bit4, #[case] expected: Bit4) {
    assert_eq!(a | b, expected);
    assert_eq!(b | a, expected);
}

#[rstest]
#[case(Zero, One, One)]
#[case(One, One, Zero)]
#[case(One, X, X)]
#[case(Z, Zero, X)]
fn test_xor(#[case] a: Bit4, #[case] b: Bit4, #[case] expected: Bit4) {
    assert_eq!(a ^ b, expected);
}

#[test]
fn test_not() {
    assert_eq!(!Zero, One);
    assert_eq!(!One, Zero);
    assert_eq!(!X, X);
    assert_eq!(!Z, X);
}

#[test]
fn test_planes_round_trip() {
    for bit in [Zero, One, X, Z] {
        let (a, b) = bit.planes();
        assert_eq!(Bit4::from_planes(a, b), bit);
    }
    assert_eq!(One.planes(), (true, false));
    assert_eq!(Z.planes(), (false, true));
}

#[test]
fn test_chars() {
    assert_eq!(Bit4::from_char('x'), Some(X));
    assert_eq!(Bit4::from_char('Z'), Some(Z));
    assert_eq!(Bit4::from_char('2'), None);
    assert_eq!(One.to_char(), '1');
}

#[test]
fn test_add_with_carry() {
    let mut carry = One;
    assert_eq!(Bit4::add_with_carry(One, One, &mut carry), One);
    assert_eq!(carry, One);

    let mut carry = Zero;
    assert_eq!(Bit4::add_with_carry(Zero, Z, &mut carry), X);
    assert_eq!(carry, X);
}
