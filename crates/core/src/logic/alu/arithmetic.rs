//! Vector arithmetic.
//!
//! Addition and subtraction ripple a single carry bit through the operand words and give up
//! with an all-`X` result as soon as an undefined bit is met. Multiplication, division,
//! modulo and power go through [`Vec2`]: a failed conversion yields all `X`, one-word operands
//! use native integer arithmetic and wider operands the schoolbook routines.

use crate::common::error::{Fatal, fatal};
use crate::logic::bit4::Bit4;
use crate::logic::vec2::{Vec2, divide_bits, multiply, pow_unsigned};
use crate::logic::vec4::Vec4;

#[inline]
fn check_widths(context: &'static str, a: &Vec4, b: &Vec4) {
    if a.width() != b.width() {
        fatal(Fatal::WidthMismatch { context, left: a.width(), right: b.width() });
    }
}

/// Ripple-carry sum of `a`, `b` and a carry-in, modulo 2^width.
fn add_words(a: &Vec4, b: &[u64], carry_in: bool) -> Vec4 {
    let mut carry = carry_in;
    let mut out = Vec::with_capacity(a.abits().len());
    for (i, &x) in a.abits().iter().enumerate() {
        if a.bbits()[i] != 0 {
            return Vec4::xs(a.width());
        }
        let y = b[i];
        let (s1, c1) = x.overflowing_add(y);
        let (s2, c2) = s1.overflowing_add(u64::from(carry));
        out.push(s2);
        carry = c1 || c2;
    }
    Vec4::from_planes(a.width(), out, Vec::new())
}

/// `a + b`, truncated to the common width.
pub fn add(a: &Vec4, b: &Vec4) -> Vec4 {
    check_widths("add", a, b);
    if b.has_xz() {
        return Vec4::xs(a.width());
    }
    add_words(a, b.abits(), false)
}

/// `a - b`, computed as `a + ~b + 1`.
pub fn sub(a: &Vec4, b: &Vec4) -> Vec4 {
    check_widths("sub", a, b);
    if b.has_xz() {
        return Vec4::xs(a.width());
    }
    let inverted: Vec<u64> = b.abits().iter().map(|w| !w).collect();
    add_words(a, &inverted, true)
}

/// Bit-serial ripple-carry addition, as performed by the combinational sum functor.
///
/// The first undefined bit (operand or carry) turns the whole result into `X`.
pub fn add_ripple(a: &Vec4, b: &Vec4) -> Vec4 {
    check_widths("add", a, b);
    let mut out = Vec4::zeros(a.width());
    let mut carry = Bit4::Zero;
    for i in 0..a.width() {
        let sum = Bit4::add_with_carry(a.bit(i), b.bit(i), &mut carry);
        if sum == Bit4::X {
            return Vec4::xs(a.width());
        }
        out.set_bit(i, sum);
    }
    out
}

/// Two's-complement negation; all `X` if any bit is undefined.
pub fn negate(v: &Vec4) -> Vec4 {
    Vec2::from_vec4(v).map_or_else(
        || Vec4::xs(v.width()),
        |mut x| {
            x.negate();
            x.to_vec4()
        },
    )
}

/// Absolute value of a signed vector.
pub fn abs(v: &Vec4) -> Vec4 {
    match v.msb() {
        Bit4::One => negate(v),
        Bit4::Zero => v.clone(),
        _ => Vec4::xs(v.width()),
    }
}

/// `a * b`, truncated to the common width.
pub fn mul(a: &Vec4, b: &Vec4) -> Vec4 {
    check_widths("mul", a, b);
    match (Vec2::from_vec4(a), Vec2::from_vec4(b)) {
        (Some(x), Some(y)) => multiply(&x, &y).to_vec4(),
        _ => Vec4::xs(a.width()),
    }
}

/// Quotient and remainder, or `None` for undefined operands or a zero divisor.
///
/// Signed operands are negated into magnitudes around the unsigned core; the quotient takes
/// the XOR of the operand signs and the remainder the sign of the dividend.
pub fn divmod(a: &Vec4, b: &Vec4, signed: bool) -> Option<(Vec2, Vec2)> {
    check_widths("div", a, b);
    let mut x = Vec2::from_vec4(a)?;
    let mut y = Vec2::from_vec4(b)?;
    if y.is_zero() {
        return None;
    }
    if !signed {
        return Some(divide_bits(&x, &y));
    }
    if x.is_min_signed() && y.is_all_ones() {
        // MIN / -1 wraps back to MIN with no remainder.
        return Some((x, Vec2::zeros(a.width())));
    }
    let (neg_x, neg_y) = (x.is_negative(), y.is_negative());
    if neg_x {
        x.negate();
    }
    if neg_y {
        y.negate();
    }
    let (mut q, mut r) = divide_bits(&x, &y);
    if neg_x != neg_y {
        q.negate();
    }
    if neg_x {
        r.negate();
    }
    Some((q, r))
}

/// `a / b`; division by zero or undefined operands give all `X`.
pub fn div(a: &Vec4, b: &Vec4, signed: bool) -> Vec4 {
    divmod(a, b, signed).map_or_else(|| Vec4::xs(a.width()), |(q, _)| q.to_vec4())
}

/// `a % b`; division by zero or undefined operands give all `X`.
pub fn rem(a: &Vec4, b: &Vec4, signed: bool) -> Vec4 {
    divmod(a, b, signed).map_or_else(|| Vec4::xs(a.width()), |(_, r)| r.to_vec4())
}

/// `a ** b`, truncated to the width of `a`.
///
/// A negative signed exponent cannot produce a fraction, so it is decided by the base:
/// `0` gives `X`, `1` gives `1`, `-1` gives `±1` by exponent parity and any other base `0`.
pub fn pow(a: &Vec4, b: &Vec4, signed: bool) -> Vec4 {
    let width = a.width();
    let (Some(base), Some(exp)) = (Vec2::from_vec4(a), Vec2::from_vec4(b)) else {
        return Vec4::xs(width);
    };
    if signed && exp.is_negative() {
        if base.is_zero() {
            return Vec4::xs(width);
        }
        if base.fits_u64() && base.low_u64() == 1 {
            return Vec4::from_u64(width, 1);
        }
        if base.is_all_ones() {
            return if exp.bit(0) { Vec4::from_i64(width, -1) } else { Vec4::from_u64(width, 1) };
        }
        return Vec4::zeros(width);
    }
    pow_unsigned(&base, &exp).to_vec4()
}
