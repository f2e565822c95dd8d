//! Comparison operators.
//!
//! Three equality families behave differently on `X`/`Z`:
//! 1. **Case equality (`===`):** Compares all four states literally.
//! 2. **Logical equality (`==`):** A differing pair of defined bits gives `0`; otherwise any
//!    undefined bit gives `X`.
//! 3. **Wildcard equality (`==?`):** `X`/`Z` in the right operand match anything; `X`/`Z` left
//!    in the left operand at a compared position give `X`.
//!
//! casex and casez matches treat `X`/`Z` (respectively `Z` only) on either side as don't-care.

use std::cmp::Ordering;

use crate::common::error::{Fatal, fatal};
use crate::logic::bit4::Bit4;
use crate::logic::vec4::Vec4;

fn check_widths(context: &'static str, a: &Vec4, b: &Vec4) {
    if a.width() != b.width() {
        fatal(Fatal::WidthMismatch { context, left: a.width(), right: b.width() });
    }
}

/// `a === b`.
pub fn eeq(a: &Vec4, b: &Vec4) -> Bit4 {
    check_widths("===", a, b);
    Bit4::from_bool(a.eeq(b))
}

/// `a == b`.
pub fn eq(a: &Vec4, b: &Vec4) -> Bit4 {
    check_widths("==", a, b);
    let mut res = Bit4::One;
    for i in 0..a.width() {
        let (x, y) = (a.bit(i), b.bit(i));
        if x.is_xz() || y.is_xz() {
            res = Bit4::X;
        } else if x != y {
            return Bit4::Zero;
        }
    }
    res
}

/// `a ==? b`, with `X`/`Z` in `b` as wildcards.
pub fn weq(a: &Vec4, b: &Vec4) -> Bit4 {
    check_widths("==?", a, b);
    let mut res = Bit4::One;
    for i in 0..a.width() {
        let y = b.bit(i);
        if y.is_xz() {
            continue;
        }
        let x = a.bit(i);
        if x.is_xz() {
            res = Bit4::X;
        } else if x != y {
            return Bit4::Zero;
        }
    }
    res
}

/// casex match.
pub fn eqx(a: &Vec4, b: &Vec4) -> Bit4 {
    check_widths("casex", a, b);
    let hit = a.iter().zip(b.iter()).all(|(x, y)| x.is_xz() || y.is_xz() || x == y);
    Bit4::from_bool(hit)
}

/// casez match.
pub fn eqz(a: &Vec4, b: &Vec4) -> Bit4 {
    check_widths("casez", a, b);
    let hit = a.iter().zip(b.iter()).all(|(x, y)| x == Bit4::Z || y == Bit4::Z || x == y);
    Bit4::from_bool(hit)
}

/// Magnitude comparison of fully defined vectors; `None` if either has `X`/`Z`.
pub fn magnitude(a: &Vec4, b: &Vec4, signed: bool) -> Option<Ordering> {
    check_widths("compare", a, b);
    if a.has_xz() || b.has_xz() {
        return None;
    }
    if signed && a.width() > 0 {
        let (sa, sb) = (a.msb() == Bit4::One, b.msb() == Bit4::One);
        if sa != sb {
            return Some(if sa { Ordering::Less } else { Ordering::Greater });
        }
    }
    for (x, y) in a.abits().iter().rev().zip(b.abits().iter().rev()) {
        match x.cmp(y) {
            Ordering::Equal => {}
            ord => return Some(ord),
        }
    }
    Some(Ordering::Equal)
}

/// `a > b`.
pub fn gt(a: &Vec4, b: &Vec4, signed: bool) -> Bit4 {
    magnitude(a, b, signed).map_or(Bit4::X, |o| Bit4::from_bool(o == Ordering::Greater))
}

/// `a >= b`.
pub fn ge(a: &Vec4, b: &Vec4, signed: bool) -> Bit4 {
    magnitude(a, b, signed).map_or(Bit4::X, |o| Bit4::from_bool(o != Ordering::Less))
}
