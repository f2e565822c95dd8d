//! Shift operators.
//!
//! The shift amount arrives with an explicit `undefined` flag, set when the amount itself had
//! `X`/`Z` bits. An undefined amount makes every result bit `X`. A defined amount at or beyond
//! the width shifts everything out: left and logical right shifts leave zeros, the arithmetic
//! right shift leaves copies of the sign bit.

use crate::logic::bit4::Bit4;
use crate::logic::vec4::{Vec4, WORD_BITS};

/// Extracts a shift amount from a vector operand.
///
/// Returns `(amount, undefined)`. Amounts that do not fit in 64 bits saturate.
pub fn amount_of(v: &Vec4) -> (u64, bool) {
    if v.has_xz() {
        return (0, true);
    }
    let words = v.abits();
    if words.iter().skip(1).any(|&w| w != 0) {
        return (u64::MAX, false);
    }
    (words.first().copied().unwrap_or(0), false)
}

fn shift_plane_left(words: &[u64], n: u64) -> Vec<u64> {
    let word_shift = (n / u64::from(WORD_BITS)) as usize;
    let bit_shift = (n % u64::from(WORD_BITS)) as u32;
    let mut out = vec![0u64; words.len()];
    for i in word_shift..words.len() {
        let src = i - word_shift;
        let mut w = words[src] << bit_shift;
        if bit_shift != 0 && src > 0 {
            w |= words[src - 1] >> (WORD_BITS - bit_shift);
        }
        out[i] = w;
    }
    out
}

fn shift_plane_right(words: &[u64], n: u64) -> Vec<u64> {
    let word_shift = (n / u64::from(WORD_BITS)) as usize;
    let bit_shift = (n % u64::from(WORD_BITS)) as u32;
    let mut out = vec![0u64; words.len()];
    for i in 0..words.len().saturating_sub(word_shift) {
        let src = i + word_shift;
        let mut w = words[src] >> bit_shift;
        if bit_shift != 0 && src + 1 < words.len() {
            w |= words[src + 1] << (WORD_BITS - bit_shift);
        }
        out[i] = w;
    }
    out
}

/// `v << amount`, filling with zeros.
pub fn shift_left(v: &Vec4, amount: u64, undefined: bool) -> Vec4 {
    if undefined {
        return Vec4::xs(v.width());
    }
    if amount >= u64::from(v.width()) {
        return Vec4::zeros(v.width());
    }
    Vec4::from_planes(
        v.width(),
        shift_plane_left(v.abits(), amount),
        shift_plane_left(v.bbits(), amount),
    )
}

/// `v >> amount`, filling with zeros.
pub fn shift_right(v: &Vec4, amount: u64, undefined: bool) -> Vec4 {
    if undefined {
        return Vec4::xs(v.width());
    }
    if amount >= u64::from(v.width()) {
        return Vec4::zeros(v.width());
    }
    Vec4::from_planes(
        v.width(),
        shift_plane_right(v.abits(), amount),
        shift_plane_right(v.bbits(), amount),
    )
}

/// `v >>> amount`, filling with the sign bit (which may itself be `X` or `Z`).
pub fn shift_right_signed(v: &Vec4, amount: u64, undefined: bool) -> Vec4 {
    if undefined {
        return Vec4::xs(v.width());
    }
    let sign = if v.is_empty() { Bit4::Zero } else { v.msb() };
    if amount >= u64::from(v.width()) {
        return Vec4::new(v.width(), sign);
    }
    let mut out = shift_right(v, amount, false);
    let keep = v.width() - amount as u32;
    for i in keep..v.width() {
        out.set_bit(i, sign);
    }
    out
}
