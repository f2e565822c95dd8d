//! Fixed-width 2-state vectors.
//!
//! [`Vec2`] is the operand form for the multiply, divide, modulo and power algorithms. It can
//! only hold `0`/`1`; [`Vec2::from_vec4`] returns `None` (the "not a number" result) when the
//! source vector has any `X` or `Z` bit, and callers turn that into an all-`X` answer.
//!
//! Single-word operands use native integer operations. Wider operands use schoolbook
//! long multiplication ([`multiply_with_carry`]) and shift-subtract long division
//! ([`divide_bits`]).

use std::cmp::Ordering;

use super::vec4::{Vec4, WORD_BITS, last_word_mask, words_for};

/// A fixed-width binary vector, bit 0 least significant.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Vec2 {
    width: u32,
    words: Vec<u64>,
}

impl Vec2 {
    /// All-zero vector.
    pub fn zeros(width: u32) -> Self {
        Self { width, words: vec![0; words_for(width)] }
    }

    /// Builds from a value, truncated to `width`.
    pub fn from_u64(width: u32, value: u64) -> Self {
        let mut v = Self::zeros(width);
        if let Some(w) = v.words.first_mut() {
            *w = value;
        }
        v.normalize();
        v
    }

    /// Converts a 4-state vector; `None` if any bit is `X` or `Z`.
    pub fn from_vec4(v: &Vec4) -> Option<Self> {
        if v.has_xz() {
            return None;
        }
        Some(Self { width: v.width(), words: v.abits().to_vec() })
    }

    /// Converts back to a 4-state vector.
    pub fn to_vec4(&self) -> Vec4 {
        Vec4::from_planes(self.width, self.words.clone(), Vec::new())
    }

    /// Width in bits.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Storage words, least significant first.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Reads bit `idx` (false past the width).
    pub fn bit(&self, idx: u32) -> bool {
        idx < self.width && (self.words[(idx / WORD_BITS) as usize] >> (idx % WORD_BITS)) & 1 == 1
    }

    fn set_bit(&mut self, idx: u32, val: bool) {
        if idx >= self.width {
            return;
        }
        let w = (idx / WORD_BITS) as usize;
        let m = 1u64 << (idx % WORD_BITS);
        if val {
            self.words[w] |= m;
        } else {
            self.words[w] &= !m;
        }
    }

    /// True if the sign (most significant) bit is set.
    pub fn is_negative(&self) -> bool {
        self.width > 0 && self.bit(self.width - 1)
    }

    /// True if every bit is zero.
    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Low word as unsigned.
    pub fn low_u64(&self) -> u64 {
        self.words.first().copied().unwrap_or(0)
    }

    /// True if the value fits in 64 bits.
    pub fn fits_u64(&self) -> bool {
        self.words.iter().skip(1).all(|&w| w == 0)
    }

    /// Value sign-extended from the width to `i64`; only meaningful for widths up to 64.
    pub fn to_i64(&self) -> i64 {
        let raw = self.low_u64();
        if self.width == 0 || self.width >= WORD_BITS {
            return raw as i64;
        }
        let shift = WORD_BITS - self.width;
        ((raw << shift) as i64) >> shift
    }

    /// True if this is the most negative value of its width (`1000...0`).
    pub fn is_min_signed(&self) -> bool {
        if self.width == 0 || !self.is_negative() {
            return false;
        }
        (0..self.width - 1).all(|i| !self.bit(i))
    }

    /// True if every bit is one (`-1` when signed).
    pub fn is_all_ones(&self) -> bool {
        self.width > 0 && (0..self.width).all(|i| self.bit(i))
    }

    /// Two's-complement negation in place.
    pub fn negate(&mut self) {
        let mut carry = 1u64;
        for w in &mut self.words {
            let (s, c) = (!*w).overflowing_add(carry);
            *w = s;
            carry = u64::from(c);
        }
        self.normalize();
    }

    /// Unsigned magnitude comparison of equal-width vectors.
    pub fn cmp_unsigned(&self, other: &Self) -> Ordering {
        for (a, b) in self.words.iter().rev().zip(other.words.iter().rev()) {
            match a.cmp(b) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }
        Ordering::Equal
    }

    /// Returns a copy resized to `width`, zero-extending.
    pub fn resize(&self, width: u32) -> Self {
        let mut words = self.words.clone();
        words.resize(words_for(width), 0);
        let mut v = Self { width, words };
        v.normalize();
        v
    }

    fn normalize(&mut self) {
        let mask = last_word_mask(self.width);
        if let Some(w) = self.words.last_mut() {
            *w &= mask;
        }
    }
}

/// Multiplies `a * b + carry`, returning the low word and updating `carry` with the high word.
#[inline]
pub const fn multiply_with_carry(a: u64, b: u64, carry: &mut u64) -> u64 {
    let wide = (a as u128) * (b as u128) + *carry as u128;
    *carry = (wide >> 64) as u64;
    wide as u64
}

/// Schoolbook product of two vectors, truncated to the width of `a`.
pub fn multiply(a: &Vec2, b: &Vec2) -> Vec2 {
    let width = a.width;
    let n = words_for(width);
    if n <= 1 {
        return Vec2::from_u64(width, a.low_u64().wrapping_mul(b.low_u64()));
    }
    let mut res = vec![0u64; n];
    for (i, &aw) in a.words.iter().enumerate().take(n) {
        if aw == 0 {
            continue;
        }
        let mut carry = 0u64;
        for j in 0..(n - i) {
            let bw = b.words.get(j).copied().unwrap_or(0);
            let lo = multiply_with_carry(aw, bw, &mut carry);
            let (sum, overflow) = res[i + j].overflowing_add(lo);
            res[i + j] = sum;
            carry += u64::from(overflow);
        }
    }
    let mut out = Vec2 { width, words: res };
    out.normalize();
    out
}

/// Unsigned long division of equal-width vectors, returning `(quotient, remainder)`.
///
/// The divisor must be non-zero.
pub fn divide_bits(dividend: &Vec2, divisor: &Vec2) -> (Vec2, Vec2) {
    let width = dividend.width;
    if words_for(width) <= 1 {
        let (a, b) = (dividend.low_u64(), divisor.low_u64());
        return (Vec2::from_u64(width, a / b), Vec2::from_u64(width, a % b));
    }
    let mut quot = Vec2::zeros(width);
    let mut rem = Vec2::zeros(width + 1);
    let div = divisor.resize(width + 1);
    for i in (0..width).rev() {
        shl1(&mut rem);
        rem.set_bit(0, dividend.bit(i));
        if rem.cmp_unsigned(&div) != Ordering::Less {
            sub_in_place(&mut rem, &div);
            quot.set_bit(i, true);
        }
    }
    (quot, rem.resize(width))
}

fn shl1(v: &mut Vec2) {
    let mut carry = 0u64;
    for w in &mut v.words {
        let next = *w >> 63;
        *w = (*w << 1) | carry;
        carry = next;
    }
    v.normalize();
}

fn sub_in_place(a: &mut Vec2, b: &Vec2) {
    let mut borrow = false;
    for (x, &y) in a.words.iter_mut().zip(&b.words) {
        let (d1, b1) = x.overflowing_sub(y);
        let (d2, b2) = d1.overflowing_sub(u64::from(borrow));
        *x = d2;
        borrow = b1 || b2;
    }
    a.normalize();
}

/// Raises `base` to an unsigned `exp`, modulo 2^width.
pub fn pow_unsigned(base: &Vec2, exp: &Vec2) -> Vec2 {
    let width = base.width;
    let mut result = Vec2::from_u64(width, 1);
    let mut sq = base.clone();
    for i in 0..exp.width {
        if exp.bit(i) {
            result = multiply(&result, &sq);
        }
        if (i + 1..exp.width).any(|j| exp.bit(j)) {
            sq = multiply(&sq, &sq);
        } else {
            break;
        }
    }
    result
}

impl From<&Vec2> for Vec4 {
    fn from(v: &Vec2) -> Self {
        v.to_vec4()
    }
}
