//! Strength-valued scalars and vectors.
//!
//! A [`Scalar`] packs a 4-state value together with a range of drive strengths into one byte
//! laid out as `VSSS vsss`. The high nibble is the end of the strength range nearest supply-1,
//! the low nibble the end nearest supply-0; `V`/`v` give the value at that end and `SSS`/`sss`
//! its strength (0 = high impedance, 7 = supply). A scalar whose two nibbles agree is
//! *unambiguous*.
//!
//! [`Scalar::resolve`] combines two drivers:
//! 1. **High impedance:** A `Z` driver contributes nothing.
//! 2. **Both unambiguous:** The strictly stronger wins; equal strengths with different
//!    values give an `X` spanning both.
//! 3. **One ambiguous:** The unambiguous driver sweeps every part of the ambiguous range that is
//!    not stronger than itself.
//! 4. **Both ambiguous:** The result spans the union of both ranges.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::bit4::Bit4;
use super::vec4::Vec4;
use crate::common::error::{Fatal, fatal};

/// Named drive strengths.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    /// High impedance (no drive).
    HiZ = 0,
    /// Small capacitor.
    Small = 1,
    /// Medium capacitor.
    Medium = 2,
    /// Weak drive.
    Weak = 3,
    /// Large capacitor.
    Large = 4,
    /// Pull drive.
    Pull = 5,
    /// Strong drive (the default for gate outputs).
    Strong = 6,
    /// Supply drive.
    Supply = 7,
}

impl Strength {
    /// Numeric level 0..=7.
    pub const fn level(self) -> u8 {
        self as u8
    }
}

/// One strength-valued bit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Scalar(u8);

const fn unambiguous(v: u8) -> bool {
    v & 0x0f == (v >> 4) & 0x0f
}

/// Signed position of a nibble on the line supply-0 (-7) .. HiZ (0) .. supply-1 (+7).
const fn position(nibble: u8) -> i8 {
    let s = (nibble & 0x07) as i8;
    if nibble & 0x08 != 0 { s } else { -s }
}

const fn nibble(pos: i8) -> u8 {
    if pos > 0 { 0x08 | pos as u8 } else { (-pos) as u8 }
}

impl Scalar {
    /// The high-impedance scalar.
    pub const HIZ: Self = Self(0);

    /// Builds a scalar from a 4-state value and the strengths of its 0 and 1 sides.
    pub const fn new(val: Bit4, str0: Strength, str1: Strength) -> Self {
        let (s0, s1) = (str0 as u8, str1 as u8);
        if s0 == 0 && s1 == 0 {
            return Self::HIZ;
        }
        match val {
            Bit4::Zero => Self::from_raw(s0 | (s0 << 4)),
            Bit4::One => Self::from_raw(s1 | (s1 << 4) | 0x88),
            Bit4::X => Self::from_raw(s0 | (s1 << 4) | 0x80),
            Bit4::Z => Self::HIZ,
        }
    }

    /// A strong-drive scalar for `val`.
    pub const fn strong(val: Bit4) -> Self {
        Self::new(val, Strength::Strong, Strength::Strong)
    }

    /// Reconstructs a scalar from its packed byte.
    pub const fn from_raw(raw: u8) -> Self {
        if raw & 0x77 == 0 { Self::HIZ } else { Self(raw) }
    }

    /// The packed `VSSSvsss` byte.
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// The 4-state value.
    pub const fn value(self) -> Bit4 {
        if self.0 & 0x77 == 0 {
            return Bit4::Z;
        }
        match self.0 & 0x88 {
            0x00 => Bit4::Zero,
            0x88 => Bit4::One,
            _ => Bit4::X,
        }
    }

    /// Strength of the end nearest supply-0.
    pub const fn strength0(self) -> u8 {
        self.0 & 0x07
    }

    /// Strength of the end nearest supply-1.
    pub const fn strength1(self) -> u8 {
        (self.0 >> 4) & 0x07
    }

    /// True for high impedance.
    pub const fn is_hiz(self) -> bool {
        self.0 & 0x77 == 0
    }

    /// True when both ends of the range agree.
    pub const fn is_unambiguous(self) -> bool {
        unambiguous(self.0)
    }

    /// Combines two drivers of the same bit. Commutative and idempotent.
    pub const fn resolve(a: Self, b: Self) -> Self {
        if a.is_hiz() {
            return b;
        }
        if b.is_hiz() || a.0 == b.0 {
            return a;
        }
        let (av, bv) = (a.0, b.0);
        let res = if unambiguous(av) && unambiguous(bv) {
            if bv & 0x07 > av & 0x07 {
                bv
            } else if bv & 0x77 == av & 0x77 {
                // Equal strength, opposite values: X across [str0, str1].
                let (zero, one) = if av & 0x80 == 0 { (av, bv) } else { (bv, av) };
                (one & 0xf0) | (zero & 0x0f)
            } else {
                av
            }
        } else if unambiguous(av) || unambiguous(bv) {
            let (u, amb) = if unambiguous(av) { (av, bv) } else { (bv, av) };
            let hi = if u & 0x70 > amb & 0x70 { u & 0xf0 } else { amb & 0xf0 };
            let lo = if u & 0x07 > amb & 0x07 { u & 0x0f } else { amb & 0x0f };
            hi | lo
        } else {
            let ends = [position(av >> 4), position(av & 0x0f), position(bv >> 4), position(bv & 0x0f)];
            let mut top = ends[0];
            let mut bottom = ends[0];
            let mut i = 1;
            while i < ends.len() {
                if ends[i] > top {
                    top = ends[i];
                }
                if ends[i] < bottom {
                    bottom = ends[i];
                }
                i += 1;
            }
            (nibble(top) << 4) | nibble(bottom)
        };
        Self::from_raw(res)
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}{}>", self.value(), self.strength0(), self.strength1())
    }
}

impl From<Bit4> for Scalar {
    fn from(bit: Bit4) -> Self {
        Self::strong(bit)
    }
}

/// A fixed-width vector of [`Scalar`] values, bit 0 least significant.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Vec8 {
    bits: Vec<Scalar>,
}

impl Vec8 {
    /// Creates a vector of `width` copies of `fill`.
    pub fn new(width: u32, fill: Scalar) -> Self {
        Self { bits: vec![fill; width as usize] }
    }

    /// All high impedance.
    pub fn hiz(width: u32) -> Self {
        Self::new(width, Scalar::HIZ)
    }

    /// Drives a 4-state vector with the given strengths.
    pub fn from_vec4(v: &Vec4, str0: Strength, str1: Strength) -> Self {
        Self { bits: v.iter().map(|b| Scalar::new(b, str0, str1)).collect() }
    }

    /// Builds from scalars given least-significant first.
    pub fn from_scalars(bits: Vec<Scalar>) -> Self {
        Self { bits }
    }

    /// Width in bits.
    pub fn width(&self) -> u32 {
        self.bits.len() as u32
    }

    /// Scalar at `idx`; past the width reads as an `X` of strong drive.
    pub fn value(&self, idx: u32) -> Scalar {
        self.bits.get(idx as usize).copied().unwrap_or(Scalar::strong(Bit4::X))
    }

    /// Overwrites one scalar; ignored past the width.
    pub fn set_value(&mut self, idx: u32, val: Scalar) {
        if let Some(slot) = self.bits.get_mut(idx as usize) {
            *slot = val;
        }
    }

    /// Iterates scalars least significant first.
    pub fn iter(&self) -> impl Iterator<Item = Scalar> + '_ {
        self.bits.iter().copied()
    }

    /// Extracts `wid` scalars starting at `base`.
    pub fn subvalue(&self, base: u32, wid: u32) -> Self {
        Self { bits: (base..base.saturating_add(wid)).map(|i| self.value(i)).collect() }
    }

    /// Overwrites scalars starting at `base`, clipping at the top.
    pub fn set_vec(&mut self, base: u32, val: &Self) {
        for (i, s) in val.iter().enumerate() {
            self.set_value(base.saturating_add(i as u32), s);
        }
    }

    /// Strips strengths, keeping the 4-state values.
    pub fn to_vec4(&self) -> Vec4 {
        let values: Vec<Bit4> = self.bits.iter().map(|s| s.value()).collect();
        Vec4::from_bits(&values)
    }

    /// Per-bit resolution of two equal-width vectors.
    ///
    /// A width mismatch is an internal invariant violation.
    pub fn resolve(a: &Self, b: &Self) -> Self {
        if a.width() != b.width() {
            fatal(Fatal::WidthMismatch { context: "strength resolution", left: a.width(), right: b.width() });
        }
        Self { bits: a.bits.iter().zip(&b.bits).map(|(&x, &y)| Scalar::resolve(x, y)).collect() }
    }
}

impl fmt::Debug for Vec8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.bits.iter().rev()).finish()
    }
}
