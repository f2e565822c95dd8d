//! Scalar 4-state logic values.
//!
//! A [`Bit4`] is one of `0`, `1`, `X` (unknown) or `Z` (high impedance). The bitwise operators
//! implement the usual dominance rules: a `0` decides an AND regardless of the other input,
//! a `1` decides an OR, and everything else involving `X` or `Z` yields `X`.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

use serde::{Deserialize, Serialize};

/// A single 4-state bit.
///
/// The discriminants match the packed encoding used by the vector planes: bit 0 is the
/// "a" plane, bit 1 the "b" plane.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bit4 {
    /// Logic zero.
    #[default]
    Zero = 0,
    /// Logic one.
    One = 1,
    /// High impedance.
    Z = 2,
    /// Unknown.
    X = 3,
}

impl Bit4 {
    /// Builds a bit from its `(a, b)` plane pair.
    ///
    /// `(0,0)` is `0`, `(1,0)` is `1`, `(0,1)` is `Z` and `(1,1)` is `X`.
    #[inline]
    pub const fn from_planes(a: bool, b: bool) -> Self {
        match (a, b) {
            (false, false) => Self::Zero,
            (true, false) => Self::One,
            (false, true) => Self::Z,
            (true, true) => Self::X,
        }
    }

    /// Returns the `(a, b)` plane pair for this bit.
    #[inline]
    pub const fn planes(self) -> (bool, bool) {
        match self {
            Self::Zero => (false, false),
            Self::One => (true, false),
            Self::Z => (false, true),
            Self::X => (true, true),
        }
    }

    /// Converts a boolean to `0` or `1`.
    #[inline]
    pub const fn from_bool(v: bool) -> Self {
        if v { Self::One } else { Self::Zero }
    }

    /// True for `X` and `Z`.
    #[inline]
    pub const fn is_xz(self) -> bool {
        matches!(self, Self::X | Self::Z)
    }

    /// Maps `Z` to `X`, leaving the other values alone.
    #[inline]
    pub const fn z_to_x(self) -> Self {
        match self {
            Self::Z => Self::X,
            other => other,
        }
    }

    /// Parses one of `0 1 x X z Z`.
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::Zero),
            '1' => Some(Self::One),
            'x' | 'X' => Some(Self::X),
            'z' | 'Z' => Some(Self::Z),
            _ => None,
        }
    }

    /// Lower-case character for this value.
    pub const fn to_char(self) -> char {
        match self {
            Self::Zero => '0',
            Self::One => '1',
            Self::Z => 'z',
            Self::X => 'x',
        }
    }

    /// One step of a ripple-carry adder.
    ///
    /// Returns the sum bit and updates `carry`. Any `X`/`Z` among the inputs (carry included)
    /// makes both the sum and the carry `X`.
    #[inline]
    pub fn add_with_carry(a: Self, b: Self, carry: &mut Self) -> Self {
        if a.is_xz() || b.is_xz() || carry.is_xz() {
            *carry = Self::X;
            return Self::X;
        }
        let sum = a as u8 + b as u8 + *carry as u8;
        *carry = Self::from_bool(sum >= 2);
        Self::from_bool(sum & 1 == 1)
    }
}

impl Not for Bit4 {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        match self {
            Self::Zero => Self::One,
            Self::One => Self::Zero,
            Self::X | Self::Z => Self::X,
        }
    }
}

impl BitAnd for Bit4 {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Zero, _) | (_, Self::Zero) => Self::Zero,
            (Self::One, Self::One) => Self::One,
            _ => Self::X,
        }
    }
}

impl BitOr for Bit4 {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::One, _) | (_, Self::One) => Self::One,
            (Self::Zero, Self::Zero) => Self::Zero,
            _ => Self::X,
        }
    }
}

impl BitXor for Bit4 {
    type Output = Self;

    #[inline]
    fn bitxor(self, rhs: Self) -> Self {
        if self.is_xz() || rhs.is_xz() {
            Self::X
        } else {
            Self::from_bool(self != rhs)
        }
    }
}

impl fmt::Display for Bit4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}
