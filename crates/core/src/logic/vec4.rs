//! Fixed-width 4-state vectors.
//!
//! A [`Vec4`] stores its bits in two parallel planes of 64-bit words:
//! 1. **a plane:** The value bit.
//! 2. **b plane:** Set for the two "undefined" states.
//!
//! The pair `(a, b)` encodes `0 = (0,0)`, `1 = (1,0)`, `Z = (0,1)`, `X = (1,1)`. Bits above the
//! width in the last word are always zero in both planes, so structural equality is 4-state
//! case equality (`===`).

use std::fmt;

use super::bit4::Bit4;

/// Number of bits per storage word.
pub const WORD_BITS: u32 = 64;

/// Number of storage words for a vector of `width` bits.
#[inline]
pub const fn words_for(width: u32) -> usize {
    width.div_ceil(WORD_BITS) as usize
}

/// Mask of the valid bits in the last storage word of a `width`-bit vector.
#[inline]
pub const fn last_word_mask(width: u32) -> u64 {
    match width % WORD_BITS {
        0 => u64::MAX,
        rem => (1u64 << rem) - 1,
    }
}

/// Fill words for each scalar value, as `(a, b)`.
const fn fill_words(fill: Bit4) -> (u64, u64) {
    match fill {
        Bit4::Zero => (0, 0),
        Bit4::One => (u64::MAX, 0),
        Bit4::Z => (0, u64::MAX),
        Bit4::X => (u64::MAX, u64::MAX),
    }
}

/// A fixed-width vector of [`Bit4`] values, bit 0 least significant.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Vec4 {
    width: u32,
    abits: Vec<u64>,
    bbits: Vec<u64>,
}

impl Vec4 {
    /// Creates a vector of `width` bits, all set to `fill`.
    pub fn new(width: u32, fill: Bit4) -> Self {
        let n = words_for(width);
        let (a, b) = fill_words(fill);
        let mut v = Self { width, abits: vec![a; n], bbits: vec![b; n] };
        v.normalize();
        v
    }

    /// All-zero vector.
    pub fn zeros(width: u32) -> Self {
        Self::new(width, Bit4::Zero)
    }

    /// All-X vector.
    pub fn xs(width: u32) -> Self {
        Self::new(width, Bit4::X)
    }

    /// All-Z vector.
    pub fn zs(width: u32) -> Self {
        Self::new(width, Bit4::Z)
    }

    /// Builds a vector from raw planes, masking any bits above `width`.
    ///
    /// Missing words are treated as zero.
    pub fn from_planes(width: u32, mut abits: Vec<u64>, mut bbits: Vec<u64>) -> Self {
        let n = words_for(width);
        abits.resize(n, 0);
        bbits.resize(n, 0);
        let mut v = Self { width, abits, bbits };
        v.normalize();
        v
    }

    /// Builds a fully defined vector from an unsigned value; bits above 64 are zero.
    pub fn from_u64(width: u32, value: u64) -> Self {
        let n = words_for(width);
        let mut abits = vec![0; n];
        if let Some(w) = abits.first_mut() {
            *w = value;
        }
        Self::from_planes(width, abits, vec![0; n])
    }

    /// Builds a fully defined vector from a signed value, sign-extending past 64 bits.
    pub fn from_i64(width: u32, value: i64) -> Self {
        let n = words_for(width);
        let ext = if value < 0 { u64::MAX } else { 0 };
        let mut abits = vec![ext; n];
        if let Some(w) = abits.first_mut() {
            *w = value as u64;
        }
        Self::from_planes(width, abits, vec![0; n])
    }

    /// Builds a vector from bits given least-significant first.
    pub fn from_bits(bits: &[Bit4]) -> Self {
        let mut v = Self::zeros(bits.len() as u32);
        for (i, &b) in bits.iter().enumerate() {
            v.set_bit(i as u32, b);
        }
        v
    }

    /// Width in bits.
    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// True for a zero-width vector.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0
    }

    /// The a (value) plane.
    #[inline]
    pub fn abits(&self) -> &[u64] {
        &self.abits
    }

    /// The b (undefined) plane.
    #[inline]
    pub fn bbits(&self) -> &[u64] {
        &self.bbits
    }

    /// Reads bit `idx`; positions past the width read as `X`.
    #[inline]
    pub fn bit(&self, idx: u32) -> Bit4 {
        if idx >= self.width {
            return Bit4::X;
        }
        let w = (idx / WORD_BITS) as usize;
        let s = idx % WORD_BITS;
        Bit4::from_planes((self.abits[w] >> s) & 1 == 1, (self.bbits[w] >> s) & 1 == 1)
    }

    /// Writes bit `idx`; writes past the width are ignored.
    #[inline]
    pub fn set_bit(&mut self, idx: u32, val: Bit4) {
        if idx >= self.width {
            return;
        }
        let w = (idx / WORD_BITS) as usize;
        let m = 1u64 << (idx % WORD_BITS);
        let (a, b) = val.planes();
        if a {
            self.abits[w] |= m;
        } else {
            self.abits[w] &= !m;
        }
        if b {
            self.bbits[w] |= m;
        } else {
            self.bbits[w] &= !m;
        }
    }

    /// Most significant bit, or `X` for an empty vector.
    pub fn msb(&self) -> Bit4 {
        if self.width == 0 { Bit4::X } else { self.bit(self.width - 1) }
    }

    /// Iterates bits least significant first.
    pub fn iter(&self) -> impl Iterator<Item = Bit4> + '_ {
        (0..self.width).map(move |i| self.bit(i))
    }

    /// True if any bit is `X` or `Z`.
    #[inline]
    pub fn has_xz(&self) -> bool {
        self.bbits.iter().any(|&w| w != 0)
    }

    /// True if every bit equals `val`.
    pub fn is_all(&self, val: Bit4) -> bool {
        let (fa, fb) = fill_words(val);
        let last = self.abits.len().saturating_sub(1);
        let mask = last_word_mask(self.width);
        self.abits.iter().zip(&self.bbits).enumerate().all(|(i, (&a, &b))| {
            let m = if i == last { mask } else { u64::MAX };
            a == fa & m && b == fb & m
        })
    }

    /// Case equality (`===`): same width and identical bits including `X`/`Z`.
    #[inline]
    pub fn eeq(&self, other: &Self) -> bool {
        self == other
    }

    /// Low 64 bits as an unsigned value, or `None` if any bit is `X`/`Z`.
    pub fn to_u64(&self) -> Option<u64> {
        if self.has_xz() {
            return None;
        }
        Some(self.abits.first().copied().unwrap_or(0))
    }

    /// Value as a signed integer, sign-extended from the vector width when it is below 64.
    ///
    /// Returns `None` if any bit is `X`/`Z`.
    pub fn to_i64(&self) -> Option<i64> {
        let raw = self.to_u64()?;
        if self.width == 0 || self.width >= WORD_BITS {
            return Some(raw as i64);
        }
        let shift = WORD_BITS - self.width;
        Some(((raw << shift) as i64) >> shift)
    }

    /// Converts to a real value, treating `X`/`Z` bits as zero.
    pub fn to_f64(&self, signed: bool) -> f64 {
        let negative = signed && self.msb() == Bit4::One;
        let mut mag = self.clone();
        mag.z_to_x();
        for (a, b) in mag.abits.iter_mut().zip(&mut mag.bbits) {
            *a &= !*b;
            *b = 0;
        }
        if negative {
            mag = super::alu::arithmetic::negate(&mag);
        }
        let mut res = 0.0_f64;
        for &w in mag.abits.iter().rev() {
            res = res * 18_446_744_073_709_551_616.0 + w as f64;
        }
        if negative { -res } else { res }
    }

    /// Converts a real to a `width`-bit vector, rounding half away from zero.
    ///
    /// NaN and infinities produce all `X`.
    pub fn from_f64(width: u32, val: f64) -> Self {
        if !val.is_finite() {
            return Self::xs(width);
        }
        let rounded = val.round();
        let negative = rounded < 0.0;
        let mag = rounded.abs();
        let mut out = if mag < 9_223_372_036_854_775_808.0 {
            Self::from_u64(width, mag as u64)
        } else {
            let bits = mag.to_bits();
            let mant = (bits & ((1u64 << 52) - 1)) | (1u64 << 52);
            let exp = ((bits >> 52) & 0x7ff) as i64 - 1075;
            let mut wide = Self::from_u64(width.max(64), mant);
            wide = super::alu::shifts::shift_left(&wide, exp.max(0) as u64, false);
            wide.resize(width, Bit4::Zero)
        };
        if negative {
            out = super::alu::arithmetic::negate(&out);
        }
        out
    }

    /// Extracts `wid` bits starting at `base`; positions past the width read as `X`.
    pub fn subvalue(&self, base: u32, wid: u32) -> Self {
        let mut out = Self::zeros(wid);
        if base % WORD_BITS == 0 && base.saturating_add(wid) <= self.width {
            let first = (base / WORD_BITS) as usize;
            let n = out.abits.len();
            out.abits.copy_from_slice(&self.abits[first..first + n]);
            out.bbits.copy_from_slice(&self.bbits[first..first + n]);
            out.normalize();
            return out;
        }
        for i in 0..wid {
            out.set_bit(i, self.bit(base.saturating_add(i)));
        }
        out
    }

    /// Overwrites bits `[base, base + val.width())` with `val`, clipping at the top.
    ///
    /// Returns `true` if any bit changed.
    pub fn set_vec(&mut self, base: u32, val: &Self) -> bool {
        let mut changed = false;
        for i in 0..val.width {
            let idx = base.saturating_add(i);
            if idx >= self.width {
                break;
            }
            let nb = val.bit(i);
            if self.bit(idx) != nb {
                self.set_bit(idx, nb);
                changed = true;
            }
        }
        changed
    }

    /// Returns a copy resized to `width`, padding new high bits with `pad`.
    pub fn resize(&self, width: u32, pad: Bit4) -> Self {
        if width == self.width {
            return self.clone();
        }
        let mut out = Self::new(width, pad);
        let keep = width.min(self.width);
        let full = (keep / WORD_BITS) as usize;
        out.abits[..full].copy_from_slice(&self.abits[..full]);
        out.bbits[..full].copy_from_slice(&self.bbits[..full]);
        for i in (full as u32 * WORD_BITS)..keep {
            out.set_bit(i, self.bit(i));
        }
        out
    }

    /// Resizes, padding with the most significant bit.
    pub fn sign_extend(&self, width: u32) -> Self {
        let pad = if self.width == 0 { Bit4::Zero } else { self.msb() };
        self.resize(width, pad)
    }

    /// Concatenation `{msb, lsb}`.
    pub fn concat(msb: &Self, lsb: &Self) -> Self {
        let mut out = lsb.resize(lsb.width + msb.width, Bit4::Zero);
        let _ = out.set_vec(lsb.width, msb);
        out
    }

    /// Replaces every `Z` with `X`.
    pub fn z_to_x(&mut self) {
        for (a, b) in self.abits.iter_mut().zip(&self.bbits) {
            *a |= *b;
        }
    }

    /// Bitwise 4-state inversion in place.
    pub fn invert(&mut self) {
        for (a, b) in self.abits.iter_mut().zip(&self.bbits) {
            *a = !*a | *b;
        }
        self.normalize();
    }

    /// Bitwise 4-state AND in place. Widths must match.
    pub fn and_assign(&mut self, that: &Self) {
        for i in 0..self.abits.len().min(that.abits.len()) {
            let (a, b) = (self.abits[i], self.bbits[i]);
            let (c, d) = (that.abits[i], that.bbits[i]);
            let zero = (!a & !b) | (!c & !d);
            let xz = b | d;
            self.abits[i] = !zero;
            self.bbits[i] = !zero & xz;
        }
        self.normalize();
    }

    /// Bitwise 4-state OR in place. Widths must match.
    pub fn or_assign(&mut self, that: &Self) {
        for i in 0..self.abits.len().min(that.abits.len()) {
            let (a, b) = (self.abits[i], self.bbits[i]);
            let (c, d) = (that.abits[i], that.bbits[i]);
            let one = (a & !b) | (c & !d);
            let xz = b | d;
            self.abits[i] = one | xz;
            self.bbits[i] = !one & xz;
        }
        self.normalize();
    }

    /// Bitwise 4-state XOR in place. Widths must match.
    pub fn xor_assign(&mut self, that: &Self) {
        for i in 0..self.abits.len().min(that.abits.len()) {
            let xz = self.bbits[i] | that.bbits[i];
            self.abits[i] = (self.abits[i] ^ that.abits[i]) | xz;
            self.bbits[i] = xz;
        }
        self.normalize();
    }

    /// Clears storage bits above the width.
    fn normalize(&mut self) {
        let mask = last_word_mask(self.width);
        if let Some(a) = self.abits.last_mut() {
            *a &= mask;
        }
        if let Some(b) = self.bbits.last_mut() {
            *b &= mask;
        }
    }
}

impl fmt::Display for Vec4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.width).rev() {
            write!(f, "{}", self.bit(i).to_char())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Vec4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'b{self}", self.width)
    }
}

impl From<Bit4> for Vec4 {
    fn from(bit: Bit4) -> Self {
        Self::new(1, bit)
    }
}
