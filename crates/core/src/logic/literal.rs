//! Immediate-value encodings shared with the loader.
//!
//! Three textual forms describe constant node values:
//! 1. **4-state literal:** `C4<01xz>` (or the bare digits), most significant bit first.
//! 2. **Strength literal:** `C8<...>`, three characters per bit (0-side strength digit,
//!    1-side strength digit, value character), most significant bit first.
//! 3. **Real literal:** `Cr<m{hex}g{hex}>`, a mantissa and a biased exponent word.
//!
//! The real exponent word carries the sign in bit `0x4000` and a magnitude biased by
//! `0x1000` in its low 13 bits. A zero mantissa with exponent `0x3fff` is `+inf`, with
//! `0x7fff` is `-inf`; exponent `0x3fff` with a non-zero mantissa is NaN. The same word layout
//! is used by the `%pushi/real` operands.

use std::str::FromStr;

use super::bit4::Bit4;
use super::vec4::Vec4;
use super::vec8::{Scalar, Strength, Vec8};
use crate::common::error::BuildError;

/// Exponent bias of the real encoding.
pub const REAL_EXP_BIAS: i32 = 0x1000;

/// Sign bit of the real exponent word.
pub const REAL_SIGN_BIT: u32 = 0x4000;

/// Exponent word that marks `+inf` (zero mantissa) or NaN (non-zero mantissa).
pub const REAL_EXP_INF: u32 = 0x3fff;

/// Exponent word that marks `-inf`.
pub const REAL_EXP_NEG_INF: u32 = 0x7fff;

const REAL_EXP_MASK: u32 = 0x1fff;

fn invalid(text: &str, reason: &'static str) -> BuildError {
    BuildError::InvalidLiteral { text: text.to_owned(), reason }
}

/// Parses bare `01xz` digits, most significant first.
pub fn parse_bits(text: &str) -> Result<Vec4, BuildError> {
    let bits = text
        .chars()
        .rev()
        .map(|c| Bit4::from_char(c).ok_or_else(|| invalid(text, "expected one of 0 1 x z")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Vec4::from_bits(&bits))
}

fn strip<'a>(text: &'a str, prefix: &str) -> Result<&'a str, BuildError> {
    text.strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix('>'))
        .ok_or_else(|| invalid(text, "missing literal delimiters"))
}

/// Parses a `C4<...>` literal.
pub fn parse_c4(text: &str) -> Result<Vec4, BuildError> {
    parse_bits(strip(text, "C4<")?)
}

fn strength_digit(text: &str, c: char) -> Result<Strength, BuildError> {
    const LEVELS: [Strength; 8] = [
        Strength::HiZ,
        Strength::Small,
        Strength::Medium,
        Strength::Weak,
        Strength::Large,
        Strength::Pull,
        Strength::Strong,
        Strength::Supply,
    ];
    c.to_digit(8).map(|d| LEVELS[d as usize]).ok_or_else(|| invalid(text, "strength digit must be 0-7"))
}

/// Parses a `C8<...>` strength literal.
pub fn parse_c8(text: &str) -> Result<Vec8, BuildError> {
    let body: Vec<char> = strip(text, "C8<")?.chars().collect();
    if body.len() % 3 != 0 {
        return Err(invalid(text, "strength literal needs three characters per bit"));
    }
    let mut bits = Vec::with_capacity(body.len() / 3);
    for chunk in body.chunks(3).rev() {
        let str0 = strength_digit(text, chunk[0])?;
        let str1 = strength_digit(text, chunk[1])?;
        let val = Bit4::from_char(chunk[2]).ok_or_else(|| invalid(text, "expected one of 0 1 x z"))?;
        bits.push(Scalar::new(val, str0, str1));
    }
    Ok(Vec8::from_scalars(bits))
}

/// Multiplies `x` by `2^exp` without intermediate overflow.
pub fn ldexp(mut x: f64, mut exp: i32) -> f64 {
    const STEP: i32 = 1000;
    while exp > STEP {
        x *= 2f64.powi(STEP);
        exp -= STEP;
    }
    while exp < -STEP {
        x *= 2f64.powi(-STEP);
        exp += STEP;
    }
    x * 2f64.powi(exp)
}

/// Decodes a mantissa and exponent word.
pub fn decode_real(mant: u64, exp: u32) -> f64 {
    if mant == 0 && exp == REAL_EXP_INF {
        return f64::INFINITY;
    }
    if mant == 0 && exp == REAL_EXP_NEG_INF {
        return f64::NEG_INFINITY;
    }
    if exp == REAL_EXP_INF {
        return f64::NAN;
    }
    let sign = if exp & REAL_SIGN_BIT != 0 { -1.0 } else { 1.0 };
    sign * ldexp(mant as f64, (exp & REAL_EXP_MASK) as i32 - REAL_EXP_BIAS)
}

/// Encodes a real as `(mantissa, exponent word)` with an exact 53-bit mantissa.
pub fn encode_real(value: f64) -> (u64, u32) {
    if value.is_nan() {
        return (1, REAL_EXP_INF);
    }
    if value.is_infinite() {
        return (0, if value > 0.0 { REAL_EXP_INF } else { REAL_EXP_NEG_INF });
    }
    if value == 0.0 {
        return (0, REAL_EXP_BIAS as u32);
    }
    let sign = if value < 0.0 { REAL_SIGN_BIT } else { 0 };
    let mag = value.abs();
    let bits = mag.to_bits();
    let raw_exp = ((bits >> 52) & 0x7ff) as i32;
    let (mant, exp) = if raw_exp == 0 {
        (bits & ((1u64 << 52) - 1), -1074)
    } else {
        ((bits & ((1u64 << 52) - 1)) | (1u64 << 52), raw_exp - 1075)
    };
    let shift = mant.trailing_zeros();
    (mant >> shift, (exp + shift as i32 + REAL_EXP_BIAS) as u32 | sign)
}

/// Parses a `Cr<m{hex}g{hex}>` literal.
pub fn parse_cr(text: &str) -> Result<f64, BuildError> {
    let body = strip(text, "Cr<")?;
    let rest = body.strip_prefix('m').ok_or_else(|| invalid(text, "real literal must start with `m`"))?;
    let (mant, exp) = rest.split_once('g').ok_or_else(|| invalid(text, "real literal needs a `g` exponent"))?;
    let mant = u64::from_str_radix(mant, 16).map_err(|_| invalid(text, "bad mantissa"))?;
    let exp = u32::from_str_radix(exp, 16).map_err(|_| invalid(text, "bad exponent"))?;
    Ok(decode_real(mant, exp))
}

/// Formats a real as a `Cr<...>` literal.
pub fn format_cr(value: f64) -> String {
    let (mant, exp) = encode_real(value);
    format!("Cr<m{mant:x}g{exp:x}>")
}

impl FromStr for Vec4 {
    type Err = BuildError;

    /// Accepts either `C4<...>` or bare `01xz` digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("C4<") { parse_c4(s) } else { parse_bits(s) }
    }
}
