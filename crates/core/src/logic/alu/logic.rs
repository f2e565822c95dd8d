//! Bitwise and reduction operators.

use crate::common::error::{Fatal, fatal};
use crate::logic::bit4::Bit4;
use crate::logic::vec4::Vec4;

fn check_widths(context: &'static str, a: &Vec4, b: &Vec4) {
    if a.width() != b.width() {
        fatal(Fatal::WidthMismatch { context, left: a.width(), right: b.width() });
    }
}

/// Bitwise operator selector shared by gate functors and opcodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LogicOp {
    /// `&`.
    And,
    /// `|`.
    Or,
    /// `^`.
    Xor,
    /// `~&`.
    Nand,
    /// `~|`.
    Nor,
    /// `~^`.
    Xnor,
}

impl LogicOp {
    /// True for the inverting forms.
    pub const fn inverts(self) -> bool {
        matches!(self, Self::Nand | Self::Nor | Self::Xnor)
    }
}

/// Applies `op` bitwise to equal-width vectors.
pub fn apply(op: LogicOp, a: &Vec4, b: &Vec4) -> Vec4 {
    check_widths("bitwise", a, b);
    let mut out = a.clone();
    match op {
        LogicOp::And | LogicOp::Nand => out.and_assign(b),
        LogicOp::Or | LogicOp::Nor => out.or_assign(b),
        LogicOp::Xor | LogicOp::Xnor => out.xor_assign(b),
    }
    if op.inverts() {
        out.invert();
    }
    out
}

/// Applies `op` across any number of equal-width inputs.
pub fn apply_all<'a>(op: LogicOp, inputs: impl IntoIterator<Item = &'a Vec4>) -> Option<Vec4> {
    let mut iter = inputs.into_iter();
    let mut acc = iter.next()?.clone();
    for v in iter {
        check_widths("bitwise", &acc, v);
        match op {
            LogicOp::And | LogicOp::Nand => acc.and_assign(v),
            LogicOp::Or | LogicOp::Nor => acc.or_assign(v),
            LogicOp::Xor | LogicOp::Xnor => acc.xor_assign(v),
        }
    }
    if op.inverts() {
        acc.invert();
    }
    Some(acc)
}

/// Bitwise inversion.
pub fn not(v: &Vec4) -> Vec4 {
    let mut out = v.clone();
    out.invert();
    out
}

/// Reduction: folds `op` over every bit of `v`.
///
/// An empty vector reduces to the operator's identity (`1` for AND, `0` for OR/XOR), inverted
/// for the inverting forms.
pub fn reduce(op: LogicOp, v: &Vec4) -> Bit4 {
    let folded = match op {
        LogicOp::And | LogicOp::Nand => v.iter().fold(Bit4::One, |acc, b| acc & b),
        LogicOp::Or | LogicOp::Nor => v.iter().fold(Bit4::Zero, |acc, b| acc | b),
        LogicOp::Xor | LogicOp::Xnor => v.iter().fold(Bit4::Zero, |acc, b| acc ^ b),
    };
    if op.inverts() { !folded } else { folded }
}

/// Per-bit blend used by the conditional operator with an undefined select:
/// equal bits pass through, differing bits become `X`.
pub fn blend(a: &Vec4, b: &Vec4) -> Vec4 {
    check_widths("blend", a, b);
    let mut out = a.clone();
    for i in 0..a.width() {
        if a.bit(i) != b.bit(i) {
            out.set_bit(i, Bit4::X);
        }
    }
    out
}
