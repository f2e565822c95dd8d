//! Operators over 4-state vectors.
//!
//! The operators every functor and opcode relies on are grouped by category:
//! - [`arithmetic`]: add, subtract, multiply, divide, modulo, power, negate
//! - [`logic`]:      bitwise and reduction operators
//! - [`shifts`]:     logical left/right and arithmetic right shifts
//! - [`compare`]:    equality families (`==`, `===`, `==?`, casex, casez) and magnitude
//!
//! Every operator follows 4-state semantics: an `X` or `Z` in a bit the result depends on
//! makes the result `X`, unless the operator's own table says otherwise.

/// Add, subtract, multiply, divide, modulo and power.
pub mod arithmetic;

/// Equality and magnitude comparisons.
pub mod compare;

/// Bitwise and reduction operators.
pub mod logic;

/// Shift operators with an explicit "undefined amount" flag.
pub mod shifts;

use serde::{Deserialize, Serialize};

use super::bit4::Bit4;
use super::vec4::Vec4;

/// Binary vector operators that produce a vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithOp {
    /// `a + b`.
    Add,
    /// `a - b`.
    Sub,
    /// `a * b`.
    Mul,
    /// Unsigned `a / b`.
    Div,
    /// Signed `a / b`.
    DivS,
    /// Unsigned `a % b`.
    Mod,
    /// Signed `a % b`.
    ModS,
    /// Unsigned `a ** b`.
    Pow,
    /// Signed `a ** b`.
    PowS,
    /// `a << b`.
    ShiftL,
    /// `a >> b`.
    ShiftR,
    /// `a >>> b` (sign-filling).
    ShiftRS,
}

/// Binary comparisons that produce a single bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    /// `===`.
    Eeq,
    /// `!==`.
    Nee,
    /// `==`.
    Eq,
    /// `!=`.
    Ne,
    /// casex match.
    Eqx,
    /// casez match.
    Eqz,
    /// `==?`.
    Weq,
    /// `!=?`.
    Wne,
    /// Unsigned `a > b`.
    Gt,
    /// Unsigned `a >= b`.
    Ge,
    /// Signed `a > b`.
    GtS,
    /// Signed `a >= b`.
    GeS,
}

/// Vector arithmetic unit.
///
/// Stateless; it exists so that functors and opcodes share one dispatch point.
#[derive(Debug)]
pub struct Alu;

impl Alu {
    /// Applies a vector operator.
    ///
    /// # Arguments
    ///
    /// * `op` - The operator.
    /// * `a`  - Left operand; its width is the result width.
    /// * `b`  - Right operand (the shift amount for shifts).
    ///
    /// # Returns
    ///
    /// The result vector, all `X` when an operand bit the result depends on is undefined.
    pub fn execute(op: ArithOp, a: &Vec4, b: &Vec4) -> Vec4 {
        match op {
            ArithOp::Add => arithmetic::add(a, b),
            ArithOp::Sub => arithmetic::sub(a, b),
            ArithOp::Mul => arithmetic::mul(a, b),
            ArithOp::Div => arithmetic::div(a, b, false),
            ArithOp::DivS => arithmetic::div(a, b, true),
            ArithOp::Mod => arithmetic::rem(a, b, false),
            ArithOp::ModS => arithmetic::rem(a, b, true),
            ArithOp::Pow => arithmetic::pow(a, b, false),
            ArithOp::PowS => arithmetic::pow(a, b, true),
            ArithOp::ShiftL | ArithOp::ShiftR | ArithOp::ShiftRS => {
                let (amount, undefined) = shifts::amount_of(b);
                match op {
                    ArithOp::ShiftL => shifts::shift_left(a, amount, undefined),
                    ArithOp::ShiftR => shifts::shift_right(a, amount, undefined),
                    _ => shifts::shift_right_signed(a, amount, undefined),
                }
            }
        }
    }

    /// Applies a comparison.
    pub fn compare(op: CompareOp, a: &Vec4, b: &Vec4) -> Bit4 {
        match op {
            CompareOp::Eeq => compare::eeq(a, b),
            CompareOp::Nee => !compare::eeq(a, b),
            CompareOp::Eq => compare::eq(a, b),
            CompareOp::Ne => !compare::eq(a, b),
            CompareOp::Eqx => compare::eqx(a, b),
            CompareOp::Eqz => compare::eqz(a, b),
            CompareOp::Weq => compare::weq(a, b),
            CompareOp::Wne => !compare::weq(a, b),
            CompareOp::Gt => compare::gt(a, b, false),
            CompareOp::Ge => compare::ge(a, b, false),
            CompareOp::GtS => compare::gt(a, b, true),
            CompareOp::GeS => compare::ge(a, b, true),
        }
    }
}
