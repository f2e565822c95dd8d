//! Arithmetic and comparison functors.
//!
//! Binary functors latch their two operands on ports 0 and 1 and recompute on every input.
//! Operands start as all `X`, so a result is only meaningful once both ports have been driven.

use super::functor::{Output, Receive};
use crate::common::error::{Fatal, fatal};
use crate::logic::alu::{Alu, ArithOp, CompareOp, arithmetic};
use crate::logic::{Bit4, Vec4};

/// What a vector arithmetic functor computes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithKind {
    /// A vector-valued operator.
    Op(ArithOp),
    /// A one-bit comparison.
    Compare(CompareOp),
}

/// Two-operand vector arithmetic, shift or comparison.
#[derive(Clone, Debug)]
pub struct ArithFun {
    kind: ArithKind,
    a: Vec4,
    b: Vec4,
}

impl ArithFun {
    /// Creates a functor over `width`-bit operands.
    pub fn new(kind: ArithKind, width: u32) -> Self {
        Self { kind, a: Vec4::xs(width), b: Vec4::xs(width) }
    }

    /// Shorthand for an arithmetic operator.
    pub fn op(op: ArithOp, width: u32) -> Self {
        Self::new(ArithKind::Op(op), width)
    }

    /// Shorthand for a comparison.
    pub fn compare(op: CompareOp, width: u32) -> Self {
        Self::new(ArithKind::Compare(op), width)
    }

    /// Width of the result.
    pub const fn width(&self) -> u32 {
        match self.kind {
            ArithKind::Op(_) => self.a.width(),
            ArithKind::Compare(_) => 1,
        }
    }

    fn evaluate(&self) -> Vec4 {
        match self.kind {
            // The combinational adder is bit-serial and gives up at the first undefined carry.
            ArithKind::Op(ArithOp::Add) => arithmetic::add_ripple(&self.a, &self.b),
            ArithKind::Op(op) => Alu::execute(op, &self.a, &self.b),
            ArithKind::Compare(op) => Vec4::from(Alu::compare(op, &self.a, &self.b)),
        }
    }
}

impl Receive for ArithFun {
    const NAME: &'static str = "arith";

    fn recv_vec4(&mut self, port: u32, bits: &Vec4, out: &mut Output<'_>) {
        match port {
            0 => self.a = bits.clone(),
            // Shift amounts may be narrower or wider than the shifted operand.
            1 => self.b = bits.clone(),
            _ => fatal(Fatal::BadPort { functor: Self::NAME, port }),
        }
        let is_shift = matches!(self.kind, ArithKind::Op(ArithOp::ShiftL | ArithOp::ShiftR | ArithOp::ShiftRS));
        if !is_shift && self.a.width() != self.b.width() {
            fatal(Fatal::WidthMismatch { context: Self::NAME, left: self.a.width(), right: self.b.width() });
        }
        out.send_vec4(self.evaluate());
    }
}

/// Absolute value of a signed vector or a real.
#[derive(Clone, Debug, Default)]
pub struct AbsFun;

impl Receive for AbsFun {
    const NAME: &'static str = "abs";

    fn recv_vec4(&mut self, port: u32, bits: &Vec4, out: &mut Output<'_>) {
        if port != 0 {
            fatal(Fatal::BadPort { functor: Self::NAME, port });
        }
        out.send_vec4(arithmetic::abs(bits));
    }

    fn recv_real(&mut self, port: u32, value: f64, out: &mut Output<'_>) {
        if port != 0 {
            fatal(Fatal::BadPort { functor: Self::NAME, port });
        }
        out.send_real(value.abs());
    }
}

/// Real-valued operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RealOp {
    /// `a + b`.
    Add,
    /// `a - b`.
    Sub,
    /// `a * b`.
    Mul,
    /// `a / b`.
    Div,
    /// `fmod(a, b)`.
    Mod,
    /// `a ** b`.
    Pow,
    /// `a == b`, one-bit result.
    Eq,
    /// `a != b`, one-bit result.
    Ne,
    /// `a >= b`, one-bit result.
    Ge,
    /// `a > b`, one-bit result.
    Gt,
}

/// Two-operand real arithmetic or comparison.
#[derive(Clone, Debug)]
pub struct RealArithFun {
    op: RealOp,
    a: f64,
    b: f64,
}

impl RealArithFun {
    /// Creates a functor with both operands at `0.0`.
    pub const fn new(op: RealOp) -> Self {
        Self { op, a: 0.0, b: 0.0 }
    }
}

impl Receive for RealArithFun {
    const NAME: &'static str = "arith.r";

    fn recv_real(&mut self, port: u32, value: f64, out: &mut Output<'_>) {
        match port {
            0 => self.a = value,
            1 => self.b = value,
            _ => fatal(Fatal::BadPort { functor: Self::NAME, port }),
        }
        let (a, b) = (self.a, self.b);
        let bit = |v: bool| Vec4::from(Bit4::from_bool(v));
        match self.op {
            RealOp::Add => out.send_real(a + b),
            RealOp::Sub => out.send_real(a - b),
            RealOp::Mul => out.send_real(a * b),
            RealOp::Div => out.send_real(a / b),
            RealOp::Mod => out.send_real(a % b),
            RealOp::Pow => out.send_real(a.powf(b)),
            RealOp::Eq => out.send_vec4(bit(a == b)),
            RealOp::Ne => out.send_vec4(bit(a != b)),
            RealOp::Ge => out.send_vec4(bit(a >= b)),
            RealOp::Gt => out.send_vec4(bit(a > b)),
        }
    }
}
