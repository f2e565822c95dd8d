//! Gate, conditional-buffer and reduction functors.

use super::functor::{Output, Receive};
use crate::common::error::{Fatal, fatal};
use crate::logic::alu::logic::{self as ops, LogicOp};
use crate::logic::{Bit4, Scalar, Strength, Vec4, Vec8};

/// Gate function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateKind {
    /// Bitwise operator folded over every connected input.
    Op(LogicOp),
    /// Buffer (`Z` reads as `X`).
    Buf,
    /// Inverter.
    Not,
}

/// A logic gate over one to four equal-width inputs.
#[derive(Clone, Debug)]
pub struct LogicFun {
    kind: GateKind,
    inputs: Vec<Vec4>,
}

impl LogicFun {
    /// Creates a gate with `inputs` connected ports of `width` bits, all initially `X`.
    pub fn new(kind: GateKind, width: u32, inputs: usize) -> Self {
        let inputs = match kind {
            GateKind::Op(_) => inputs.clamp(1, 4),
            GateKind::Buf | GateKind::Not => 1,
        };
        Self { kind, inputs: vec![Vec4::xs(width); inputs] }
    }

    fn evaluate(&self) -> Vec4 {
        match self.kind {
            GateKind::Op(op) => ops::apply_all(op, &self.inputs).unwrap_or_default(),
            GateKind::Buf => {
                let mut v = self.inputs[0].clone();
                v.z_to_x();
                v
            }
            GateKind::Not => ops::not(&self.inputs[0]),
        }
    }
}

impl Receive for LogicFun {
    const NAME: &'static str = "logic";

    fn recv_vec4(&mut self, port: u32, bits: &Vec4, out: &mut Output<'_>) {
        let Some(slot) = self.inputs.get_mut(port as usize) else {
            fatal(Fatal::BadPort { functor: Self::NAME, port });
        };
        if slot.eeq(bits) {
            return;
        }
        *slot = bits.clone();
        out.send_vec4(self.evaluate());
    }
}

/// Polarity of a conditional buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufIfKind {
    /// `bufif0`: drives while the enable is `0`.
    BufIf0,
    /// `bufif1`: drives while the enable is `1`.
    BufIf1,
    /// `notif0`: inverts while the enable is `0`.
    NotIf0,
    /// `notif1`: inverts while the enable is `1`.
    NotIf1,
}

/// Tri-state buffer: data on port 0, enable on port 1, strength-valued output.
#[derive(Clone, Debug)]
pub struct BufIfFun {
    kind: BufIfKind,
    drive: (Strength, Strength),
    data: Vec4,
    enable: Vec4,
}

impl BufIfFun {
    /// Creates a buffer of `width` bits driving with `(drive0, drive1)`.
    pub fn new(kind: BufIfKind, width: u32, drive0: Strength, drive1: Strength) -> Self {
        Self { kind, drive: (drive0, drive1), data: Vec4::xs(width), enable: Vec4::xs(1) }
    }

    fn scalar(&self, data: Bit4, enable: Bit4) -> Scalar {
        let (s0, s1) = self.drive;
        let data = match self.kind {
            BufIfKind::NotIf0 | BufIfKind::NotIf1 => !data,
            BufIfKind::BufIf0 | BufIfKind::BufIf1 => data.z_to_x(),
        };
        let enable = match self.kind {
            BufIfKind::BufIf0 | BufIfKind::NotIf0 => !enable,
            BufIfKind::BufIf1 | BufIfKind::NotIf1 => enable.z_to_x(),
        };
        match (enable, data) {
            (Bit4::Zero, _) => Scalar::HIZ,
            (Bit4::One, d) => Scalar::new(d, s0, s1),
            // Unknown enable: the output is the data value or high impedance.
            (_, Bit4::Zero) => Scalar::from_raw(s0.level()),
            (_, Bit4::One) => Scalar::from_raw(0x80 | (s1.level() << 4) | 0x08),
            (_, _) => Scalar::new(Bit4::X, s0, s1),
        }
    }

    fn evaluate(&self) -> Vec8 {
        let single = self.enable.width() == 1;
        let bits = (0..self.data.width())
            .map(|i| self.scalar(self.data.bit(i), self.enable.bit(if single { 0 } else { i })))
            .collect();
        Vec8::from_scalars(bits)
    }
}

impl Receive for BufIfFun {
    const NAME: &'static str = "bufif";

    fn recv_vec4(&mut self, port: u32, bits: &Vec4, out: &mut Output<'_>) {
        match port {
            0 => self.data = bits.clone(),
            1 => self.enable = bits.clone(),
            _ => fatal(Fatal::BadPort { functor: Self::NAME, port }),
        }
        out.send_vec8(self.evaluate());
    }
}

/// Reduction of one input to a single bit.
#[derive(Clone, Debug)]
pub struct ReduceFun {
    op: LogicOp,
}

impl ReduceFun {
    /// Creates a reduction node.
    pub const fn new(op: LogicOp) -> Self {
        Self { op }
    }
}

impl Receive for ReduceFun {
    const NAME: &'static str = "reduce";

    fn recv_vec4(&mut self, port: u32, bits: &Vec4, out: &mut Output<'_>) {
        if port != 0 {
            fatal(Fatal::BadPort { functor: Self::NAME, port });
        }
        out.send_vec4(Vec4::from(ops::reduce(self.op, bits)));
    }
}
