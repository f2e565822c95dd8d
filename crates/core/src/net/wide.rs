//! Wide-node adapter.
//!
//! A net has four input ports. Operators with more inputs are built as one *core* node that
//! accepts any port number plus a chain of [`ExtendFun`] nodes, each forwarding its four ports
//! to core ports `base..base + 4`. The core sees a single flat port space.

use super::functor::{Output, Receive};
use super::value::{ObjectRef, Value};
use crate::common::NetId;
use crate::common::error::{Fatal, fatal};
use crate::logic::alu::logic::{self as ops, LogicOp};
use crate::logic::{Vec4, Vec8};
use crate::sched::PartSelect;

/// Forwards its four ports into a wide core.
#[derive(Clone, Debug)]
pub struct ExtendFun {
    core: NetId,
    base: u32,
}

impl ExtendFun {
    /// Creates an adapter feeding core ports `base..base + 4`.
    pub const fn new(core: NetId, base: u32) -> Self {
        Self { core, base }
    }

    /// The core node.
    pub const fn core(&self) -> NetId {
        self.core
    }

    /// First core port fed by this adapter.
    pub const fn base(&self) -> u32 {
        self.base
    }

    fn forward(&self, port: u32, value: &Value, out: &mut Output<'_>) {
        if port >= 4 {
            fatal(Fatal::BadPort { functor: Self::NAME, port });
        }
        out.forward_wide(self.core, self.base + port, value);
    }
}

impl Receive for ExtendFun {
    const NAME: &'static str = "extend";

    fn recv_vec4(&mut self, port: u32, bits: &Vec4, out: &mut Output<'_>) {
        self.forward(port, &Value::Vec4(bits.clone()), out);
    }

    fn recv_vec4_pv(&mut self, port: u32, bits: &Vec4, part: PartSelect, out: &mut Output<'_>) {
        if port >= 4 {
            fatal(Fatal::BadPort { functor: Self::NAME, port });
        }
        out.forward_wide_vec4_pv(self.core, self.base + port, bits, part);
    }

    fn recv_vec8(&mut self, port: u32, bits: &Vec8, out: &mut Output<'_>) {
        self.forward(port, &Value::Vec8(bits.clone()), out);
    }

    fn recv_real(&mut self, port: u32, value: f64, out: &mut Output<'_>) {
        self.forward(port, &Value::Real(value), out);
    }

    fn recv_string(&mut self, port: u32, value: &str, out: &mut Output<'_>) {
        self.forward(port, &Value::Str(value.to_owned()), out);
    }

    fn recv_object(&mut self, port: u32, value: &ObjectRef, out: &mut Output<'_>) {
        self.forward(port, &Value::Object(value.clone()), out);
    }
}

/// Operation of a wide core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WideKind {
    /// Bitwise operator over every input.
    Logic(LogicOp),
    /// Concatenation; port 0 is least significant.
    Concat(Vec<u32>),
}

/// Core of a logic gate or concatenation with more than four inputs.
#[derive(Clone, Debug)]
pub struct WideFun {
    kind: WideKind,
    inputs: Vec<Vec4>,
}

impl WideFun {
    /// A gate over `inputs` inputs of `width` bits.
    pub fn logic(op: LogicOp, width: u32, inputs: usize) -> Self {
        Self { kind: WideKind::Logic(op), inputs: vec![Vec4::xs(width); inputs] }
    }

    /// A concatenation of inputs with the given widths.
    pub fn concat(widths: Vec<u32>) -> Self {
        let inputs = widths.iter().map(|&w| Vec4::zs(w)).collect();
        Self { kind: WideKind::Concat(widths), inputs }
    }

    /// Number of inputs.
    pub fn inputs(&self) -> usize {
        self.inputs.len()
    }

    fn evaluate(&self) -> Vec4 {
        match &self.kind {
            WideKind::Logic(op) => ops::apply_all(*op, &self.inputs).unwrap_or_default(),
            WideKind::Concat(_) => self
                .inputs
                .iter()
                .rev()
                .fold(Vec4::default(), |acc, part| Vec4::concat(&acc, part)),
        }
    }
}

impl Receive for WideFun {
    const NAME: &'static str = "wide";

    fn recv_vec4(&mut self, port: u32, bits: &Vec4, out: &mut Output<'_>) {
        let Some(slot) = self.inputs.get_mut(port as usize) else {
            fatal(Fatal::BadPort { functor: Self::NAME, port });
        };
        if slot.width() != bits.width() {
            fatal(Fatal::WidthMismatch { context: Self::NAME, left: slot.width(), right: bits.width() });
        }
        if slot.eeq(bits) {
            return;
        }
        *slot = bits.clone();
        out.send_vec4(self.evaluate());
    }
}
