//! Part-select, concatenation, extension and conversion functors.

use super::functor::{Output, Receive};
use crate::common::error::{Fatal, fatal};
use crate::logic::{Bit4, Strength, Vec4, Vec8};
use crate::sched::PartSelect;

/// Extracts `wid` bits at `base` of its input.
#[derive(Clone, Debug)]
pub struct PartFun {
    base: u32,
    wid: u32,
    input: Option<Vec4>,
}

impl PartFun {
    /// Creates a part-select of `wid` bits starting at `base`.
    pub const fn new(base: u32, wid: u32) -> Self {
        Self { base, wid, input: None }
    }

    fn emit(&self, out: &mut Output<'_>) {
        if let Some(input) = &self.input {
            out.send_vec4(input.subvalue(self.base, self.wid));
        }
    }
}

impl Receive for PartFun {
    const NAME: &'static str = "part";

    fn recv_vec4(&mut self, port: u32, bits: &Vec4, out: &mut Output<'_>) {
        if port != 0 {
            fatal(Fatal::BadPort { functor: Self::NAME, port });
        }
        self.input = Some(bits.clone());
        self.emit(out);
    }

    fn recv_vec4_pv(&mut self, port: u32, bits: &Vec4, part: PartSelect, out: &mut Output<'_>) {
        if port != 0 {
            fatal(Fatal::BadPort { functor: Self::NAME, port });
        }
        let input = self.input.get_or_insert_with(|| Vec4::zs(part.vwid));
        if input.width() != part.vwid {
            fatal(Fatal::WidthMismatch { context: Self::NAME, left: input.width(), right: part.vwid });
        }
        let _ = input.set_vec(part.base, bits);
        self.emit(out);
    }
}

/// Concatenates up to four inputs; port 0 supplies the least significant part.
#[derive(Clone, Debug)]
pub struct ConcatFun {
    widths: Vec<u32>,
    value: Vec4,
}

impl ConcatFun {
    /// Creates a concatenation of inputs with the given widths, initially all `Z`.
    pub fn new(widths: &[u32]) -> Self {
        let total = widths.iter().sum();
        Self { widths: widths.to_vec(), value: Vec4::zs(total) }
    }

    fn offset(&self, port: u32) -> u32 {
        self.widths.iter().take(port as usize).sum()
    }
}

impl Receive for ConcatFun {
    const NAME: &'static str = "concat";

    fn recv_vec4(&mut self, port: u32, bits: &Vec4, out: &mut Output<'_>) {
        let Some(&wid) = self.widths.get(port as usize) else {
            fatal(Fatal::BadPort { functor: Self::NAME, port });
        };
        if wid != bits.width() {
            fatal(Fatal::WidthMismatch { context: Self::NAME, left: wid, right: bits.width() });
        }
        let off = self.offset(port);
        if self.value.set_vec(off, bits) {
            out.send_vec4(self.value.clone());
        }
    }
}

/// Sign-extends its input to a fixed width.
#[derive(Clone, Debug)]
pub struct SextFun {
    width: u32,
}

impl SextFun {
    /// Creates an extender producing `width` bits.
    pub const fn new(width: u32) -> Self {
        Self { width }
    }
}

impl Receive for SextFun {
    const NAME: &'static str = "sext";

    fn recv_vec4(&mut self, port: u32, bits: &Vec4, out: &mut Output<'_>) {
        if port != 0 {
            fatal(Fatal::BadPort { functor: Self::NAME, port });
        }
        out.send_vec4(bits.sign_extend(self.width));
    }
}

/// Converts 4-state values into strength values with fixed drive strengths.
#[derive(Clone, Debug)]
pub struct DriveFun {
    drive0: Strength,
    drive1: Strength,
}

impl DriveFun {
    /// Creates a driver with the given strengths.
    pub const fn new(drive0: Strength, drive1: Strength) -> Self {
        Self { drive0, drive1 }
    }
}

impl Receive for DriveFun {
    const NAME: &'static str = "drive";

    fn recv_vec4(&mut self, port: u32, bits: &Vec4, out: &mut Output<'_>) {
        if port != 0 {
            fatal(Fatal::BadPort { functor: Self::NAME, port });
        }
        out.send_vec8(Vec8::from_vec4(bits, self.drive0, self.drive1));
    }
}

/// Conversion performed by a [`CastFun`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastKind {
    /// Vector to real, optionally treating the vector as signed.
    ToReal {
        /// Interpret the vector as two's complement.
        signed: bool,
    },
    /// Real to a vector of `width` bits, rounding to nearest.
    ToVec4 {
        /// Result width.
        width: u32,
    },
    /// 4-state to 2-state: `X` and `Z` become `0`.
    ToInt2,
}

/// Type conversion node.
#[derive(Clone, Debug)]
pub struct CastFun {
    kind: CastKind,
}

impl CastFun {
    /// Creates a conversion node.
    pub const fn new(kind: CastKind) -> Self {
        Self { kind }
    }
}

impl Receive for CastFun {
    const NAME: &'static str = "cast";

    fn recv_vec4(&mut self, port: u32, bits: &Vec4, out: &mut Output<'_>) {
        if port != 0 {
            fatal(Fatal::BadPort { functor: Self::NAME, port });
        }
        match self.kind {
            CastKind::ToReal { signed } => out.send_real(bits.to_f64(signed)),
            CastKind::ToInt2 => {
                let mut v = bits.clone();
                for i in 0..v.width() {
                    if v.bit(i).is_xz() {
                        v.set_bit(i, Bit4::Zero);
                    }
                }
                out.send_vec4(v);
            }
            CastKind::ToVec4 { .. } => fatal(Fatal::UnsupportedValue { functor: Self::NAME, kind: "vec4" }),
        }
    }

    fn recv_real(&mut self, port: u32, value: f64, out: &mut Output<'_>) {
        if port != 0 {
            fatal(Fatal::BadPort { functor: Self::NAME, port });
        }
        match self.kind {
            CastKind::ToVec4 { width } => out.send_vec4(Vec4::from_f64(width, value)),
            _ => fatal(Fatal::UnsupportedValue { functor: Self::NAME, kind: "real" }),
        }
    }
}
