//! Wired-logic resolution (`triand` / `trior`).
//!
//! Strength is ignored. For wired-AND a `Z` driver yields the other driver, `0` dominates and
//! `X` dominates what remains. Wired-OR is the dual with `1` dominating.

use super::tree::{ResolvTree, TreeUpdate};
use crate::common::error::{Fatal, fatal};
use crate::logic::{Bit4, Vec4};
use crate::net::functor::{Output, Receive};

/// Wired-logic discipline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WiredOp {
    /// `triand` / `wand`.
    And,
    /// `trior` / `wor`.
    Or,
}

/// Wired-AND of two bits.
pub const fn wired_and(a: Bit4, b: Bit4) -> Bit4 {
    match (a, b) {
        (Bit4::Z, other) | (other, Bit4::Z) => other,
        (Bit4::Zero, _) | (_, Bit4::Zero) => Bit4::Zero,
        (Bit4::X, _) | (_, Bit4::X) => Bit4::X,
        (Bit4::One, Bit4::One) => Bit4::One,
    }
}

/// Wired-OR of two bits.
pub const fn wired_or(a: Bit4, b: Bit4) -> Bit4 {
    match (a, b) {
        (Bit4::Z, other) | (other, Bit4::Z) => other,
        (Bit4::One, _) | (_, Bit4::One) => Bit4::One,
        (Bit4::X, _) | (_, Bit4::X) => Bit4::X,
        (Bit4::Zero, Bit4::Zero) => Bit4::Zero,
    }
}

fn combine(a: &Vec4, b: &Vec4, f: fn(Bit4, Bit4) -> Bit4) -> Vec4 {
    if a.width() != b.width() {
        fatal(Fatal::WidthMismatch { context: "wired resolution", left: a.width(), right: b.width() });
    }
    let bits: Vec<Bit4> = a.iter().zip(b.iter()).map(|(x, y)| f(x, y)).collect();
    Vec4::from_bits(&bits)
}

/// Resolves two vectors with wired-AND.
pub fn resolve_and(a: &Vec4, b: &Vec4) -> Vec4 {
    combine(a, b, wired_and)
}

/// Resolves two vectors with wired-OR.
pub fn resolve_or(a: &Vec4, b: &Vec4) -> Vec4 {
    combine(a, b, wired_or)
}

/// Multi-driver wired-logic resolver.
#[derive(Clone, Debug)]
pub struct WiredFun {
    op: WiredOp,
    width: u32,
    tree: ResolvTree<Vec4>,
}

impl WiredFun {
    /// Creates a resolver of `width` bits over `drivers` inputs.
    pub fn new(op: WiredOp, width: u32, drivers: usize) -> Self {
        let combine: fn(&Vec4, &Vec4) -> Vec4 = match op {
            WiredOp::And => resolve_and,
            WiredOp::Or => resolve_or,
        };
        Self { op, width, tree: ResolvTree::new(drivers, &Vec4::zs(width), combine) }
    }

    /// The wired discipline.
    pub const fn op(&self) -> WiredOp {
        self.op
    }

    /// Width of every driver.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of driver inputs.
    pub fn drivers(&self) -> usize {
        self.tree.leaves()
    }

    /// The resolved value.
    pub fn output(&self) -> &Vec4 {
        self.tree.root()
    }
}

impl Receive for WiredFun {
    const NAME: &'static str = "resolv.wired";

    fn recv_vec4(&mut self, port: u32, bits: &Vec4, out: &mut Output<'_>) {
        if port as usize >= self.tree.leaves() {
            fatal(Fatal::BadPort { functor: Self::NAME, port });
        }
        if bits.width() != self.width {
            fatal(Fatal::WidthMismatch { context: Self::NAME, left: self.width, right: bits.width() });
        }
        out.network().stats.resolver_updates += 1;
        match self.tree.update(port as usize, bits.clone()) {
            TreeUpdate::Root(root) => out.send_vec4(root),
            TreeUpdate::Absorbed => out.network().stats.resolver_short_circuits += 1,
            TreeUpdate::Unchanged => {}
        }
    }
}
