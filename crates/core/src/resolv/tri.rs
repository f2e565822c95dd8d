//! Tri-state resolution.
//!
//! A [`TriFun`] resolves any number of strength-valued drivers with [`Scalar::resolve`] through
//! a [`ResolvTree`]. `tri0`/`tri1` nets add a pull scalar that is resolved against the tree's
//! root, so it shows through only where no stronger driver is active.

use super::tree::{ResolvTree, TreeUpdate};
use crate::common::error::{Fatal, fatal};
use crate::logic::{Bit4, Scalar, Strength, Vec4, Vec8};
use crate::net::functor::{Output, Receive};

/// Pull applied by `tri0` / `tri1` nets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pull {
    /// Plain `tri`/`wire`.
    None,
    /// `tri0`: pull-strength `0`.
    Down,
    /// `tri1`: pull-strength `1`.
    Up,
}

impl Pull {
    /// The scalar the pull contributes, if any.
    pub const fn scalar(self) -> Option<Scalar> {
        match self {
            Self::None => None,
            Self::Down => Some(Scalar::new(Bit4::Zero, Strength::Pull, Strength::Pull)),
            Self::Up => Some(Scalar::new(Bit4::One, Strength::Pull, Strength::Pull)),
        }
    }
}

/// Multi-driver tri-state resolver.
#[derive(Clone, Debug)]
pub struct TriFun {
    width: u32,
    pull: Pull,
    tree: ResolvTree<Vec8>,
    settled: bool,
}

impl TriFun {
    /// Creates a resolver of `width` bits over `drivers` inputs.
    pub fn new(width: u32, drivers: usize, pull: Pull) -> Self {
        Self { width, pull, tree: ResolvTree::new(drivers, &Vec8::hiz(width), Vec8::resolve), settled: false }
    }

    /// Width of every driver.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of driver inputs.
    pub fn drivers(&self) -> usize {
        self.tree.leaves()
    }

    /// The resolved output, pull applied.
    pub fn output(&self) -> Vec8 {
        let root = self.tree.root();
        match self.pull.scalar() {
            None => root.clone(),
            Some(pull) => Vec8::from_scalars(root.iter().map(|s| Scalar::resolve(s, pull)).collect()),
        }
    }

    /// Marks the resolver settled and returns its current output.
    ///
    /// With no driver delivered yet this is the pull value of a `tri0`/`tri1` net and `Z`
    /// otherwise.
    pub fn settle(&mut self) -> Vec8 {
        self.settled = true;
        self.output()
    }

    fn drive(&mut self, port: u32, value: Vec8, out: &mut Output<'_>) {
        if port as usize >= self.tree.leaves() {
            fatal(Fatal::BadPort { functor: Self::NAME, port });
        }
        if value.width() != self.width {
            fatal(Fatal::WidthMismatch { context: Self::NAME, left: self.width, right: value.width() });
        }
        out.network().stats.resolver_updates += 1;
        match self.tree.update(port as usize, value) {
            TreeUpdate::Root(_) => {}
            TreeUpdate::Absorbed => {
                out.network().stats.resolver_short_circuits += 1;
                if self.settled {
                    return;
                }
            }
            TreeUpdate::Unchanged if self.settled => return,
            TreeUpdate::Unchanged => {}
        }
        self.settled = true;
        out.send_vec8(self.output());
    }
}

impl Receive for TriFun {
    const NAME: &'static str = "resolv.tri";

    fn recv_vec4(&mut self, port: u32, bits: &Vec4, out: &mut Output<'_>) {
        let (s0, s1) = out.drive();
        self.drive(port, Vec8::from_vec4(bits, s0, s1), out);
    }

    fn recv_vec8(&mut self, port: u32, bits: &Vec8, out: &mut Output<'_>) {
        self.drive(port, bits.clone(), out);
    }
}
