//! The resolution engine.
//!
//! Nets with more than one driver are fed through a resolver functor:
//! 1. **Tree:** [`tree::ResolvTree`] caches partial results in a 4-ary tree so a driver change
//!    costs `O(log4 N)`.
//! 2. **Tri-state:** [`TriFun`] combines strength values, with optional `tri0`/`tri1` pull.
//! 3. **Wired logic:** [`WiredFun`] combines 4-state values for `triand`/`trior`.
//!
//! [`link_drivers`] wires drivers to a resolver, inserting [`ExtendFun`] adapters when there
//! are more than four.

/// Incremental resolution tree.
pub mod tree;

/// Tri-state resolver.
pub mod tri;

/// Wired-AND / wired-OR resolver.
pub mod wired;

pub use tree::{ResolvTree, TreeUpdate};
pub use tri::{Pull, TriFun};
pub use wired::{WiredFun, WiredOp};

use crate::common::NetId;
use crate::common::error::BuildError;
use crate::net::{ExtendFun, Functor, NET_PORTS, Network};

/// Connects `drivers` (each with its declared width) to the resolver on `resolver`.
///
/// Drivers `0..4` link straight to the resolver's ports; every further group of four goes
/// through an [`ExtendFun`] that forwards into resolver ports `4k..4k + 4`.
///
/// # Errors
///
/// [`BuildError::WidthMismatch`] if a driver's width differs from the resolver's, and
/// [`BuildError::MissingFunctor`] if `resolver` is not a resolver node.
pub fn link_drivers(network: &mut Network, resolver: NetId, drivers: &[(NetId, u32)]) -> Result<(), BuildError> {
    let (width, capacity) = match network.functor(resolver) {
        Some(Functor::Tri(tri)) => (tri.width(), tri.drivers()),
        Some(Functor::Wired(w)) => (w.width(), w.drivers()),
        _ => return Err(BuildError::MissingFunctor(resolver.0)),
    };
    if drivers.len() > capacity {
        return Err(BuildError::PortOutOfRange { net: resolver.0, port: drivers.len() as u32 - 1 });
    }
    let ports = usize::from(NET_PORTS);
    let mut extend = None;
    for (i, &(driver, found)) in drivers.iter().enumerate() {
        if found != width {
            return Err(BuildError::WidthMismatch { net: resolver.0, expected: width, found });
        }
        let port = (i % ports) as u8;
        if i < ports {
            network.link(driver, resolver.port(port))?;
            continue;
        }
        if port == 0 {
            extend = Some(network.add(ExtendFun::new(resolver, i as u32)));
        }
        if let Some(ext) = extend {
            network.link(driver, ext.port(port))?;
        }
    }
    Ok(())
}
