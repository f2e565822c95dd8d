//! The signal propagation network.
//!
//! This module contains the node graph and every functor that can sit on a node:
//! 1. **Graph:** [`Network`] owns the nets, their fan-out lists and filters, and implements
//!    synchronous depth-first propagation.
//! 2. **Dispatch:** [`Functor`] is the closed set of behaviors; [`Receive`] defines the
//!    per-value-kind entry points with the default partial-vector adapter.
//! 3. **Storage:** Signals, force filters and word arrays.
//! 4. **Operators:** Arithmetic, logic, selection, delay, event and wide-node functors.
//!
//! Resolver functors live in [`crate::resolv`].

/// Arithmetic and comparison functors.
pub mod arith;

/// Word arrays.
pub mod array;

/// Delay functor.
pub mod delay;

/// Edge and named-event functors.
pub mod event;

/// Force filters.
pub mod filter;

/// Functor dispatch and the output handle.
pub mod functor;

/// Gates, conditional buffers and reductions.
pub mod logic;

/// The node graph.
pub mod network;

/// Part-select, concat, extension and conversion functors.
pub mod select;

/// Variable and net storage.
pub mod signal;

/// Values carried by the network.
pub mod value;

/// Wide-node adapter.
pub mod wide;

pub use arith::{AbsFun, ArithFun, ArithKind, RealArithFun, RealOp};
pub use array::VArray;
pub use delay::{DelayFun, DelaySpec};
pub use event::{EdgeKind, EventFun};
pub use filter::{Filter, FilterResult};
pub use functor::{Functor, Output, Receive};
pub use logic::{BufIfFun, BufIfKind, GateKind, LogicFun, ReduceFun};
pub use network::{NET_PORTS, Net, NetStats, Network};
pub use select::{CastFun, CastKind, ConcatFun, DriveFun, PartFun, SextFun};
pub use signal::{AutoVar, SignalFun, SignalKind};
pub use value::{Object, ObjectRef, Value};
pub use wide::{ExtendFun, WideFun, WideKind};
