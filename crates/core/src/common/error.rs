//! Error definitions for the simulation core.
//!
//! This module defines the four error classes the core distinguishes:
//! 1. **Build errors:** A malformed graph or code space detected while it is being assembled.
//! 2. **Config errors:** Configuration file I/O and JSON parse failures.
//! 3. **Run errors:** Conditions that stop [`crate::sim::Simulator`] from running at all.
//! 4. **Fatal violations:** Internal invariant breaks (stack underflow, width mismatch, re-entrant
//!    propagation). These indicate a defect in the upstream compiler and abort the process.

use std::io;

use thiserror::Error;

/// Configuration errors detected while constructing a network or a code space.
///
/// The simulator refuses to start when any of these is reported.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The mnemonic does not appear in the opcode table.
    #[error("unknown opcode mnemonic `{0}`")]
    UnknownOpcode(String),

    /// The instruction was given the wrong number of operands.
    #[error("opcode `{mnemonic}` takes {expected} operand(s), got {found}")]
    OperandCount {
        /// Mnemonic of the offending instruction.
        mnemonic: &'static str,
        /// Arity recorded in the opcode table.
        expected: usize,
        /// Number of operands supplied.
        found: usize,
    },

    /// An operand does not match the kind the opcode table requires.
    #[error("operand {index} of `{mnemonic}` must be {expected}, got {found}")]
    OperandKind {
        /// Mnemonic of the offending instruction.
        mnemonic: &'static str,
        /// Zero-based operand position.
        index: usize,
        /// Operand kind the table requires.
        expected: &'static str,
        /// Operand kind supplied.
        found: &'static str,
    },

    /// A forward code label was referenced but never defined.
    #[error("label `{0}` is referenced but never defined")]
    UnresolvedLabel(String),

    /// A code label was defined more than once.
    #[error("label `{0}` is defined more than once")]
    DuplicateLabel(String),

    /// A link targets a node that has no functor to receive values.
    #[error("net {0} has no functor and cannot receive values")]
    MissingFunctor(u32),

    /// A link names a port the target cannot accept.
    #[error("port {port} is out of range for net {net}")]
    PortOutOfRange {
        /// Target net index.
        net: u32,
        /// Requested port.
        port: u32,
    },

    /// Two drivers of one resolver disagree on width.
    #[error("driver of net {net} is {found} bits wide, resolver expects {expected}")]
    WidthMismatch {
        /// Resolver net index.
        net: u32,
        /// Width of the resolver.
        expected: u32,
        /// Width of the offending driver.
        found: u32,
    },

    /// A 4-state, strength or real literal could not be parsed.
    #[error("invalid literal `{text}`: {reason}")]
    InvalidLiteral {
        /// The literal text as written.
        text: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A foreign call site names a procedure that was never registered.
    #[error("foreign procedure `{0}` is not registered")]
    UnknownForeign(String),

    /// An object type descriptor such as `"sb8"` could not be interpreted.
    #[error("invalid type descriptor `{0}`")]
    InvalidType(String),
}

/// Errors raised while loading a [`crate::config::Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] io::Error),

    /// The configuration text is not valid JSON for the schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors that prevent a simulation run from proceeding.
#[derive(Debug, Error)]
pub enum SimError {
    /// The network or code space was malformed.
    #[error("build error: {0}")]
    Build(#[from] BuildError),

    /// The configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// `run` was called before `start`.
    #[error("simulation has not been started")]
    NotStarted,
}

/// Internal invariant violations.
///
/// These are never returned to callers. They are passed to [`fatal`], which logs and aborts,
/// because they mean the compiled design handed to the core was inconsistent.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Fatal {
    /// A value stack was popped or peeked past its bottom.
    #[error("{stack} stack underflow (depth {depth}, size {size})")]
    StackUnderflow {
        /// Which of the four stacks underflowed.
        stack: &'static str,
        /// Requested depth.
        depth: usize,
        /// Actual number of entries.
        size: usize,
    },

    /// A vector operand did not have the width the operation requires.
    #[error("{context}: width mismatch ({left} vs {right})")]
    WidthMismatch {
        /// Operation that detected the mismatch.
        context: &'static str,
        /// Expected width.
        left: u32,
        /// Actual width.
        right: u32,
    },

    /// A functor was handed a value kind it cannot process.
    #[error("functor `{functor}` cannot receive {kind} values")]
    UnsupportedValue {
        /// Functor variant name.
        functor: &'static str,
        /// Value kind delivered.
        kind: &'static str,
    },

    /// A functor port index outside its accepted range.
    #[error("functor `{functor}` has no input port {port}")]
    BadPort {
        /// Functor variant name.
        functor: &'static str,
        /// Requested port.
        port: u32,
    },

    /// A node was re-entered while it was still propagating a value.
    #[error("re-entrant propagation into net {0}")]
    Reentrant(u32),

    /// A handle referred to an arena slot that no longer exists.
    #[error("stale {kind} handle {index}")]
    StaleHandle {
        /// Arena the handle belongs to.
        kind: &'static str,
        /// Slot index.
        index: u32,
    },

    /// An instruction operand did not have the kind its opcode expects.
    #[error("`{mnemonic}` operand {index} is not a {expected}")]
    Operand {
        /// Opcode mnemonic.
        mnemonic: &'static str,
        /// Operand position.
        index: usize,
        /// Kind the handler tried to read.
        expected: &'static str,
    },

    /// A thread-lifecycle precondition did not hold (for example `%join` with no children).
    #[error("thread {thread}: {reason}")]
    ThreadState {
        /// Offending thread slot.
        thread: u32,
        /// What was violated.
        reason: &'static str,
    },

    /// The program counter ran off the end of the code space.
    #[error("program counter {0} is outside the code space")]
    PcOutOfRange(u32),

    /// A net does not hold the kind of functor an instruction requires.
    #[error("net {net} is not a {expected}")]
    WrongFunctor {
        /// Net index.
        net: u32,
        /// Functor kind the caller required.
        expected: &'static str,
    },

    /// Array index outside the array bounds on an internal path that assumes validity.
    #[error("array {array} has no word {index}")]
    ArrayIndex {
        /// Array index.
        array: u32,
        /// Requested word.
        index: u64,
    },
}

/// Reports an internal invariant violation and aborts.
///
/// The release profile builds with `panic = "abort"`, so this terminates the process
/// without unwinding. Debug and test builds unwind, which lets `#[should_panic]` tests
/// observe the violation.
#[cold]
#[track_caller]
pub fn fatal(err: Fatal) -> ! {
    tracing::error!(target: "vsim::fatal", "{err}");
    panic!("fatal: {err}");
}
