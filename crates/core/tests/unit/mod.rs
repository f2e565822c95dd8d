//! # Unit Components
//!
//! This module is the hub for the unit tests of every layer of the simulation core,
//! from the 4-state value algebra up to the simulator run loop.

/// Unit tests for shared types: errors, handles and simulated time.
pub mod common;


/// Unit tests for the 4-state value algebra.
///
/// This module aggregates tests for:
/// - Vector construction, slicing and conversion.
/// - Arithmetic, logic, shift and comparison operators.
/// - Literal parsing.
pub mod logic;



/// Unit tests for the event queue and end-to-end simulator runs.
pub mod sim;


/// Unit tests for the bytecode VM.
///
/// This module organizes tests for the code builder, opcode families, thread
/// lifecycle and foreign calls.
pub mod vm;
