//! # VM Tests
//!
//! Tests for the code builder and the opcode families, run through complete programs on a
//! started simulator.




/// Real stack and conversions.
pub mod real;



/// Non-blocking, continuous and forced assignment from code.
pub mod assign;
