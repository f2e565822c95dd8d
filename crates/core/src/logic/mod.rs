//! Multi-state logic values and the algebra over them.
//!
//! This module provides:
//! 1. **Scalars:** [`Bit4`] and the strength-carrying [`Scalar`].
//! 2. **Vectors:** 4-state [`Vec4`], 2-state [`Vec2`] and strength-valued [`Vec8`].
//! 3. **Operators:** The [`alu`] submodules implementing arithmetic, logic, shifts and
//!    comparisons with 4-state semantics.
//! 4. **Literals:** Parsing of the textual constant encodings.

/// Vector operators.
pub mod alu;

/// Scalar 4-state values.
pub mod bit4;

/// Textual literal encodings.
pub mod literal;

/// 2-state vectors and the multi-word arithmetic kernels.
pub mod vec2;

/// 4-state vectors.
pub mod vec4;

/// Strength-valued scalars and vectors.
pub mod vec8;

pub use bit4::Bit4;
pub use vec2::Vec2;
pub use vec4::Vec4;
pub use vec8::{Scalar, Strength, Vec8};
