/// Scalar truth tables.
pub mod bit4;

/// Vector construction, slicing and conversion.
pub mod vec4;

/// Arithmetic, logic, shift and comparison operators.
pub mod alu;

/// Strength scalars and resolution.
pub mod vec8;

/// Literal parsing and the real encoding.
pub mod literal;
