/// Operator dispatch.
///
/// Routes a binary operator to the module implementing it.
pub mod core;

/// Arithmetic on number-like values.
///
/// Implements `+ - * / %` for integers, floats and vectors, with checked
/// integer arithmetic.
pub mod arithmetic;

/// Collection operators.
///
/// Concatenation of strings, arrays and lists, dictionary merging, and the
/// in-place append used by `+=`.
pub mod collection;

/// Comparison operators.
///
/// Implements `== != < > <= >=` on unified operands.
pub mod comparison;

/// Boolean operators.
pub mod logic;
