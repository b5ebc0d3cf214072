/// Core evaluation logic.
///
/// Holds the interpreter state and the consolidation of expression trees,
/// including scope management and name resolution.
pub mod core;

/// Assignment evaluation.
///
/// Evaluates the left side of `=`, `+=`, `++` and friends as a place and
/// writes through it.
pub mod assign;

/// Unary operator evaluation.
///
/// Handles negation and logical NOT.
pub mod unary;

/// Binary operator evaluation.
///
/// Implements arithmetic, concatenation, comparisons and boolean operators
/// on unified operands.
pub mod binary;

/// Loop evaluation.
///
/// Runs `for`, `while` and `foreach` loops.
pub mod for_loop;

/// Conditional evaluation.
pub mod conditional;

/// Function calls and definitions.
///
/// Dispatches calls to interpreted and native functions, defines functions
/// and classes, and provides the builtin function table.
pub mod function;

/// Script imports.
pub mod import;
