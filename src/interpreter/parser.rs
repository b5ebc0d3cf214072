/// Shared parser types.
///
/// Declares the result alias used by the tokenizer, the expression builder
/// and the statement parser.
pub mod core;

/// Expression building.
///
/// Turns the token run of a single statement into an expression tree. Binary
/// operators are placed by rotating them into the existing tree according to
/// their precedence class.
pub mod builder;

/// Statement parsing.
///
/// A state machine fed one token at a time. It recognizes keyword headers,
/// tracks nested braces and hands completed statements out as soon as they
/// end.
pub mod statement;

/// Utility functions for the parser.
///
/// Bracket matching and top-level comma splitting shared by the builder.
pub mod utils;
