//! # sable
//!
//! sable is an embeddable, dynamically typed scripting language written in
//! Rust. Source is tokenized, parsed incrementally one token at a time and
//! evaluated against a tree of lexical scopes. Values convert implicitly
//! along a fixed rank order, and the language has closures, classes,
//! dictionaries and typed arrays.
//!
//! Host programs drive an [`Interpreter`]: they register native functions
//! and privilege-checked [`Module`]s, submit source a line at a time or as a
//! whole script, and read variables back.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

/// Defines the structure of parsed code.
///
/// This module declares the `Expression` enum and the operator and
/// precedence types the expression builder works with. Statements are
/// expressions too; a script is a sequence of expression trees.
///
/// # Responsibilities
/// - Defines node types for all language constructs.
/// - Attaches source lines to nodes for error reporting.
/// - Derives operator precedence from function names.
pub mod ast;
/// Interpreter settings.
pub mod config;
/// Provides unified error types for parsing and evaluation.
///
/// This module defines all errors that can be raised while tokenizing,
/// parsing or evaluating code. Every message names the source line it was
/// raised on.
///
/// # Responsibilities
/// - Defines error enums for all failure modes (lexer, parser, evaluator).
/// - Wraps them in the single `Error` type returned by the embedding API.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, evaluation, value
/// representations and scopes, and exposes the embedding API.
///
/// # Responsibilities
/// - Coordinates all core components: lexer, parser, evaluator, and value
///   types.
/// - Provides entry points for submitting and evaluating source.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;
/// General utilities for safe numeric conversion and helpers.
///
/// # Responsibilities
/// - Safely convert between `i64`, `usize`, and `f64` without silent data
///   loss.
/// - Grow the stack on demand for deeply nested evaluation.
pub mod util;

pub use config::Config;
pub use error::Error;
pub use interpreter::{
    Interpreter,
    module::{Module, Privileges},
    value::core::Value,
};

/// Evaluates a script in a fresh interpreter and returns the value of its
/// last statement.
///
/// # Errors
/// Returns an error if tokenizing, parsing or evaluation fails.
///
/// # Examples
/// ```
/// use sable::{Value, run};
///
/// // Simple expression: the result will be calculated and no error should occur.
/// let result = run("var x = 2 + 2; x * 10;").unwrap();
/// assert_eq!(result, Value::Int(40));
///
/// // Example with an intentional error (unknown function).
/// assert!(run("var y = missing(1);").is_err());
/// ```
pub fn run(source: &str) -> Result<Value, Error> {
    Interpreter::with_config(Config::default().with_echo_errors(false)).run_script(source)
}
