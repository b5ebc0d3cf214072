/// The evaluator consolidates expression trees into values.
///
/// It resolves names against the scope chain, dispatches calls to
/// interpreted and native functions, performs the operator semantics of the
/// value lattice and runs the control flow constructs.
///
/// # Responsibilities
/// - Holds the interpreter state: global and current scope, the pending
///   parser and the last error.
/// - Evaluates calls, assignments, loops, conditionals, classes and imports.
/// - Reports runtime errors such as unknown functions or invalid conversions.
pub mod evaluator;
/// The embedding API.
///
/// Everything a host program needs: registering native functions and
/// modules, submitting source a line at a time or as a whole script, and
/// reading variables back.
pub mod embed;
/// The lexer module tokenizes source code for further parsing.
///
/// The lexer reads the raw source text and produces a stream of tokens, each
/// tagged with the line it was read on: literals, identifiers, keywords,
/// operators and punctuation.
///
/// # Responsibilities
/// - Converts the input character stream into `(Token, line)` pairs.
/// - Resolves string escapes and folds negative numeric literals.
/// - Reports lexical errors for invalid or malformed input.
pub mod lexer;
/// Privilege-gated groups of native functions.
pub mod module;
/// The parser module builds expression trees from tokens.
///
/// The statement parser is a state machine fed one token at a time; each
/// completed statement is handed to the expression builder, which places
/// operators by precedence.
///
/// # Responsibilities
/// - Recognizes keyword constructs and brace nesting.
/// - Builds operator trees, call chains and list literals.
/// - Reports syntax errors with the offending line.
pub mod parser;
/// Lexical scopes.
///
/// Scopes form a tree through parent links and hold variables, functions and
/// named sub-scopes (class templates).
pub mod scope;
/// The value module defines the runtime data types for evaluation.
///
/// This module declares the dynamically typed `Value` and the types it
/// carries: vectors, typed arrays, lists, dictionaries, functions and class
/// instances. It also implements the conversion lattice between them.
///
/// # Responsibilities
/// - Defines the `Value` enum and the rank order of its types.
/// - Implements widening and narrowing conversions.
/// - Provides shared, in-place mutable collection storage.
pub mod value;

pub use evaluator::core::Interpreter;
