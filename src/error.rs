/// Parsing errors.
///
/// Defines all error types that can occur while tokenizing source text or
/// while the statement parser and expression builder assemble it into an
/// expression tree. Parse errors include malformed tokens, missing separators
/// and misplaced keywords.
pub mod parse_error;
/// Runtime errors.
///
/// Contains all error types that can be raised while an expression tree is
/// consolidated: unresolved calls, disallowed conversions, out-of-bounds
/// indexing and incompatible comparisons.
pub mod runtime_error;

pub use parse_error::ParseError;
pub use runtime_error::RuntimeError;

/// The single error family surfaced by the embedding API.
///
/// Every failure, whether it happened in the tokenizer, the parser or the
/// evaluator, is reported through this type. Variants are distinguished only
/// by the message they carry; each message names the offending source line.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A tokenizer or parser failure.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A failure during evaluation.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    /// A script file could not be read.
    #[error("Error reading '{}': {source}", path.display())]
    Io {
        /// The file that was requested.
        path:   std::path::PathBuf,
        /// The underlying I/O failure.
        source: std::io::Error,
    },
}

impl Error {
    /// Returns the source line the error was raised on.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::Parse(e) => e.line(),
            Self::Runtime(e) => e.line(),
            Self::Io { .. } => 0,
        }
    }
}
