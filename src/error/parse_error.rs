#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
/// Represents all errors that can occur during tokenizing or parsing.
pub enum ParseError {
    /// Found an unexpected token while parsing.
    #[error("Error on line {line}: Unexpected token: {token}.")]
    UnexpectedToken {
        /// The token encountered.
        token: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// Reached the end of input while a construct was still open.
    #[error("Error on line {line}: Unexpected end of input.")]
    UnexpectedEndOfInput {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A quoted string was never closed.
    #[error("Error on line {line}: Unterminated string literal.")]
    UnterminatedString {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Two values followed each other without an operator between them.
    #[error("Error on line {line}: Unexpected value '{token}', possible missing ','.")]
    MissingSeparator {
        /// The value that should have been preceded by a separator.
        token: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// An `else` appeared without an open `if` to attach to.
    #[error("Error on line {line}: 'else' without a preceding 'if'.")]
    DanglingElse {
        /// The source line where the error occurred.
        line: usize,
    },
    /// `else` was followed by something other than `if` or `{`.
    #[error("Error on line {line}: Expected 'if' or '{{' after 'else', found {token}.")]
    ExpectedAfterElse {
        /// The token that followed `else`.
        token: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// A loop header had the wrong number of `;`-separated clauses.
    #[error("Error on line {line}: '{construct}' expects {expected} clauses but found {found}.")]
    ClauseCount {
        /// The construct keyword (`for`, `while`, `foreach`).
        construct: &'static str,
        /// Human readable expected count.
        expected:  &'static str,
        /// The number of clauses actually found.
        found:     usize,
        /// The source line where the error occurred.
        line:      usize,
    },
    /// A `}` appeared with no open scope to close.
    #[error("Error on line {line}: Unbalanced '}}'.")]
    UnbalancedBrace {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A numeric literal did not fit its representation.
    #[error("Error on line {line}: Literal is too large.")]
    LiteralTooLarge {
        /// The source line where the error occurred.
        line: usize,
    },
}

impl ParseError {
    /// Returns the source line the error was raised on.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::UnexpectedToken { line, .. }
            | Self::UnexpectedEndOfInput { line }
            | Self::UnterminatedString { line }
            | Self::MissingSeparator { line, .. }
            | Self::DanglingElse { line }
            | Self::ExpectedAfterElse { line, .. }
            | Self::ClauseCount { line, .. }
            | Self::UnbalancedBrace { line }
            | Self::LiteralTooLarge { line } => *line,
        }
    }
}
