use crate::error::ParseError;

/// Result type used by the tokenizer and the parsers.
pub type ParseResult<T> = Result<T, ParseError>;
