use std::fmt;

use logos::Logos;

use crate::{error::ParseError, interpreter::parser::core::ParseResult};

/// Represents a lexical token in the source input.
/// A token is a minimal but meaningful unit of text produced by the lexer.
/// This enum defines all recognized tokens in the language.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(extras = LexerExtras)]
pub enum Token {
    /// Float literal tokens, such as `3.14`, `.5`, `2.0` or `2.1e-10`.
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", parse_float)]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", parse_float)]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", parse_float)]
    Float(f64),
    /// Integer literal tokens, such as `42`.
    #[regex(r"[0-9]+", parse_integer)]
    Int(i64),
    /// String literal tokens, such as `"fish \"tacos\""`. Escapes are resolved.
    #[regex(r#""([^"\\\n]|\\.)*""#, parse_string)]
    Str(String),
    /// Boolean literal tokens, such as `true`.
    #[token("true", parse_bool)]
    #[token("false", parse_bool)]
    Bool(bool),
    /// `null`
    #[token("null")]
    Null,
    /// `func`
    #[token("func")]
    Func,
    /// `var`
    #[token("var")]
    Var,
    /// `if`
    #[token("if")]
    If,
    /// `else`
    #[token("else")]
    Else,
    /// `for`
    #[token("for")]
    For,
    /// `while`
    #[token("while")]
    While,
    /// `foreach`
    #[token("foreach")]
    ForEach,
    /// `class`
    #[token("class")]
    Class,
    /// `return`
    #[token("return")]
    Return,
    /// `import`
    #[token("import")]
    Import,
    /// Identifier tokens; variable or function names such as `x` or `square`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),
    /// `// Comments.`
    #[regex(r"//[^\n]*", logos::skip, allow_greedy = true)]
    Comment,
    /// Operators. Only the two character operators the language defines are
    /// merged, so `a=-1` is `=` followed by `-1`.
    #[regex(r"==|!=|<=|>=|&&|\|\||\+\+|--|\+=|-=|\*=|/=|[-+*/%<>=!]",
            |lex| lex.slice().to_string())]
    Operator(String),
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `,`
    #[token(",")]
    Comma,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `.`
    #[token(".")]
    Dot,
    /// Line breaks only advance the line counter.
    #[token("\n", |lex| {
        lex.extras.line += 1;
        logos::Skip
    })]
    NewLine,
    /// Spaces, tabs and feeds.
    #[regex(r"[ \t\r\f]+", logos::skip)]
    Ignored,
}

impl Token {
    /// Returns `true` for the operator token `op`.
    #[must_use]
    pub fn is_operator(&self, op: &str) -> bool {
        matches!(self, Self::Operator(o) if o == op)
    }

    /// Returns `true` for tokens that are a complete value on their own.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self,
                 Self::Int(_) | Self::Float(_) | Self::Str(_) | Self::Bool(_) | Self::Null)
    }

    /// A `-` directly in front of a number is part of the number when the
    /// previous token cannot end an operand.
    const fn starts_operand_context(previous: Option<&Self>) -> bool {
        matches!(previous,
                 None | Some(Self::Operator(_)
                             | Self::LParen
                             | Self::LBracket
                             | Self::LBrace
                             | Self::RBrace
                             | Self::Comma
                             | Self::Semicolon
                             | Self::Return))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => f.write_str("null"),
            Self::Func => f.write_str("func"),
            Self::Var => f.write_str("var"),
            Self::If => f.write_str("if"),
            Self::Else => f.write_str("else"),
            Self::For => f.write_str("for"),
            Self::While => f.write_str("while"),
            Self::ForEach => f.write_str("foreach"),
            Self::Class => f.write_str("class"),
            Self::Return => f.write_str("return"),
            Self::Import => f.write_str("import"),
            Self::Identifier(name) | Self::Operator(name) => f.write_str(name),
            Self::Comment => f.write_str("//"),
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
            Self::LBracket => f.write_str("["),
            Self::RBracket => f.write_str("]"),
            Self::LBrace => f.write_str("{"),
            Self::RBrace => f.write_str("}"),
            Self::Comma => f.write_str(","),
            Self::Semicolon => f.write_str(";"),
            Self::Dot => f.write_str("."),
            Self::NewLine => f.write_str("newline"),
            Self::Ignored => f.write_str("whitespace"),
        }
    }
}

/// Additional information carried by the lexer during tokenization.
///
/// Tracks the current line number for error reporting and diagnostics.
#[derive(Default)]
pub struct LexerExtras {
    /// The current line number in the source being tokenized.
    pub line: usize,
}

/// Splits source text into tokens tagged with their line.
///
/// `first_line` is the line number of the first line of `source`, so text
/// submitted a line at a time keeps counting across calls.
///
/// # Errors
/// - `UnterminatedString` for a `"` without a closing quote on its line.
/// - `LiteralTooLarge` for an integer that does not fit in 64 bits.
/// - `UnexpectedToken` for any other character the language does not use.
///
/// # Example
/// ```
/// use sable::interpreter::lexer::{Token, tokenize};
///
/// let tokens = tokenize("a-1; f(-1)", 1).unwrap();
/// let kinds: Vec<Token> = tokens.into_iter().map(|(t, _)| t).collect();
///
/// assert_eq!(kinds[1], Token::Operator("-".into()));
/// assert_eq!(kinds[2], Token::Int(1));
/// assert_eq!(kinds[6], Token::Int(-1));
/// ```
pub fn tokenize(source: &str, first_line: usize) -> ParseResult<Vec<(Token, usize)>> {
    let mut lexer = Token::lexer_with_extras(source, LexerExtras { line: first_line });
    let mut raw: Vec<(Token, usize, std::ops::Range<usize>)> = Vec::new();

    while let Some(token) = lexer.next() {
        let line = lexer.extras.line;
        match token {
            Ok(token) => raw.push((token, line, lexer.span())),
            Err(()) => {
                let slice = lexer.slice();
                if fold_most_negative_literal(&mut raw, slice, lexer.span(), line) {
                    continue;
                }
                return Err(if slice.starts_with('"') {
                               ParseError::UnterminatedString { line }
                           } else if slice.bytes().all(|b| b.is_ascii_digit()) {
                               ParseError::LiteralTooLarge { line }
                           } else {
                               ParseError::UnexpectedToken { token: slice.to_string(),
                                                             line }
                           });
            },
        }
    }

    Ok(fold_negative_literals(raw))
}

/// Merges a `-` with the number right after it when the minus cannot be a
/// binary operator.
fn fold_negative_literals(raw: Vec<(Token, usize, std::ops::Range<usize>)>)
                          -> Vec<(Token, usize)> {
    let mut tokens: Vec<(Token, usize)> = Vec::with_capacity(raw.len());
    let mut iter = raw.into_iter().peekable();

    while let Some((token, line, span)) = iter.next() {
        if token.is_operator("-")
           && Token::starts_operand_context(tokens.last().map(|(t, _)| t))
           && let Some((next, _, next_span)) = iter.peek()
           && next_span.start == span.end
        {
            let folded = match next {
                Token::Int(i) => Some(Token::Int(-i)),
                Token::Float(x) => Some(Token::Float(-x)),
                _ => None,
            };
            if let Some(folded) = folded {
                iter.next();
                tokens.push((folded, line));
                continue;
            }
        }
        tokens.push((token, line));
    }

    tokens
}

/// Handles `-9223372036854775808`, whose digits overflow an `i64` until the
/// minus is applied.
///
/// Replaces the `-` at the end of `raw` by the negative literal when the
/// minus directly precedes `digits` in operand position.
fn fold_most_negative_literal(raw: &mut Vec<(Token, usize, std::ops::Range<usize>)>,
                              digits: &str,
                              span: std::ops::Range<usize>,
                              line: usize)
                              -> bool {
    let Some((minus, _, minus_span)) = raw.last() else {
        return false;
    };
    let before = raw.len().checked_sub(2).map(|i| &raw[i].0);
    if !minus.is_operator("-")
       || minus_span.end != span.start
       || !Token::starts_operand_context(before)
       || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return false;
    }
    let Ok(value) = format!("-{digits}").parse::<i64>() else {
        return false;
    };
    let start = minus_span.start;
    raw.pop();
    raw.push((Token::Int(value), line, start..span.end));
    true
}

/// Parses a floating-point literal from the current token slice.
///
/// # Parameters
/// - `lex`: Reference to the Logos lexer at the current token.
///
/// # Returns
/// - `Some(f64)`: The parsed floating-point value if successful.
/// - `None`: If the token slice is not a valid float.
fn parse_float(lex: &logos::Lexer<Token>) -> Option<f64> {
    lex.slice().parse().ok()
}

/// Parses an integer literal from the current token slice.
///
/// Returns `None` when the literal does not fit in an `i64`.
fn parse_integer(lex: &logos::Lexer<Token>) -> Option<i64> {
    lex.slice().parse().ok()
}

/// Strips the quotes of a string literal and resolves its escapes.
///
/// `\"`, `\\`, `\n`, `\t` and `\r` are recognized; any other escaped
/// character stands for itself.
fn parse_string(lex: &logos::Lexer<Token>) -> String {
    let slice = lex.slice();
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {},
        }
    }
    out
}

/// Parses a boolean literal from the current token slice (`true` or `false`).
fn parse_bool(lex: &logos::Lexer<Token>) -> Option<bool> {
    match lex.slice() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source, 1).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn merges_only_known_two_character_operators() {
        assert_eq!(kinds("a += 1"),
                   vec![Token::Identifier("a".into()), Token::Operator("+=".into()), Token::Int(1)]);
        assert_eq!(kinds("a=-1"),
                   vec![Token::Identifier("a".into()), Token::Operator("=".into()), Token::Int(-1)]);
    }

    #[test]
    fn minus_after_operand_stays_binary() {
        assert_eq!(kinds("a-1"),
                   vec![Token::Identifier("a".into()), Token::Operator("-".into()), Token::Int(1)]);
        assert_eq!(kinds("(-1.5)"), vec![Token::LParen, Token::Float(-1.5), Token::RParen]);
        assert_eq!(kinds("x - 1"),
                   vec![Token::Identifier("x".into()), Token::Operator("-".into()), Token::Int(1)]);
    }

    #[test]
    fn most_negative_integer_is_a_literal() {
        assert_eq!(kinds("x = -9223372036854775808;"),
                   vec![Token::Identifier("x".into()),
                        Token::Operator("=".into()),
                        Token::Int(i64::MIN),
                        Token::Semicolon]);
        assert_eq!(tokenize("9223372036854775808", 2), Err(ParseError::LiteralTooLarge { line: 2 }));
        assert_eq!(tokenize("a -9223372036854775808", 1),
                   Err(ParseError::LiteralTooLarge { line: 1 }));
        assert_eq!(tokenize("-99999999999999999999", 1),
                   Err(ParseError::LiteralTooLarge { line: 1 }));
    }

    #[test]
    fn dot_before_digit_is_a_number() {
        assert_eq!(kinds(".5"), vec![Token::Float(0.5)]);
        assert_eq!(kinds("p.x"),
                   vec![Token::Identifier("p".into()), Token::Dot, Token::Identifier("x".into())]);
    }

    #[test]
    fn strings_resolve_escapes() {
        assert_eq!(kinds(r#""fish \"tacos\"\n""#), vec![Token::Str("fish \"tacos\"\n".into())]);
    }

    #[test]
    fn comments_truncate_the_line_and_lines_are_counted() {
        let tokens = tokenize("a; // b c\nd;", 4).unwrap();
        assert_eq!(tokens,
                   vec![(Token::Identifier("a".into()), 4),
                        (Token::Semicolon, 4),
                        (Token::Identifier("d".into()), 5),
                        (Token::Semicolon, 5),]);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert_eq!(tokenize("x = \"open", 3), Err(ParseError::UnterminatedString { line: 3 }));
    }

    #[test]
    fn keywords_are_not_identifiers() {
        assert_eq!(kinds("foreach forest"),
                   vec![Token::ForEach, Token::Identifier("forest".into())]);
    }
}
