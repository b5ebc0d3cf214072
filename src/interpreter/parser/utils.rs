use crate::{
    error::ParseError,
    interpreter::{lexer::Token, parser::core::ParseResult},
};

const fn opens(token: &Token) -> bool {
    matches!(token, Token::LParen | Token::LBracket)
}

const fn closes(token: &Token) -> bool {
    matches!(token, Token::RParen | Token::RBracket)
}

/// Finds the bracket that closes the one at `open`.
///
/// Parentheses and square brackets share one depth counter; the closing token
/// must match the kind of the opener.
///
/// # Parameters
/// - `tokens`: The token run of one statement.
/// - `open`: Index of a `(` or `[`.
///
/// # Returns
/// The index of the matching closer.
///
/// # Errors
/// - `UnexpectedToken` if the brackets are crossed (`(]`).
/// - `UnexpectedEndOfInput` if the run ends first.
pub fn find_closing(tokens: &[(Token, usize)], open: usize) -> ParseResult<usize> {
    let mut stack = Vec::new();

    for (index, (token, line)) in tokens.iter().enumerate().skip(open) {
        if opens(token) {
            stack.push(token);
        } else if closes(token) {
            let matched = match stack.pop() {
                Some(Token::LParen) => *token == Token::RParen,
                Some(Token::LBracket) => *token == Token::RBracket,
                _ => false,
            };
            if !matched {
                return Err(ParseError::UnexpectedToken { token: token.to_string(),
                                                         line:  *line, });
            }
            if stack.is_empty() {
                return Ok(index);
            }
        }
    }

    Err(ParseError::UnexpectedEndOfInput { line: tokens.last().map_or(0, |(_, l)| *l) })
}

/// Splits a token run on commas that are not nested in brackets.
///
/// An empty run yields no parts, so `f()` has no arguments. An empty part
/// between two commas is reported as an unexpected `,`.
pub fn split_top_level(tokens: &[(Token, usize)]) -> ParseResult<Vec<&[(Token, usize)]>> {
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    let mut parts = Vec::new();
    let mut depth = 0_usize;
    let mut start = 0;

    for (index, (token, line)) in tokens.iter().enumerate() {
        if opens(token) {
            depth += 1;
        } else if closes(token) {
            depth = depth.saturating_sub(1);
        } else if *token == Token::Comma && depth == 0 {
            if index == start {
                return Err(ParseError::UnexpectedToken { token: ",".to_string(),
                                                         line:  *line, });
            }
            parts.push(&tokens[start..index]);
            start = index + 1;
        }
    }

    if start == tokens.len() {
        let line = tokens.last().map_or(0, |(_, l)| *l);
        return Err(ParseError::UnexpectedToken { token: ",".to_string(),
                                                 line });
    }
    parts.push(&tokens[start..]);

    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(kinds: Vec<Token>) -> Vec<(Token, usize)> {
        kinds.into_iter().map(|t| (t, 1)).collect()
    }

    #[test]
    fn finds_matching_bracket_across_kinds() {
        let run = tokens(vec![Token::LParen,
                              Token::LBracket,
                              Token::Int(1),
                              Token::RBracket,
                              Token::RParen,
                              Token::Int(2)]);
        assert_eq!(find_closing(&run, 0), Ok(4));
        assert_eq!(find_closing(&run, 1), Ok(3));
    }

    #[test]
    fn crossed_brackets_are_rejected() {
        let run = tokens(vec![Token::LParen, Token::RBracket]);
        assert!(matches!(find_closing(&run, 0), Err(ParseError::UnexpectedToken { .. })));
    }

    #[test]
    fn splits_only_at_depth_zero() {
        let run = tokens(vec![Token::Int(1),
                              Token::Comma,
                              Token::LParen,
                              Token::Int(2),
                              Token::Comma,
                              Token::Int(3),
                              Token::RParen]);
        let parts = split_top_level(&run).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1].len(), 5);
    }

    #[test]
    fn trailing_comma_is_an_error() {
        let run = tokens(vec![Token::Int(1), Token::Comma]);
        assert!(split_top_level(&run).is_err());
        assert!(split_top_level(&[]).unwrap().is_empty());
    }
}
