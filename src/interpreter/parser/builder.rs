use tracing::trace;

use crate::{
    ast::{AssignOperator, BinaryOperator, Expression, Precedence},
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::{
            core::ParseResult,
            utils::{find_closing, split_top_level},
        },
        value::{array::Array, core::Value},
    },
};

/// Builds the expression tree of one statement.
///
/// The tokens are consumed left to right in a single pass. Operands (literals,
/// names, calls, groups and list literals, each with their postfix chain) are
/// parsed eagerly; every binary operator is then rotated into the tree built
/// so far with [`insert_operator`].
///
/// # Parameters
/// - `tokens`: The token run of one statement, without its terminator.
///
/// # Returns
/// The root of the expression tree.
///
/// # Errors
/// - `UnexpectedEndOfInput` if an operand is missing.
/// - `MissingSeparator` if two operands follow each other.
/// - `UnexpectedToken` for anything that cannot start or continue an
///   expression.
///
/// # Example
/// ```
/// use sable::{
///     ast::{Expression, Precedence},
///     interpreter::{lexer::tokenize, parser::builder::build_expression},
/// };
///
/// let tokens = tokenize("a = 1 + 2 * 3", 1).unwrap();
/// let tree = build_expression(&tokens).unwrap();
///
/// assert_eq!(tree.callee_name(), Some("="));
/// let Expression::FunctionCall { arguments, precedence, .. } = tree else { unreachable!() };
/// assert_eq!(precedence, Precedence::Assign);
/// assert_eq!(arguments[1].callee_name(), Some("+"));
/// ```
pub fn build_expression(tokens: &[(Token, usize)]) -> ParseResult<Expression> {
    let mut builder = ExpressionBuilder { tokens, pos: 0 };
    let tree = builder.build()?;
    trace!(line = tree.line(), "built expression");
    Ok(tree)
}

/// Places the binary operator `op` with right operand `operand` into `tree`.
///
/// While the node under inspection is a call that binds looser than `op`, the
/// operator descends into that call's last argument. Assignment operators
/// also descend into each other, which makes them right associative. Where
/// the descent stops, the reached subtree becomes the left operand of a new
/// call to `op`.
#[must_use]
pub fn insert_operator(tree: Expression, op: &str, operand: Expression, line: usize) -> Expression {
    let incoming = Precedence::of(op);

    match tree {
        Expression::FunctionCall { callee,
                                   mut arguments,
                                   precedence,
                                   line: call_line, }
            if rotates_into(precedence, incoming) && !arguments.is_empty() =>
        {
            if let Some(last) = arguments.pop() {
                arguments.push(insert_operator(last, op, operand, line));
            }
            Expression::FunctionCall { callee,
                                       arguments,
                                       precedence,
                                       line: call_line }
        },
        tree => Expression::call(op, vec![tree, operand], incoming, line),
    }
}

fn rotates_into(existing: Precedence, incoming: Precedence) -> bool {
    existing < incoming || (existing == Precedence::Assign && incoming == Precedence::Assign)
}

fn is_binary_operator(op: &str) -> bool {
    BinaryOperator::from_symbol(op).is_some()
    || AssignOperator::from_symbol(op).is_some_and(|a| {
                                           !matches!(a,
                                                     AssignOperator::Increment
                                                     | AssignOperator::Decrement)
                                       })
}

fn is_prefix_operator(op: &str) -> bool {
    matches!(op, "-" | "!" | "++" | "--")
}

fn starts_operand(token: &Token) -> bool {
    match token {
        Token::Operator(op) => is_prefix_operator(op),
        Token::Identifier(_) | Token::Var | Token::LParen | Token::LBracket => true,
        other => other.is_literal(),
    }
}

/// Collapses constant list elements of one scalar type into a typed array.
///
/// Returns `None` when the elements are not all constants, do not share one
/// type, or have a type arrays cannot hold.
#[must_use]
pub fn collapse_homogeneous(elements: &[Expression]) -> Option<Value> {
    let mut values = Vec::with_capacity(elements.len());
    for element in elements {
        match element {
            Expression::Value { value, .. } => values.push(value.clone()),
            _ => return None,
        }
    }

    let element_type = values.first()?.value_type();
    if !element_type.is_array_element() || values.iter().any(|v| v.value_type() != element_type) {
        return None;
    }

    Array::from_values(&values, 0).ok().map(Value::from)
}

struct ExpressionBuilder<'a> {
    tokens: &'a [(Token, usize)],
    pos:    usize,
}

impl<'a> ExpressionBuilder<'a> {
    fn build(&mut self) -> ParseResult<Expression> {
        let mut root = self.operand()?;

        while let Some((token, line)) = self.peek() {
            match token {
                Token::Operator(op) if is_binary_operator(op) => {
                    self.pos += 1;
                    let operand = self.operand()?;
                    root = insert_operator(root, op, operand, line);
                },
                token if starts_operand(token) => {
                    return Err(ParseError::MissingSeparator { token: token.to_string(),
                                                              line });
                },
                token => {
                    return Err(ParseError::UnexpectedToken { token: token.to_string(),
                                                             line });
                },
            }
        }

        Ok(root)
    }

    fn peek(&self) -> Option<(&'a Token, usize)> {
        self.tokens.get(self.pos).map(|(t, l)| (t, *l))
    }

    fn next(&mut self) -> Option<(&'a Token, usize)> {
        let item = self.peek();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn last_line(&self) -> usize {
        self.tokens.last().map_or(0, |(_, l)| *l)
    }

    fn operand(&mut self) -> ParseResult<Expression> {
        let Some((token, line)) = self.next() else {
            return Err(ParseError::UnexpectedEndOfInput { line: self.last_line() });
        };

        match token {
            Token::Operator(op) if is_prefix_operator(op) => {
                let inner = self.operand()?;
                Ok(prefix(op, inner, line))
            },
            token => {
                let atom = self.atom(token, line)?;
                self.postfix(atom)
            },
        }
    }

    fn atom(&mut self, token: &Token, line: usize) -> ParseResult<Expression> {
        let value = match token {
            Token::Int(i) => Value::Int(*i),
            Token::Float(x) => Value::Float(*x),
            Token::Str(s) => Value::String(s.clone()),
            Token::Bool(b) => Value::from(*b),
            Token::Null => Value::Null,
            Token::Var => {
                return match self.next() {
                    Some((Token::Identifier(name), _)) => {
                        Ok(Expression::DefineVar { name: name.clone(),
                                                   initializer: None,
                                                   line })
                    },
                    Some((other, line)) => Err(ParseError::UnexpectedToken { token: other.to_string(),
                                                                             line }),
                    None => Err(ParseError::UnexpectedEndOfInput { line }),
                };
            },
            Token::Identifier(name) => {
                if matches!(self.peek(), Some((Token::LParen, _))) {
                    let arguments = self.arguments()?;
                    return Ok(Expression::call(name, arguments, Precedence::Func, line));
                }
                return Ok(Expression::ResolveVar { name: name.clone(),
                                                   line });
            },
            Token::LParen => {
                let inner = self.group()?;
                let mut tree = build_expression(inner)?;
                if let Expression::FunctionCall { precedence, .. } = &mut tree {
                    *precedence = Precedence::Func;
                }
                return Ok(tree);
            },
            Token::LBracket => {
                let inner = self.group()?;
                let elements = split_top_level(inner)?.into_iter()
                                                      .map(build_expression)
                                                      .collect::<ParseResult<Vec<_>>>()?;
                return Ok(match collapse_homogeneous(&elements) {
                    Some(value) => Expression::Value { value, line },
                    None => Expression::List { elements, line },
                });
            },
            other => {
                return Err(ParseError::UnexpectedToken { token: other.to_string(),
                                                         line });
            },
        };

        Ok(Expression::Value { value, line })
    }

    /// Consumes a bracketed group whose opener was just read and returns the
    /// tokens between the brackets.
    fn group(&mut self) -> ParseResult<&'a [(Token, usize)]> {
        let open = self.pos - 1;
        let close = find_closing(self.tokens, open)?;
        self.pos = close + 1;
        Ok(&self.tokens[open + 1..close])
    }

    /// Parses `( a, b, ... )` starting at the opening parenthesis.
    fn arguments(&mut self) -> ParseResult<Vec<Expression>> {
        self.pos += 1;
        let inner = self.group()?;
        split_top_level(inner)?.into_iter().map(build_expression).collect()
    }

    fn postfix(&mut self, mut expr: Expression) -> ParseResult<Expression> {
        while let Some((token, line)) = self.peek() {
            expr = match token {
                Token::LParen => {
                    let mut arguments = vec![expr];
                    arguments.extend(self.arguments()?);
                    Expression::call("applyfunction", arguments, Precedence::Func, line)
                },
                Token::LBracket => {
                    self.pos += 1;
                    let inner = self.group()?;
                    let index = build_expression(inner)?;
                    Expression::call("listindex", vec![expr, index], Precedence::Func, line)
                },
                Token::Dot => {
                    self.pos += 1;
                    let name = match self.next() {
                        Some((Token::Identifier(name), _)) => name.clone(),
                        Some((other, line)) => {
                            return Err(ParseError::UnexpectedToken { token: other.to_string(),
                                                                     line });
                        },
                        None => return Err(ParseError::UnexpectedEndOfInput { line }),
                    };
                    let member = Expression::Value { value: Value::String(name),
                                                     line };
                    if matches!(self.peek(), Some((Token::LParen, _))) {
                        let mut arguments = vec![member, expr];
                        arguments.extend(self.arguments()?);
                        Expression::call("applyfunction", arguments, Precedence::Func, line)
                    } else {
                        Expression::call("listindex", vec![expr, member], Precedence::Func, line)
                    }
                },
                Token::Operator(op) if op == "++" || op == "--" => {
                    self.pos += 1;
                    Expression::call(op, vec![expr], Precedence::Func, line)
                },
                _ => break,
            };
        }

        Ok(expr)
    }
}

fn prefix(op: &str, inner: Expression, line: usize) -> Expression {
    if op == "-"
       && let Expression::Value { value, line: value_line } = &inner
    {
        let negated = match value {
            Value::Int(i) => i.checked_neg().map(Value::Int),
            Value::Float(x) => Some(Value::Float(-x)),
            _ => None,
        };
        if let Some(value) = negated {
            return Expression::Value { value,
                                       line: *value_line };
        }
    }

    Expression::call(op, vec![inner], Precedence::Func, line)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::lexer::tokenize;

    fn build(source: &str) -> ParseResult<Expression> {
        build_expression(&tokenize(source, 1)?)
    }

    fn arguments(tree: &Expression) -> &[Expression] {
        match tree {
            Expression::FunctionCall { arguments, .. } => arguments,
            other => panic!("expected a call, got {other:?}"),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let tree = build("1 + 2 * 3").unwrap();
        assert_eq!(tree.callee_name(), Some("+"));
        assert_eq!(arguments(&tree)[1].callee_name(), Some("*"));

        let tree = build("1 * 2 + 3").unwrap();
        assert_eq!(tree.callee_name(), Some("+"));
        assert_eq!(arguments(&tree)[0].callee_name(), Some("*"));
    }

    #[test]
    fn equal_precedence_is_left_associative() {
        let tree = build("1 - 2 - 3").unwrap();
        assert_eq!(tree.callee_name(), Some("-"));
        assert_eq!(arguments(&tree)[0].callee_name(), Some("-"));
    }

    #[test]
    fn assignment_is_right_associative() {
        let tree = build("a = b = 3").unwrap();
        assert_eq!(tree.callee_name(), Some("="));
        assert_eq!(arguments(&tree)[1].callee_name(), Some("="));
    }

    #[test]
    fn parenthesised_groups_are_not_split() {
        let tree = build("(1 + 2) * 3").unwrap();
        assert_eq!(tree.callee_name(), Some("*"));
        assert_eq!(arguments(&tree)[0].callee_name(), Some("+"));
    }

    #[test]
    fn homogeneous_literals_collapse_to_arrays() {
        let tree = build("[1, 2, 3]").unwrap();
        let Expression::Value { value: Value::Array(array), .. } = tree else {
            panic!("expected an array constant");
        };
        assert_eq!(array.read().len(), 3);

        assert!(matches!(build("[1, \"a\"]").unwrap(), Expression::List { .. }));
        assert!(matches!(build("[]").unwrap(), Expression::List { .. }));
        assert!(matches!(build("[x, 1]").unwrap(), Expression::List { .. }));
    }

    #[test]
    fn member_calls_become_applyfunction() {
        let tree = build("p.move(1, 2)").unwrap();
        assert_eq!(tree.callee_name(), Some("applyfunction"));
        let args = arguments(&tree);
        assert_eq!(args.len(), 4);
        assert_eq!(args[0],
                   Expression::Value { value: Value::from("move"),
                                       line:  1, });

        let tree = build("p.x").unwrap();
        assert_eq!(tree.callee_name(), Some("listindex"));
    }

    #[test]
    fn postfix_chains_nest_left_to_right() {
        let tree = build("a[1][2]").unwrap();
        assert_eq!(tree.callee_name(), Some("listindex"));
        assert_eq!(arguments(&tree)[0].callee_name(), Some("listindex"));
    }

    #[test]
    fn negative_literals_fold() {
        assert_eq!(build("-(5)").unwrap(),
                   Expression::Value { value: Value::Int(-5),
                                       line:  1, });
        assert_eq!(build("-x").unwrap().callee_name(), Some("-"));
    }

    #[test]
    fn adjacent_operands_report_missing_separator() {
        assert!(matches!(build("f(1 2)"), Err(ParseError::MissingSeparator { .. })));
        assert!(matches!(build("1 +"), Err(ParseError::UnexpectedEndOfInput { .. })));
    }

    #[test]
    fn var_definitions_nest_inside_expressions() {
        let tree = build("var x += 2").unwrap();
        assert_eq!(tree.callee_name(), Some("+="));
        assert!(matches!(arguments(&tree)[0], Expression::DefineVar { .. }));
    }
}
