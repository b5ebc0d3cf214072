use std::cmp::Ordering;

use crate::{
    ast::BinaryOperator,
    error::RuntimeError,
    interpreter::{evaluator::core::EvalResult, value::core::Value},
};

/// Maps an operator and the ordering of its operands to the boolean result.
///
/// `None` means the operands are unordered (NaN, or values that only
/// support equality); only `!=` holds for them.
#[must_use]
pub fn ordering_result(op: BinaryOperator, ordering: Option<Ordering>) -> bool {
    match op {
        BinaryOperator::Equal => ordering == Some(Ordering::Equal),
        BinaryOperator::NotEqual => ordering != Some(Ordering::Equal),
        BinaryOperator::Less => ordering == Some(Ordering::Less),
        BinaryOperator::Greater => ordering == Some(Ordering::Greater),
        BinaryOperator::LessEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        BinaryOperator::GreaterEqual => {
            matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
        },
        _ => false,
    }
}

const fn is_equality(op: BinaryOperator) -> bool {
    matches!(op, BinaryOperator::Equal | BinaryOperator::NotEqual)
}

/// Evaluates a comparison of the form `Value <Operator> Value`.
///
/// Both operands are unified to the higher rank; a number-like value is
/// never compared with anything else. Numbers and strings are ordered
/// naturally, vectors by length (equality is componentwise). Collections are
/// ordered by size, while `==` compares them element by element. Functions,
/// pointers and class instances only support `==` and `!=`, by identity.
///
/// # Returns
/// `Int(1)` if the comparison holds, otherwise `Int(0)`.
///
/// # Example
/// ```
/// use sable::{
///     ast::BinaryOperator,
///     interpreter::{evaluator::binary::comparison::eval_comparison, value::core::Value},
/// };
///
/// let r = eval_comparison(BinaryOperator::Less, &Value::Int(3), &Value::Float(3.5), 1).unwrap();
/// assert_eq!(r, Value::Int(1));
///
/// assert!(eval_comparison(BinaryOperator::Less, &Value::Int(1), &Value::from("a"), 1).is_err());
/// ```
pub fn eval_comparison(op: BinaryOperator,
                       left: &Value,
                       right: &Value,
                       line: usize)
                       -> EvalResult<Value> {
    let (left, right) = match Value::unify_for_compare(left, right, line) {
        Ok(pair) => pair,
        Err(RuntimeError::InvalidConversion { .. }) if is_equality(op) => {
            return Ok(Value::from(op == BinaryOperator::NotEqual));
        },
        Err(e) => return Err(e),
    };

    let holds = match (&left, &right) {
        (Value::Null, Value::Null) => ordering_result(op, Some(Ordering::Equal)),
        (Value::Int(a), Value::Int(b)) => ordering_result(op, Some(a.cmp(b))),
        (Value::Float(a), Value::Float(b)) => ordering_result(op, a.partial_cmp(b)),
        (Value::Vec3(a), Value::Vec3(b)) if is_equality(op) => {
            ordering_result(op, (a == b).then_some(Ordering::Equal))
        },
        (Value::Vec3(a), Value::Vec3(b)) => ordering_result(op, a.length().partial_cmp(&b.length())),
        (Value::String(a), Value::String(b)) => ordering_result(op, Some(a.cmp(b))),
        (Value::Array(_) | Value::List(_) | Value::Dictionary(_), _) if is_equality(op) => {
            ordering_result(op, (left == right).then_some(Ordering::Equal))
        },
        (Value::Array(_) | Value::List(_) | Value::Dictionary(_), _) => {
            ordering_result(op, left.len().partial_cmp(&right.len()))
        },
        _ if is_equality(op) => ordering_result(op, (left == right).then_some(Ordering::Equal)),
        _ => {
            return Err(RuntimeError::IncomparableTypes { left: left.value_type(),
                                                         right: right.value_type(),
                                                         line });
        },
    };

    Ok(Value::from(holds))
}
