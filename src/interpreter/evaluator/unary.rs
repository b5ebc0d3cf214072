use crate::{
    ast::UnaryOperator,
    error::RuntimeError,
    interpreter::{evaluator::core::EvalResult, value::core::Value},
};

/// Evaluates a unary operation on a value.
///
/// Supported operators:
/// - `Negate`: numeric negation of integers, floats and vectors. Negating
///   null yields null. Integer negation is checked.
/// - `Not`: `Int(1)` for falsy values, `Int(0)` otherwise.
///
/// # Parameters
/// - `op`: Unary operator.
/// - `value`: Input value.
/// - `line`: Line number for error reporting.
///
/// # Example
/// ```
/// use sable::{
///     ast::UnaryOperator,
///     interpreter::{evaluator::unary::eval_unary, value::core::Value},
/// };
///
/// assert_eq!(eval_unary(UnaryOperator::Negate, &Value::Float(2.5), 1).unwrap(), Value::Float(-2.5));
/// assert_eq!(eval_unary(UnaryOperator::Not, &Value::from(""), 1).unwrap(), Value::Int(1));
/// ```
pub fn eval_unary(op: UnaryOperator, value: &Value, line: usize) -> EvalResult<Value> {
    let value = value.clone().resolved(line)?;

    match op {
        UnaryOperator::Not => Ok(Value::from(!value.is_truthy())),
        UnaryOperator::Negate => match value {
            Value::Null => Ok(Value::Null),
            Value::Int(i) => i.checked_neg().map(Value::Int).ok_or(RuntimeError::Overflow { line }),
            Value::Float(x) => Ok(Value::Float(-x)),
            Value::Vec3(v) => Ok(Value::Vec3(-v)),
            other => Err(RuntimeError::TypeError { details: format!("cannot negate a value of \
                                                                     type {}",
                                                                    other.value_type()),
                                                   line }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negating_the_minimum_integer_overflows() {
        assert_eq!(eval_unary(UnaryOperator::Negate, &Value::Int(i64::MIN), 3),
                   Err(RuntimeError::Overflow { line: 3 }));
    }

    #[test]
    fn strings_cannot_be_negated() {
        assert!(eval_unary(UnaryOperator::Negate, &Value::from("x"), 1).is_err());
    }
}
