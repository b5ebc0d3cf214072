use crate::{
    ast::BinaryOperator,
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        value::{core::Value, vec3::Vec3},
    },
};

/// Applies an arithmetic operator to two number-like values.
///
/// Both operands are widened to the higher of their two ranks. Integer
/// arithmetic is checked: overflow and division by zero are errors. Float
/// and vector arithmetic follow IEEE semantics; vectors operate
/// componentwise, so a scalar operand is first splatted to all three
/// components.
///
/// # Parameters
/// - `op`: One of `+ - * / %`.
/// - `left`, `right`: The operands.
/// - `line`: Line number for error reporting.
///
/// # Example
/// ```
/// use sable::{
///     ast::BinaryOperator,
///     interpreter::{evaluator::binary::arithmetic::eval_arithmetic, value::core::Value},
/// };
///
/// let r = eval_arithmetic(BinaryOperator::Div, &Value::Int(7), &Value::Int(2), 1).unwrap();
/// assert_eq!(r, Value::Int(3));
///
/// assert!(eval_arithmetic(BinaryOperator::Mod, &Value::Int(1), &Value::Int(0), 1).is_err());
/// ```
pub fn eval_arithmetic(op: BinaryOperator,
                       left: &Value,
                       right: &Value,
                       line: usize)
                       -> EvalResult<Value> {
    let (left, right) = Value::unify(left, right, line)?;

    match (&left, &right) {
        (Value::Null, Value::Null) => int_op(op, 0, 0, line).map(Value::Int),
        (Value::Int(a), Value::Int(b)) => int_op(op, *a, *b, line).map(Value::Int),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(float_op(op, *a, *b))),
        (Value::Vec3(a), Value::Vec3(b)) => Ok(Value::Vec3(vec_op(op, *a, *b))),
        _ => Err(RuntimeError::TypeError { details: format!("operator '{op}' is not defined for \
                                                             {}",
                                                            left.value_type()),
                                           line }),
    }
}

fn int_op(op: BinaryOperator, a: i64, b: i64, line: usize) -> EvalResult<i64> {
    let result = match op {
        BinaryOperator::Add => a.checked_add(b),
        BinaryOperator::Sub => a.checked_sub(b),
        BinaryOperator::Mul => a.checked_mul(b),
        BinaryOperator::Div | BinaryOperator::Mod if b == 0 => {
            return Err(RuntimeError::DivisionByZero { line });
        },
        BinaryOperator::Div => a.checked_div(b),
        BinaryOperator::Mod => a.checked_rem(b),
        _ => None,
    };

    result.ok_or(RuntimeError::Overflow { line })
}

fn float_op(op: BinaryOperator, a: f64, b: f64) -> f64 {
    match op {
        BinaryOperator::Add => a + b,
        BinaryOperator::Sub => a - b,
        BinaryOperator::Mul => a * b,
        BinaryOperator::Div => a / b,
        _ => a % b,
    }
}

fn vec_op(op: BinaryOperator, a: Vec3, b: Vec3) -> Vec3 {
    match op {
        BinaryOperator::Add => a + b,
        BinaryOperator::Sub => a - b,
        BinaryOperator::Mul => a * b,
        BinaryOperator::Div => a / b,
        _ => a % b,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn integers_widen_to_the_higher_rank() {
        let r = eval_arithmetic(BinaryOperator::Sub, &Value::Int(5), &Value::Float(0.5), 1).unwrap();
        assert_eq!(r, Value::Float(4.5));

        let r = eval_arithmetic(BinaryOperator::Mul,
                                &Value::Int(2),
                                &Value::Vec3(Vec3::new(1.0, 2.0, 3.0)),
                                1).unwrap();
        assert_eq!(r, Value::Vec3(Vec3::new(2.0, 4.0, 6.0)));
    }

    #[test]
    fn null_acts_as_zero() {
        let r = eval_arithmetic(BinaryOperator::Sub, &Value::Null, &Value::Int(3), 1).unwrap();
        assert_eq!(r, Value::Int(-3));
    }

    #[test]
    fn checked_integer_failures() {
        assert_eq!(eval_arithmetic(BinaryOperator::Div, &Value::Int(1), &Value::Int(0), 4),
                   Err(RuntimeError::DivisionByZero { line: 4 }));
        assert_eq!(eval_arithmetic(BinaryOperator::Mul, &Value::Int(i64::MAX), &Value::Int(2), 2),
                   Err(RuntimeError::Overflow { line: 2 }));
    }

    #[test]
    fn float_division_by_zero_is_infinite() {
        let r = eval_arithmetic(BinaryOperator::Div, &Value::Float(1.0), &Value::Int(0), 1).unwrap();
        assert_eq!(r, Value::Float(f64::INFINITY));
    }

    #[test]
    fn strings_have_no_subtraction() {
        let r = eval_arithmetic(BinaryOperator::Sub, &Value::from("a"), &Value::from("b"), 3);
        assert!(matches!(r, Err(RuntimeError::TypeError { line: 3, .. })));
    }
}
