use tracing::trace;

use crate::{
    ast::BinaryOperator,
    interpreter::{
        evaluator::{
            binary::{arithmetic::eval_arithmetic, collection::eval_add, comparison::eval_comparison,
                     logic::eval_logic},
            core::EvalResult,
        },
        value::core::Value,
    },
};

/// Evaluates `left <op> right`.
///
/// Element handles are resolved first. The operands are then brought to a
/// common type by the operator family: arithmetic and concatenation widen
/// to the higher rank, comparisons refuse to mix number-like and other
/// values, and boolean operators only look at truthiness.
///
/// # Parameters
/// - `op`: The operator.
/// - `left`: The left operand.
/// - `right`: The right operand.
/// - `line`: Line number for error reporting.
///
/// # Returns
/// The result of the operation.
///
/// # Example
/// ```
/// use sable::{
///     ast::BinaryOperator,
///     interpreter::{evaluator::binary::core::eval_binary, value::core::Value},
/// };
///
/// let r = eval_binary(BinaryOperator::Mul, &Value::Int(2), &Value::Float(1.5), 1).unwrap();
/// assert_eq!(r, Value::Float(3.0));
///
/// let r = eval_binary(BinaryOperator::Add, &Value::from("fish "), &Value::from("tacos"), 1).unwrap();
/// assert_eq!(r, Value::from("fish tacos"));
/// ```
pub fn eval_binary(op: BinaryOperator, left: &Value, right: &Value, line: usize) -> EvalResult<Value> {
    let left = left.clone().resolved(line)?;
    let right = right.clone().resolved(line)?;
    trace!(%op, left = %left.value_type(), right = %right.value_type(), line, "binary");

    match op {
        BinaryOperator::Add => eval_add(&left, &right, line),
        BinaryOperator::Sub | BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Mod => {
            eval_arithmetic(op, &left, &right, line)
        },
        BinaryOperator::Equal
        | BinaryOperator::NotEqual
        | BinaryOperator::Less
        | BinaryOperator::Greater
        | BinaryOperator::LessEqual
        | BinaryOperator::GreaterEqual => eval_comparison(op, &left, &right, line),
        BinaryOperator::And | BinaryOperator::Or => Ok(eval_logic(op, &left, &right)),
    }
}
