use crate::{ast::BinaryOperator, interpreter::value::core::Value};

/// Evaluates `&&` and `||` on the truthiness of both operands.
///
/// Both operands have already been evaluated when this runs; the operators
/// do not short-circuit.
#[must_use]
pub fn eval_logic(op: BinaryOperator, left: &Value, right: &Value) -> Value {
    let holds = match op {
        BinaryOperator::And => left.is_truthy() && right.is_truthy(),
        _ => left.is_truthy() || right.is_truthy(),
    };
    Value::from(holds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_drives_the_result() {
        let empty = Value::from("");
        let full = Value::from(vec![Value::Null]);
        assert_eq!(eval_logic(BinaryOperator::And, &empty, &full), Value::Int(0));
        assert_eq!(eval_logic(BinaryOperator::Or, &empty, &full), Value::Int(1));
        assert_eq!(eval_logic(BinaryOperator::Or, &Value::Null, &Value::Float(0.0)), Value::Int(0));
    }
}
