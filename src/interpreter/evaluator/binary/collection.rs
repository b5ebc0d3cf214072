use crate::{
    ast::BinaryOperator,
    error::RuntimeError,
    interpreter::{
        evaluator::{binary::arithmetic::eval_arithmetic, core::EvalResult},
        value::{
            array::Array,
            core::{Value, ValueType},
        },
    },
};

/// Evaluates `left + right`.
///
/// Number-like operands are added. Otherwise both operands are widened to
/// the higher rank and combined: strings concatenate, arrays concatenate
/// when they hold the same element type, lists concatenate and dictionaries
/// merge with the right operand winning on equal keys. The result is always
/// a new collection; neither operand is modified.
///
/// Adding a scalar to an empty list yields a one element typed array.
///
/// # Example
/// ```
/// use sable::interpreter::{evaluator::binary::collection::eval_add, value::core::Value};
///
/// let a = Value::from(vec![Value::Int(1)]);
/// let r = eval_add(&a, &Value::from("x"), 1).unwrap();
/// assert_eq!(r.to_string(), "[1, \"x\"]");
/// ```
pub fn eval_add(left: &Value, right: &Value, line: usize) -> EvalResult<Value> {
    if let Some(array) = seed_array(left, right, line)? {
        return Ok(array);
    }

    if left.is_number_like() && right.is_number_like() {
        return eval_arithmetic(BinaryOperator::Add, left, right, line);
    }

    let (left, right) = Value::unify(left, right, line)?;
    match (&left, &right) {
        (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
        (Value::Array(a), Value::Array(b)) => {
            let tail = b.read().clone();
            let mut joined = a.read().clone();
            joined.extend(&tail, line)?;
            Ok(joined.into())
        },
        (Value::List(a), Value::List(b)) => {
            let tail = b.read().clone();
            let mut joined = a.read().clone();
            joined.extend(tail);
            Ok(joined.into())
        },
        (Value::Dictionary(a), Value::Dictionary(b)) => {
            let other = b.read().clone();
            let mut merged = a.read().clone();
            merged.merge(&other);
            Ok(merged.into())
        },
        _ => Err(RuntimeError::TypeError { details: format!("operator '+' is not defined for {}",
                                                            left.value_type()),
                                           line }),
    }
}

/// Evaluates the value stored by `target += right`.
///
/// When `target` is a list, array or dictionary handle, the right operand
/// is appended (or merged) into the shared storage and the same handle is
/// returned, so every alias observes the change. An empty list receiving a
/// scalar is replaced by a one element typed array. All other combinations
/// fall back to [`eval_add`].
pub fn append_in_place(target: &Value, right: &Value, line: usize) -> EvalResult<Value> {
    let right = right.clone().resolved(line)?;

    match target {
        Value::List(items) => {
            if let Some(array) = seed_array(target, &right, line)? {
                return Ok(array);
            }
            let tail = match &right {
                Value::List(other) => other.read().clone(),
                Value::Array(other) => other.read().to_values(),
                other => vec![other.clone()],
            };
            items.write().extend(tail);
            Ok(target.clone())
        },
        Value::Array(array) => match &right {
            Value::Array(other) => {
                let tail = other.read().clone();
                array.write().extend(&tail, line)?;
                Ok(target.clone())
            },
            other if other.value_type().is_array_element() => {
                array.write().push(other.clone(), line)?;
                Ok(target.clone())
            },
            _ => eval_add(target, &right, line),
        },
        Value::Dictionary(dictionary) => {
            let Value::Dictionary(other) = right.upconvert(ValueType::Dictionary, line)? else {
                return eval_add(target, &right, line);
            };
            let other = other.read().clone();
            dictionary.write().merge(&other);
            Ok(target.clone())
        },
        _ => eval_add(target, &right, line),
    }
}

/// An empty list plus a scalar becomes a typed array holding the scalar.
fn seed_array(left: &Value, right: &Value, line: usize) -> EvalResult<Option<Value>> {
    match left {
        Value::List(items) if items.read().is_empty() && right.value_type().is_array_element() => {
            let array = Array::from_values(std::slice::from_ref(right), line)?;
            Ok(Some(array.into()))
        },
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::value::dictionary::Dictionary;

    fn ints(values: &[i64]) -> Value {
        let values: Vec<Value> = values.iter().map(|i| Value::Int(*i)).collect();
        Array::from_values(&values, 1).unwrap().into()
    }

    #[test]
    fn arrays_of_one_type_concatenate() {
        assert_eq!(eval_add(&ints(&[1, 2]), &ints(&[3, 4]), 1).unwrap(), ints(&[1, 2, 3, 4]));
    }

    #[test]
    fn arrays_of_different_types_do_not_concatenate() {
        let strings = Array::from_values(&[Value::from("a")], 1).unwrap().into();
        assert!(eval_add(&ints(&[1]), &strings, 1).is_err());
    }

    #[test]
    fn empty_list_plus_scalar_is_a_typed_array() {
        let r = eval_add(&Value::from(Vec::<Value>::new()), &Value::Int(7), 1).unwrap();
        assert_eq!(r, ints(&[7]));
    }

    #[test]
    fn in_place_append_is_visible_through_aliases() {
        let list = Value::from(vec![Value::Int(1)]);
        let alias = list.clone();
        append_in_place(&list, &Value::from("two"), 1).unwrap();
        assert_eq!(alias.len(), Some(2));

        let array = ints(&[1]);
        let alias = array.clone();
        append_in_place(&array, &Value::Int(2), 1).unwrap();
        assert_eq!(alias, ints(&[1, 2]));
    }

    #[test]
    fn dictionaries_merge_with_right_precedence() {
        let mut a = Dictionary::default();
        a.insert(Value::from("k"), Value::Int(1), 1).unwrap();
        let mut b = Dictionary::default();
        b.insert(Value::from("k"), Value::Int(2), 1).unwrap();
        b.insert(Value::from("j"), Value::Int(3), 1).unwrap();

        let merged = eval_add(&a.into(), &b.into(), 1).unwrap();
        let Value::Dictionary(merged) = merged else { panic!("expected a dictionary") };
        let merged = merged.read();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get(&Value::from("k"), 1).unwrap(), Some(Value::Int(2)));
    }

    #[test]
    fn number_plus_string_concatenates_the_display_form() {
        assert_eq!(eval_add(&Value::Int(1), &Value::from("x"), 1).unwrap(), Value::from("1x"));
    }
}
