use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        value::{
            array::Array,
            core::{Value, ValueType},
            dictionary::Dictionary,
            vec3::Vec3,
        },
    },
    util::num::len_value,
};

/// `int(value)`: hard conversion to an integer.
///
/// Floats truncate toward zero, strings are parsed (zero if they do not hold
/// a number) and collections yield their length.
///
/// # Example
/// ```
/// use sable::interpreter::{evaluator::function::convert::to_int, value::core::Value};
///
/// assert_eq!(to_int(&[Value::Float(-2.7)], 1).unwrap(), Value::Int(-2));
/// assert_eq!(to_int(&[Value::from("42")], 1).unwrap(), Value::Int(42));
/// ```
pub fn to_int(args: &[Value], line: usize) -> EvalResult<Value> {
    args[0].hardconvert(ValueType::Int, line)
}

/// `float(value)`: hard conversion to a float.
pub fn to_float(args: &[Value], line: usize) -> EvalResult<Value> {
    args[0].hardconvert(ValueType::Float, line)
}

/// `string(value)`: the display form of a value.
pub fn to_string(args: &[Value], line: usize) -> EvalResult<Value> {
    args[0].hardconvert(ValueType::String, line)
}

/// `vec3(x, y, z)` or `vec3(value)`.
///
/// With one argument a number is splatted to all components and a
/// collection supplies up to three components.
///
/// # Example
/// ```
/// use sable::interpreter::{
///     evaluator::function::convert::vec3,
///     value::{core::Value, vec3::Vec3},
/// };
///
/// let v = vec3(&[Value::Int(1), Value::Float(2.5), Value::Null], 1).unwrap();
/// assert_eq!(v, Value::Vec3(Vec3::new(1.0, 2.5, 0.0)));
/// ```
pub fn vec3(args: &[Value], line: usize) -> EvalResult<Value> {
    if let [value] = args {
        return value.hardconvert(ValueType::Vec3, line);
    }

    let mut components = [0.0; 3];
    for (slot, arg) in components.iter_mut().zip(args) {
        let Value::Float(x) = arg.hardconvert(ValueType::Float, line)? else {
            return Err(RuntimeError::InvalidConversion { from: arg.value_type(),
                                                         to: ValueType::Float,
                                                         line });
        };
        *slot = x;
    }
    let [x, y, z] = components;
    Ok(Value::Vec3(Vec3::new(x, y, z)))
}

/// `array(...)`: a typed array.
///
/// Without arguments the array is empty. A single argument is converted;
/// several arguments become the elements and must share one type.
pub fn to_array(args: &[Value], line: usize) -> EvalResult<Value> {
    match args {
        [] => Ok(Array::default().into()),
        [value] => Ok(value.hardconvert(ValueType::Array, line)?.duplicate()),
        values => Ok(Array::from_values(values, line)?.into()),
    }
}

/// `list(...)`: a list.
///
/// Without arguments the list is empty. A single argument is converted
/// (arrays and dictionaries yield their elements); several arguments become
/// the elements.
pub fn to_list(args: &[Value], line: usize) -> EvalResult<Value> {
    match args {
        [] => Ok(Vec::new().into()),
        [value] => Ok(value.hardconvert(ValueType::List, line)?.duplicate()),
        values => Ok(values.to_vec().into()),
    }
}

/// `dictionary()` or `dictionary(value)`.
///
/// A list or array converts to a dictionary keyed by element index.
pub fn to_dictionary(args: &[Value], line: usize) -> EvalResult<Value> {
    match args.first() {
        None => Ok(Dictionary::default().into()),
        Some(value) => Ok(value.hardconvert(ValueType::Dictionary, line)?.duplicate()),
    }
}

/// `keys(value)`: the keys of a dictionary in key order, the member names
/// of a class instance, or the indices of a list or array.
///
/// Keys that all share one scalar type are returned as a typed array.
///
/// # Example
/// ```
/// use sable::interpreter::{
///     evaluator::function::convert::keys,
///     value::{core::Value, dictionary::Dictionary},
/// };
///
/// let mut d = Dictionary::default();
/// d.insert(Value::from("b"), Value::Int(1), 1).unwrap();
/// d.insert(Value::from("a"), Value::Int(2), 1).unwrap();
///
/// assert_eq!(keys(&[d.into()], 1).unwrap().to_string(), "[\"a\", \"b\"]");
/// ```
pub fn keys(args: &[Value], line: usize) -> EvalResult<Value> {
    let keys = match &args[0] {
        Value::Dictionary(dictionary) => dictionary.read().keys(),
        Value::Class(class) => class.members().into_iter().map(|(name, _)| Value::String(name)).collect(),
        Value::List(_) | Value::Array(_) => {
            let len = args[0].len().unwrap_or(0);
            (0..len).map(len_value).collect()
        },
        other => {
            return Err(RuntimeError::TypeError { details: format!("a value of type {} has no keys",
                                                                  other.value_type()),
                                                 line });
        },
    };

    let uniform = keys.first().map(Value::value_type).filter(|t| {
                                                         t.is_array_element()
                                                         && keys.iter().all(|k| k.value_type() == *t)
                                                     });
    match uniform {
        Some(_) => Ok(Array::from_values(&keys, line)?.into()),
        None if keys.is_empty() => Ok(Array::default().into()),
        None => Ok(keys.into()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn list_conversion_copies_the_storage() {
        let original = Value::from(vec![Value::Int(1)]);
        let copy = to_list(&[original.clone()], 1).unwrap();
        if let Value::List(items) = &copy {
            items.write().push(Value::Int(2));
        }
        assert_eq!(original.len(), Some(1));
        assert_eq!(copy.len(), Some(2));
    }

    #[test]
    fn array_rejects_mixed_arguments() {
        assert!(to_array(&[Value::Int(1), Value::from("a")], 1).is_err());
        assert_eq!(to_array(&[Value::Int(1), Value::Int(2)], 1).unwrap().len(), Some(2));
    }

    #[test]
    fn keys_of_a_list_are_its_indices() {
        let list = Value::from(vec![Value::Null, Value::Null]);
        assert_eq!(keys(&[list], 1).unwrap().to_string(), "[0, 1]");
    }

    #[test]
    fn dictionary_from_list_is_index_keyed() {
        let list = Value::from(vec![Value::from("a"), Value::from("b")]);
        let Value::Dictionary(d) = to_dictionary(&[list], 1).unwrap() else {
            panic!("expected a dictionary");
        };
        assert_eq!(d.read().get(&Value::Int(1), 1).unwrap(), Some(Value::from("b")));
    }
}
