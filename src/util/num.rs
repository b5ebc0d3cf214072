use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        value::core::{Value, ValueType},
    },
};

/// Converts an integer to a float, rounding to the nearest representable
/// value beyond `2^53`.
///
/// ## Example
/// ```
/// use sable::util::num::int_to_float;
///
/// assert_eq!(int_to_float(42), 42.0);
/// ```
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub const fn int_to_float(value: i64) -> f64 {
    value as f64
}

/// Truncates a float toward zero, saturating at the `i64` bounds.
///
/// `NaN` becomes `0`.
///
/// ## Example
/// ```
/// use sable::util::num::float_to_int;
///
/// assert_eq!(float_to_int(2.9), 2);
/// assert_eq!(float_to_int(-2.9), -2);
/// assert_eq!(float_to_int(f64::NAN), 0);
/// ```
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub const fn float_to_int(value: f64) -> i64 {
    value as i64
}

/// Parses an integer from text the way `int("...")` does.
///
/// Leading and trailing whitespace is ignored. Text that is a float is
/// truncated; anything else yields `0`.
#[must_use]
pub fn parse_int_lossy(text: &str) -> i64 {
    let text = text.trim();
    text.parse::<i64>()
        .unwrap_or_else(|_| text.parse::<f64>().map_or(0, float_to_int))
}

/// Parses a float from text, yielding `0.0` when the text is not a number.
#[must_use]
pub fn parse_float_lossy(text: &str) -> f64 {
    text.trim().parse().unwrap_or(0.0)
}

/// Converts an index value into a position inside a collection of length
/// `len`.
///
/// Integers are used as is and floats are truncated. Negative indices and
/// indices at or past `len` are out of bounds.
///
/// ## Errors
/// - `TypeError` if the index is not a number.
/// - `IndexOutOfBounds` if it does not address an element.
///
/// ## Example
/// ```
/// use sable::{interpreter::value::core::Value, util::num::index_checked};
///
/// assert_eq!(index_checked(&Value::Int(2), 3, 1).unwrap(), 2);
/// assert_eq!(index_checked(&Value::Float(1.7), 3, 1).unwrap(), 1);
/// assert!(index_checked(&Value::Int(-1), 3, 1).is_err());
/// ```
pub fn index_checked(index: &Value, len: usize, line: usize) -> EvalResult<usize> {
    let index = match index {
        Value::Int(i) => *i,
        Value::Float(x) => float_to_int(*x),
        Value::ArrayMember(member) => return index_checked(&member.get(line)?, len, line),
        other => {
            return Err(RuntimeError::TypeError { details: format!("index must be a number, found {}",
                                                                  other.value_type()),
                                                 line });
        },
    };

    usize::try_from(index).ok()
                          .filter(|i| *i < len)
                          .ok_or(RuntimeError::IndexOutOfBounds { index, len, line })
}

/// Converts a collection length into an `Int` value.
#[must_use]
pub fn len_value(len: usize) -> Value {
    Value::Int(i64::try_from(len).unwrap_or(i64::MAX))
}

/// Requires `value` to be a string and borrows it.
pub fn expect_string<'a>(value: &'a Value, what: &str, line: usize) -> EvalResult<&'a str> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(RuntimeError::TypeError { details: format!("{what} must be a {}, found {}",
                                                                ValueType::String,
                                                                other.value_type()),
                                               line }),
    }
}
