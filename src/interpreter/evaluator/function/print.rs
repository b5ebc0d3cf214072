use crate::interpreter::{evaluator::core::EvalResult, value::core::Value};

/// Prints its arguments to standard output, separated by spaces, and
/// returns the first one.
///
/// Every value is formatted using its `Display` implementation; strings are
/// printed without quotes. With no arguments an empty line is printed and
/// null returned.
///
/// # Parameters
/// - `args`: The values to print.
/// - `line`: Line number for error reporting.
///
/// # Example
/// ```
/// use sable::interpreter::{evaluator::function::print::print, value::core::Value};
///
/// // The function prints the values to stdout, but the doctest
/// // only checks the returned result.
/// let result = print(&[Value::Int(42), Value::from("fish")], 1).unwrap();
///
/// assert_eq!(result, Value::Int(42));
/// ```
pub fn print(args: &[Value], _line: usize) -> EvalResult<Value> {
    let text = args.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ");
    println!("{text}");
    Ok(args.first().cloned().unwrap_or(Value::Null))
}
