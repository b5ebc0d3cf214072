use std::sync::Arc;

use crate::{
    ast::{BinaryOperator, UnaryOperator},
    error::RuntimeError,
    interpreter::{
        evaluator::{
            binary::core::eval_binary,
            core::{EvalResult, Interpreter},
            unary::eval_unary,
        },
        scope::Scope,
        value::{array::ArrayMember, core::Value, function::FunctionKind},
    },
    util::num::len_value,
};

/// Generates the builtin wrapper of a binary operator.
///
/// The generated functions take exactly two arguments; the arity has been
/// checked by the dispatcher.
macro_rules! binary_builtin {
    ($fname:ident, $op:expr) => {
        pub fn $fname(args: &[Value], line: usize) -> EvalResult<Value> {
            eval_binary($op, &args[0], &args[1], line)
        }
    };
}

binary_builtin!(add, BinaryOperator::Add);
binary_builtin!(mul, BinaryOperator::Mul);
binary_builtin!(div, BinaryOperator::Div);
binary_builtin!(rem, BinaryOperator::Mod);
binary_builtin!(equal, BinaryOperator::Equal);
binary_builtin!(not_equal, BinaryOperator::NotEqual);
binary_builtin!(less, BinaryOperator::Less);
binary_builtin!(greater, BinaryOperator::Greater);
binary_builtin!(less_equal, BinaryOperator::LessEqual);
binary_builtin!(greater_equal, BinaryOperator::GreaterEqual);
binary_builtin!(and, BinaryOperator::And);
binary_builtin!(or, BinaryOperator::Or);

/// `-`: subtraction with two arguments, negation with one.
///
/// # Example
/// ```
/// use sable::interpreter::{evaluator::function::builtin::sub_or_negate, value::core::Value};
///
/// assert_eq!(sub_or_negate(&[Value::Int(5), Value::Int(7)], 1).unwrap(), Value::Int(-2));
/// assert_eq!(sub_or_negate(&[Value::Int(5)], 1).unwrap(), Value::Int(-5));
/// ```
pub fn sub_or_negate(args: &[Value], line: usize) -> EvalResult<Value> {
    match args {
        [value] => eval_unary(UnaryOperator::Negate, value, line),
        [left, right] => eval_binary(BinaryOperator::Sub, left, right, line),
        _ => Err(RuntimeError::ArgumentCountMismatch { name: "-".to_string(),
                                                       found: args.len(),
                                                       line }),
    }
}

/// `!`: logical negation.
pub fn not(args: &[Value], line: usize) -> EvalResult<Value> {
    eval_unary(UnaryOperator::Not, &args[0], line)
}

/// `listindex(collection, key)`: reads `collection[key]` or `collection.key`.
///
/// Lists, arrays and strings take an integer index, vectors `0..3` or
/// `"x"`/`"y"`/`"z"`, dictionaries any hashable key, class instances a
/// member name.
///
/// # Example
/// ```
/// use sable::interpreter::{evaluator::function::builtin::list_index, value::core::Value};
///
/// let list = Value::from(vec![Value::Int(4), Value::from("x")]);
/// assert_eq!(list_index(&[list, Value::Int(1)], 1).unwrap(), Value::from("x"));
/// ```
pub fn list_index(args: &[Value], line: usize) -> EvalResult<Value> {
    ArrayMember::new(args[0].clone(), args[1].clone()).get(line)
}

/// `applyfunction(callee, args...)`: the call the expression builder emits
/// for every call that is not a plain name.
///
/// - With a string callee, `applyfunction("name", receiver, args...)` is the
///   member call `receiver.name(args...)`.
/// - With a function callee the function is called with the remaining
///   arguments. A method called this way with a class instance as first
///   argument runs against that instance.
pub fn apply_function(interp: &mut Interpreter,
                      args: &[Value],
                      _scope: &Arc<Scope>,
                      line: usize)
                      -> EvalResult<Value> {
    match &args[0] {
        Value::String(name) => {
            let Some(receiver) = args.get(1) else {
                return Err(RuntimeError::ArgumentCountMismatch { name: "applyfunction".to_string(),
                                                                 found: args.len(),
                                                                 line });
            };
            interp.call_member(receiver, name, args[2..].to_vec(), line)
        },
        Value::Function(function) => match args.get(1) {
            Some(Value::Class(class)) if function.kind == FunctionKind::Member => {
                interp.invoke(function, args[2..].to_vec(), Some(class), line)
            },
            _ => interp.invoke(function, args[1..].to_vec(), None, line),
        },
        other => Err(RuntimeError::NotCallable { found: other.value_type(),
                                                 line }),
    }
}

/// `len(value)`: the number of elements of a collection, characters of a
/// string or members of a class instance.
///
/// # Example
/// ```
/// use sable::interpreter::{evaluator::function::builtin::len, value::core::Value};
///
/// assert_eq!(len(&[Value::from("fish")], 1).unwrap(), Value::Int(4));
/// assert!(len(&[Value::Int(3)], 1).is_err());
/// ```
pub fn len(args: &[Value], line: usize) -> EvalResult<Value> {
    args[0].len().map(len_value).ok_or_else(|| {
                                      RuntimeError::TypeError { details: format!("a value of type \
                                                                                  {} has no length",
                                                                                 args[0].value_type()),
                                                                line }
                                  })
}

/// `typeof(value)`: the type name of a value.
///
/// # Example
/// ```
/// use sable::interpreter::{evaluator::function::builtin::type_of, value::core::Value};
///
/// assert_eq!(type_of(&[Value::Float(1.0)], 1).unwrap(), Value::from("float"));
/// ```
pub fn type_of(args: &[Value], _line: usize) -> EvalResult<Value> {
    Ok(Value::from(args[0].value_type().name()))
}

/// `assert(condition)` or `assert(condition, message)`.
///
/// Fails with `AssertionFailed` when the condition is not truthy, otherwise
/// returns the condition.
pub fn assert(args: &[Value], line: usize) -> EvalResult<Value> {
    if args[0].is_truthy() {
        return Ok(args[0].clone());
    }
    let message = args.get(1).map_or_else(|| "condition was false".to_string(), ToString::to_string);
    Err(RuntimeError::AssertionFailed { message, line })
}
