use crate::interpreter::value::core::ValueType;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
/// Represents all errors that can occur during evaluation.
pub enum RuntimeError {
    /// Called a function that no scope defines.
    #[error("Error on line {line}: Call to non-existent function '{name}'.")]
    UnknownFunction {
        /// The name of the function.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Tried to call a value that is not a function.
    #[error("Error on line {line}: Value of type {found} is not callable.")]
    NotCallable {
        /// The type of the value in call position.
        found: ValueType,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// A class named in `class X, Base` or a member lookup does not exist.
    #[error("Error on line {line}: Unknown class '{name}'.")]
    UnknownClass {
        /// The name of the class.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A member was read or called on a value that does not have it.
    #[error("Error on line {line}: {found} has no member '{name}'.")]
    UnknownMember {
        /// The member name.
        name:  String,
        /// The type of the receiver.
        found: ValueType,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// A conversion between two types is not allowed.
    #[error("Error on line {line}: Cannot convert {from} to {to}.")]
    InvalidConversion {
        /// The source type.
        from: ValueType,
        /// The requested type.
        to:   ValueType,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A collection with mixed element types was converted to an Array.
    #[error("Error on line {line}: Cannot build an Array from elements of different types ({first} and {second}).")]
    HeterogeneousArray {
        /// The element type established by the first element.
        first:  ValueType,
        /// The conflicting element type.
        second: ValueType,
        /// The source line where the error occurred.
        line:   usize,
    },
    /// Indexed a collection outside its bounds.
    #[error("Error on line {line}: Index {index} out of bounds for collection of length {len}.")]
    IndexOutOfBounds {
        /// The index that was requested.
        index: i64,
        /// The collection length.
        len:   usize,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// Compared a number-like value with a non-number-like value.
    #[error("Error on line {line}: Cannot compare {left} with {right}.")]
    IncomparableTypes {
        /// The left operand type.
        left:  ValueType,
        /// The right operand type.
        right: ValueType,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// A value had an unexpected or incompatible type.
    #[error("Error on line {line}: Type error: {details}.")]
    TypeError {
        /// Details about the type mismatch.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// Attempted integer division or modulo by zero.
    #[error("Error on line {line}: Division by zero.")]
    DivisionByZero {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Integer arithmetic overflowed.
    #[error("Error on line {line}: Integer overflow while trying to compute result.")]
    Overflow {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A native function received an argument count it does not accept.
    #[error("Error on line {line}: '{name}' does not accept {found} argument(s).")]
    ArgumentCountMismatch {
        /// The function name.
        name:  String,
        /// The number of arguments supplied.
        found: usize,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// The left-hand side of an assignment is not a variable or element.
    #[error("Error on line {line}: Invalid assignment target.")]
    InvalidAssignmentTarget {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A value of this type cannot be used as a dictionary key.
    #[error("Error on line {line}: {found} cannot be used as a dictionary key.")]
    UnhashableKey {
        /// The type of the rejected key.
        found: ValueType,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// A native function could not complete its work.
    #[error("Error on line {line}: '{function}' failed: {reason}")]
    NativeFailure {
        /// The function that failed.
        function: String,
        /// Why it failed.
        reason:   String,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// A script `assert` did not hold.
    #[error("Error on line {line}: Assertion failed: {message}")]
    AssertionFailed {
        /// The message passed to `assert`, or the default one.
        message: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// An `import` could not be read, parsed or evaluated.
    #[error("Error on line {line}: Failed to import '{path}': {reason}")]
    ImportFailed {
        /// The path as written in the script.
        path:   String,
        /// Why the import failed.
        reason: String,
        /// The source line where the error occurred.
        line:   usize,
    },
}

impl RuntimeError {
    /// Returns the source line the error was raised on.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::UnknownFunction { line, .. }
            | Self::NotCallable { line, .. }
            | Self::UnknownClass { line, .. }
            | Self::UnknownMember { line, .. }
            | Self::InvalidConversion { line, .. }
            | Self::HeterogeneousArray { line, .. }
            | Self::IndexOutOfBounds { line, .. }
            | Self::IncomparableTypes { line, .. }
            | Self::TypeError { line, .. }
            | Self::DivisionByZero { line }
            | Self::Overflow { line }
            | Self::ArgumentCountMismatch { line, .. }
            | Self::InvalidAssignmentTarget { line }
            | Self::UnhashableKey { line, .. }
            | Self::AssertionFailed { line, .. }
            | Self::NativeFailure { line, .. }
            | Self::ImportFailed { line, .. } => *line,
        }
    }
}
