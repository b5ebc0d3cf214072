use std::{any::Any, fmt, sync::Arc};

use parking_lot::RwLock;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        value::{
            array::{Array, ArrayMember},
            class::Class,
            dictionary::{Dictionary, HashKey},
            function::Function,
            vec3::Vec3,
        },
    },
    util::num::{float_to_int, int_to_float, parse_float_lossy, parse_int_lossy},
};

/// Shared, lock-guarded storage behind every collection handle.
pub type Shared<T> = Arc<RwLock<T>>;

/// Wraps a value in a fresh [`Shared`] handle.
pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(RwLock::new(value))
}

/// Collections nested deeper than this are elided when formatted.
const MAX_DISPLAY_DEPTH: usize = 32;

/// The type tag of a [`Value`].
///
/// The declaration order is the coercion rank. Implicit conversions
/// (`upconvert`) only ever move from a lower rank to a higher one, and binary
/// operators unify both operands to the higher rank of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueType {
    /// The absent value.
    Null,
    /// 64 bit signed integer. Booleans are integers.
    Int,
    /// 64 bit float.
    Float,
    /// Three component float vector.
    Vec3,
    /// Reference to a function.
    Function,
    /// Opaque host pointer.
    UserPointer,
    /// Owned text.
    String,
    /// Homogeneous typed array.
    Array,
    /// Transient element handle used as an assignment target.
    ArrayMember,
    /// Heterogeneous list.
    List,
    /// Hash map from values to values.
    Dictionary,
    /// Class instance.
    Class,
}

impl ValueType {
    /// Null, Int, Float and Vec3 are number-like; everything above is not.
    #[must_use]
    pub const fn is_number_like(self) -> bool {
        matches!(self, Self::Null | Self::Int | Self::Float | Self::Vec3)
    }

    /// Returns `true` for the types an [`Array`] can store.
    #[must_use]
    pub const fn is_array_element(self) -> bool {
        matches!(self,
                 Self::Int | Self::Float | Self::Vec3 | Self::Function | Self::UserPointer | Self::String)
    }

    /// The name scripts see through `typeof`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int => "int",
            Self::Float => "float",
            Self::Vec3 => "vec3",
            Self::Function => "function",
            Self::UserPointer => "pointer",
            Self::String => "string",
            Self::Array => "array",
            Self::ArrayMember => "member",
            Self::List => "list",
            Self::Dictionary => "dictionary",
            Self::Class => "class",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An opaque pointer handed to the interpreter by the host.
///
/// Scripts can store and pass it around but never look inside; equality is
/// identity.
#[derive(Clone)]
pub struct UserPointer(Arc<dyn Any + Send + Sync>);

impl UserPointer {
    /// Wraps a host value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Borrows the host value if it has type `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    /// Address of the pointee, used for hashing and identity.
    #[must_use]
    pub fn address(&self) -> usize {
        Arc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl PartialEq for UserPointer {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl fmt::Debug for UserPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserPointer({:#x})", self.address())
    }
}

/// Represents a runtime value in the interpreter.
///
/// Cloning a value copies the union. Array, List and Dictionary payloads are
/// shared handles, so a clone of a collection value aliases the same storage
/// until [`Value::duplicate`] is used.
#[derive(Debug, Clone)]
pub enum Value {
    /// The absent value. Unknown variables resolve to it.
    Null,
    /// Integer; comparisons and `true`/`false` produce `1` and `0`.
    Int(i64),
    /// Float.
    Float(f64),
    /// Three component vector.
    Vec3(Vec3),
    /// Reference to a function.
    Function(Arc<Function>),
    /// Opaque host pointer.
    UserPointer(UserPointer),
    /// Text.
    String(String),
    /// Homogeneous array handle.
    Array(Shared<Array>),
    /// Element handle produced while resolving an assignment target.
    ArrayMember(ArrayMember),
    /// Heterogeneous list handle.
    List(Shared<Vec<Self>>),
    /// Dictionary handle.
    Dictionary(Shared<Dictionary>),
    /// Class instance.
    Class(Arc<Class>),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec3> for Value {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::List(shared(v))
    }
}

impl From<Array> for Value {
    fn from(v: Array) -> Self {
        Self::Array(shared(v))
    }
}

impl From<Dictionary> for Value {
    fn from(v: Dictionary) -> Self {
        Self::Dictionary(shared(v))
    }
}

impl From<Arc<Function>> for Value {
    fn from(v: Arc<Function>) -> Self {
        Self::Function(v)
    }
}

impl From<UserPointer> for Value {
    fn from(v: UserPointer) -> Self {
        Self::UserPointer(v)
    }
}

impl From<Arc<Class>> for Value {
    fn from(v: Arc<Class>) -> Self {
        Self::Class(v)
    }
}

impl Value {
    /// Returns the type tag of the value.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Null => ValueType::Null,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::Vec3(_) => ValueType::Vec3,
            Self::Function(_) => ValueType::Function,
            Self::UserPointer(_) => ValueType::UserPointer,
            Self::String(_) => ValueType::String,
            Self::Array(_) => ValueType::Array,
            Self::ArrayMember(_) => ValueType::ArrayMember,
            Self::List(_) => ValueType::List,
            Self::Dictionary(_) => ValueType::Dictionary,
            Self::Class(_) => ValueType::Class,
        }
    }

    /// Shorthand for `self.value_type().is_number_like()`.
    #[must_use]
    pub const fn is_number_like(&self) -> bool {
        self.value_type().is_number_like()
    }

    /// Replaces an [`ArrayMember`] handle by the element it points at.
    ///
    /// Every other value is returned unchanged.
    pub fn resolved(self, line: usize) -> EvalResult<Self> {
        match self {
            Self::ArrayMember(member) => member.get(line),
            other => Ok(other),
        }
    }

    /// Widens the value to `to` without narrowing.
    ///
    /// Converting to the same type is the identity. Converting to a lower
    /// ranked type, or to a type the value has no widening into, fails with
    /// `InvalidConversion`.
    ///
    /// # Parameters
    /// - `to`: The target type.
    /// - `line`: Source line for error reporting.
    ///
    /// # Example
    /// ```
    /// use sable::interpreter::value::core::{Value, ValueType};
    ///
    /// let v = Value::Int(3).upconvert(ValueType::Float, 1).unwrap();
    /// assert_eq!(v, Value::Float(3.0));
    ///
    /// assert!(Value::Float(3.5).upconvert(ValueType::Int, 1).is_err());
    /// ```
    pub fn upconvert(&self, to: ValueType, line: usize) -> EvalResult<Self> {
        if let Self::ArrayMember(member) = self {
            return member.get(line)?.upconvert(to, line);
        }

        let from = self.value_type();
        if from == to {
            return Ok(self.clone());
        }
        if from > to {
            return Err(RuntimeError::InvalidConversion { from, to, line });
        }

        match (self, to) {
            (Self::Null, ValueType::Int) => Ok(Self::Int(0)),
            (Self::Null, ValueType::Float) => Ok(Self::Float(0.0)),
            (Self::Null, ValueType::Vec3) => Ok(Self::Vec3(Vec3::default())),
            (Self::Null, ValueType::String) => Ok(Self::String("null".to_string())),
            (Self::Null, ValueType::Array) => Ok(Array::default().into()),
            (Self::Null, ValueType::List) => Ok(Vec::new().into()),
            (Self::Null, ValueType::Dictionary) => Ok(Dictionary::default().into()),
            (Self::Int(i), ValueType::Float) => Ok(Self::Float(int_to_float(*i))),
            (Self::Int(i), ValueType::Vec3) => Ok(Self::Vec3(Vec3::splat(int_to_float(*i)))),
            (Self::Float(x), ValueType::Vec3) => Ok(Self::Vec3(Vec3::splat(*x))),
            (_, ValueType::String) if from != ValueType::Null => Ok(Self::String(self.to_string())),
            (_, ValueType::Array) if from.is_array_element() => {
                Ok(Array::from_values(std::slice::from_ref(self), line)?.into())
            },
            (Self::Array(array), ValueType::List) => Ok(array.read().to_values().into()),
            (_, ValueType::List) if from.is_array_element() => Ok(vec![self.clone()].into()),
            (_, ValueType::Dictionary) => {
                let Self::List(items) = self.upconvert(ValueType::List, line)? else {
                    return Err(RuntimeError::InvalidConversion { from, to, line });
                };
                let mut dictionary = Dictionary::default();
                for (index, item) in (0_i64..).zip(items.read().iter()) {
                    dictionary.insert(Self::Int(index), item.clone(), line)?;
                }
                Ok(dictionary.into())
            },
            _ => Err(RuntimeError::InvalidConversion { from, to, line }),
        }
    }

    /// Forces the value into `to`, narrowing if needed.
    ///
    /// Narrowing may lose information: Float to Int truncates, a collection
    /// to Int yields its length, an unparsable string yields zero. Widening
    /// requests behave like [`Value::upconvert`]. A List with mixed element
    /// types cannot become an Array.
    ///
    /// # Example
    /// ```
    /// use sable::interpreter::value::core::{Value, ValueType};
    ///
    /// let list = Value::from(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    /// assert_eq!(list.hardconvert(ValueType::Int, 1).unwrap(), Value::Int(3));
    /// assert_eq!(Value::Float(2.9).hardconvert(ValueType::Int, 1).unwrap(), Value::Int(2));
    /// ```
    pub fn hardconvert(&self, to: ValueType, line: usize) -> EvalResult<Self> {
        if let Self::ArrayMember(member) = self {
            return member.get(line)?.hardconvert(to, line);
        }

        let from = self.value_type();
        if from <= to {
            return self.upconvert(to, line);
        }

        match to {
            ValueType::Null => Ok(Self::Null),
            ValueType::Int => Ok(Self::Int(self.as_int_lossy())),
            ValueType::Float => Ok(Self::Float(self.as_float_lossy())),
            ValueType::Vec3 => self.as_vec3(line).map(Self::Vec3),
            ValueType::String => Ok(Self::String(self.to_string())),
            ValueType::Array => match self {
                Self::List(items) => Ok(Array::from_values(&items.read(), line)?.into()),
                Self::Dictionary(dictionary) => {
                    Ok(Array::from_values(&dictionary.read().values(), line)?.into())
                },
                _ => Err(RuntimeError::InvalidConversion { from, to, line }),
            },
            ValueType::List => match self {
                Self::Dictionary(dictionary) => Ok(dictionary.read().values().into()),
                _ => Err(RuntimeError::InvalidConversion { from, to, line }),
            },
            _ => Err(RuntimeError::InvalidConversion { from, to, line }),
        }
    }

    /// Converts both operands to the higher rank of the two.
    pub fn unify(left: &Self, right: &Self, line: usize) -> EvalResult<(Self, Self)> {
        let rank = left.value_type().max(right.value_type());
        Ok((left.upconvert(rank, line)?, right.upconvert(rank, line)?))
    }

    /// Like [`Value::unify`], but refuses to bring a number-like value and a
    /// non-number-like value to a common type.
    pub fn unify_for_compare(left: &Self, right: &Self, line: usize) -> EvalResult<(Self, Self)> {
        if left.is_number_like() != right.is_number_like() {
            return Err(RuntimeError::IncomparableTypes { left: left.value_type(),
                                                         right: right.value_type(),
                                                         line });
        }
        Self::unify(left, right, line)
    }

    /// Truthiness used by `if`, loop tests, `!`, `&&` and `||`.
    ///
    /// Null, zero, empty strings and empty collections are false.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Int(i) => *i != 0,
            Self::Float(x) => *x != 0.0,
            Self::Vec3(v) => !v.is_zero(),
            Self::Function(_) | Self::UserPointer(_) | Self::Class(_) => true,
            Self::String(s) => !s.is_empty(),
            Self::Array(array) => !array.read().is_empty(),
            Self::ArrayMember(member) => member.get(0).is_ok_and(|v| v.is_truthy()),
            Self::List(items) => !items.read().is_empty(),
            Self::Dictionary(dictionary) => !dictionary.read().is_empty(),
        }
    }

    /// Number of elements for collections and strings.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::String(s) => Some(s.chars().count()),
            Self::Array(array) => Some(array.read().len()),
            Self::List(items) => Some(items.read().len()),
            Self::Dictionary(dictionary) => Some(dictionary.read().len()),
            Self::Class(class) => Some(class.member_count()),
            _ => None,
        }
    }

    /// Returns the type-tagged hash key for this value.
    pub fn hash_key(&self, line: usize) -> EvalResult<HashKey> {
        HashKey::from_value(self, line)
    }

    /// Copies the value, giving collections fresh storage.
    ///
    /// Elements are cloned, so nested collection handles stay shared. Class
    /// instances are returned as is.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        match self {
            Self::Array(array) => array.read().clone().into(),
            Self::List(items) => items.read().clone().into(),
            Self::Dictionary(dictionary) => dictionary.read().clone().into(),
            other => other.clone(),
        }
    }

    fn as_int_lossy(&self) -> i64 {
        match self {
            Self::Null => 0,
            Self::Int(i) => *i,
            Self::Float(x) => float_to_int(*x),
            Self::Vec3(v) => float_to_int(v.length()),
            Self::Function(_) | Self::UserPointer(_) => 1,
            Self::String(s) => parse_int_lossy(s),
            _ => self.len().map_or(0, |n| i64::try_from(n).unwrap_or(i64::MAX)),
        }
    }

    fn as_float_lossy(&self) -> f64 {
        match self {
            Self::Float(x) => *x,
            Self::Vec3(v) => v.length(),
            Self::String(s) => parse_float_lossy(s),
            other => int_to_float(other.as_int_lossy()),
        }
    }

    fn as_vec3(&self, line: usize) -> EvalResult<Vec3> {
        let components = match self {
            Self::Null | Self::Int(_) | Self::Float(_) | Self::String(_) => {
                return Ok(Vec3::splat(self.as_float_lossy()));
            },
            Self::Vec3(v) => return Ok(*v),
            Self::Array(array) => array.read().to_values(),
            Self::List(items) => items.read().clone(),
            _ => {
                return Err(RuntimeError::InvalidConversion { from: self.value_type(),
                                                             to: ValueType::Vec3,
                                                             line });
            },
        };

        let mut v = Vec3::default();
        for (index, component) in components.iter().take(3).enumerate() {
            let value = component.hardconvert(ValueType::Float, line)?;
            if let Self::Float(x) = value
               && let Some(updated) = v.with_component(index, x)
            {
                v = updated;
            }
        }
        Ok(v)
    }

    fn write_nested(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            other => other.write_display(f, depth),
        }
    }

    fn write_display(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        if depth > MAX_DISPLAY_DEPTH {
            return f.write_str("...");
        }

        match self {
            Self::Null => f.write_str("null"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => f.write_str(&format_float(*x)),
            Self::Vec3(v) => write!(f, "{v}"),
            Self::Function(function) => write!(f, "<func {}>", function.name),
            Self::UserPointer(pointer) => write!(f, "<pointer {:#x}>", pointer.address()),
            Self::String(s) => f.write_str(s),
            Self::Array(array) => write_sequence(f, &array.read().to_values(), depth),
            Self::ArrayMember(member) => match member.get(0) {
                Ok(value) => value.write_display(f, depth),
                Err(_) => f.write_str("null"),
            },
            Self::List(items) => write_sequence(f, &items.read(), depth),
            Self::Dictionary(dictionary) => {
                f.write_str("{")?;
                for (i, (key, value)) in dictionary.read().sorted_entries().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    key.write_nested(f, depth + 1)?;
                    f.write_str(": ")?;
                    value.write_nested(f, depth + 1)?;
                }
                f.write_str("}")
            },
            Self::Class(class) => {
                write!(f, "{} {{", class.name)?;
                for (i, (name, value)) in class.members().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: ")?;
                    value.write_nested(f, depth + 1)?;
                }
                f.write_str("}")
            },
        }
    }
}

fn write_sequence(f: &mut fmt::Formatter<'_>, items: &[Value], depth: usize) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        item.write_nested(f, depth + 1)?;
    }
    f.write_str("]")
}

/// Formats a float so that it always reads as a float (`5.0`, not `5`).
#[must_use]
pub fn format_float(x: f64) -> String {
    format!("{x:?}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_display(f, 0)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Vec3(a), Self::Vec3(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => Arc::ptr_eq(a, b),
            (Self::UserPointer(a), Self::UserPointer(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => Arc::ptr_eq(a, b) || *a.read() == *b.read(),
            (Self::ArrayMember(a), Self::ArrayMember(b)) => a == b,
            (Self::List(a), Self::List(b)) => Arc::ptr_eq(a, b) || *a.read() == *b.read(),
            (Self::Dictionary(a), Self::Dictionary(b)) => {
                Arc::ptr_eq(a, b) || *a.read() == *b.read()
            },
            (Self::Class(a), Self::Class(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn rank_order_follows_declaration() {
        assert!(ValueType::Null < ValueType::Int);
        assert!(ValueType::Float < ValueType::Vec3);
        assert!(ValueType::String < ValueType::Array);
        assert!(ValueType::List < ValueType::Dictionary);
        assert!(ValueType::Dictionary < ValueType::Class);
        assert!(ValueType::Vec3.is_number_like());
        assert!(!ValueType::Function.is_number_like());
    }

    #[test]
    fn null_upconverts_to_zero_values() {
        assert_eq!(Value::Null.upconvert(ValueType::Int, 1).unwrap(), Value::Int(0));
        assert_eq!(Value::Null.upconvert(ValueType::String, 1).unwrap(), Value::from("null"));
        assert_eq!(Value::Null.upconvert(ValueType::List, 1).unwrap(), Value::from(Vec::<Value>::new()));
    }

    #[test]
    fn scalars_widen_into_collections() {
        let array = Value::Int(7).upconvert(ValueType::Array, 1).unwrap();
        assert_eq!(array, Value::from(Array::Int(vec![7])));

        let list = Value::from("a").upconvert(ValueType::List, 1).unwrap();
        assert_eq!(list, Value::from(vec![Value::from("a")]));

        let vec = Value::Float(1.5).upconvert(ValueType::Vec3, 1).unwrap();
        assert_eq!(vec, Value::Vec3(Vec3::splat(1.5)));
    }

    #[test]
    fn narrowing_requires_hardconvert() {
        let err = Value::from("12").upconvert(ValueType::Int, 4).unwrap_err();
        assert_eq!(err,
                   RuntimeError::InvalidConversion { from: ValueType::String,
                                                     to:   ValueType::Int,
                                                     line: 4, });

        assert_eq!(Value::from("12").hardconvert(ValueType::Int, 4).unwrap(), Value::Int(12));
        assert_eq!(Value::from("fish").hardconvert(ValueType::Int, 4).unwrap(), Value::Int(0));
    }

    #[test]
    fn mixed_list_cannot_become_array() {
        let list = Value::from(vec![Value::Int(1), Value::from("two")]);
        let err = list.hardconvert(ValueType::Array, 2).unwrap_err();
        assert!(matches!(err, RuntimeError::HeterogeneousArray { line: 2, .. }));
    }

    #[test]
    fn compare_unification_rejects_number_against_text() {
        let err = Value::unify_for_compare(&Value::Int(1), &Value::from("1"), 3).unwrap_err();
        assert!(matches!(err, RuntimeError::IncomparableTypes { line: 3, .. }));

        let (a, b) = Value::unify_for_compare(&Value::Int(1), &Value::Float(2.0), 3).unwrap();
        assert_eq!((a, b), (Value::Float(1.0), Value::Float(2.0)));
    }

    #[test]
    fn duplicate_gives_fresh_storage() {
        let original = Value::from(vec![Value::Int(1)]);
        let alias = original.clone();
        let copy = original.duplicate();

        if let Value::List(items) = &original {
            items.write().push(Value::Int(2));
        }

        assert_eq!(alias.len(), Some(2));
        assert_eq!(copy.len(), Some(1));
    }

    #[test]
    fn display_quotes_nested_strings_only() {
        let list = Value::from(vec![Value::from("a"), Value::Float(2.0), Value::Null]);
        assert_eq!(list.to_string(), "[\"a\", 2.0, null]");
        assert_eq!(Value::from("a").to_string(), "a");
    }
}
