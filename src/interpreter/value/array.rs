use std::sync::Arc;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        value::{
            core::{UserPointer, Value, ValueType},
            function::Function,
            vec3::Vec3,
        },
    },
    util::num::index_checked,
};

/// A homogeneous array.
///
/// Elements live in one concrete vector per element type, so an array of
/// integers never holds a string. An empty array is untyped in practice: the
/// first push decides its element type.
#[derive(Debug, Clone, PartialEq)]
pub enum Array {
    /// Integers.
    Int(Vec<i64>),
    /// Floats.
    Float(Vec<f64>),
    /// Vectors.
    Vec3(Vec<Vec3>),
    /// Function references.
    Function(Vec<Arc<Function>>),
    /// Host pointers.
    UserPointer(Vec<UserPointer>),
    /// Strings.
    String(Vec<String>),
}

impl Default for Array {
    fn default() -> Self {
        Self::Int(Vec::new())
    }
}

/// Runs `$body` against the inner vector whatever the element type.
macro_rules! with_elements {
    ($array:expr, $v:ident => $body:expr) => {
        match $array {
            Array::Int($v) => $body,
            Array::Float($v) => $body,
            Array::Vec3($v) => $body,
            Array::Function($v) => $body,
            Array::UserPointer($v) => $body,
            Array::String($v) => $body,
        }
    };
}

impl Array {
    /// Creates an empty array of the given element type.
    ///
    /// Returns `None` if arrays cannot hold that type.
    #[must_use]
    pub const fn empty_of(element: ValueType) -> Option<Self> {
        Some(match element {
            ValueType::Int => Self::Int(Vec::new()),
            ValueType::Float => Self::Float(Vec::new()),
            ValueType::Vec3 => Self::Vec3(Vec::new()),
            ValueType::Function => Self::Function(Vec::new()),
            ValueType::UserPointer => Self::UserPointer(Vec::new()),
            ValueType::String => Self::String(Vec::new()),
            _ => return None,
        })
    }

    /// Reports which concrete vector backs the array.
    #[must_use]
    pub const fn element_type(&self) -> ValueType {
        match self {
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::Vec3(_) => ValueType::Vec3,
            Self::Function(_) => ValueType::Function,
            Self::UserPointer(_) => ValueType::UserPointer,
            Self::String(_) => ValueType::String,
        }
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        with_elements!(self, v => v.len())
    }

    /// Returns `true` if the array has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the element at `index` as a value.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        with_elements!(self, v => v.get(index).cloned().map(Value::from))
    }

    /// Copies every element out as a value, switching on the element type.
    #[must_use]
    pub fn to_values(&self) -> Vec<Value> {
        with_elements!(self, v => v.iter().cloned().map(Value::from).collect())
    }

    /// Builds an array from values that must all share one array element
    /// type.
    ///
    /// # Errors
    /// - `HeterogeneousArray` if two elements have different types.
    /// - `InvalidConversion` if the elements are not array element types.
    ///
    /// # Example
    /// ```
    /// use sable::interpreter::value::{array::Array, core::Value};
    ///
    /// let array = Array::from_values(&[Value::Int(1), Value::Int(2)], 1).unwrap();
    /// assert_eq!(array, Array::Int(vec![1, 2]));
    ///
    /// assert!(Array::from_values(&[Value::Int(1), Value::Float(2.0)], 1).is_err());
    /// ```
    pub fn from_values(values: &[Value], line: usize) -> EvalResult<Self> {
        let Some(first) = values.first() else {
            return Ok(Self::default());
        };

        let element = first.value_type();
        let mut array = Self::empty_of(element).ok_or(RuntimeError::InvalidConversion {
            from: element,
            to: ValueType::Array,
            line,
        })?;

        for value in values {
            if value.value_type() != element {
                return Err(RuntimeError::HeterogeneousArray { first: element,
                                                              second: value.value_type(),
                                                              line });
            }
            array.store(None, value.clone(), line)?;
        }
        Ok(array)
    }

    /// Appends a value.
    ///
    /// An empty array adopts the value's type. Otherwise the value must have
    /// the element type, or be a lower ranked number that widens into it.
    pub fn push(&mut self, value: Value, line: usize) -> EvalResult<()> {
        if self.is_empty() && value.value_type() != self.element_type() {
            let element = value.value_type();
            *self = Self::empty_of(element).ok_or(RuntimeError::InvalidConversion {
                from: element,
                to: ValueType::Array,
                line,
            })?;
        }
        self.store(None, value, line)
    }

    /// Replaces the element at `index`.
    pub fn set(&mut self, index: usize, value: Value, line: usize) -> EvalResult<()> {
        self.store(Some(index), value, line)
    }

    /// Appends every element of `other`.
    ///
    /// Both arrays must have the same element type unless one of them is
    /// empty.
    pub fn extend(&mut self, other: &Self, line: usize) -> EvalResult<()> {
        if other.is_empty() {
            return Ok(());
        }
        if self.is_empty() {
            *self = other.clone();
            return Ok(());
        }

        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.extend_from_slice(b),
            (Self::Float(a), Self::Float(b)) => a.extend_from_slice(b),
            (Self::Vec3(a), Self::Vec3(b)) => a.extend_from_slice(b),
            (Self::Function(a), Self::Function(b)) => a.extend_from_slice(b),
            (Self::UserPointer(a), Self::UserPointer(b)) => a.extend_from_slice(b),
            (Self::String(a), Self::String(b)) => a.extend_from_slice(b),
            (a, b) => {
                return Err(RuntimeError::HeterogeneousArray { first: a.element_type(),
                                                              second: b.element_type(),
                                                              line });
            },
        }
        Ok(())
    }

    fn store(&mut self, index: Option<usize>, value: Value, line: usize) -> EvalResult<()> {
        let element = self.element_type();
        let found = value.value_type();
        let widens = found < element && found.is_number_like() && element.is_number_like();
        if found != element && !widens {
            return Err(RuntimeError::HeterogeneousArray { first: element,
                                                          second: found,
                                                          line });
        }
        let len = self.len();

        match (self, value.upconvert(element, line)?) {
            (Self::Int(v), Value::Int(x)) => place(v, index, x, len, line),
            (Self::Float(v), Value::Float(x)) => place(v, index, x, len, line),
            (Self::Vec3(v), Value::Vec3(x)) => place(v, index, x, len, line),
            (Self::Function(v), Value::Function(x)) => place(v, index, x, len, line),
            (Self::UserPointer(v), Value::UserPointer(x)) => place(v, index, x, len, line),
            (Self::String(v), Value::String(x)) => place(v, index, x, len, line),
            (array, other) => Err(RuntimeError::HeterogeneousArray { first: array.element_type(),
                                                                     second: other.value_type(),
                                                                     line }),
        }
    }
}

fn place<T>(v: &mut Vec<T>, index: Option<usize>, x: T, len: usize, line: usize) -> EvalResult<()> {
    match index {
        None => v.push(x),
        Some(i) => match v.get_mut(i) {
            Some(slot) => *slot = x,
            None => {
                return Err(RuntimeError::IndexOutOfBounds { index: i64::try_from(i).unwrap_or(i64::MAX),
                                                            len,
                                                            line });
            },
        },
    }
    Ok(())
}

/// A transient handle to one element of a collection.
///
/// Produced when the target of an assignment is an index or member
/// expression (`a[1] = ...`, `p.x = ...`). Reads resolve through the handle to
/// the current element; writes go straight into the shared storage.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayMember {
    collection: Box<Value>,
    key:        Box<Value>,
}

impl ArrayMember {
    /// Creates a handle to `collection[key]`.
    #[must_use]
    pub fn new(collection: Value, key: Value) -> Self {
        Self { collection: Box::new(collection),
               key:        Box::new(key), }
    }

    /// The collection the handle points into.
    #[must_use]
    pub fn collection(&self) -> &Value {
        &self.collection
    }

    /// The index or key of the element.
    #[must_use]
    pub fn key(&self) -> &Value {
        &self.key
    }

    /// Reads the element.
    ///
    /// Arrays, lists and strings are indexed by integer; vectors by `0..3` or
    /// `x`/`y`/`z`; dictionaries by any hashable key (a missing key reads as
    /// null); class instances by member name.
    pub fn get(&self, line: usize) -> EvalResult<Value> {
        match &*self.collection {
            Value::Array(array) => {
                let array = array.read();
                let index = index_checked(&self.key, array.len(), line)?;
                Ok(array.get(index).unwrap_or(Value::Null))
            },
            Value::List(items) => {
                let items = items.read();
                let index = index_checked(&self.key, items.len(), line)?;
                Ok(items[index].clone())
            },
            Value::String(s) => {
                let index = index_checked(&self.key, s.chars().count(), line)?;
                Ok(s.chars().nth(index).map_or(Value::Null, |c| Value::String(c.to_string())))
            },
            Value::Vec3(v) => {
                let index = match &*self.key {
                    Value::String(name) => Vec3::component_index(name).ok_or_else(|| {
                                               RuntimeError::UnknownMember { name: name.clone(),
                                                                             found: ValueType::Vec3,
                                                                             line }
                                           })?,
                    key => index_checked(key, 3, line)?,
                };
                Ok(v.component(index).map_or(Value::Null, Value::Float))
            },
            Value::Dictionary(dictionary) => {
                Ok(dictionary.read().get(&self.key, line)?.unwrap_or(Value::Null))
            },
            Value::Class(class) => {
                let name = member_name(&self.key, line)?;
                class.member(name).ok_or_else(|| RuntimeError::UnknownMember { name: name.to_string(),
                                                                                found: ValueType::Class,
                                                                                line })
            },
            Value::ArrayMember(inner) => {
                Self::new(inner.get(line)?, (*self.key).clone()).get(line)
            },
            other => Err(RuntimeError::TypeError { details: format!("cannot index a value of type {}",
                                                                    other.value_type()),
                                                   line }),
        }
    }

    /// Writes the element in place.
    pub fn set(&self, value: Value, line: usize) -> EvalResult<()> {
        match &*self.collection {
            Value::Array(array) => {
                let mut array = array.write();
                let index = index_checked(&self.key, array.len(), line)?;
                array.set(index, value, line)
            },
            Value::List(items) => {
                let mut items = items.write();
                let index = index_checked(&self.key, items.len(), line)?;
                items[index] = value;
                Ok(())
            },
            Value::Dictionary(dictionary) => {
                dictionary.write().insert((*self.key).clone(), value, line)
            },
            Value::Class(class) => {
                class.set_member(member_name(&self.key, line)?, value);
                Ok(())
            },
            Value::ArrayMember(inner) => {
                Self::new(inner.get(line)?, (*self.key).clone()).set(value, line)
            },
            _ => Err(RuntimeError::InvalidAssignmentTarget { line }),
        }
    }
}

fn member_name(key: &Value, line: usize) -> EvalResult<&str> {
    match key {
        Value::String(name) => Ok(name),
        other => Err(RuntimeError::TypeError { details: format!("member names must be strings, found {}",
                                                                other.value_type()),
                                               line }),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_array_adopts_first_pushed_type() {
        let mut array = Array::default();
        array.push(Value::from("x"), 1).unwrap();

        assert_eq!(array.element_type(), ValueType::String);
        assert_eq!(array.to_values(), vec![Value::from("x")]);
    }

    #[test]
    fn push_widens_numbers_but_rejects_other_types() {
        let mut array = Array::Float(vec![1.0]);
        array.push(Value::Int(2), 1).unwrap();
        assert_eq!(array, Array::Float(vec![1.0, 2.0]));

        let err = array.push(Value::from("three"), 5).unwrap_err();
        assert_eq!(err,
                   RuntimeError::HeterogeneousArray { first:  ValueType::Float,
                                                      second: ValueType::String,
                                                      line:   5, });
    }

    #[test]
    fn extend_requires_matching_types() {
        let mut a = Array::Int(vec![1, 2]);
        a.extend(&Array::Int(vec![3, 4]), 1).unwrap();
        assert_eq!(a.len(), 4);

        assert!(a.extend(&Array::String(vec!["x".into()]), 1).is_err());
    }

    #[test]
    fn member_handle_writes_through_shared_storage() {
        let list = Value::from(vec![Value::Int(1), Value::from("b")]);
        let member = ArrayMember::new(list.clone(), Value::Int(1));

        member.set(Value::Float(2.5), 1).unwrap();

        assert_eq!(member.get(1).unwrap(), Value::Float(2.5));
        assert_eq!(list.to_string(), "[1, 2.5]");
    }

    #[test]
    fn out_of_bounds_index_is_reported() {
        let array = Value::from(Array::Int(vec![1, 2, 3]));
        let err = ArrayMember::new(array, Value::Int(3)).get(9).unwrap_err();

        assert_eq!(err, RuntimeError::IndexOutOfBounds { index: 3, len: 3, line: 9 });
    }
}
