use std::{collections::HashMap, sync::Arc};

use ordered_float::OrderedFloat;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        value::core::{Value, ValueType},
    },
};

/// A hashable projection of a [`Value`].
///
/// The variant acts as a type discriminator folded into the hash, so `1`,
/// `1.0` and `"1"` are three different keys. Floats go through
/// `OrderedFloat` to get total equality. Functions and host pointers hash by
/// identity. Collections and class instances are mutable and cannot be keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashKey {
    /// `null`.
    Null,
    /// An integer key.
    Int(i64),
    /// A float key.
    Float(OrderedFloat<f64>),
    /// A vector key.
    Vec3([OrderedFloat<f64>; 3]),
    /// A function, by address.
    Function(usize),
    /// A host pointer, by address.
    UserPointer(usize),
    /// A string key.
    String(String),
}

impl HashKey {
    /// Computes the key for a value.
    ///
    /// # Errors
    /// `UnhashableKey` for collections and class instances.
    pub fn from_value(value: &Value, line: usize) -> EvalResult<Self> {
        Ok(match value {
            Value::Null => Self::Null,
            Value::Int(i) => Self::Int(*i),
            Value::Float(x) => Self::Float(OrderedFloat(*x)),
            Value::Vec3(v) => Self::Vec3([OrderedFloat(v.x), OrderedFloat(v.y), OrderedFloat(v.z)]),
            Value::Function(f) => Self::Function(Arc::as_ptr(f) as usize),
            Value::UserPointer(p) => Self::UserPointer(p.address()),
            Value::String(s) => Self::String(s.clone()),
            Value::ArrayMember(member) => return Self::from_value(&member.get(line)?, line),
            other => {
                return Err(RuntimeError::UnhashableKey { found: other.value_type(),
                                                         line });
            },
        })
    }
}

/// A map from values to values.
///
/// Each entry keeps the original key value next to the stored value so keys
/// can be handed back to scripts (`keys`, `foreach`).
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: HashMap<HashKey, (Value, Value)>,
}

impl Dictionary {
    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up `key`.
    pub fn get(&self, key: &Value, line: usize) -> EvalResult<Option<Value>> {
        let hash = HashKey::from_value(key, line)?;
        Ok(self.entries.get(&hash).map(|(_, value)| value.clone()))
    }

    /// Inserts or replaces the entry for `key`.
    pub fn insert(&mut self, key: Value, value: Value, line: usize) -> EvalResult<()> {
        let key = key.resolved(line)?;
        let hash = HashKey::from_value(&key, line)?;
        self.entries.insert(hash, (key, value));
        Ok(())
    }

    /// Removes the entry for `key`, returning its value.
    pub fn remove(&mut self, key: &Value, line: usize) -> EvalResult<Option<Value>> {
        let hash = HashKey::from_value(key, line)?;
        Ok(self.entries.remove(&hash).map(|(_, value)| value))
    }

    /// Copies every entry of `other` into `self`, replacing existing keys.
    pub fn merge(&mut self, other: &Self) {
        for (hash, entry) in &other.entries {
            self.entries.insert(hash.clone(), entry.clone());
        }
    }

    /// Entries ordered by key.
    #[must_use]
    pub fn sorted_entries(&self) -> Vec<(Value, Value)> {
        let mut entries = self.entries.iter().collect::<Vec<_>>();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        entries.into_iter().map(|(_, entry)| entry.clone()).collect()
    }

    /// Keys ordered by key.
    #[must_use]
    pub fn keys(&self) -> Vec<Value> {
        self.sorted_entries().into_iter().map(|(key, _)| key).collect()
    }

    /// Values ordered by key.
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        self.sorted_entries().into_iter().map(|(_, value)| value).collect()
    }

    /// Type of the keys if they all share one, used by `keys` to decide between
    /// an Array and a List.
    #[must_use]
    pub fn key_type(&self) -> Option<ValueType> {
        let mut types = self.entries.values().map(|(key, _)| key.value_type());
        let first = types.next()?;
        types.all(|t| t == first).then_some(first)
    }
}

impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
        && self.entries
               .iter()
               .all(|(hash, (_, value))| other.entries.get(hash).is_some_and(|(_, v)| v == value))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn keys_of_different_types_do_not_collide() {
        let mut dictionary = Dictionary::default();
        dictionary.insert(Value::Int(1), Value::from("int"), 1).unwrap();
        dictionary.insert(Value::Float(1.0), Value::from("float"), 1).unwrap();
        dictionary.insert(Value::from("1"), Value::from("string"), 1).unwrap();

        assert_eq!(dictionary.len(), 3);
        assert_eq!(dictionary.get(&Value::Float(1.0), 1).unwrap(), Some(Value::from("float")));
        assert_eq!(dictionary.key_type(), None);
    }

    #[test]
    fn collections_are_not_hashable() {
        let mut dictionary = Dictionary::default();
        let err = dictionary.insert(Value::from(vec![Value::Int(1)]), Value::Null, 7).unwrap_err();

        assert_eq!(err, RuntimeError::UnhashableKey { found: ValueType::List, line: 7 });
    }

    #[test]
    fn merge_replaces_existing_keys() {
        let mut a = Dictionary::default();
        a.insert(Value::from("k"), Value::Int(1), 1).unwrap();
        a.insert(Value::from("a"), Value::Int(0), 1).unwrap();

        let mut b = Dictionary::default();
        b.insert(Value::from("k"), Value::Int(2), 1).unwrap();

        a.merge(&b);

        assert_eq!(a.keys(), vec![Value::from("a"), Value::from("k")]);
        assert_eq!(a.values(), vec![Value::Int(0), Value::Int(2)]);
    }
}
