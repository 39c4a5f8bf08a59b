//! Records attached to environment steps.
//!
//! A [`Record`] is the `info` mapping of the stepping contract: a string-keyed map of
//! scalars, vectors and strings. Adapters return an empty record unless the native
//! backend reports something.
use crate::error::SurrealError;
use std::collections::{
    hash_map::{IntoIter, Iter, Keys},
    HashMap,
};

/// Represents possible types of values that can be stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single floating-point value.
    Scalar(f32),

    /// A 1-dimensional array of floating-point values.
    Array1(Vec<f32>),

    /// A text value.
    String(String),
}

/// A container for storing key-value pairs of various data types.
///
/// ```rust
/// use surreal_core::record::{Record, RecordValue};
///
/// let mut record = Record::from_scalar("x_position", 0.5);
/// record.insert("terminal_reason", RecordValue::String("fell".into()));
/// assert_eq!(record.get_scalar("x_position").unwrap(), 0.5);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Returns an iterator over the keys in the record.
    pub fn keys(&self) -> Keys<String, RecordValue> {
        self.0.keys()
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over the key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Merges another record into this one in place.
    ///
    /// Values of `record` overwrite values with the same key.
    pub fn merge_inplace(&mut self, record: Record) {
        for (k, v) in record {
            self.0.insert(k, v);
        }
    }

    /// Gets a scalar value from the record.
    pub fn get_scalar(&self, k: &str) -> Result<f32, SurrealError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            Some(_) => Err(SurrealError::RecordValueTypeError("Scalar".to_string())),
            None => Err(SurrealError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a 1-dimensional array from the record.
    pub fn get_array1(&self, k: &str) -> Result<Vec<f32>, SurrealError> {
        match self.0.get(k) {
            Some(RecordValue::Array1(v)) => Ok(v.clone()),
            Some(_) => Err(SurrealError::RecordValueTypeError("Array1".to_string())),
            None => Err(SurrealError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a string value from the record.
    pub fn get_string(&self, k: &str) -> Result<String, SurrealError> {
        match self.0.get(k) {
            Some(RecordValue::String(s)) => Ok(s.clone()),
            Some(_) => Err(SurrealError::RecordValueTypeError("String".to_string())),
            None => Err(SurrealError::RecordKeyError(k.to_string())),
        }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks if the record is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for Record {
    type Item = (String, RecordValue);
    type IntoIter = IntoIter<String, RecordValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_getters() {
        let mut record = Record::from_scalar("a", 1.0);
        record.insert("b", RecordValue::Array1(vec![1.0, 2.0]));

        assert_eq!(record.get_scalar("a").unwrap(), 1.0);
        assert_eq!(record.get_array1("b").unwrap(), vec![1.0, 2.0]);
        assert!(matches!(
            record.get_scalar("b"),
            Err(SurrealError::RecordValueTypeError(_))
        ));
        assert!(matches!(
            record.get_string("c"),
            Err(SurrealError::RecordKeyError(_))
        ));
    }

    #[test]
    fn test_merge_overwrites() {
        let mut r1 = Record::from_scalar("a", 1.0);
        let r2 = Record::from_slice(&[
            ("a", RecordValue::Scalar(2.0)),
            ("b", RecordValue::String("x".into())),
        ]);
        r1.merge_inplace(r2);

        assert_eq!(r1.len(), 2);
        assert_eq!(r1.get_scalar("a").unwrap(), 2.0);
    }
}
