//! The variable-store abstraction over swath files.
//!
//! A store answers two questions: how long is a named dimension, and what
//! are the flattened contents of a named variable. Every read states the
//! length the caller expects; a variable that is absent or has a different
//! element count is an error, never a default.

use std::collections::HashMap;

use crate::error::{NetCdfError, NetCdfResult};

/// Read access to the named dimensions and variables of one opened file.
pub trait VariableStore {
    /// Human-readable origin of the data (usually the file path).
    fn source(&self) -> &str;

    /// Extent of a named dimension.
    fn dimension(&self, name: &str) -> NetCdfResult<usize>;

    /// Whether a variable with this name exists.
    fn has_variable(&self, name: &str) -> bool;

    /// Read a numeric variable as `f32`, checking its element count.
    fn read_f32(&self, name: &str, expected_len: usize) -> NetCdfResult<Vec<f32>>;

    /// Read an integer variable as `i64`, checking its element count.
    ///
    /// Floating-point variables are rejected rather than truncated.
    fn read_i64(&self, name: &str, expected_len: usize) -> NetCdfResult<Vec<i64>>;
}

/// Fail with [`NetCdfError::ShapeMismatch`] if `actual != expected`.
pub fn check_len(name: &str, expected: usize, actual: usize) -> NetCdfResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(NetCdfError::ShapeMismatch {
            name: name.to_string(),
            expected,
            actual,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum StoredArray {
    Float(Vec<f32>),
    Int(Vec<i64>),
}

impl StoredArray {
    fn len(&self) -> usize {
        match self {
            StoredArray::Float(v) => v.len(),
            StoredArray::Int(v) => v.len(),
        }
    }
}

/// A [`VariableStore`] held entirely in memory.
///
/// Used by drivers that already hold decoded arrays and by the test suites.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    source: String,
    dimensions: HashMap<String, usize>,
    variables: HashMap<String, StoredArray>,
}

impl MemoryStore {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    pub fn with_dimension(mut self, name: &str, len: usize) -> Self {
        self.set_dimension(name, len);
        self
    }

    pub fn set_dimension(&mut self, name: &str, len: usize) {
        self.dimensions.insert(name.to_string(), len);
    }

    pub fn insert_f32(&mut self, name: &str, values: Vec<f32>) {
        self.variables
            .insert(name.to_string(), StoredArray::Float(values));
    }

    pub fn insert_i64(&mut self, name: &str, values: Vec<i64>) {
        self.variables.insert(name.to_string(), StoredArray::Int(values));
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.variables.remove(name).is_some()
    }

    fn get(&self, name: &str, expected_len: usize) -> NetCdfResult<&StoredArray> {
        let array = self
            .variables
            .get(name)
            .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", name)))?;
        check_len(name, expected_len, array.len())?;
        Ok(array)
    }
}

impl VariableStore for MemoryStore {
    fn source(&self) -> &str {
        &self.source
    }

    fn dimension(&self, name: &str) -> NetCdfResult<usize> {
        self.dimensions
            .get(name)
            .copied()
            .ok_or_else(|| NetCdfError::MissingData(format!("{} dimension", name)))
    }

    fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    fn read_f32(&self, name: &str, expected_len: usize) -> NetCdfResult<Vec<f32>> {
        Ok(match self.get(name, expected_len)? {
            StoredArray::Float(v) => v.clone(),
            StoredArray::Int(v) => v.iter().map(|&x| x as f32).collect(),
        })
    }

    fn read_i64(&self, name: &str, expected_len: usize) -> NetCdfResult<Vec<i64>> {
        match self.get(name, expected_len)? {
            StoredArray::Int(v) => Ok(v.clone()),
            StoredArray::Float(_) => Err(NetCdfError::InvalidFormat(format!(
                "{} is floating point, expected integers",
                name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new("memory://test")
            .with_dimension("spots", 2)
            .with_dimension("scans", 3);
        store.insert_f32("latitude", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        store.insert_i64("Year", vec![2020, 2020, 2020]);
        store
    }

    #[test]
    fn test_dimension_lookup() {
        let store = store();
        assert_eq!(store.dimension("spots").unwrap(), 2);
        assert!(matches!(
            store.dimension("channels"),
            Err(NetCdfError::MissingData(_))
        ));
    }

    #[test]
    fn test_read_checks_length() {
        let store = store();
        assert_eq!(store.read_f32("latitude", 6).unwrap().len(), 6);
        match store.read_f32("latitude", 5) {
            Err(NetCdfError::ShapeMismatch {
                expected, actual, ..
            }) => {
                assert_eq!(expected, 5);
                assert_eq!(actual, 6);
            }
            other => panic!("expected shape mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_variable_is_an_error() {
        let store = store();
        assert!(!store.has_variable("longitude"));
        assert!(matches!(
            store.read_f32("longitude", 6),
            Err(NetCdfError::MissingData(_))
        ));
    }

    #[test]
    fn test_integers_widen_to_float() {
        let store = store();
        assert_eq!(store.read_f32("Year", 3).unwrap(), vec![2020.0; 3]);
    }

    #[test]
    fn test_floats_are_not_truncated_to_integers() {
        let store = store();
        assert!(matches!(
            store.read_i64("latitude", 6),
            Err(NetCdfError::InvalidFormat(_))
        ));
    }
}
