// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Row type for overframe - a collection of field values

use std::fmt;
use std::ops::{Deref, Index};
use std::sync::Arc;

use super::error::{Error, Result};
use super::value::Value;

/// Internal storage for Row - either owned Vec or shared Arc
#[derive(Debug, Clone)]
enum RowStorage {
    /// Owned storage - supports mutation
    Owned(Vec<Value>),
    /// Shared storage - O(1) clone, copy-on-write for mutation
    Shared(Arc<[Value]>),
}

impl Default for RowStorage {
    fn default() -> Self {
        RowStorage::Owned(Vec::new())
    }
}

impl PartialEq for RowStorage {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl RowStorage {
    #[inline]
    fn as_slice(&self) -> &[Value] {
        match self {
            RowStorage::Owned(v) => v,
            RowStorage::Shared(a) => a,
        }
    }

    /// Get mutable access, converting to owned if necessary (copy-on-write)
    #[inline]
    fn make_mut(&mut self) -> &mut Vec<Value> {
        if let RowStorage::Shared(arc) = self {
            *self = RowStorage::Owned(arc.to_vec());
        }
        match self {
            RowStorage::Owned(v) => v,
            RowStorage::Shared(_) => unreachable!("storage converted to owned above"),
        }
    }

    #[inline]
    fn into_vec(self) -> Vec<Value> {
        match self {
            RowStorage::Owned(v) => v,
            RowStorage::Shared(arc) => arc.to_vec(),
        }
    }
}

/// A row of field values
///
/// Rows held in a partition buffer are shared (`Arc<[Value]>`), so reading
/// one back for a frame is an O(1) clone. Mutations trigger copy-on-write.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    storage: RowStorage,
}

impl Row {
    /// Create a new empty row
    #[inline]
    pub fn new() -> Self {
        Self {
            storage: RowStorage::Owned(Vec::new()),
        }
    }

    /// Create a row with pre-allocated capacity
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: RowStorage::Owned(Vec::with_capacity(capacity)),
        }
    }

    /// Create a row from a vector of values
    #[inline]
    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            storage: RowStorage::Owned(values),
        }
    }

    /// Create a row from an Arc slice - O(1) clone
    #[inline]
    pub fn from_arc(values: Arc<[Value]>) -> Self {
        Self {
            storage: RowStorage::Shared(values),
        }
    }

    /// Convert into shared storage so further clones are O(1)
    pub fn into_shared(self) -> Self {
        match self.storage {
            RowStorage::Shared(_) => self,
            RowStorage::Owned(v) => Self {
                storage: RowStorage::Shared(Arc::from(v)),
            },
        }
    }

    /// Get the number of values in the row
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.as_slice().len()
    }

    /// Check if the row is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get a value by index
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.storage.as_slice().get(index)
    }

    /// Get a value by index, failing when the row is too short
    pub fn field(&self, index: usize) -> Result<&Value> {
        self.get(index).ok_or(Error::FieldIndexOutOfBounds {
            index,
            arity: self.len(),
        })
    }

    /// Push a value to the end of the row (triggers copy-on-write if shared)
    #[inline]
    pub fn push(&mut self, value: Value) {
        self.storage.make_mut().push(value);
    }

    /// Extend the row with values from a slice (clones the values)
    #[inline]
    pub fn extend_from_slice(&mut self, other: &[Value]) {
        self.storage.make_mut().extend_from_slice(other);
    }

    /// Get an iterator over the values
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.storage.as_slice().iter()
    }

    /// Get the underlying vector of values
    #[inline]
    pub fn into_values(self) -> Vec<Value> {
        self.storage.into_vec()
    }

    /// Get a reference to the underlying slice
    #[inline]
    pub fn as_slice(&self) -> &[Value] {
        self.storage.as_slice()
    }

    /// Approximate in-memory footprint in bytes
    pub fn estimated_size(&self) -> usize {
        std::mem::size_of::<Row>() + self.iter().map(Value::estimated_size).sum::<usize>()
    }

    /// Concatenate two rows
    pub fn concat(&self, other: &Row) -> Row {
        let mut values = Vec::with_capacity(self.len() + other.len());
        values.extend_from_slice(self.storage.as_slice());
        values.extend_from_slice(other.storage.as_slice());
        Row::from_values(values)
    }
}

impl Deref for Row {
    type Target = [Value];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.storage.as_slice()
    }
}

impl Index<usize> for Row {
    type Output = Value;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.storage.as_slice()[index]
    }
}

impl FromIterator<Value> for Row {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Row::from_values(iter.into_iter().collect())
    }
}

impl IntoIterator for Row {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.storage.into_vec().into_iter()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.storage.as_slice().iter()
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Row::from_values(values)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.storage.as_slice().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, ")")
    }
}

/// Macro for creating rows conveniently
#[macro_export]
macro_rules! row {
    () => {
        $crate::core::Row::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::core::Row::from_values(vec![$($crate::core::Value::from($value)),+])
    };
}
