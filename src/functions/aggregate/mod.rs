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

//! Aggregate Functions
//!
//! Retractable aggregates for framed windows:
//!
//! - [`CountFunction`] - COUNT(*) and COUNT(column)
//! - [`SumFunction`] - SUM(column)
//! - [`AvgFunction`] - AVG(column)
//! - [`MinFunction`] - MIN(column)
//! - [`MaxFunction`] - MAX(column)

mod avg;
mod count;
mod max;
mod min;
mod sum;

pub use avg::AvgFunction;
pub use count::CountFunction;
pub use max::MaxFunction;
pub use min::MinFunction;
pub use sum::SumFunction;

use std::collections::BTreeMap;

use crate::core::{Error, Result, Value};

/// Running numeric sum that can take values back out
///
/// Integers add with wrapping arithmetic so that retracting exactly undoes
/// accumulating. The result stays an integer until a float is in the frame.
#[derive(Debug, Default, Clone)]
pub(crate) struct NumericSum {
    int_sum: i64,
    float_sum: f64,
    float_count: usize,
    count: usize,
}

impl NumericSum {
    /// Add a value, ignoring NULL and non-numeric values
    pub(crate) fn add(&mut self, value: &Value) {
        match value {
            Value::Integer(i) => {
                self.int_sum = self.int_sum.wrapping_add(*i);
                self.count += 1;
            }
            Value::Float(f) => {
                self.float_sum += f;
                self.float_count += 1;
                self.count += 1;
            }
            _ => {}
        }
    }

    /// Remove a value previously passed to [`add`](Self::add)
    pub(crate) fn remove(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Integer(i) => {
                self.take_one()?;
                self.int_sum = self.int_sum.wrapping_sub(*i);
            }
            Value::Float(f) => {
                self.take_one()?;
                self.float_count = self.float_count.saturating_sub(1);
                self.float_sum -= f;
                if self.float_count == 0 {
                    self.float_sum = 0.0;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn take_one(&mut self) -> Result<()> {
        self.count = self
            .count
            .checked_sub(1)
            .ok_or_else(|| Error::internal("retract from an empty sum"))?;
        Ok(())
    }

    /// Number of numeric values currently summed
    pub(crate) fn count(&self) -> usize {
        self.count
    }

    /// The sum, or None when no value is present
    pub(crate) fn total(&self) -> Option<Value> {
        if self.count == 0 {
            None
        } else if self.float_count > 0 {
            Some(Value::Float(self.int_sum as f64 + self.float_sum))
        } else {
            Some(Value::Integer(self.int_sum))
        }
    }

    pub(crate) fn as_f64(&self) -> f64 {
        self.int_sum as f64 + self.float_sum
    }

    pub(crate) fn clear(&mut self) {
        *self = NumericSum::default();
    }
}

/// Counted multiset of values, ordered by the total order of [`Value`]
///
/// MIN and MAX keep every value in the frame here so the extreme can be
/// recovered after the current one is retracted.
#[derive(Debug, Default, Clone)]
pub(crate) struct ValueMultiset {
    counts: BTreeMap<Value, usize>,
}

impl ValueMultiset {
    pub(crate) fn insert(&mut self, value: &Value) {
        *self.counts.entry(value.clone()).or_insert(0) += 1;
    }

    pub(crate) fn remove(&mut self, value: &Value) -> Result<()> {
        match self.counts.get_mut(value) {
            Some(n) if *n > 1 => {
                *n -= 1;
                Ok(())
            }
            Some(_) => {
                self.counts.remove(value);
                Ok(())
            }
            None => Err(Error::internal(format!(
                "retracted value {} was never accumulated",
                value
            ))),
        }
    }

    pub(crate) fn first(&self) -> Option<&Value> {
        self.counts.keys().next()
    }

    pub(crate) fn last(&self) -> Option<&Value> {
        self.counts.keys().next_back()
    }

    pub(crate) fn clear(&mut self) {
        self.counts.clear();
    }
}
