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

//! MIN aggregate function

use crate::core::{Result, Value};
use crate::functions::{
    AggregateFunction, FunctionDataType, FunctionInfo, FunctionSignature, FunctionType,
};

use super::ValueMultiset;

/// MIN aggregate function
///
/// Returns the minimum of all non-NULL values in the frame.
/// Works with any comparable type (numbers, strings, timestamps, etc.)
#[derive(Default)]
pub struct MinFunction {
    values: ValueMultiset,
}

impl AggregateFunction for MinFunction {
    fn name(&self) -> &str {
        "MIN"
    }

    fn info(&self) -> FunctionInfo {
        FunctionInfo::new(
            "MIN",
            FunctionType::Aggregate,
            "Returns the minimum value of all non-NULL values in the specified column",
            FunctionSignature::new(
                FunctionDataType::Any, // MIN returns the same type as input
                vec![FunctionDataType::Any],
                1,
                1,
            ),
        )
    }

    fn accumulate(&mut self, value: &Value) {
        if !value.is_null() {
            self.values.insert(value);
        }
    }

    fn retract(&mut self, value: &Value) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        self.values.remove(value)
    }

    fn supports_retract(&self) -> bool {
        true
    }

    fn result(&self) -> Value {
        self.values.first().cloned().unwrap_or_else(Value::null_unknown)
    }

    fn reset(&mut self) {
        self.values.clear();
    }

    fn clone_box(&self) -> Box<dyn AggregateFunction> {
        Box::new(MinFunction::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_integers() {
        let mut min = MinFunction::default();
        min.accumulate(&Value::Integer(5));
        min.accumulate(&Value::null_unknown());
        min.accumulate(&Value::Integer(2));
        min.accumulate(&Value::Integer(8));
        assert_eq!(min.result(), Value::Integer(2));
    }

    #[test]
    fn test_min_text() {
        let mut min = MinFunction::default();
        min.accumulate(&Value::text("pear"));
        min.accumulate(&Value::text("apple"));
        assert_eq!(min.result(), Value::text("apple"));
    }

    #[test]
    fn test_min_retract_current_minimum() {
        let mut min = MinFunction::default();
        min.accumulate(&Value::Integer(2));
        min.accumulate(&Value::Integer(7));
        min.retract(&Value::Integer(2)).unwrap();
        assert_eq!(min.result(), Value::Integer(7));
        min.retract(&Value::Integer(7)).unwrap();
        assert!(min.result().is_null());
    }
}
