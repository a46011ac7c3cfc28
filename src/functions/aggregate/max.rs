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

//! MAX aggregate function

use crate::core::{Result, Value};
use crate::functions::{
    AggregateFunction, FunctionDataType, FunctionInfo, FunctionSignature, FunctionType,
};

use super::ValueMultiset;

/// MAX aggregate function
///
/// Returns the maximum of all non-NULL values in the frame.
#[derive(Default)]
pub struct MaxFunction {
    values: ValueMultiset,
}

impl AggregateFunction for MaxFunction {
    fn name(&self) -> &str {
        "MAX"
    }

    fn info(&self) -> FunctionInfo {
        FunctionInfo::new(
            "MAX",
            FunctionType::Aggregate,
            "Returns the maximum value of all non-NULL values in the specified column",
            FunctionSignature::new(FunctionDataType::Any, vec![FunctionDataType::Any], 1, 1),
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
        self.values.last().cloned().unwrap_or_else(Value::null_unknown)
    }

    fn reset(&mut self) {
        self.values.clear();
    }

    fn clone_box(&self) -> Box<dyn AggregateFunction> {
        Box::new(MaxFunction::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_mixed_numeric() {
        let mut max = MaxFunction::default();
        max.accumulate(&Value::Integer(5));
        max.accumulate(&Value::Float(5.5));
        max.accumulate(&Value::Integer(3));
        assert_eq!(max.result(), Value::Float(5.5));
    }

    #[test]
    fn test_max_retract_duplicates() {
        let mut max = MaxFunction::default();
        max.accumulate(&Value::Integer(9));
        max.accumulate(&Value::Integer(9));
        max.accumulate(&Value::Integer(1));
        max.retract(&Value::Integer(9)).unwrap();
        assert_eq!(max.result(), Value::Integer(9));
        max.retract(&Value::Integer(9)).unwrap();
        assert_eq!(max.result(), Value::Integer(1));
    }

    #[test]
    fn test_max_empty() {
        assert!(MaxFunction::default().result().is_null());
    }
}
