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

//! AVG aggregate function

use crate::core::{Result, Value};
use crate::functions::{
    AggregateFunction, FunctionDataType, FunctionInfo, FunctionSignature, FunctionType,
};

use super::NumericSum;

/// AVG aggregate function
///
/// Returns the average of all non-NULL values in the frame.
/// Always returns a float64.
#[derive(Default)]
pub struct AvgFunction {
    sum: NumericSum,
}

impl AggregateFunction for AvgFunction {
    fn name(&self) -> &str {
        "AVG"
    }

    fn info(&self) -> FunctionInfo {
        FunctionInfo::new(
            "AVG",
            FunctionType::Aggregate,
            "Returns the average of all non-NULL values in the specified column",
            FunctionSignature::new(FunctionDataType::Float, vec![FunctionDataType::Any], 1, 1),
        )
    }

    fn accumulate(&mut self, value: &Value) {
        self.sum.add(value);
    }

    fn retract(&mut self, value: &Value) -> Result<()> {
        self.sum.remove(value)
    }

    fn supports_retract(&self) -> bool {
        true
    }

    fn result(&self) -> Value {
        match self.sum.count() {
            0 => Value::null_unknown(),
            n => Value::Float(self.sum.as_f64() / n as f64),
        }
    }

    fn reset(&mut self) {
        self.sum.clear();
    }

    fn clone_box(&self) -> Box<dyn AggregateFunction> {
        Box::new(AvgFunction::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avg_basic() {
        let mut avg = AvgFunction::default();
        avg.accumulate(&Value::Integer(1));
        avg.accumulate(&Value::Integer(2));
        avg.accumulate(&Value::null_unknown());
        avg.accumulate(&Value::Integer(6));
        assert_eq!(avg.result(), Value::Float(3.0));
    }

    #[test]
    fn test_avg_retract() {
        let mut avg = AvgFunction::default();
        avg.accumulate(&Value::Integer(10));
        avg.accumulate(&Value::Integer(20));
        avg.retract(&Value::Integer(10)).unwrap();
        assert_eq!(avg.result(), Value::Float(20.0));
        avg.retract(&Value::Integer(20)).unwrap();
        assert!(avg.result().is_null());
    }
}
