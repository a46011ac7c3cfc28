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

//! SUM aggregate function

use crate::core::{Result, Value};
use crate::functions::{
    AggregateFunction, FunctionDataType, FunctionInfo, FunctionSignature, FunctionType,
};

use super::NumericSum;

/// SUM aggregate function
///
/// Returns the sum of all non-NULL values in the frame.
/// Returns int64 for integer inputs, float64 once a float is in the frame,
/// NULL for a frame without numeric values.
#[derive(Default)]
pub struct SumFunction {
    sum: NumericSum,
}

impl AggregateFunction for SumFunction {
    fn name(&self) -> &str {
        "SUM"
    }

    fn info(&self) -> FunctionInfo {
        FunctionInfo::new(
            "SUM",
            FunctionType::Aggregate,
            "Returns the sum of all non-NULL values in the specified column",
            FunctionSignature::new(
                FunctionDataType::Any, // can return either int64 or float64
                vec![FunctionDataType::Any],
                1,
                1,
            ),
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
        self.sum.total().unwrap_or_else(Value::null_unknown)
    }

    fn reset(&mut self) {
        self.sum.clear();
    }

    fn clone_box(&self) -> Box<dyn AggregateFunction> {
        Box::new(SumFunction::default())
    }
}
