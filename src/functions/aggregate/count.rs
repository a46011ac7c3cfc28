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

//! COUNT aggregate function

use crate::core::{Error, Result, Value};
use crate::functions::{
    AggregateFunction, FunctionDataType, FunctionInfo, FunctionSignature, FunctionType,
};

/// COUNT aggregate function
///
/// - COUNT(*) counts all rows in the frame; calls without arguments are fed
///   a non-NULL marker per row
/// - COUNT(column) counts non-NULL values
#[derive(Default)]
pub struct CountFunction {
    count: i64,
}

impl AggregateFunction for CountFunction {
    fn name(&self) -> &str {
        "COUNT"
    }

    fn info(&self) -> FunctionInfo {
        FunctionInfo::new(
            "COUNT",
            FunctionType::Aggregate,
            "Returns the number of rows matching the query criteria",
            FunctionSignature::new(
                FunctionDataType::Integer,
                vec![FunctionDataType::Any],
                0, // COUNT(*) has no actual argument
                1, // But can be COUNT(column)
            ),
        )
    }

    fn accumulate(&mut self, value: &Value) {
        if !value.is_null() {
            self.count += 1;
        }
    }

    fn retract(&mut self, value: &Value) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        if self.count == 0 {
            return Err(Error::internal("COUNT retracted below zero"));
        }
        self.count -= 1;
        Ok(())
    }

    fn supports_retract(&self) -> bool {
        true
    }

    fn result(&self) -> Value {
        Value::Integer(self.count)
    }

    fn reset(&mut self) {
        self.count = 0;
    }

    fn clone_box(&self) -> Box<dyn AggregateFunction> {
        Box::new(CountFunction::default())
    }
}
