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

//! LEAD and LAG window functions
//!
//! The offset frame positions these functions on a single row: it
//! accumulates the target row's argument when the target lies inside the
//! partition and retracts with the call's default otherwise. Either way the
//! function simply reports the last value it was given.

use crate::core::{Result, Value};
use crate::functions::{
    AggregateFunction, FunctionDataType, FunctionInfo, FunctionSignature, FunctionType,
};

fn offset_signature() -> FunctionSignature {
    FunctionSignature::new(
        FunctionDataType::Any,
        vec![
            FunctionDataType::Any,     // column
            FunctionDataType::Integer, // offset
            FunctionDataType::Any,     // default
        ],
        1,
        3,
    )
}

/// LEAD window function
///
/// Returns the value from a row that is `offset` rows after the current row
/// within the partition. If there is no such row, returns the default value.
#[derive(Default)]
pub struct LeadFunction {
    value: Value,
}

impl AggregateFunction for LeadFunction {
    fn name(&self) -> &str {
        "LEAD"
    }

    fn info(&self) -> FunctionInfo {
        FunctionInfo::new(
            "LEAD",
            FunctionType::Window,
            "Returns the value from a row that is offset rows after the current row",
            offset_signature(),
        )
    }

    fn accumulate(&mut self, value: &Value) {
        self.value = value.clone();
    }

    fn retract(&mut self, default: &Value) -> Result<()> {
        self.value = default.clone();
        Ok(())
    }

    fn supports_retract(&self) -> bool {
        true
    }

    fn result(&self) -> Value {
        self.value.clone()
    }

    fn reset(&mut self) {
        self.value = Value::null_unknown();
    }

    fn clone_box(&self) -> Box<dyn AggregateFunction> {
        Box::new(LeadFunction::default())
    }
}

/// LAG window function
///
/// Returns the value from a row that is `offset` rows before the current row
/// within the partition. If there is no such row, returns the default value.
#[derive(Default)]
pub struct LagFunction {
    value: Value,
}

impl AggregateFunction for LagFunction {
    fn name(&self) -> &str {
        "LAG"
    }

    fn info(&self) -> FunctionInfo {
        FunctionInfo::new(
            "LAG",
            FunctionType::Window,
            "Returns the value from a row that is offset rows before the current row",
            offset_signature(),
        )
    }

    fn accumulate(&mut self, value: &Value) {
        self.value = value.clone();
    }

    fn retract(&mut self, default: &Value) -> Result<()> {
        self.value = default.clone();
        Ok(())
    }

    fn supports_retract(&self) -> bool {
        true
    }

    fn result(&self) -> Value {
        self.value.clone()
    }

    fn reset(&mut self) {
        self.value = Value::null_unknown();
    }

    fn clone_box(&self) -> Box<dyn AggregateFunction> {
        Box::new(LagFunction::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_reports_last_value() {
        let mut lead = LeadFunction::default();
        assert!(lead.result().is_null());
        lead.accumulate(&Value::Integer(20));
        assert_eq!(lead.result(), Value::Integer(20));
        lead.retract(&Value::Integer(0)).unwrap();
        assert_eq!(lead.result(), Value::Integer(0));
    }

    #[test]
    fn test_lag_reset() {
        let mut lag = LagFunction::default();
        lag.accumulate(&Value::text("x"));
        lag.reset();
        assert!(lag.result().is_null());
        assert_eq!(lag.info().signature.max_args, 3);
    }
}
