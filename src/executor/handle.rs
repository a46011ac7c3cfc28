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

//! Aggregation handles
//!
//! A handle owns the accumulators of one window group, or of a single
//! LEAD/LAG call in OFFSET mode. Frames drive it through accumulate and
//! retract and read one value per call with [`AggregationHandle::current_value`].

use crate::core::{Result, Row, Value};
use crate::functions::{AggregateFunction, FunctionRegistry};
use crate::plan::{AggregateCall, Operand};

/// Accumulator contract a frame drives
pub trait AggregationHandle: Send {
    /// Add one row's contribution
    fn accumulate(&mut self, row: &Row) -> Result<()>;

    /// Remove one row's contribution
    ///
    /// For LEAD/LAG the row is the current row and the call's default
    /// operand is evaluated on it.
    fn retract(&mut self, row: &Row) -> Result<()>;

    /// One value per call, in declared order
    fn current_value(&self) -> Row;

    /// Forget all accumulated rows
    fn reset(&mut self);

    /// Hand the partition length to size-sensitive calls
    fn set_window_size(&mut self, _size: usize) {}

    /// Number of values [`current_value`](Self::current_value) returns
    fn arity(&self) -> usize;
}

/// Stand-in argument for calls without one, counted by COUNT(*)
const ROW_MARKER: Value = Value::Boolean(true);

struct AggSlot {
    function: Box<dyn AggregateFunction>,
    value: Option<Operand>,
    /// Present for LEAD/LAG, fed to `retract`
    default: Option<Operand>,
}

/// Handle backed by registered aggregate functions
pub struct AggsHandle {
    slots: Vec<AggSlot>,
}

impl AggsHandle {
    /// Create and configure one function per call
    pub fn new(calls: &[AggregateCall], registry: &FunctionRegistry) -> Result<Self> {
        let slots = calls
            .iter()
            .map(|call| {
                let mut function = registry.create(&call.name)?;
                function.configure(&call.literal_args())?;
                Ok(AggSlot {
                    function,
                    value: call.value_operand().cloned(),
                    default: call.offset.as_ref().map(|o| o.default.clone()),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { slots })
    }
}

impl AggregationHandle for AggsHandle {
    fn accumulate(&mut self, row: &Row) -> Result<()> {
        for slot in &mut self.slots {
            match &slot.value {
                Some(operand) => slot.function.accumulate(&operand.eval(row)?),
                None => slot.function.accumulate(&ROW_MARKER),
            }
        }
        Ok(())
    }

    fn retract(&mut self, row: &Row) -> Result<()> {
        for slot in &mut self.slots {
            let value = match (&slot.default, &slot.value) {
                (Some(operand), _) | (None, Some(operand)) => operand.eval(row)?,
                (None, None) => ROW_MARKER,
            };
            slot.function.retract(&value)?;
        }
        Ok(())
    }

    fn current_value(&self) -> Row {
        self.slots.iter().map(|s| s.function.result()).collect()
    }

    fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.function.reset();
        }
    }

    fn set_window_size(&mut self, size: usize) {
        for slot in &mut self.slots {
            slot.function.set_window_size(size);
        }
    }

    fn arity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    fn handle(calls: &[AggregateCall]) -> AggsHandle {
        AggsHandle::new(calls, &FunctionRegistry::new()).unwrap()
    }

    #[test]
    fn test_accumulate_and_retract() {
        let mut h = handle(&[
            AggregateCall::on_field("SUM", 1),
            AggregateCall::count_star(),
            AggregateCall::on_field("COUNT", 1),
        ]);
        assert_eq!(h.arity(), 3);
        h.accumulate(&row![1i64, 10i64]).unwrap();
        h.accumulate(&row![1i64, Value::null(crate::core::DataType::Integer)])
            .unwrap();
        h.accumulate(&row![1i64, 5i64]).unwrap();
        assert_eq!(h.current_value(), row![15i64, 3i64, 2i64]);

        h.retract(&row![1i64, 10i64]).unwrap();
        assert_eq!(h.current_value(), row![5i64, 2i64, 1i64]);

        h.reset();
        assert_eq!(h.current_value().get(1), Some(&Value::integer(0)));
    }

    #[test]
    fn test_offset_retract_uses_default() {
        let mut h = handle(&[AggregateCall::lag(
            1,
            Operand::literal(1i64),
            Operand::field(0),
        )]);
        h.accumulate(&row![7i64, 42i64]).unwrap();
        assert_eq!(h.current_value(), row![42i64]);
        h.retract(&row![7i64, 43i64]).unwrap();
        assert_eq!(h.current_value(), row![7i64]);
    }

    #[test]
    fn test_configured_calls() {
        let mut h = handle(&[AggregateCall::new("NTILE", vec![Operand::literal(2i64)])]);
        h.set_window_size(4);
        for _ in 0..3 {
            h.accumulate(&row![0i64]).unwrap();
        }
        assert_eq!(h.current_value(), row![2i64]);

        let err = AggsHandle::new(
            &[AggregateCall::new("NTILE", vec![Operand::literal(-1i64)])],
            &FunctionRegistry::new(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_missing_field_is_reported() {
        let mut h = handle(&[AggregateCall::on_field("SUM", 3)]);
        assert!(h.accumulate(&row![1i64]).is_err());
    }
}
