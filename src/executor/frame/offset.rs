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

use crate::core::{Error, Result, Row, Value};
use crate::executor::handle::{AggregationHandle, AggsHandle};
use crate::functions::FunctionRegistry;
use crate::plan::{AggregateCall, Operand};
use crate::storage::ExternalBuffer;

/// Single-row frame of one LEAD/LAG call
///
/// Row `i` reads row `i + offset * sign`, where the offset is a constant or
/// an integral field of the current row. A target outside the partition, or
/// a NULL offset, retracts with the call's default instead.
pub struct OffsetFrame {
    handle: AggsHandle,
    offset: Operand,
    sign: i64,
    len: usize,
}

impl OffsetFrame {
    pub fn new(call: &AggregateCall, registry: &FunctionRegistry) -> Result<Self> {
        let offset_call = call.offset.as_ref().ok_or_else(|| {
            Error::unexpected_frame_shape(format!("offset frame for {}", call))
        })?;
        Ok(Self {
            handle: AggsHandle::new(std::slice::from_ref(call), registry)?,
            offset: offset_call.offset.clone(),
            sign: offset_call.direction.sign(),
            len: 0,
        })
    }

    pub fn prepare(&mut self, len: usize) {
        self.handle.reset();
        self.len = len;
    }

    /// Partition position read by row `index`, None when outside
    fn target(&self, index: usize, current: &Row) -> Result<Option<usize>> {
        let distance = match self.offset.eval(current)? {
            Value::Integer(k) => k,
            Value::Null(_) => return Ok(None),
            other => {
                return Err(Error::type_conversion(
                    other.data_type().to_string(),
                    "INTEGER row offset",
                ))
            }
        };
        let target = index as i128 + distance as i128 * self.sign as i128;
        if target < 0 || target >= self.len as i128 {
            return Ok(None);
        }
        Ok(Some(target as usize))
    }

    pub fn process(&mut self, rows: &mut ExternalBuffer, index: usize, current: &Row) -> Result<Row> {
        match self.target(index, current)? {
            Some(target) => self.handle.accumulate(&rows.get(target)?)?,
            None => self.handle.retract(current)?,
        }
        Ok(self.handle.current_value())
    }
}
