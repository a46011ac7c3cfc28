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

use super::Cursor;
use crate::core::{Error, Result, Row, Value};
use crate::executor::handle::AggregationHandle;
use crate::plan::{FrameBound, Operand};
use crate::storage::ExternalBuffer;

/// Row-count distance of a bound, None when unbounded
fn row_offset(bound: &FrameBound) -> Result<Option<i64>> {
    match bound {
        FrameBound::UnboundedPreceding | FrameBound::UnboundedFollowing => Ok(None),
        FrameBound::CurrentRow => Ok(Some(0)),
        FrameBound::Bounded(Operand::Literal(Value::Integer(k))) => Ok(Some(*k)),
        other => Err(Error::unexpected_frame_shape(format!("ROWS bound {}", other))),
    }
}

/// Growing, shrinking and sliding ROW frames
///
/// Row `i` sees rows `[i + lower, i + upper]` clipped to the partition. An
/// unbounded lower side pins the start at 0 (growing, accumulate only), an
/// unbounded upper side pins the end at the last row (shrinking, retract
/// only).
pub struct RowFrame {
    handle: Box<dyn AggregationHandle>,
    lower: Option<i64>,
    upper: Option<i64>,
    len: usize,
    cursor: Cursor,
}

impl RowFrame {
    pub fn new(
        handle: Box<dyn AggregationHandle>,
        lower: &FrameBound,
        upper: &FrameBound,
    ) -> Result<Self> {
        Ok(Self {
            handle,
            lower: row_offset(lower)?,
            upper: row_offset(upper)?,
            len: 0,
            cursor: Cursor::default(),
        })
    }

    pub fn prepare(&mut self, len: usize) {
        self.handle.reset();
        self.handle.set_window_size(len);
        self.cursor.clear();
        self.len = len;
    }

    /// Half-open row range `[lo, hi)` of the frame at `index`
    fn bounds(&self, index: usize) -> (usize, usize) {
        let n = self.len as i128;
        let i = index as i128;
        let lo = self.lower.map_or(0, |k| (i + k as i128).clamp(0, n));
        let hi = self.upper.map_or(n, |k| (i + k as i128 + 1).clamp(0, n));
        (lo as usize, hi.max(lo) as usize)
    }

    pub fn process(&mut self, rows: &mut ExternalBuffer, index: usize) -> Result<Row> {
        let (lo, hi) = self.bounds(index);
        self.cursor.slide(self.handle.as_mut(), rows, lo, hi)?;
        Ok(self.handle.current_value())
    }
}
