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
use crate::core::{Result, Row};
use crate::executor::comparator::BoundComparator;
use crate::executor::handle::AggregationHandle;
use crate::plan::{FrameBound, SortSpec};
use crate::storage::ExternalBuffer;

/// Growing, shrinking and sliding RANGE frames
///
/// Same pointer movement as the ROW frames, but the frame edges are found
/// with [`BoundComparator`]s against the current row's ordering values. The
/// partition is sorted, so both edges only ever move forward.
pub struct RangeFrame {
    handle: Box<dyn AggregationHandle>,
    lower: BoundComparator,
    upper: BoundComparator,
    len: usize,
    /// First row admitted by the lower bound
    lo: usize,
    /// First row past the upper bound
    hi: usize,
    cursor: Cursor,
}

impl RangeFrame {
    pub fn new(
        handle: Box<dyn AggregationHandle>,
        sort: &SortSpec,
        lower: &FrameBound,
        upper: &FrameBound,
    ) -> Result<Self> {
        Ok(Self {
            handle,
            lower: BoundComparator::new(lower, sort, true)?,
            upper: BoundComparator::new(upper, sort, false)?,
            len: 0,
            lo: 0,
            hi: 0,
            cursor: Cursor::default(),
        })
    }

    pub fn prepare(&mut self, len: usize) {
        self.handle.reset();
        self.handle.set_window_size(len);
        self.cursor.clear();
        self.len = len;
        self.lo = 0;
        self.hi = 0;
    }

    pub fn process(&mut self, rows: &mut ExternalBuffer, _index: usize, current: &Row) -> Result<Row> {
        while self.lo < self.len && !self.lower.admits(current, &rows.get(self.lo)?)? {
            self.lo += 1;
        }
        while self.hi < self.len && self.upper.admits(current, &rows.get(self.hi)?)? {
            self.hi += 1;
        }
        let hi = self.hi.max(self.lo);
        self.cursor.slide(self.handle.as_mut(), rows, self.lo, hi)?;
        Ok(self.handle.current_value())
    }
}
