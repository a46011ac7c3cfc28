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

use crate::core::{Result, Row};
use crate::executor::handle::AggregationHandle;
use crate::plan::FrameBound;

/// ROW frame that never looks ahead of the current row
///
/// `ROWS BETWEEN CURRENT ROW AND CURRENT ROW` resets before every row;
/// `ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW` keeps a running
/// accumulation. Neither needs random access, so the no-buffer driver runs
/// this frame directly on the input stream.
pub struct CurrentRowFrame {
    handle: Box<dyn AggregationHandle>,
    reset_each_row: bool,
}

impl CurrentRowFrame {
    pub fn new(handle: Box<dyn AggregationHandle>, lower: &FrameBound, upper: &FrameBound) -> Self {
        Self {
            handle,
            reset_each_row: *lower == FrameBound::CurrentRow && *upper == FrameBound::CurrentRow,
        }
    }

    pub fn resets_each_row(&self) -> bool {
        self.reset_each_row
    }

    /// Start a new partition of `size` rows, when known
    pub fn prepare(&mut self, size: usize) {
        self.handle.reset();
        self.handle.set_window_size(size);
    }

    pub fn process_row(&mut self, current: &Row) -> Result<Row> {
        if self.reset_each_row {
            self.handle.reset();
        }
        self.handle.accumulate(current)?;
        Ok(self.handle.current_value())
    }
}
