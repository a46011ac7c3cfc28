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

//! Streaming driver
//!
//! Runs groups whose frames never look past the current row. Each input row
//! is emitted right away with its aggregate values appended; only the
//! previous row and the accumulators are held.

use tracing::trace;

use super::comparator::PartitionEqualiser;
use super::frame::CurrentRowFrame;
use super::operator::RowSink;
use crate::core::{Result, Row};

pub struct NonBufferDriver {
    frames: Vec<CurrentRowFrame>,
    equaliser: PartitionEqualiser,
    last: Option<Row>,
    partition_rows: usize,
}

impl NonBufferDriver {
    pub fn new(frames: Vec<CurrentRowFrame>, equaliser: PartitionEqualiser) -> Self {
        Self {
            frames,
            equaliser,
            last: None,
            partition_rows: 0,
        }
    }

    pub fn process_element<S: RowSink + ?Sized>(&mut self, row: Row, out: &mut S) -> Result<()> {
        let boundary = match &self.last {
            Some(last) => !self.equaliser.equals(last, &row)?,
            None => true,
        };
        if boundary {
            if self.last.is_some() {
                trace!(rows = self.partition_rows, "partition evaluated");
            }
            for frame in &mut self.frames {
                frame.prepare(0);
            }
            self.partition_rows = 0;
        }

        let mut output = Row::with_capacity(row.len() + self.frames.len());
        output.extend_from_slice(row.as_slice());
        for frame in &mut self.frames {
            output.extend_from_slice(frame.process_row(&row)?.as_slice());
        }
        self.partition_rows += 1;
        self.last = Some(row);
        out.emit(output)
    }

    pub fn end_input<S: RowSink + ?Sized>(&mut self, _out: &mut S) -> Result<()> {
        if self.last.take().is_some() {
            trace!(rows = self.partition_rows, "partition evaluated");
        }
        self.partition_rows = 0;
        Ok(())
    }
}
