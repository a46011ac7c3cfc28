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

//! Buffering driver
//!
//! Collects each partition into an [`ExternalBuffer`] and evaluates it only
//! once the next partition starts or the input ends. Output for a partition
//! is produced in row order, every frame's values appended to the input
//! fields.

use tracing::trace;

use super::comparator::PartitionEqualiser;
use super::frame::OverWindowFrame;
use super::operator::RowSink;
use crate::core::{Result, Row};
use crate::storage::{ExternalBuffer, OverAggregateConfig};

pub struct BufferedDriver {
    frames: Vec<OverWindowFrame>,
    equaliser: PartitionEqualiser,
    buffer: ExternalBuffer,
    /// Last row of the partition being collected
    last: Option<Row>,
}

impl BufferedDriver {
    pub fn new(
        frames: Vec<OverWindowFrame>,
        equaliser: PartitionEqualiser,
        config: &OverAggregateConfig,
    ) -> Self {
        Self {
            frames,
            equaliser,
            buffer: ExternalBuffer::new(config),
            last: None,
        }
    }

    pub fn process_element<S: RowSink + ?Sized>(&mut self, row: Row, out: &mut S) -> Result<()> {
        let row = row.into_shared();
        if let Some(last) = &self.last {
            if !self.equaliser.equals(last, &row)? {
                self.flush(out)?;
            }
        }
        self.last = Some(row.clone());
        self.buffer.append(row)
    }

    pub fn end_input<S: RowSink + ?Sized>(&mut self, out: &mut S) -> Result<()> {
        self.flush(out)
    }

    /// Evaluate and emit the buffered partition, then release it
    fn flush<S: RowSink + ?Sized>(&mut self, out: &mut S) -> Result<()> {
        self.last = None;
        if self.buffer.is_empty() {
            return Ok(());
        }
        let result = self.evaluate(out);
        self.buffer.release();
        result
    }

    fn evaluate<S: RowSink + ?Sized>(&mut self, out: &mut S) -> Result<()> {
        let len = self.buffer.len();
        trace!(
            rows = len,
            spilled = self.buffer.is_spilled(),
            "evaluating partition"
        );

        for frame in &mut self.frames {
            frame.prepare(&mut self.buffer)?;
        }
        for index in 0..len {
            let row = self.buffer.get(index)?;
            let mut output = Row::with_capacity(row.len() + self.frames.len());
            output.extend_from_slice(row.as_slice());
            for frame in &mut self.frames {
                let values = frame.process(&mut self.buffer, index, &row)?;
                output.extend_from_slice(values.as_slice());
            }
            out.emit(output)?;
        }
        Ok(())
    }
}
