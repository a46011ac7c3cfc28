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

//! Frame evaluators
//!
//! Every window group becomes one [`OverWindowFrame`], except OFFSET groups
//! which get one frame per LEAD/LAG call. The variant is picked once when the
//! operator is built:
//!
//! | Mode        | Shape                         | Frame                  |
//! |-------------|-------------------------------|------------------------|
//! | INSENSITIVE | whole partition               | [`UnboundedFrame`]     |
//! | ROW / RANGE | unbounded both sides          | [`UnboundedFrame`]     |
//! | ROW         | current row only              | [`CurrentRowFrame`]    |
//! | ROW         | unbounded preceding .. current| [`CurrentRowFrame`]    |
//! | ROW         | growing, shrinking, sliding   | [`RowFrame`]           |
//! | RANGE       | growing, shrinking, sliding   | [`RangeFrame`]         |
//! | OFFSET      | one row per call              | [`OffsetFrame`]        |
//!
//! Buffered frames see the partition through the [`ExternalBuffer`]:
//! `prepare` once per partition, then `process` once per row in order.

mod current_row;
mod offset;
mod range;
mod row;
mod unbounded;

pub use current_row::CurrentRowFrame;
pub use offset::OffsetFrame;
pub use range::RangeFrame;
pub use row::RowFrame;
pub use unbounded::UnboundedFrame;

use tracing::debug;

use super::handle::{AggregationHandle, AggsHandle};
use crate::core::{Error, Result, Row};
use crate::functions::FunctionRegistry;
use crate::plan::{FrameBound, FrameShape, GroupSpec, OverWindowMode};
use crate::storage::ExternalBuffer;

/// Frame evaluator of one window group (or one LEAD/LAG call)
pub enum OverWindowFrame {
    Unbounded(UnboundedFrame),
    CurrentRow(CurrentRowFrame),
    Row(RowFrame),
    Range(RangeFrame),
    Offset(OffsetFrame),
}

impl OverWindowFrame {
    /// Build the frames of one group
    pub fn build(group: &GroupSpec, registry: &FunctionRegistry) -> Result<Vec<OverWindowFrame>> {
        let mode = OverWindowMode::infer(group);
        if mode == OverWindowMode::Offset {
            return group
                .calls
                .iter()
                .map(|call| {
                    debug!(call = %call, "built offset frame");
                    Ok(OverWindowFrame::Offset(OffsetFrame::new(call, registry)?))
                })
                .collect();
        }

        let handle: Box<dyn AggregationHandle> = Box::new(AggsHandle::new(&group.calls, registry)?);
        let frame = if mode == OverWindowMode::Insensitive {
            OverWindowFrame::Unbounded(UnboundedFrame::new(handle))
        } else {
            let shape = FrameShape::classify(group.unit, &group.lower, &group.upper)?;
            match (mode, shape) {
                (_, FrameShape::Unbounded) => OverWindowFrame::Unbounded(UnboundedFrame::new(handle)),
                (OverWindowMode::Row, FrameShape::CurrentRowOnly) => OverWindowFrame::CurrentRow(
                    CurrentRowFrame::new(handle, &group.lower, &group.upper),
                ),
                (OverWindowMode::Row, FrameShape::Growing)
                    if group.upper == FrameBound::CurrentRow =>
                {
                    OverWindowFrame::CurrentRow(CurrentRowFrame::new(
                        handle,
                        &group.lower,
                        &group.upper,
                    ))
                }
                (OverWindowMode::Row, _) => {
                    OverWindowFrame::Row(RowFrame::new(handle, &group.lower, &group.upper)?)
                }
                (OverWindowMode::Range, FrameShape::CurrentRowOnly) => {
                    return Err(Error::unexpected_frame_shape(format!(
                        "RANGE frame classified as {}",
                        shape
                    )))
                }
                (OverWindowMode::Range, _) => OverWindowFrame::Range(RangeFrame::new(
                    handle,
                    &group.sort,
                    &group.lower,
                    &group.upper,
                )?),
                (mode, shape) => {
                    return Err(Error::unexpected_frame_shape(format!(
                        "{} group with {} frame",
                        mode, shape
                    )))
                }
            }
        };
        debug!(mode = %mode, frame = frame.name(), group = %group, "built window frame");
        Ok(vec![frame])
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            OverWindowFrame::Unbounded(_) => "unbounded",
            OverWindowFrame::CurrentRow(f) if f.resets_each_row() => "current-row",
            OverWindowFrame::CurrentRow(_) => "running",
            OverWindowFrame::Row(_) => "row",
            OverWindowFrame::Range(_) => "range",
            OverWindowFrame::Offset(_) => "offset",
        }
    }

    /// Reset state for a new partition held in `rows`
    pub fn prepare(&mut self, rows: &mut ExternalBuffer) -> Result<()> {
        match self {
            OverWindowFrame::Unbounded(f) => f.prepare(rows),
            OverWindowFrame::CurrentRow(f) => {
                f.prepare(rows.len());
                Ok(())
            }
            OverWindowFrame::Row(f) => {
                f.prepare(rows.len());
                Ok(())
            }
            OverWindowFrame::Range(f) => {
                f.prepare(rows.len());
                Ok(())
            }
            OverWindowFrame::Offset(f) => {
                f.prepare(rows.len());
                Ok(())
            }
        }
    }

    /// Values of the frame for row `index`, whose contents are `current`
    pub fn process(&mut self, rows: &mut ExternalBuffer, index: usize, current: &Row) -> Result<Row> {
        match self {
            OverWindowFrame::Unbounded(f) => Ok(f.process()),
            OverWindowFrame::CurrentRow(f) => f.process_row(current),
            OverWindowFrame::Row(f) => f.process(rows, index),
            OverWindowFrame::Range(f) => f.process(rows, index, current),
            OverWindowFrame::Offset(f) => f.process(rows, index, current),
        }
    }
}

/// Rows `[start, end)` currently held by a handle
///
/// Both ends only move forward. Rows leaving at `start` are retracted,
/// rows entering at `end` accumulated.
#[derive(Debug, Default)]
struct Cursor {
    start: usize,
    end: usize,
}

impl Cursor {
    fn clear(&mut self) {
        self.start = 0;
        self.end = 0;
    }

    /// Move the held range to `[lo, hi)`; `lo <= hi` and both are monotone
    fn slide(
        &mut self,
        handle: &mut dyn AggregationHandle,
        rows: &mut ExternalBuffer,
        lo: usize,
        hi: usize,
    ) -> Result<()> {
        if lo >= self.end {
            // Nothing held survives
            if self.start < self.end {
                handle.reset();
            }
            self.start = lo;
            self.end = lo;
        } else {
            while self.start < lo {
                handle.retract(&rows.get(self.start)?)?;
                self.start += 1;
            }
        }
        while self.end < hi {
            handle.accumulate(&rows.get(self.end)?)?;
            self.end += 1;
        }
        Ok(())
    }
}
