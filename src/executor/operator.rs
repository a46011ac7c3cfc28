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

//! OVER aggregate operator
//!
//! Input must arrive sorted by the partition fields followed by the
//! representative ordering. Each input row leaves the operator once, with
//! one value per aggregate call appended in declared order:
//!
//! ```text
//! input fields | group 0 calls | group 1 calls | ...
//! ```
//!
//! The driver is chosen when the operator is built: the streaming driver if
//! every group can be computed one row at a time, the buffering driver
//! otherwise.

use tracing::debug;

use super::buffered::BufferedDriver;
use super::comparator::PartitionEqualiser;
use super::frame::{CurrentRowFrame, OverWindowFrame};
use super::handle::AggsHandle;
use super::non_buffer::NonBufferDriver;
use crate::core::{DataType, Result, Row};
use crate::functions::{global_registry, FunctionRegistry};
use crate::plan::{needs_buffering, validate, OverSpec};
use crate::storage::OverAggregateConfig;

/// Receiver of output rows
pub trait RowSink {
    fn emit(&mut self, row: Row) -> Result<()>;
}

impl RowSink for Vec<Row> {
    #[inline]
    fn emit(&mut self, row: Row) -> Result<()> {
        self.push(row);
        Ok(())
    }
}

/// Adapts a closure into a [`RowSink`]
pub struct FnSink<F>(pub F);

impl<F> RowSink for FnSink<F>
where
    F: FnMut(Row) -> Result<()>,
{
    #[inline]
    fn emit(&mut self, row: Row) -> Result<()> {
        (self.0)(row)
    }
}

/// Batch OVER aggregate operator over sorted input
pub enum OverAggregateOperator {
    NonBuffer(NonBufferDriver),
    Buffered(BufferedDriver),
}

impl OverAggregateOperator {
    /// Build an operator using the global function registry
    pub fn new(
        spec: &OverSpec,
        input_types: &[DataType],
        config: &OverAggregateConfig,
    ) -> Result<Self> {
        Self::with_registry(spec, input_types, config, global_registry())
    }

    /// Build an operator resolving functions in `registry`
    ///
    /// Fails with a validation error before any row is seen if the
    /// specification does not fit the input type.
    pub fn with_registry(
        spec: &OverSpec,
        input_types: &[DataType],
        config: &OverAggregateConfig,
        registry: &FunctionRegistry,
    ) -> Result<Self> {
        validate(spec, input_types, registry)?;
        let equaliser = PartitionEqualiser::new(spec.partition_fields());

        if !needs_buffering(spec, registry) {
            let frames = spec
                .groups
                .iter()
                .map(|group| {
                    let handle = AggsHandle::new(&group.calls, registry)?;
                    Ok(CurrentRowFrame::new(
                        Box::new(handle),
                        &group.lower,
                        &group.upper,
                    ))
                })
                .collect::<Result<Vec<_>>>()?;
            debug!(
                groups = spec.groups.len(),
                outputs = spec.output_arity(),
                sort = ?spec.representative_sort(),
                "over aggregate without buffering"
            );
            return Ok(OverAggregateOperator::NonBuffer(NonBufferDriver::new(
                frames, equaliser,
            )));
        }

        let mut frames = Vec::with_capacity(spec.groups.len());
        for group in &spec.groups {
            frames.extend(OverWindowFrame::build(group, registry)?);
        }
        debug!(
            groups = spec.groups.len(),
            frames = frames.len(),
            outputs = spec.output_arity(),
            memory = config.external_buffer_memory,
            sort = ?spec.representative_sort(),
            "over aggregate with partition buffer"
        );
        Ok(OverAggregateOperator::Buffered(BufferedDriver::new(
            frames, equaliser, config,
        )))
    }

    /// True if partitions are materialized before evaluation
    pub fn is_buffered(&self) -> bool {
        matches!(self, OverAggregateOperator::Buffered(_))
    }

    /// Feed one input row; output may be emitted for earlier rows
    pub fn process_element<S: RowSink + ?Sized>(&mut self, row: Row, out: &mut S) -> Result<()> {
        match self {
            OverAggregateOperator::NonBuffer(driver) => driver.process_element(row, out),
            OverAggregateOperator::Buffered(driver) => driver.process_element(row, out),
        }
    }

    /// Signal the end of input, emitting everything still held
    pub fn end_input<S: RowSink + ?Sized>(&mut self, out: &mut S) -> Result<()> {
        match self {
            OverAggregateOperator::NonBuffer(driver) => driver.end_input(out),
            OverAggregateOperator::Buffered(driver) => driver.end_input(out),
        }
    }

    /// Run a whole input and collect the output
    pub fn execute<I>(&mut self, input: I) -> Result<Vec<Row>>
    where
        I: IntoIterator<Item = Row>,
    {
        let mut out = Vec::new();
        for row in input {
            self.process_element(row, &mut out)?;
        }
        self.end_input(&mut out)?;
        Ok(out)
    }
}
