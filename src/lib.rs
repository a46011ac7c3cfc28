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

//! # Overframe - SQL OVER-window aggregation
//!
//! Overframe evaluates `aggregate(...) OVER (PARTITION BY ... ORDER BY ...
//! frame)` over batches of rows that arrive sorted by the partition fields
//! and the window ordering. Every input row is emitted once, extended with
//! one value per aggregate call.
//!
//! ## Key Features
//!
//! - **ROWS and RANGE frames** - growing, shrinking and sliding frames driven
//!   by accumulate/retract, amortized linear per partition
//! - **LEAD / LAG** - constant or per-row offsets with per-row defaults
//! - **Whole-partition aggregates** - windows without ORDER BY
//! - **Size-aware functions** - NTILE, CUME_DIST
//! - **Streaming when possible** - current-row frames run without buffering
//! - **Disk spill** - partitions larger than the memory budget spill to a
//!   checksummed temporary file
//!
//! ## Quick Start
//!
//! ```rust
//! use overframe::{
//!     AggregateCall, DataType, FrameBound, GroupSpec, OverAggregateConfig,
//!     OverAggregateOperator, OverSpec, Row, SortSpec, Value,
//! };
//!
//! // SUM(v) OVER (PARTITION BY k ORDER BY v ROWS BETWEEN 1 PRECEDING AND CURRENT ROW)
//! let spec = OverSpec::new(vec![GroupSpec::new(vec![0])
//!     .order_by(SortSpec::new().asc(1))
//!     .rows(FrameBound::preceding(1), FrameBound::CurrentRow)
//!     .call(AggregateCall::on_field("SUM", 1))]);
//!
//! let mut op = OverAggregateOperator::new(
//!     &spec,
//!     &[DataType::Integer, DataType::Integer],
//!     &OverAggregateConfig::default(),
//! )
//! .unwrap();
//!
//! let input = [10, 20, 30].map(|v| Row::from_values(vec![Value::integer(1), Value::integer(v)]));
//! let output = op.execute(input).unwrap();
//! let sums: Vec<&Value> = output.iter().map(|row| &row[2]).collect();
//! assert_eq!(sums, [&Value::integer(10), &Value::integer(30), &Value::integer(50)]);
//! ```
//!
//! ## Modules
//!
//! - [`core`] - Core types ([`DataType`], [`Value`], [`Row`], [`Error`])
//! - [`functions`] - aggregate functions and the [`FunctionRegistry`]
//! - [`plan`] - window specification, mode classification, validation
//! - [`executor`] - frames, comparators and the [`OverAggregateOperator`]
//! - [`storage`] - configuration and the spilling partition buffer

pub mod core;
pub mod executor;
pub mod functions;
pub mod plan;
pub mod storage;

// Re-export main types for convenience
pub use core::{DataType, Error, ErrorKind, Result, Row, Value};

// Re-export function types
pub use functions::{
    global_registry, AggregateFunction, AvgFunction, CountFunction, CumeDistFunction,
    FunctionDataType, FunctionInfo, FunctionRegistry, FunctionSignature, FunctionType,
    LagFunction, LeadFunction, MaxFunction, MinFunction, NtileFunction, SumFunction,
};

// Re-export plan types
pub use plan::{
    AggregateCall, FrameBound, FrameShape, FrameUnit, GroupSpec, OffsetDirection, Operand,
    OverSpec, OverWindowMode, SortField, SortSpec,
};

// Re-export executor types
pub use executor::{AggregationHandle, AggsHandle, FnSink, OverAggregateOperator, RowSink};

// Re-export storage types
pub use storage::{ExternalBuffer, OverAggregateConfig};
