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

//! OVER aggregate execution
//!
//! - [`handle`] - accumulator handles driven by frames
//! - [`comparator`] - partition, peer and RANGE bound comparators
//! - [`frame`] - one evaluator per frame shape
//! - [`operator`] - the streaming and buffering drivers behind
//!   [`OverAggregateOperator`]

pub mod buffered;
pub mod comparator;
pub mod frame;
pub mod handle;
pub mod non_buffer;
pub mod operator;

pub use comparator::{BoundComparator, MultiFieldComparator, PartitionEqualiser};
pub use frame::OverWindowFrame;
pub use handle::{AggregationHandle, AggsHandle};
pub use operator::{FnSink, OverAggregateOperator, RowSink};
