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

//! Window plan
//!
//! - [`over_spec`] - the immutable description of window groups
//! - [`mode`] - execution mode and frame shape classification
//! - [`validate`] - checks a specification against the input row type

pub mod mode;
pub mod over_spec;
pub mod validate;

pub use mode::{group_needs_buffering, needs_buffering, FrameShape, OverWindowMode};
pub use over_spec::{
    AggregateCall, FrameBound, FrameUnit, GroupSpec, OffsetCall, OffsetDirection, Operand,
    OverSpec, SortField, SortSpec,
};
pub use validate::validate;
