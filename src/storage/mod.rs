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

//! Partition storage
//!
//! Buffered window groups materialize each partition before evaluating it.
//! This module holds that buffer together with its configuration and the
//! row codec used when the buffer spills to disk.

pub mod buffer;
pub mod codec;
pub mod config;

pub use buffer::ExternalBuffer;
pub use config::{parse_memory_size, OverAggregateConfig};
