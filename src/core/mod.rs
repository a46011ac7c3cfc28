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

//! Core types and definitions for overframe
//!
//! - [`DataType`] - SQL data types of input fields
//! - [`Value`] - Runtime values with type information
//! - [`Row`] - A record (collection of values)
//! - [`Error`] - Error types, classified by [`ErrorKind`]

pub mod error;
pub mod row;
pub mod types;
pub mod value;

pub use error::{Error, ErrorKind, Result};
pub use row::Row;
pub use types::DataType;
pub use value::Value;
