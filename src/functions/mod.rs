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

//! Aggregate Function System
//!
//! Window frames feed rows into aggregates one at a time and take rows back
//! out again when a frame slides, so every function here speaks in terms of
//! accumulate / retract / result:
//!
//! - [`AggregateFunction`] - the per-call accumulator contract
//! - [`aggregate`] - COUNT, SUM, AVG, MIN, MAX
//! - [`window`] - LEAD, LAG, NTILE, CUME_DIST
//! - [`FunctionRegistry`] - name lookup for aggregate calls

pub mod aggregate;
pub mod registry;
pub mod window;

use crate::core::{Error, Result, Value};

/// Function type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionType {
    /// Plain aggregate over the frame's rows
    Aggregate,
    /// Window function (ranking, distribution, offset)
    Window,
}

/// Data type for function signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionDataType {
    /// Any type
    Any,
    /// Integer type
    Integer,
    /// Float type
    Float,
    /// String type
    String,
    /// Boolean type
    Boolean,
    /// Timestamp type
    Timestamp,
}

/// Function signature information
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    /// Return type
    pub return_type: FunctionDataType,
    /// Argument types
    pub argument_types: Vec<FunctionDataType>,
    /// Minimum number of arguments
    pub min_args: usize,
    /// Maximum number of arguments
    pub max_args: usize,
}

impl FunctionSignature {
    /// Create a new function signature
    pub fn new(
        return_type: FunctionDataType,
        argument_types: Vec<FunctionDataType>,
        min_args: usize,
        max_args: usize,
    ) -> Self {
        Self {
            return_type,
            argument_types,
            min_args,
            max_args,
        }
    }

    /// Validate argument count
    pub fn validate_arg_count(&self, count: usize) -> Result<()> {
        if count < self.min_args {
            return Err(Error::invalid_argument(format!(
                "expected at least {} arguments, got {}",
                self.min_args, count
            )));
        }
        if count > self.max_args {
            return Err(Error::invalid_argument(format!(
                "expected at most {} arguments, got {}",
                self.max_args, count
            )));
        }
        Ok(())
    }
}

/// Function information
#[derive(Debug, Clone)]
pub struct FunctionInfo {
    /// Function name
    pub name: String,
    /// Function type
    pub function_type: FunctionType,
    /// Description
    pub description: String,
    /// Signature
    pub signature: FunctionSignature,
}

impl FunctionInfo {
    /// Create a new function info
    pub fn new(
        name: impl Into<String>,
        function_type: FunctionType,
        description: impl Into<String>,
        signature: FunctionSignature,
    ) -> Self {
        Self {
            name: name.into(),
            function_type,
            description: description.into(),
            signature,
        }
    }

    /// Get the function name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the signature
    pub fn signature(&self) -> &FunctionSignature {
        &self.signature
    }
}

/// Trait for aggregate functions evaluated over window frames
///
/// One instance holds the running state of one aggregate call. Frames call
/// `accumulate` when a row enters, `retract` when it leaves and `result`
/// once per output row.
pub trait AggregateFunction: Send + Sync {
    /// Get the function name
    fn name(&self) -> &str;

    /// Get function information
    fn info(&self) -> FunctionInfo;

    /// Configure the function with the call's literal arguments
    ///
    /// Called once before any row is accumulated. NTILE(4) receives
    /// `&[Value::Integer(4)]`. Default implementation ignores options.
    fn configure(&mut self, _options: &[Value]) -> Result<()> {
        Ok(())
    }

    /// Accumulate a value into the aggregate
    fn accumulate(&mut self, value: &Value);

    /// Remove a previously accumulated value
    ///
    /// Only called when [`supports_retract`](Self::supports_retract) is true;
    /// plan validation rejects retracting frames otherwise.
    fn retract(&mut self, _value: &Value) -> Result<()> {
        Err(Error::retraction_not_supported(self.name(), "retracting"))
    }

    /// Whether [`retract`](Self::retract) is implemented
    fn supports_retract(&self) -> bool {
        false
    }

    /// Whether the result depends on the total number of rows in the window
    fn is_size_sensitive(&self) -> bool {
        false
    }

    /// Receive the window size before any value is read
    fn set_window_size(&mut self, _size: usize) {}

    /// Get the current result
    fn result(&self) -> Value;

    /// Reset the aggregate state
    ///
    /// Configuration from [`configure`](Self::configure) survives a reset.
    fn reset(&mut self);

    /// Clone the function into a new, empty instance with the same configuration
    fn clone_box(&self) -> Box<dyn AggregateFunction>;
}

// Re-export main types
pub use aggregate::{AvgFunction, CountFunction, MaxFunction, MinFunction, SumFunction};
pub use registry::{global_registry, FunctionRegistry};
pub use window::{CumeDistFunction, LagFunction, LeadFunction, NtileFunction};
