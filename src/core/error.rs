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

//! Error types for overframe
//!
//! Every failure is one of three kinds:
//!
//! - **Validation** - the window specification is malformed; raised before any
//!   row is processed and recoverable by fixing the query
//! - **Internal** - an engine defect (a frame shape that cannot occur, ...)
//! - **Resource** - the environment failed (spill I/O, corrupted spill pages)

use thiserror::Error;

use super::types::DataType;

/// Result type alias for overframe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed window specification
    Validation,
    /// Engine defect
    Internal,
    /// Environment trouble (I/O)
    Resource,
}

/// Main error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // =========================================================================
    // Function errors
    // =========================================================================
    /// Aggregate function not found in the registry
    #[error("aggregate function '{0}' not found")]
    FunctionNotFound(String),

    /// Invalid argument for function
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Aggregate called in a frame that retracts rows, but it cannot retract
    #[error("aggregate function '{function}' does not support retraction, required by {frame} frame")]
    RetractionNotSupported { function: String, frame: String },

    // =========================================================================
    // Specification errors
    // =========================================================================
    /// Field index outside the input row type
    #[error("field index {index} out of bounds for input of {arity} fields")]
    FieldIndexOutOfBounds { index: usize, arity: usize },

    /// LEAD/LAG offset field has a non-integral type
    #[error("offset field {index} must be an integral type, got {data_type}")]
    OffsetNotIntegral { index: usize, data_type: DataType },

    /// LEAD/LAG default has no common type with the value argument
    #[error("the default value must have a common type with the given expression. ARG0: {expected}, default: {actual}")]
    DefaultTypeMismatch { expected: DataType, actual: DataType },

    /// RANGE frame over an ordering field without additive distance
    #[error("RANGE frame offset needs a numeric or temporal ordering field, field {index} is {data_type}")]
    RangeKeyNotAdditive { index: usize, data_type: DataType },

    /// Frame offset literal with the wrong type for its frame unit or key
    #[error("invalid frame offset {value}: {reason}")]
    InvalidFrameOffset { value: String, reason: String },

    /// Boundary pair that maps to no execution mode
    #[error("invalid window frame: {0}")]
    InvalidFrame(String),

    /// Window groups that cannot run together in one specification
    #[error("invalid window specification: {0}")]
    InvalidSpec(String),

    // =========================================================================
    // Value errors
    // =========================================================================
    /// NULL compared with a non-NULL value
    #[error("cannot compare NULL with non-NULL value")]
    NullComparison,

    /// Values whose types have no ordering between them
    #[error("incomparable types")]
    IncomparableTypes,

    /// Type conversion error
    #[error("cannot convert {from} to {to}")]
    TypeConversion { from: String, to: String },

    // =========================================================================
    // Internal errors
    // =========================================================================
    /// A frame shape that the declared mode and boundaries rule out
    #[error("unexpected frame shape: {0}")]
    UnexpectedFrameShape(String),

    /// Internal error
    #[error("internal error: {message}")]
    Internal { message: String },

    // =========================================================================
    // Resource errors
    // =========================================================================
    /// I/O error while spilling or reading back rows
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Spilled row failed its checksum
    #[error("spill page corrupted at row {row}: stored={stored:#x}, computed={computed:#x}")]
    SpillCorrupted { row: usize, stored: u32, computed: u32 },
}

impl Error {
    /// Create a new InvalidArgument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    /// Create a new InvalidFrame error
    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Error::InvalidFrame(message.into())
    }

    /// Create a new InvalidSpec error
    pub fn invalid_spec(message: impl Into<String>) -> Self {
        Error::InvalidSpec(message.into())
    }

    /// Create a new InvalidFrameOffset error
    pub fn invalid_frame_offset(value: impl ToString, reason: impl Into<String>) -> Self {
        Error::InvalidFrameOffset {
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a new RetractionNotSupported error
    pub fn retraction_not_supported(function: impl Into<String>, frame: impl Into<String>) -> Self {
        Error::RetractionNotSupported {
            function: function.into(),
            frame: frame.into(),
        }
    }

    /// Create a new TypeConversion error
    pub fn type_conversion(from: impl Into<String>, to: impl Into<String>) -> Self {
        Error::TypeConversion {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a new UnexpectedFrameShape error
    pub fn unexpected_frame_shape(message: impl Into<String>) -> Self {
        Error::UnexpectedFrameShape(message.into())
    }

    /// Create a new Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Create a new IO error
    pub fn io(message: impl Into<String>) -> Self {
        Error::Io {
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnexpectedFrameShape(_) | Error::Internal { .. } => ErrorKind::Internal,
            Error::Io { .. } | Error::SpillCorrupted { .. } => ErrorKind::Resource,
            // Value errors surface while checking the plan against the input type
            _ => ErrorKind::Validation,
        }
    }

    /// Check if this error is fixable by correcting the query
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Check if this error indicates an engine defect
    pub fn is_internal(&self) -> bool {
        self.kind() == ErrorKind::Internal
    }

    /// Check if this error indicates environment trouble
    pub fn is_resource(&self) -> bool {
        self.kind() == ErrorKind::Resource
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
        }
    }
}
