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

//! Operator configuration
//!

use std::path::PathBuf;

use crate::core::{Error, Result};

/// Configuration options for the OVER aggregate operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverAggregateConfig {
    /// Bytes of rows a partition buffer keeps in memory before spilling
    /// Default: 10485760 (10MB)
    pub external_buffer_memory: usize,

    /// Directory for spill files
    /// Default: None (system temp dir)
    pub spill_dir: Option<PathBuf>,

    /// Rows decoded per read when reading spilled rows back
    /// Default: 1024
    pub spill_page_rows: usize,
}

impl Default for OverAggregateConfig {
    fn default() -> Self {
        Self {
            external_buffer_memory: 10 * 1024 * 1024, // 10MB
            spill_dir: None,
            spill_page_rows: 1024,
        }
    }
}

impl OverAggregateConfig {
    /// Creates a new OverAggregateConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the in-memory byte budget of the partition buffer
    pub fn with_external_buffer_memory(mut self, bytes: usize) -> Self {
        self.external_buffer_memory = bytes;
        self
    }

    /// Sets the spill directory
    pub fn with_spill_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spill_dir = Some(dir.into());
        self
    }

    /// Sets how many spilled rows are decoded per read
    pub fn with_spill_page_rows(mut self, rows: usize) -> Self {
        self.spill_page_rows = rows.max(1);
        self
    }

    /// Parses `key=value&key=value` options
    ///
    /// Keys: `external_buffer_memory` (alias
    /// `table.exec.resource.external-buffer-memory`), `spill_dir`,
    /// `spill_page_rows`. Memory sizes take an optional unit suffix
    /// (`b`, `kb`, `mb`, `gb`).
    pub fn from_query(query: &str) -> Result<Self> {
        let mut config = Self::default();

        for param in query.split('&').filter(|p| !p.is_empty()) {
            let mut parts = param.splitn(2, '=');
            let key = parts.next().unwrap_or("").trim();
            let value = parts.next().unwrap_or("").trim();

            match key {
                // external_buffer_memory=64mb
                "external_buffer_memory" | "table.exec.resource.external-buffer-memory" => {
                    config.external_buffer_memory = parse_memory_size(value)?;
                }
                // spill_dir=/var/tmp/overframe
                "spill_dir" => {
                    if value.is_empty() {
                        return Err(Error::invalid_argument("spill_dir must not be empty"));
                    }
                    config.spill_dir = Some(PathBuf::from(value));
                }
                // spill_page_rows=1024
                "spill_page_rows" => {
                    let rows = value.parse::<usize>().ok().filter(|r| *r > 0).ok_or_else(|| {
                        Error::invalid_argument(format!(
                            "spill_page_rows must be a positive integer, got '{}'",
                            value
                        ))
                    })?;
                    config.spill_page_rows = rows;
                }
                other => {
                    return Err(Error::invalid_argument(format!(
                        "unknown option '{}'",
                        other
                    )))
                }
            }
        }

        Ok(config)
    }
}

/// Parses a byte size such as `1048576`, `512kb`, `10 MB` or `1g`
pub fn parse_memory_size(input: &str) -> Result<usize> {
    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);

    let invalid = || Error::invalid_argument(format!("invalid memory size '{}'", input));

    let amount = digits.parse::<usize>().map_err(|_| invalid())?;
    let multiplier: usize = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" => 1024,
        "m" | "mb" => 1024 * 1024,
        "g" | "gb" => 1024 * 1024 * 1024,
        _ => return Err(invalid()),
    };

    amount.checked_mul(multiplier).ok_or_else(invalid)
}
