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

//! NTILE window function

use crate::core::{Error, Result, Value};
use crate::functions::{
    AggregateFunction, FunctionDataType, FunctionInfo, FunctionSignature, FunctionType,
};

/// NTILE window function
///
/// Divides the window into n roughly equal groups and returns the group
/// number (1 to n) of the current row. The current row's position is the
/// number of rows accumulated so far, so NTILE runs over a growing
/// `ROWS UNBOUNDED PRECEDING .. CURRENT ROW` frame.
///
/// If the window doesn't divide evenly, the first groups get one extra row.
pub struct NtileFunction {
    num_buckets: i64,
    window_size: i64,
    seen: i64,
}

impl Default for NtileFunction {
    fn default() -> Self {
        Self::new(1)
    }
}

impl NtileFunction {
    /// Create a new NTILE function with the specified number of buckets
    pub fn new(num_buckets: i64) -> Self {
        Self {
            num_buckets,
            window_size: 0,
            seen: 0,
        }
    }
}

impl AggregateFunction for NtileFunction {
    fn name(&self) -> &str {
        "NTILE"
    }

    fn info(&self) -> FunctionInfo {
        FunctionInfo::new(
            "NTILE",
            FunctionType::Window,
            "Divides the partition into n buckets and returns the bucket number",
            FunctionSignature::new(
                FunctionDataType::Integer,
                vec![FunctionDataType::Integer],
                1,
                1,
            ),
        )
    }

    fn configure(&mut self, options: &[Value]) -> Result<()> {
        match options.first() {
            Some(Value::Integer(n)) if *n > 0 => {
                self.num_buckets = *n;
                Ok(())
            }
            Some(other) => Err(Error::invalid_argument(format!(
                "NTILE bucket count must be a positive integer, got {}",
                other
            ))),
            None => Err(Error::invalid_argument("NTILE requires a bucket count")),
        }
    }

    fn accumulate(&mut self, _value: &Value) {
        self.seen += 1;
    }

    fn is_size_sensitive(&self) -> bool {
        true
    }

    fn set_window_size(&mut self, size: usize) {
        self.window_size = size as i64;
    }

    fn result(&self) -> Value {
        let n = self.num_buckets;
        let total_rows = self.window_size.max(self.seen).max(1);
        let row_num = self.seen.max(1);

        // 10 rows into 3 buckets: rows 1-4, 5-7, 8-10
        let base_size = total_rows / n;
        let remainder = total_rows % n;

        let bucket = if row_num <= remainder * (base_size + 1) {
            (row_num - 1) / (base_size + 1) + 1
        } else {
            let rows_in_larger_buckets = remainder * (base_size + 1);
            let remaining_row = row_num - rows_in_larger_buckets;
            if base_size > 0 {
                remainder + (remaining_row - 1) / base_size + 1
            } else {
                n
            }
        };

        Value::Integer(bucket.min(n))
    }

    fn reset(&mut self) {
        self.seen = 0;
    }

    fn clone_box(&self) -> Box<dyn AggregateFunction> {
        Box::new(NtileFunction::new(self.num_buckets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buckets(n: i64, rows: usize) -> Vec<i64> {
        let mut f = NtileFunction::default();
        f.configure(&[Value::Integer(n)]).unwrap();
        f.set_window_size(rows);
        (0..rows)
            .map(|_| {
                f.accumulate(&Value::Boolean(true));
                f.result().as_int64().unwrap()
            })
            .collect()
    }

    #[test]
    fn test_ntile_even_distribution() {
        assert_eq!(buckets(3, 6), vec![1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn test_ntile_uneven_distribution() {
        assert_eq!(buckets(3, 10), vec![1, 1, 1, 1, 2, 2, 2, 3, 3, 3]);
    }

    #[test]
    fn test_ntile_more_buckets_than_rows() {
        assert_eq!(buckets(5, 3), vec![1, 2, 3]);
    }

    #[test]
    fn test_ntile_configure_rejects_non_positive() {
        let mut f = NtileFunction::default();
        assert!(f.configure(&[Value::Integer(0)]).is_err());
        assert!(f.configure(&[Value::text("3")]).is_err());
        assert!(f.configure(&[]).is_err());
    }

    #[test]
    fn test_ntile_reset_keeps_bucket_count() {
        let mut f = NtileFunction::default();
        f.configure(&[Value::Integer(2)]).unwrap();
        f.set_window_size(4);
        f.accumulate(&Value::Boolean(true));
        f.accumulate(&Value::Boolean(true));
        f.accumulate(&Value::Boolean(true));
        assert_eq!(f.result(), Value::Integer(2));
        f.reset();
        f.accumulate(&Value::Boolean(true));
        assert_eq!(f.result(), Value::Integer(1));
        assert_eq!(f.clone_box().result(), Value::Integer(1));
    }
}
