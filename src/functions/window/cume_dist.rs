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

//! CUME_DIST window function

use crate::core::Value;
use crate::functions::{
    AggregateFunction, FunctionDataType, FunctionInfo, FunctionSignature, FunctionType,
};

/// CUME_DIST window function
///
/// (rows <= current) / total_rows. Over a growing
/// `RANGE UNBOUNDED PRECEDING .. CURRENT ROW` frame the accumulated rows are
/// exactly the current row and everything ordered before it, peers included.
#[derive(Default)]
pub struct CumeDistFunction {
    window_size: usize,
    seen: usize,
}

impl AggregateFunction for CumeDistFunction {
    fn name(&self) -> &str {
        "CUME_DIST"
    }

    fn info(&self) -> FunctionInfo {
        FunctionInfo::new(
            "CUME_DIST",
            FunctionType::Window,
            "Returns the cumulative distribution of a value: (rows <= current) / total_rows",
            FunctionSignature::new(FunctionDataType::Float, vec![], 0, 0),
        )
    }

    fn accumulate(&mut self, _value: &Value) {
        self.seen += 1;
    }

    fn is_size_sensitive(&self) -> bool {
        true
    }

    fn set_window_size(&mut self, size: usize) {
        self.window_size = size;
    }

    fn result(&self) -> Value {
        if self.window_size == 0 {
            return Value::Float(1.0);
        }
        Value::Float(self.seen as f64 / self.window_size as f64)
    }

    fn reset(&mut self) {
        self.seen = 0;
    }

    fn clone_box(&self) -> Box<dyn AggregateFunction> {
        Box::new(CumeDistFunction::default())
    }
}
