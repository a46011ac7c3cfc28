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

use crate::core::{Result, Row};
use crate::executor::handle::AggregationHandle;
use crate::storage::ExternalBuffer;

/// Whole-partition frame
///
/// Accumulates every row once in `prepare` and replays the same value for
/// each row. Serves INSENSITIVE groups and ROW/RANGE frames unbounded on
/// both sides.
pub struct UnboundedFrame {
    handle: Box<dyn AggregationHandle>,
    value: Row,
}

impl UnboundedFrame {
    pub fn new(handle: Box<dyn AggregationHandle>) -> Self {
        Self {
            handle,
            value: Row::new(),
        }
    }

    pub fn prepare(&mut self, rows: &mut ExternalBuffer) -> Result<()> {
        self.handle.reset();
        self.handle.set_window_size(rows.len());
        for i in 0..rows.len() {
            self.handle.accumulate(&rows.get(i)?)?;
        }
        self.value = self.handle.current_value();
        Ok(())
    }

    #[inline]
    pub fn process(&self) -> Row {
        self.value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::buffer;
    use super::*;
    use crate::executor::handle::AggsHandle;
    use crate::functions::FunctionRegistry;
    use crate::plan::AggregateCall;
    use crate::row;

    #[test]
    fn test_same_value_for_every_row() {
        let handle = AggsHandle::new(
            &[AggregateCall::on_field("SUM", 0), AggregateCall::new("CUME_DIST", vec![])],
            &FunctionRegistry::new(),
        )
        .unwrap();
        let mut frame = UnboundedFrame::new(Box::new(handle));

        let mut rows = buffer(&[row![10i64], row![20i64], row![30i64]]);
        frame.prepare(&mut rows).unwrap();
        for _ in 0..3 {
            assert_eq!(frame.process(), row![60i64, 1.0]);
        }

        // A second partition starts from scratch
        let mut rows = buffer(&[row![5i64]]);
        frame.prepare(&mut rows).unwrap();
        assert_eq!(frame.process(), row![5i64, 1.0]);
    }

    #[test]
    fn test_empty_partition() {
        let handle = AggsHandle::new(&[AggregateCall::count_star()], &FunctionRegistry::new())
            .unwrap();
        let mut frame = UnboundedFrame::new(Box::new(handle));
        frame.prepare(&mut buffer(&[])).unwrap();
        assert_eq!(frame.process(), row![0i64]);
    }
}
