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

//! Execution mode classification
//!
//! Every window group maps to exactly one [`OverWindowMode`], and every ROW
//! or RANGE frame to one [`FrameShape`]. Both are derived once when the
//! operator is built.

use std::fmt;

use super::over_spec::{AggregateCall, FrameBound, FrameUnit, GroupSpec, OverSpec};
use crate::core::{Error, Result};
use crate::functions::FunctionRegistry;

/// How a window group is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverWindowMode {
    /// Row-count frame
    Row,
    /// Value-distance frame over the primary ordering field
    Range,
    /// No ordering, the frame is the whole partition
    Insensitive,
    /// Only LEAD/LAG calls, one single-row frame per call
    Offset,
}

impl OverWindowMode {
    /// Classify a group, first matching rule wins
    pub fn infer(group: &GroupSpec) -> Self {
        if !group.calls.is_empty() && group.calls.iter().all(|c| c.is_offset_style()) {
            OverWindowMode::Offset
        } else if group.sort.is_empty() {
            OverWindowMode::Insensitive
        } else if group.unit == FrameUnit::Rows {
            OverWindowMode::Row
        } else {
            OverWindowMode::Range
        }
    }
}

impl fmt::Display for OverWindowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverWindowMode::Row => write!(f, "ROW"),
            OverWindowMode::Range => write!(f, "RANGE"),
            OverWindowMode::Insensitive => write!(f, "INSENSITIVE"),
            OverWindowMode::Offset => write!(f, "OFFSET"),
        }
    }
}

/// Traversal pattern of a ROW or RANGE frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameShape {
    /// Unbounded on both sides
    Unbounded,
    /// Lower bound is UNBOUNDED PRECEDING
    Growing,
    /// Upper bound is UNBOUNDED FOLLOWING
    Shrinking,
    /// Bounded on both sides
    Sliding,
    /// `ROWS BETWEEN CURRENT ROW AND CURRENT ROW`
    CurrentRowOnly,
}

impl FrameShape {
    /// Classify a boundary pair
    ///
    /// A lower UNBOUNDED FOLLOWING or an upper UNBOUNDED PRECEDING describes
    /// no frame at all and is rejected.
    pub fn classify(unit: FrameUnit, lower: &FrameBound, upper: &FrameBound) -> Result<Self> {
        match (lower, upper) {
            (FrameBound::UnboundedFollowing, _) => Err(Error::invalid_frame(format!(
                "lower bound cannot be {}",
                lower
            ))),
            (_, FrameBound::UnboundedPreceding) => Err(Error::invalid_frame(format!(
                "upper bound cannot be {}",
                upper
            ))),
            (FrameBound::UnboundedPreceding, FrameBound::UnboundedFollowing) => {
                Ok(FrameShape::Unbounded)
            }
            (FrameBound::UnboundedPreceding, _) => Ok(FrameShape::Growing),
            (_, FrameBound::UnboundedFollowing) => Ok(FrameShape::Shrinking),
            (FrameBound::CurrentRow, FrameBound::CurrentRow) if unit == FrameUnit::Rows => {
                Ok(FrameShape::CurrentRowOnly)
            }
            _ => Ok(FrameShape::Sliding),
        }
    }

    /// Whether rows leave the frame as the current row advances
    pub fn retracts(self) -> bool {
        matches!(self, FrameShape::Shrinking | FrameShape::Sliding)
    }
}

impl fmt::Display for FrameShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameShape::Unbounded => write!(f, "unbounded"),
            FrameShape::Growing => write!(f, "growing"),
            FrameShape::Shrinking => write!(f, "shrinking"),
            FrameShape::Sliding => write!(f, "sliding"),
            FrameShape::CurrentRowOnly => write!(f, "current-row"),
        }
    }
}

/// Whether `call` needs the window size, as declared or as `registry` knows it
fn is_size_sensitive(call: &AggregateCall, registry: &FunctionRegistry) -> bool {
    call.size_sensitive
        || registry
            .get_aggregate(&call.name)
            .is_some_and(|f| f.is_size_sensitive())
}

/// Whether one group needs its partition materialized
///
/// Only a ROW group whose frame is the current row alone, with no
/// size-sensitive call, can be computed in a single forward pass.
/// Size sensitivity is resolved against the registry the operator runs with.
pub fn group_needs_buffering(group: &GroupSpec, registry: &FunctionRegistry) -> bool {
    if group.calls.iter().any(|c| is_size_sensitive(c, registry)) {
        return true;
    }
    let current_row_only = OverWindowMode::infer(group) == OverWindowMode::Row
        && group.lower == FrameBound::CurrentRow
        && group.upper == FrameBound::CurrentRow;
    !current_row_only
}

/// Whether any group of `spec` needs buffering
pub fn needs_buffering(spec: &OverSpec, registry: &FunctionRegistry) -> bool {
    spec.groups
        .iter()
        .any(|group| group_needs_buffering(group, registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use crate::functions::{global_registry, AggregateFunction, FunctionInfo, NtileFunction};
    use crate::plan::over_spec::{Operand, SortSpec};

    fn ordered() -> GroupSpec {
        GroupSpec::new(vec![0]).order_by(SortSpec::new().asc(1))
    }

    #[test]
    fn test_mode_priority() {
        let lag = AggregateCall::lag(1, Operand::literal(1i64), Operand::literal(0i64));
        // Offset wins even without an ordering
        assert_eq!(
            OverWindowMode::infer(&GroupSpec::new(vec![0]).call(lag.clone())),
            OverWindowMode::Offset
        );
        assert_eq!(
            OverWindowMode::infer(&GroupSpec::new(vec![0]).call(AggregateCall::count_star())),
            OverWindowMode::Insensitive
        );
        assert_eq!(
            OverWindowMode::infer(
                &ordered()
                    .rows(FrameBound::preceding(1), FrameBound::CurrentRow)
                    .call(AggregateCall::count_star())
            ),
            OverWindowMode::Row
        );
        assert_eq!(
            OverWindowMode::infer(&ordered().call(AggregateCall::count_star()).call(lag)),
            OverWindowMode::Range
        );
    }

    #[test]
    fn test_frame_shapes() {
        use FrameBound::*;
        let rows = FrameUnit::Rows;
        assert_eq!(
            FrameShape::classify(rows, &UnboundedPreceding, &UnboundedFollowing).unwrap(),
            FrameShape::Unbounded
        );
        assert_eq!(
            FrameShape::classify(rows, &UnboundedPreceding, &FrameBound::following(2)).unwrap(),
            FrameShape::Growing
        );
        assert_eq!(
            FrameShape::classify(rows, &CurrentRow, &UnboundedFollowing).unwrap(),
            FrameShape::Shrinking
        );
        assert_eq!(
            FrameShape::classify(rows, &CurrentRow, &CurrentRow).unwrap(),
            FrameShape::CurrentRowOnly
        );
        assert_eq!(
            FrameShape::classify(FrameUnit::Range, &CurrentRow, &CurrentRow).unwrap(),
            FrameShape::Sliding
        );
        assert!(FrameShape::classify(rows, &UnboundedFollowing, &UnboundedFollowing).is_err());
        assert!(FrameShape::classify(rows, &CurrentRow, &UnboundedPreceding).is_err());
        assert!(FrameShape::Sliding.retracts());
        assert!(!FrameShape::Growing.retracts());
    }

    #[test]
    fn test_buffering_decision() {
        let registry = global_registry();
        let current_row = ordered()
            .rows(FrameBound::CurrentRow, FrameBound::CurrentRow)
            .call(AggregateCall::on_field("SUM", 1));
        assert!(!group_needs_buffering(&current_row, registry));

        let with_ntile = current_row
            .clone()
            .call(AggregateCall::new("NTILE", vec![Operand::literal(2i64)]));
        assert!(group_needs_buffering(&with_ntile, registry));

        let insensitive = GroupSpec::new(vec![0]).call(AggregateCall::on_field("SUM", 1));
        assert!(group_needs_buffering(&insensitive, registry));

        let range_current = ordered()
            .range(FrameBound::CurrentRow, FrameBound::CurrentRow)
            .call(AggregateCall::on_field("SUM", 1));
        assert!(group_needs_buffering(&range_current, registry));

        assert!(!needs_buffering(
            &OverSpec::new(vec![current_row.clone()]),
            registry
        ));
        assert!(needs_buffering(
            &OverSpec::new(vec![current_row, insensitive]),
            registry
        ));
    }

    #[test]
    fn test_size_sensitivity_follows_registry() {
        // Not known to the global registry, so the call itself is unflagged
        let call = AggregateCall::new("NTILE_ALIAS", vec![Operand::literal(2i64)]);
        assert!(!call.size_sensitive);
        let group = ordered()
            .rows(FrameBound::CurrentRow, FrameBound::CurrentRow)
            .call(call);
        assert!(!group_needs_buffering(&group, global_registry()));

        let registry = FunctionRegistry::new();
        registry.register_aggregate_factory(|| Box::new(NtileAlias::default()));
        assert!(group_needs_buffering(&group, &registry));
    }

    /// NTILE under a name only a private registry knows
    #[derive(Default)]
    struct NtileAlias(NtileFunction);

    impl AggregateFunction for NtileAlias {
        fn name(&self) -> &str {
            "NTILE_ALIAS"
        }

        fn info(&self) -> FunctionInfo {
            self.0.info()
        }

        fn accumulate(&mut self, value: &Value) {
            self.0.accumulate(value)
        }

        fn is_size_sensitive(&self) -> bool {
            true
        }

        fn result(&self) -> Value {
            self.0.result()
        }

        fn reset(&mut self) {
            self.0.reset()
        }

        fn clone_box(&self) -> Box<dyn AggregateFunction> {
            Box::new(NtileAlias::default())
        }
    }
}
