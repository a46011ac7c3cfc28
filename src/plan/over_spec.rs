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

//! Window specification model
//!
//! An [`OverSpec`] is a list of window groups that share one partitioning.
//! Each [`GroupSpec`] carries its ordering, frame and aggregate calls. All of
//! it is immutable once the operator is built.

use std::fmt;

use crate::core::{DataType, Error, Result, Row, Value};
use crate::functions::global_registry;

/// Either a reference to an input field or a constant
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Input field by position
    Field(usize),
    /// Compile-time constant
    Literal(Value),
}

impl Operand {
    /// Reference an input field
    pub fn field(index: usize) -> Self {
        Operand::Field(index)
    }

    /// Wrap a constant
    pub fn literal(value: impl Into<Value>) -> Self {
        Operand::Literal(value.into())
    }

    /// Evaluate against a row
    #[inline]
    pub fn eval(&self, row: &Row) -> Result<Value> {
        match self {
            Operand::Field(index) => row.field(*index).cloned(),
            Operand::Literal(value) => Ok(value.clone()),
        }
    }

    /// Static type of the operand for the given input row type
    pub fn data_type(&self, input_types: &[DataType]) -> Result<DataType> {
        match self {
            Operand::Field(index) => {
                input_types
                    .get(*index)
                    .copied()
                    .ok_or(Error::FieldIndexOutOfBounds {
                        index: *index,
                        arity: input_types.len(),
                    })
            }
            Operand::Literal(value) => Ok(value.data_type()),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Field(index) => write!(f, "${}", index),
            Operand::Literal(value) => write!(f, "{}", value),
        }
    }
}

/// One ordering key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortField {
    pub index: usize,
    pub ascending: bool,
}

/// Ordering of a window group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub fields: Vec<SortField>,
}

impl SortSpec {
    /// Create an empty ordering
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an ascending key
    pub fn asc(mut self, index: usize) -> Self {
        self.fields.push(SortField {
            index,
            ascending: true,
        });
        self
    }

    /// Append a descending key
    pub fn desc(mut self, index: usize) -> Self {
        self.fields.push(SortField {
            index,
            ascending: false,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The first ordering key, measured by RANGE offsets
    pub fn primary(&self) -> Option<&SortField> {
        self.fields.first()
    }
}

/// Unit in which frame boundaries are measured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameUnit {
    /// Row counts
    Rows,
    /// Distance in the primary ordering field's domain
    Range,
}

impl fmt::Display for FrameUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameUnit::Rows => write!(f, "ROWS"),
            FrameUnit::Range => write!(f, "RANGE"),
        }
    }
}

/// One side of a frame
///
/// `Bounded` holds a signed distance: negative values lie before the current
/// row (PRECEDING), positive values after it (FOLLOWING).
#[derive(Debug, Clone, PartialEq)]
pub enum FrameBound {
    CurrentRow,
    UnboundedPreceding,
    UnboundedFollowing,
    Bounded(Operand),
}

impl FrameBound {
    /// `n PRECEDING`
    pub fn preceding(n: i64) -> Self {
        FrameBound::Bounded(Operand::Literal(Value::Integer(n.saturating_neg())))
    }

    /// `n FOLLOWING`
    pub fn following(n: i64) -> Self {
        FrameBound::Bounded(Operand::Literal(Value::Integer(n)))
    }

    /// A signed distance of any additive type
    pub fn offset(distance: impl Into<Value>) -> Self {
        FrameBound::Bounded(Operand::Literal(distance.into()))
    }
}

impl fmt::Display for FrameBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameBound::CurrentRow => write!(f, "CURRENT ROW"),
            FrameBound::UnboundedPreceding => write!(f, "UNBOUNDED PRECEDING"),
            FrameBound::UnboundedFollowing => write!(f, "UNBOUNDED FOLLOWING"),
            FrameBound::Bounded(Operand::Literal(Value::Integer(n))) if *n < 0 => {
                write!(f, "{} PRECEDING", n.unsigned_abs())
            }
            FrameBound::Bounded(Operand::Literal(Value::Float(x))) if *x < 0.0 => {
                write!(f, "{} PRECEDING", -x)
            }
            FrameBound::Bounded(op) => write!(f, "{} FOLLOWING", op),
        }
    }
}

/// Direction of an offset-style call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetDirection {
    /// LEAD
    Forward,
    /// LAG
    Backward,
}

impl OffsetDirection {
    /// +1 for LEAD, -1 for LAG
    pub fn sign(self) -> i64 {
        match self {
            OffsetDirection::Forward => 1,
            OffsetDirection::Backward => -1,
        }
    }
}

/// Offset and default of a LEAD/LAG call
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetCall {
    pub direction: OffsetDirection,
    /// Row distance, a literal or an integral field
    pub offset: Operand,
    /// Value used when the target row is outside the partition
    pub default: Operand,
}

/// An aggregate call attached to a window group
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateCall {
    /// Upper-case function name
    pub name: String,
    /// Arguments as written; the first one is the aggregated value
    pub args: Vec<Operand>,
    /// Result depends on the total window size
    pub size_sensitive: bool,
    /// Present for LEAD/LAG
    pub offset: Option<OffsetCall>,
}

impl AggregateCall {
    /// Build a call by function name
    ///
    /// LEAD and LAG become offset-style calls: `(value, offset = 1,
    /// default = NULL)`. Size sensitivity comes from the registered function.
    pub fn new(name: impl Into<String>, args: Vec<Operand>) -> Self {
        let name = name.into().to_uppercase();
        let direction = match name.as_str() {
            "LEAD" => Some(OffsetDirection::Forward),
            "LAG" => Some(OffsetDirection::Backward),
            _ => None,
        };
        let offset = direction.map(|direction| OffsetCall {
            direction,
            offset: args
                .get(1)
                .cloned()
                .unwrap_or(Operand::Literal(Value::Integer(1))),
            default: args
                .get(2)
                .cloned()
                .unwrap_or(Operand::Literal(Value::null_unknown())),
        });
        let size_sensitive = global_registry()
            .get_aggregate(&name)
            .is_some_and(|f| f.is_size_sensitive());

        Self {
            name,
            args,
            size_sensitive,
            offset,
        }
    }

    /// COUNT(*)
    pub fn count_star() -> Self {
        Self::new("COUNT", vec![])
    }

    /// Single-argument aggregate over a field
    pub fn on_field(name: impl Into<String>, index: usize) -> Self {
        Self::new(name, vec![Operand::Field(index)])
    }

    /// LEAD(value, offset, default)
    pub fn lead(value: usize, offset: Operand, default: Operand) -> Self {
        Self::new("LEAD", vec![Operand::Field(value), offset, default])
    }

    /// LAG(value, offset, default)
    pub fn lag(value: usize, offset: Operand, default: Operand) -> Self {
        Self::new("LAG", vec![Operand::Field(value), offset, default])
    }

    pub fn is_offset_style(&self) -> bool {
        self.offset.is_some()
    }

    /// The operand fed to `accumulate`, None for calls without arguments
    pub fn value_operand(&self) -> Option<&Operand> {
        self.args.first()
    }

    /// Literal arguments passed to `configure`
    pub fn literal_args(&self) -> Vec<Value> {
        self.args
            .iter()
            .filter_map(|arg| match arg {
                Operand::Literal(v) => Some(v.clone()),
                Operand::Field(_) => None,
            })
            .collect()
    }
}

impl fmt::Display for AggregateCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        if self.args.is_empty() && self.name == "COUNT" {
            write!(f, "*")?;
        }
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}

/// One window group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSpec {
    pub partition_fields: Vec<usize>,
    pub sort: SortSpec,
    pub unit: FrameUnit,
    pub lower: FrameBound,
    pub upper: FrameBound,
    pub calls: Vec<AggregateCall>,
}

impl GroupSpec {
    /// A group over the given partition fields with the SQL default frame,
    /// `RANGE BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW`
    pub fn new(partition_fields: Vec<usize>) -> Self {
        Self {
            partition_fields,
            sort: SortSpec::new(),
            unit: FrameUnit::Range,
            lower: FrameBound::UnboundedPreceding,
            upper: FrameBound::CurrentRow,
            calls: Vec::new(),
        }
    }

    pub fn order_by(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    /// `ROWS BETWEEN lower AND upper`
    pub fn rows(mut self, lower: FrameBound, upper: FrameBound) -> Self {
        self.unit = FrameUnit::Rows;
        self.lower = lower;
        self.upper = upper;
        self
    }

    /// `RANGE BETWEEN lower AND upper`
    pub fn range(mut self, lower: FrameBound, upper: FrameBound) -> Self {
        self.unit = FrameUnit::Range;
        self.lower = lower;
        self.upper = upper;
        self
    }

    pub fn call(mut self, call: AggregateCall) -> Self {
        self.calls.push(call);
        self
    }
}

impl fmt::Display for GroupSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let calls: Vec<String> = self.calls.iter().map(|c| c.to_string()).collect();
        write!(f, "{} OVER (", calls.join(", "))?;
        if !self.partition_fields.is_empty() {
            let parts: Vec<String> = self
                .partition_fields
                .iter()
                .map(|i| format!("${}", i))
                .collect();
            write!(f, "PARTITION BY {} ", parts.join(", "))?;
        }
        if !self.sort.is_empty() {
            let keys: Vec<String> = self
                .sort
                .fields
                .iter()
                .map(|k| format!("${} {}", k.index, if k.ascending { "ASC" } else { "DESC" }))
                .collect();
            write!(f, "ORDER BY {} ", keys.join(", "))?;
        }
        write!(
            f,
            "{} BETWEEN {} AND {})",
            self.unit, self.lower, self.upper
        )
    }
}

/// All window groups evaluated by one operator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverSpec {
    pub groups: Vec<GroupSpec>,
}

impl OverSpec {
    pub fn new(groups: Vec<GroupSpec>) -> Self {
        Self { groups }
    }

    pub fn group(mut self, group: GroupSpec) -> Self {
        self.groups.push(group);
        self
    }

    /// Partition fields shared by every group
    pub fn partition_fields(&self) -> &[usize] {
        self.groups
            .first()
            .map(|g| g.partition_fields.as_slice())
            .unwrap_or(&[])
    }

    /// The ordering the input must be sorted by after the partition fields
    ///
    /// The last group's ordering stands for all groups. Callers guarantee the
    /// other groups' orderings are compatible with it.
    pub fn representative_sort(&self) -> Option<&SortSpec> {
        self.groups.last().map(|g| &g.sort)
    }

    /// Number of result fields appended to every input row
    pub fn output_arity(&self) -> usize {
        self.groups.iter().map(|g| g.calls.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_lag_defaults() {
        let call = AggregateCall::new("lag", vec![Operand::field(2)]);
        assert_eq!(call.name, "LAG");
        let offset = call.offset.as_ref().unwrap();
        assert_eq!(offset.direction.sign(), -1);
        assert_eq!(offset.offset, Operand::literal(1i64));
        assert!(matches!(offset.default, Operand::Literal(Value::Null(_))));
        assert!(!call.size_sensitive);
    }

    #[test]
    fn test_size_sensitive_from_registry() {
        assert!(AggregateCall::new("NTILE", vec![Operand::literal(4i64)]).size_sensitive);
        assert!(AggregateCall::new("cume_dist", vec![]).size_sensitive);
        assert!(!AggregateCall::on_field("SUM", 1).size_sensitive);
        assert!(!AggregateCall::new("NO_SUCH_FN", vec![]).size_sensitive);
    }

    #[test]
    fn test_operand_eval() {
        let row = crate::row![10i64, "x"];
        assert_eq!(Operand::field(0).eval(&row).unwrap(), Value::integer(10));
        assert_eq!(Operand::literal(3i64).eval(&row).unwrap(), Value::integer(3));
        assert!(Operand::field(9).eval(&row).is_err());
        assert_eq!(
            Operand::field(1)
                .data_type(&[DataType::Integer, DataType::Text])
                .unwrap(),
            DataType::Text
        );
    }

    #[test]
    fn test_group_display() {
        let group = GroupSpec::new(vec![0])
            .order_by(SortSpec::new().asc(1))
            .rows(FrameBound::preceding(1), FrameBound::CurrentRow)
            .call(AggregateCall::on_field("SUM", 1))
            .call(AggregateCall::count_star());
        assert_eq!(
            group.to_string(),
            "SUM($1), COUNT(*) OVER (PARTITION BY $0 ORDER BY $1 ASC ROWS BETWEEN 1 PRECEDING AND CURRENT ROW)"
        );
    }

    #[test]
    fn test_representative_sort_is_last_group() {
        let spec = OverSpec::new(vec![
            GroupSpec::new(vec![0]).order_by(SortSpec::new().asc(1)),
            GroupSpec::new(vec![0]).order_by(SortSpec::new().desc(2)),
        ]);
        assert_eq!(spec.representative_sort().unwrap(), &SortSpec::new().desc(2));
        assert_eq!(spec.partition_fields(), &[0]);
    }
}
