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

//! Row comparators
//!
//! - [`PartitionEqualiser`] finds partition boundaries in sorted input
//! - [`MultiFieldComparator`] orders rows by every ordering field
//! - [`BoundComparator`] decides RANGE frame membership for one bound

use std::cmp::Ordering;

use smallvec::SmallVec;

use crate::core::{Error, Result, Row, Value};
use crate::plan::{FrameBound, Operand, SortField, SortSpec};

/// Field indices of the partition key, stack-allocated for the common case
type KeyFields = SmallVec<[usize; 4]>;

/// Direction-agnostic equality over the partition fields
#[derive(Debug, Clone)]
pub struct PartitionEqualiser {
    fields: KeyFields,
}

impl PartitionEqualiser {
    pub fn new(fields: &[usize]) -> Self {
        Self {
            fields: fields.iter().copied().collect(),
        }
    }

    /// True if both rows belong to the same partition
    #[inline]
    pub fn equals(&self, a: &Row, b: &Row) -> Result<bool> {
        for &index in &self.fields {
            if a.field(index)? != b.field(index)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Orders two values along one sort key, NULL first in ascending order
#[inline]
fn directed(key: &SortField, a: &Value, b: &Value) -> Ordering {
    let ord = a.cmp(b);
    if key.ascending {
        ord
    } else {
        ord.reverse()
    }
}

/// Direction-aware comparison over all ordering fields
#[derive(Debug, Clone)]
pub struct MultiFieldComparator {
    keys: Vec<SortField>,
}

impl MultiFieldComparator {
    pub fn new(sort: &SortSpec) -> Self {
        Self {
            keys: sort.fields.clone(),
        }
    }

    /// Physical order of `a` relative to `b` in sorted input
    pub fn compare(&self, a: &Row, b: &Row) -> Result<Ordering> {
        for key in &self.keys {
            let ord = directed(key, a.field(key.index)?, b.field(key.index)?);
            if ord != Ordering::Equal {
                return Ok(ord);
            }
        }
        Ok(Ordering::Equal)
    }

    /// True if the rows are peers on every ordering field
    pub fn equals(&self, a: &Row, b: &Row) -> Result<bool> {
        Ok(self.compare(a, b)? == Ordering::Equal)
    }
}

#[derive(Debug, Clone)]
enum BoundKind {
    Unbounded,
    Peers(MultiFieldComparator),
    Distance { key: SortField, offset: Value },
}

/// Membership test of one RANGE bound
///
/// A lower bound admits candidates that are not before it, an upper bound
/// admits candidates that are not after it, both measured in the physical
/// order of the sorted partition.
#[derive(Debug, Clone)]
pub struct BoundComparator {
    kind: BoundKind,
    is_lower: bool,
}

impl BoundComparator {
    pub fn new(bound: &FrameBound, sort: &SortSpec, is_lower: bool) -> Result<Self> {
        let kind = match bound {
            FrameBound::UnboundedPreceding | FrameBound::UnboundedFollowing => BoundKind::Unbounded,
            FrameBound::CurrentRow => BoundKind::Peers(MultiFieldComparator::new(sort)),
            FrameBound::Bounded(Operand::Literal(offset)) => {
                let key = *sort
                    .primary()
                    .ok_or_else(|| Error::unexpected_frame_shape("RANGE offset without ordering"))?;
                // Descending keys move against the value domain
                let offset = if key.ascending {
                    offset.clone()
                } else {
                    offset.negated()?
                };
                BoundKind::Distance { key, offset }
            }
            FrameBound::Bounded(Operand::Field(index)) => {
                return Err(Error::unexpected_frame_shape(format!(
                    "RANGE bound on field ${}",
                    index
                )))
            }
        };
        Ok(Self { kind, is_lower })
    }

    /// True if `candidate` lies inside this bound relative to `current`
    pub fn admits(&self, current: &Row, candidate: &Row) -> Result<bool> {
        let ord = match &self.kind {
            BoundKind::Unbounded => return Ok(true),
            BoundKind::Peers(cmp) => cmp.compare(candidate, current)?,
            BoundKind::Distance { key, offset } => {
                let cur = current.field(key.index)?;
                let cand = candidate.field(key.index)?;
                match (cur.is_null(), cand.is_null()) {
                    (true, true) => return Ok(true),
                    // NULL is infinitely far from any value, only the side matters
                    (true, false) | (false, true) => directed(key, cand, cur),
                    (false, false) => directed(key, cand, &cur.shifted_by(offset)?),
                }
            }
        };
        Ok(if self.is_lower {
            ord != Ordering::Less
        } else {
            ord != Ordering::Greater
        })
    }
}
