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

//! Plan validation
//!
//! Checks an [`OverSpec`] against the input row type before any row is
//! processed. Every failure here is a validation error.

use super::mode::{FrameShape, OverWindowMode};
use super::over_spec::{AggregateCall, FrameBound, GroupSpec, Operand, OverSpec};
use crate::core::{DataType, Error, Result, Value};
use crate::functions::FunctionRegistry;

/// Validate a specification against the input field types
pub fn validate(spec: &OverSpec, input_types: &[DataType], registry: &FunctionRegistry) -> Result<()> {
    let first = spec
        .groups
        .first()
        .ok_or_else(|| Error::invalid_spec("no window groups"))?;
    let partition = sorted(&first.partition_fields);

    for (gi, group) in spec.groups.iter().enumerate() {
        if sorted(&group.partition_fields) != partition {
            return Err(Error::invalid_spec(format!(
                "group {} partitions by {:?}, group 0 by {:?}",
                gi, group.partition_fields, first.partition_fields
            )));
        }
        validate_group(gi, group, input_types, registry)?;
    }
    Ok(())
}

fn sorted(fields: &[usize]) -> Vec<usize> {
    let mut fields = fields.to_vec();
    fields.sort_unstable();
    fields.dedup();
    fields
}

fn field_type(index: usize, input_types: &[DataType]) -> Result<DataType> {
    Operand::Field(index).data_type(input_types)
}

fn validate_group(
    gi: usize,
    group: &GroupSpec,
    input_types: &[DataType],
    registry: &FunctionRegistry,
) -> Result<()> {
    for &index in &group.partition_fields {
        field_type(index, input_types)?;
    }
    for key in &group.sort.fields {
        let data_type = field_type(key.index, input_types)?;
        if !data_type.is_orderable() {
            return Err(Error::invalid_spec(format!(
                "cannot order by field {} of type {}",
                key.index, data_type
            )));
        }
    }

    if group.calls.is_empty() {
        return Err(Error::invalid_spec(format!(
            "window group {} has no aggregate calls",
            gi
        )));
    }
    let offset_calls = group.calls.iter().filter(|c| c.is_offset_style()).count();
    if offset_calls > 0 && offset_calls < group.calls.len() {
        return Err(Error::invalid_spec(format!(
            "window group {} mixes LEAD/LAG with framed aggregates",
            gi
        )));
    }

    let mode = OverWindowMode::infer(group);
    if mode == OverWindowMode::Offset {
        for call in &group.calls {
            validate_call(call, input_types, registry)?;
            validate_offset_call(call, input_types)?;
        }
        return Ok(());
    }

    for bound in [&group.lower, &group.upper] {
        if let FrameBound::Bounded(Operand::Field(index)) = bound {
            return Err(Error::invalid_frame_offset(
                format!("${}", index),
                "field offsets are only allowed for LEAD/LAG",
            ));
        }
    }
    let shape = FrameShape::classify(group.unit, &group.lower, &group.upper)?;

    match mode {
        OverWindowMode::Row => {
            for value in bounded_literals(group) {
                if !matches!(value, Value::Integer(_)) {
                    return Err(Error::invalid_frame_offset(
                        value,
                        "ROWS offset must be an integer",
                    ));
                }
            }
        }
        OverWindowMode::Range => validate_range_offsets(group, input_types)?,
        _ => {}
    }

    for call in &group.calls {
        let function = validate_call(call, input_types, registry)?;
        let retracting = matches!(mode, OverWindowMode::Row | OverWindowMode::Range)
            && shape.retracts();
        if retracting && !function.supports_retract() {
            return Err(Error::retraction_not_supported(
                call.name.clone(),
                format!("{} {}", group.unit, shape),
            ));
        }
    }
    Ok(())
}

fn bounded_literals(group: &GroupSpec) -> impl Iterator<Item = &Value> {
    [&group.lower, &group.upper]
        .into_iter()
        .filter_map(|bound| match bound {
            FrameBound::Bounded(Operand::Literal(value)) => Some(value),
            _ => None,
        })
}

fn validate_range_offsets(group: &GroupSpec, input_types: &[DataType]) -> Result<()> {
    let mut literals = bounded_literals(group).peekable();
    if literals.peek().is_none() {
        return Ok(());
    }
    let key = group
        .sort
        .primary()
        .ok_or_else(|| Error::invalid_frame("RANGE offset without ORDER BY"))?;
    let key_type = field_type(key.index, input_types)?;
    if !key_type.is_additive() {
        return Err(Error::RangeKeyNotAdditive {
            index: key.index,
            data_type: key_type,
        });
    }

    for value in literals {
        let compatible = match key_type {
            DataType::Timestamp => matches!(value, Value::Integer(_)),
            _ => matches!(value, Value::Integer(_) | Value::Float(_)),
        };
        if !compatible {
            let reason = if key_type == DataType::Timestamp {
                "RANGE offset over a TIMESTAMP key must be integer milliseconds".to_string()
            } else {
                format!("RANGE offset must be numeric for a {} key", key_type)
            };
            return Err(Error::invalid_frame_offset(value, reason));
        }
    }
    Ok(())
}

/// Resolve, type-check and configure one call
fn validate_call(
    call: &AggregateCall,
    input_types: &[DataType],
    registry: &FunctionRegistry,
) -> Result<Box<dyn crate::functions::AggregateFunction>> {
    let mut function = registry.create(&call.name)?;
    function
        .info()
        .signature()
        .validate_arg_count(call.args.len())
        .map_err(|e| Error::invalid_argument(format!("{}: {}", call.name, e)))?;
    for arg in &call.args {
        arg.data_type(input_types)?;
    }
    function.configure(&call.literal_args())?;
    Ok(function)
}

fn validate_offset_call(call: &AggregateCall, input_types: &[DataType]) -> Result<()> {
    let Some(offset) = &call.offset else {
        return Ok(());
    };

    match &offset.offset {
        Operand::Literal(Value::Integer(_)) => {}
        Operand::Literal(other) => {
            return Err(Error::invalid_frame_offset(
                other,
                format!("{} offset must be an integer", call.name),
            ))
        }
        Operand::Field(index) => {
            let data_type = field_type(*index, input_types)?;
            if !data_type.is_integral() {
                return Err(Error::OffsetNotIntegral {
                    index: *index,
                    data_type,
                });
            }
        }
    }

    let value_type = match call.value_operand() {
        Some(value) => value.data_type(input_types)?,
        None => return Err(Error::invalid_argument(format!("{} needs a value", call.name))),
    };
    let default_type = offset.default.data_type(input_types)?;
    if !value_type.has_common_type(&default_type) {
        return Err(Error::DefaultTypeMismatch {
            expected: value_type,
            actual: default_type,
        });
    }
    Ok(())
}
