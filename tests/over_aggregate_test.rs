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

//! OVER Aggregate Operator Tests
//!
//! End-to-end runs of the operator over sorted input: ROWS, RANGE,
//! whole-partition and LEAD/LAG windows, driver agreement and plan
//! validation.

use chrono::{TimeZone, Utc};
use overframe::{
    AggregateCall, DataType, Error, FrameBound, GroupSpec, Operand, OverAggregateConfig,
    OverAggregateOperator, OverSpec, Row, SortSpec, Value,
};

/// (region, day, amount) rows, sorted by region then day
fn sales() -> Vec<Row> {
    [
        ("north", 1, 100),
        ("north", 2, 200),
        ("north", 2, 50),
        ("north", 5, 300),
        ("south", 1, 10),
        ("south", 3, 30),
        ("west", 7, 70),
    ]
    .iter()
    .map(|(region, day, amount)| {
        Row::from_values(vec![
            Value::text(*region),
            Value::integer(*day),
            Value::integer(*amount),
        ])
    })
    .collect()
}

const SALES_TYPES: [DataType; 3] = [DataType::Text, DataType::Integer, DataType::Integer];

fn run(groups: Vec<GroupSpec>, types: &[DataType], input: Vec<Row>) -> Vec<Row> {
    let mut op = OverAggregateOperator::new(
        &OverSpec::new(groups),
        types,
        &OverAggregateConfig::default(),
    )
    .expect("Failed to build operator");
    op.execute(input).expect("Failed to execute")
}

/// Appended column `index` (counted after the input fields)
fn column(rows: &[Row], arity: usize, index: usize) -> Vec<Value> {
    rows.iter().map(|r| r[arity + index].clone()).collect()
}

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().map(|v| Value::integer(*v)).collect()
}

fn by_region() -> GroupSpec {
    GroupSpec::new(vec![0]).order_by(SortSpec::new().asc(1))
}

// =============================================================================
// ROWS frames
// =============================================================================

#[test]
fn test_rows_sliding_sum() {
    let input: Vec<Row> = [10i64, 20, 30]
        .iter()
        .map(|v| Row::from_values(vec![Value::integer(*v)]))
        .collect();
    let group = GroupSpec::new(vec![])
        .order_by(SortSpec::new().asc(0))
        .rows(FrameBound::preceding(1), FrameBound::CurrentRow)
        .call(AggregateCall::on_field("SUM", 0));
    let out = run(vec![group], &[DataType::Integer], input);
    assert_eq!(column(&out, 1, 0), ints(&[10, 30, 50]));
}

#[test]
fn test_rows_frames_per_partition() {
    let groups = vec![
        by_region()
            .rows(FrameBound::UnboundedPreceding, FrameBound::CurrentRow)
            .call(AggregateCall::on_field("SUM", 2)),
        by_region()
            .rows(FrameBound::CurrentRow, FrameBound::UnboundedFollowing)
            .call(AggregateCall::on_field("MAX", 2))
            .call(AggregateCall::count_star()),
        by_region()
            .rows(FrameBound::preceding(1), FrameBound::following(1))
            .call(AggregateCall::on_field("AVG", 2)),
    ];
    let out = run(groups, &SALES_TYPES, sales());
    assert_eq!(out.len(), 7);
    assert_eq!(out[0].len(), 3 + 4);

    assert_eq!(
        column(&out, 3, 0),
        ints(&[100, 300, 350, 650, 10, 40, 70])
    );
    assert_eq!(
        column(&out, 3, 1),
        ints(&[300, 300, 300, 300, 30, 30, 70])
    );
    assert_eq!(column(&out, 3, 2), ints(&[4, 3, 2, 1, 2, 1, 1]));
    assert_eq!(
        column(&out, 3, 3),
        vec![
            Value::float(150.0),
            Value::float(350.0 / 3.0),
            Value::float(550.0 / 3.0),
            Value::float(175.0),
            Value::float(20.0),
            Value::float(20.0),
            Value::float(70.0),
        ]
    );
}

#[test]
fn test_output_keeps_input_fields_and_order() {
    let group = by_region()
        .rows(FrameBound::CurrentRow, FrameBound::CurrentRow)
        .call(AggregateCall::on_field("MIN", 2));
    let input = sales();
    let out = run(vec![group], &SALES_TYPES, input.clone());
    for (i, row) in out.iter().enumerate() {
        assert_eq!(&row.as_slice()[..3], input[i].as_slice());
        assert_eq!(row[3], input[i][2]);
    }
}

// =============================================================================
// Whole-partition and RANGE frames
// =============================================================================

#[test]
fn test_insensitive_is_constant_per_partition() {
    let input: Vec<Row> = [10i64, 20, 30]
        .iter()
        .map(|v| Row::from_values(vec![Value::integer(*v)]))
        .collect();
    let group = GroupSpec::new(vec![]).call(AggregateCall::on_field("SUM", 0));
    let out = run(vec![group], &[DataType::Integer], input);
    assert_eq!(column(&out, 1, 0), ints(&[60, 60, 60]));

    let group = GroupSpec::new(vec![0])
        .call(AggregateCall::on_field("SUM", 2))
        .call(AggregateCall::count_star());
    let out = run(vec![group], &SALES_TYPES, sales());
    assert_eq!(column(&out, 3, 0), ints(&[650, 650, 650, 650, 40, 40, 70]));
    assert_eq!(column(&out, 3, 1), ints(&[4, 4, 4, 4, 2, 2, 1]));
}

#[test]
fn test_default_range_frame_includes_peers() {
    let group = by_region().call(AggregateCall::on_field("SUM", 2));
    let out = run(vec![group], &SALES_TYPES, sales());
    // Day 2 rows are peers and see each other
    assert_eq!(
        column(&out, 3, 0),
        ints(&[100, 350, 350, 650, 10, 40, 70])
    );
}

#[test]
fn test_range_value_distance() {
    let group = by_region()
        .range(FrameBound::preceding(1), FrameBound::following(1))
        .call(AggregateCall::count_star());
    let out = run(vec![group], &SALES_TYPES, sales());
    assert_eq!(column(&out, 3, 0), ints(&[3, 3, 3, 1, 1, 1, 1]));
}

#[test]
fn test_range_descending_order() {
    let input: Vec<Row> = [9i64, 7, 6, 3]
        .iter()
        .map(|v| Row::from_values(vec![Value::integer(*v)]))
        .collect();
    let group = GroupSpec::new(vec![])
        .order_by(SortSpec::new().desc(0))
        .range(FrameBound::preceding(2), FrameBound::CurrentRow)
        .call(AggregateCall::on_field("SUM", 0));
    let out = run(vec![group], &[DataType::Integer], input);
    // 9 | 9+7 | 7+6 | 3
    assert_eq!(column(&out, 1, 0), ints(&[9, 16, 13, 3]));
}

#[test]
fn test_range_with_null_keys() {
    let null = Value::null(DataType::Integer);
    let input: Vec<Row> = vec![null.clone(), null, Value::integer(1), Value::integer(4)]
        .into_iter()
        .map(|k| Row::from_values(vec![k, Value::integer(1)]))
        .collect();
    let group = GroupSpec::new(vec![])
        .order_by(SortSpec::new().asc(0))
        .range(FrameBound::preceding(5), FrameBound::CurrentRow)
        .call(AggregateCall::on_field("SUM", 1));
    let out = run(vec![group], &[DataType::Integer, DataType::Integer], input);
    // NULL keys only see each other
    assert_eq!(column(&out, 2, 0), ints(&[2, 2, 1, 2]));
}

#[test]
fn test_range_over_timestamps() {
    let minute = |m: i64| Value::timestamp(Utc.timestamp_opt(m * 60, 0).unwrap());
    let input: Vec<Row> = [0i64, 1, 2, 10, 11]
        .iter()
        .map(|m| Row::from_values(vec![minute(*m), Value::float(1.5)]))
        .collect();
    let group = GroupSpec::new(vec![])
        .order_by(SortSpec::new().asc(0))
        .range(FrameBound::preceding(60_000), FrameBound::CurrentRow)
        .call(AggregateCall::on_field("SUM", 1));
    let out = run(
        vec![group],
        &[DataType::Timestamp, DataType::Float],
        input,
    );
    assert_eq!(
        column(&out, 2, 0),
        vec![
            Value::float(1.5),
            Value::float(3.0),
            Value::float(3.0),
            Value::float(1.5),
            Value::float(3.0),
        ]
    );
}

// =============================================================================
// LEAD / LAG
// =============================================================================

#[test]
fn test_lag_with_default() {
    let input: Vec<Row> = [10i64, 20, 30]
        .iter()
        .map(|v| Row::from_values(vec![Value::integer(*v)]))
        .collect();
    let group = GroupSpec::new(vec![])
        .order_by(SortSpec::new().asc(0))
        .call(AggregateCall::lag(0, Operand::literal(1i64), Operand::literal(0i64)));
    let out = run(vec![group], &[DataType::Integer], input);
    assert_eq!(column(&out, 1, 0), ints(&[0, 10, 20]));
}

#[test]
fn test_lead_and_lag_per_partition() {
    let group = by_region()
        .call(AggregateCall::lead(2, Operand::literal(1i64), Operand::literal(-1i64)))
        .call(AggregateCall::lag(2, Operand::literal(2i64), Operand::field(1)));
    let out = run(vec![group], &SALES_TYPES, sales());
    assert_eq!(column(&out, 3, 0), ints(&[200, 50, 300, -1, 30, -1, -1]));
    // Default is the row's own day
    assert_eq!(column(&out, 3, 1), ints(&[1, 2, 100, 200, 1, 3, 7]));
}

// =============================================================================
// Size-sensitive functions
// =============================================================================

#[test]
fn test_ntile_and_cume_dist() {
    let input: Vec<Row> = (1..=5i64)
        .map(|v| Row::from_values(vec![Value::integer(v)]))
        .collect();
    let groups = vec![
        GroupSpec::new(vec![])
            .order_by(SortSpec::new().asc(0))
            .rows(FrameBound::UnboundedPreceding, FrameBound::CurrentRow)
            .call(AggregateCall::new("NTILE", vec![Operand::literal(2i64)])),
        GroupSpec::new(vec![])
            .order_by(SortSpec::new().asc(0))
            .call(AggregateCall::new("CUME_DIST", vec![])),
    ];
    let out = run(groups, &[DataType::Integer], input);
    assert_eq!(column(&out, 1, 0), ints(&[1, 1, 1, 2, 2]));
    assert_eq!(
        column(&out, 1, 1),
        [0.2, 0.4, 0.6, 0.8, 1.0].map(Value::float).to_vec()
    );
}

// =============================================================================
// Drivers and partitions
// =============================================================================

#[test]
fn test_streaming_and_buffered_drivers_agree() {
    let current = by_region()
        .rows(FrameBound::CurrentRow, FrameBound::CurrentRow)
        .call(AggregateCall::on_field("SUM", 2))
        .call(AggregateCall::count_star());

    let mut streaming = OverAggregateOperator::new(
        &OverSpec::new(vec![current.clone()]),
        &SALES_TYPES,
        &OverAggregateConfig::default(),
    )
    .unwrap();
    assert!(!streaming.is_buffered());

    // A whole-partition group forces buffering for both groups
    let mut buffered = OverAggregateOperator::new(
        &OverSpec::new(vec![
            current,
            GroupSpec::new(vec![0]).call(AggregateCall::count_star()),
        ]),
        &SALES_TYPES,
        &OverAggregateConfig::default(),
    )
    .unwrap();
    assert!(buffered.is_buffered());

    let a = streaming.execute(sales()).unwrap();
    let b = buffered.execute(sales()).unwrap();
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.as_slice(), &y.as_slice()[..x.len()]);
    }
}

#[test]
fn test_partition_isolation() {
    let group = by_region()
        .rows(FrameBound::preceding(5), FrameBound::following(5))
        .call(AggregateCall::on_field("SUM", 2));
    let base = run(vec![group.clone()], &SALES_TYPES, sales());

    let mut changed = sales();
    changed[0] = Row::from_values(vec![
        Value::text("north"),
        Value::integer(1),
        Value::integer(1_000_000),
    ]);
    let other = run(vec![group], &SALES_TYPES, changed);
    for i in 4..7 {
        assert_eq!(base[i], other[i], "row {} of another partition changed", i);
    }
    assert_ne!(base[0][3], other[0][3]);
}

#[test]
fn test_empty_input() {
    let group = GroupSpec::new(vec![0]).call(AggregateCall::count_star());
    assert!(run(vec![group], &SALES_TYPES, vec![]).is_empty());
}

#[test]
fn test_operator_is_reusable_after_end_input() {
    let group = GroupSpec::new(vec![0]).call(AggregateCall::count_star());
    let mut op = OverAggregateOperator::new(
        &OverSpec::new(vec![group]),
        &SALES_TYPES,
        &OverAggregateConfig::default(),
    )
    .unwrap();
    let first = op.execute(sales()).unwrap();
    let second = op.execute(sales()).unwrap();
    assert_eq!(first, second);
}

// =============================================================================
// Validation
// =============================================================================

fn build_error(group: GroupSpec) -> Error {
    match OverAggregateOperator::new(
        &OverSpec::new(vec![group]),
        &SALES_TYPES,
        &OverAggregateConfig::default(),
    ) {
        Ok(_) => panic!("expected a validation error"),
        Err(e) => e,
    }
}

#[test]
fn test_validation_errors() {
    let err = build_error(by_region().call(AggregateCall::on_field("MEDIAN", 2)));
    assert_eq!(err, Error::FunctionNotFound("MEDIAN".to_string()));

    let err = build_error(
        GroupSpec::new(vec![1])
            .order_by(SortSpec::new().asc(0))
            .range(FrameBound::preceding(1), FrameBound::CurrentRow)
            .call(AggregateCall::count_star()),
    );
    assert_eq!(
        err,
        Error::RangeKeyNotAdditive {
            index: 0,
            data_type: DataType::Text
        }
    );

    let err = build_error(by_region().call(AggregateCall::lead(
        2,
        Operand::field(0),
        Operand::literal(0i64),
    )));
    assert_eq!(
        err,
        Error::OffsetNotIntegral {
            index: 0,
            data_type: DataType::Text
        }
    );

    let err = build_error(
        by_region()
            .rows(FrameBound::preceding(2), FrameBound::CurrentRow)
            .call(AggregateCall::new("CUME_DIST", vec![])),
    );
    assert!(matches!(err, Error::RetractionNotSupported { .. }));
    assert!(err.is_validation());
}
