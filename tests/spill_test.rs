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

//! Spill Tests
//!
//! Partitions larger than the buffer budget go to disk. Results must not
//! depend on where the rows live, and spill files must not outlive the
//! partition that created them.

use overframe::{
    AggregateCall, DataType, FrameBound, GroupSpec, Operand, OverAggregateConfig,
    OverAggregateOperator, OverSpec, Row, SortSpec, Value,
};
use tempfile::tempdir;

const TYPES: [DataType; 4] = [
    DataType::Integer,
    DataType::Integer,
    DataType::Integer,
    DataType::Text,
];

/// Three partitions of 300, 1 and 120 rows: (part, seq, amount, label)
fn input() -> Vec<Row> {
    let mut rows = Vec::new();
    for (part, size) in [(0i64, 300i64), (1, 1), (2, 120)] {
        for seq in 0..size {
            let amount = if seq % 17 == 0 {
                Value::null(DataType::Integer)
            } else {
                Value::integer((seq * 7 + part) % 23 - 11)
            };
            rows.push(Row::from_values(vec![
                Value::integer(part),
                Value::integer(seq / 3),
                amount,
                Value::text(format!("p{}-row-{}", part, seq)),
            ]));
        }
    }
    rows
}

fn groups() -> Vec<GroupSpec> {
    let ordered = || GroupSpec::new(vec![0]).order_by(SortSpec::new().asc(1));
    vec![
        ordered()
            .rows(FrameBound::preceding(5), FrameBound::following(3))
            .call(AggregateCall::on_field("SUM", 2))
            .call(AggregateCall::on_field("MAX", 2)),
        ordered()
            .range(FrameBound::preceding(2), FrameBound::CurrentRow)
            .call(AggregateCall::on_field("COUNT", 2))
            .call(AggregateCall::on_field("AVG", 2)),
        ordered()
            .call(AggregateCall::lag(
                3,
                Operand::literal(4i64),
                Operand::literal("none"),
            ))
            .call(AggregateCall::lead(2, Operand::literal(1i64), Operand::literal(0i64))),
        GroupSpec::new(vec![0]).call(AggregateCall::on_field("MIN", 2)),
        ordered()
            .rows(FrameBound::UnboundedPreceding, FrameBound::CurrentRow)
            .call(AggregateCall::new("NTILE", vec![Operand::literal(4i64)]))
            .call(AggregateCall::count_star()),
    ]
}

fn run(config: &OverAggregateConfig) -> Vec<Row> {
    let mut op = OverAggregateOperator::new(&OverSpec::new(groups()), &TYPES, config)
        .expect("Failed to build operator");
    assert!(op.is_buffered());
    op.execute(input()).expect("Failed to execute")
}

fn files_in(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).expect("Failed to list spill dir").count()
}

// =============================================================================
// Result equivalence
// =============================================================================

#[test]
fn test_spilled_results_match_in_memory() {
    let expected = run(&OverAggregateConfig::default());
    assert_eq!(expected.len(), 421);

    let dir = tempdir().unwrap();
    let row_size = input()[0].estimated_size();
    for (budget, page_rows) in [(0, 1), (row_size * 10, 7), (row_size * 50, 1024)] {
        let config = OverAggregateConfig::new()
            .with_external_buffer_memory(budget)
            .with_spill_dir(dir.path())
            .with_spill_page_rows(page_rows);
        let spilled = run(&config);
        assert_eq!(
            spilled, expected,
            "budget={} page_rows={}",
            budget, page_rows
        );
        assert_eq!(files_in(dir.path()), 0);
    }
}

#[test]
fn test_from_query_budget_spills() {
    let dir = tempdir().unwrap();
    let query = format!(
        "table.exec.resource.external-buffer-memory=1kb&spill_dir={}&spill_page_rows=16",
        dir.path().display()
    );
    let config = OverAggregateConfig::from_query(&query).unwrap();
    assert_eq!(config.external_buffer_memory, 1024);

    assert_eq!(run(&config), run(&OverAggregateConfig::default()));
    assert_eq!(files_in(dir.path()), 0);
}

// =============================================================================
// Spill file lifetime
// =============================================================================

#[test]
fn test_spill_file_released_at_partition_end() {
    let dir = tempdir().unwrap();
    let config = OverAggregateConfig::new()
        .with_external_buffer_memory(0)
        .with_spill_dir(dir.path());
    let mut op = OverAggregateOperator::new(&OverSpec::new(groups()), &TYPES, &config).unwrap();

    let mut out: Vec<Row> = Vec::new();
    let mut rows = input().into_iter();

    for row in rows.by_ref().take(300) {
        op.process_element(row, &mut out).unwrap();
    }
    // First partition still open
    assert!(out.is_empty());
    assert_eq!(files_in(dir.path()), 1);

    // The single-row partition closes the first one
    op.process_element(rows.next().unwrap(), &mut out).unwrap();
    assert_eq!(out.len(), 300);
    assert_eq!(files_in(dir.path()), 1);

    for row in rows {
        op.process_element(row, &mut out).unwrap();
    }
    op.end_input(&mut out).unwrap();
    assert_eq!(out.len(), 421);
    assert_eq!(files_in(dir.path()), 0);
}

#[test]
fn test_output_keeps_input_columns() {
    let dir = tempdir().unwrap();
    let config = OverAggregateConfig::new()
        .with_external_buffer_memory(0)
        .with_spill_dir(dir.path());
    let output = run(&config);
    let input = input();

    assert_eq!(output.len(), input.len());
    for (out, row) in output.iter().zip(input.iter()) {
        assert_eq!(out.len(), TYPES.len() + 9);
        assert_eq!(&out.as_slice()[..TYPES.len()], row.as_slice());
    }

    // LAG(label, 4, 'none') on the sixth row of the first partition
    assert_eq!(output[5][8], Value::text("p0-row-1"));
    assert_eq!(output[3][8], Value::text("none"));
    // Single-row partition: whole-partition MIN is its own amount
    assert_eq!(output[300][10], Value::null(DataType::Integer));
}
