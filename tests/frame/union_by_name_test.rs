//! Column reconciliation for union-by-name.

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use bqframe::execution::ExecutionMode;
use bqframe::frame::{Builder, FrameError};
use common::{int_field, RecordingExecutor};

fn executor() -> Arc<RecordingExecutor> {
    Arc::new(
        RecordingExecutor::new()
            .on_schema("l", vec![int_field("a"), int_field("b")])
            .on_schema("r", vec![int_field("b"), int_field("c")])
            .on_schema("swapped", vec![int_field("b"), int_field("a")]),
    )
}

#[tokio::test]
async fn test_missing_columns_are_filled_with_nulls() {
    let exec = executor();
    let bq = Builder::new(exec.clone());
    let left = bq.sql_as("SELECT 1 AS a, 2 AS b", "l").unwrap();
    let right = bq.sql_as("SELECT 3 AS b, 4 AS c", "r").unwrap();

    let union = left.union_by_name(&right, true).await.unwrap();

    assert_eq!(
        union.fragment(),
        "SELECT\n  a,\n  b,\n  NULL AS c\nFROM l\nUNION ALL\nSELECT\n  NULL AS a,\n  b,\n  c\nFROM r"
    );
    assert_eq!(
        union.dependencies().aliases().collect::<Vec<_>>(),
        vec!["l", "r"]
    );
    assert!(union.compile().starts_with("WITH `l` AS (\n  SELECT 1 AS a, 2 AS b\n)\n, `r` AS ("));
}

#[tokio::test]
async fn test_strict_mode_reports_both_column_lists() {
    let bq = Builder::new(executor());
    let left = bq.sql_as("SELECT 1 AS a, 2 AS b", "l").unwrap();
    let right = bq.sql_as("SELECT 3 AS b, 4 AS c", "r").unwrap();

    let err = left.union_by_name(&right, false).await.unwrap_err();

    match &err {
        FrameError::SchemaMismatch { left, right } => {
            assert_eq!(left, &vec!["a".to_string(), "b".to_string()]);
            assert_eq!(right, &vec!["b".to_string(), "c".to_string()]);
        }
        other => panic!("expected SchemaMismatch, got {:?}", other),
    }
    let message = err.to_string();
    assert!(message.contains("Columns in first frame: [a, b]"));
    assert!(message.contains("Columns in second frame: [b, c]"));
}

#[tokio::test]
async fn test_strict_mode_aligns_reordered_columns() {
    let bq = Builder::new(executor());
    let left = bq.sql_as("SELECT 1 AS a, 2 AS b", "l").unwrap();
    let right = bq.sql_as("SELECT 2 AS b, 1 AS a", "swapped").unwrap();

    let union = left.union_by_name(&right, false).await.unwrap();

    assert_eq!(
        union.fragment(),
        "SELECT\n  a,\n  b\nFROM l\nUNION ALL\nSELECT\n  a,\n  b\nFROM swapped"
    );
}

#[tokio::test]
async fn test_schemas_are_resolved_once_per_frame() {
    let exec = executor();
    let bq = Builder::new(exec.clone());
    let left = bq.sql_as("SELECT 1 AS a, 2 AS b", "l").unwrap();
    let right = bq.sql_as("SELECT 3 AS b, 4 AS c", "r").unwrap();

    left.union_by_name(&right, true).await.unwrap();
    left.union_by_name(&right, true).await.unwrap();

    let calls = exec.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|(_, mode)| *mode == ExecutionMode::DryRun));
}

#[tokio::test]
async fn test_frames_from_other_builders_are_rejected() {
    let exec = executor();
    let left = Builder::new(exec.clone())
        .sql_as("SELECT 1 AS a, 2 AS b", "l")
        .unwrap();
    let right = Builder::new(exec.clone())
        .sql_as("SELECT 3 AS b, 4 AS c", "r")
        .unwrap();

    let err = left.union_by_name(&right, true).await.unwrap_err();
    assert!(matches!(err, FrameError::InvalidArgument(_)));
    assert_eq!(exec.call_count(), 0);
}
