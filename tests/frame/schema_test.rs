//! Schema resolution, row counting, and collection through an executor.

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use bqframe::execution::{ExecutionMode, QueryResult};
use bqframe::frame::{Builder, FieldMode, FrameError, SchemaField};
use bqframe::worker::WorkerError;
use common::{int_field, string_field, RecordingExecutor};
use serde_json::json;

fn pokemon_schema() -> Vec<SchemaField> {
    vec![
        int_field("id"),
        string_field("name"),
        SchemaField::new("stats", "RECORD").with_fields(vec![
            int_field("hp").with_mode(FieldMode::Required),
            int_field("attack"),
        ]),
        string_field("types").with_mode(FieldMode::Repeated),
    ]
}

#[tokio::test]
async fn test_schema_is_cached_after_one_dry_run() {
    let exec = Arc::new(RecordingExecutor::new().on_schema("pokedex", pokemon_schema()));
    let bq = Builder::new(exec.clone());
    let df = bq.sql_as("SELECT * FROM source", "pokedex").unwrap();

    let (first, second) = tokio::join!(df.schema(), df.schema());
    assert_eq!(first.unwrap(), pokemon_schema().as_slice());
    assert_eq!(second.unwrap().len(), 4);
    df.schema().await.unwrap();

    let calls = exec.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, ExecutionMode::DryRun);
    assert!(calls[0].0.ends_with("SELECT * FROM pokedex LIMIT 0"));
    assert_eq!(df.node().cached_schema().map(<[SchemaField]>::len), Some(4));
}

#[tokio::test]
async fn test_columns_are_top_level_names() {
    let exec = Arc::new(RecordingExecutor::new().on_schema("pokedex", pokemon_schema()));
    let bq = Builder::new(exec);
    let df = bq.sql_as("SELECT * FROM source", "pokedex").unwrap();

    assert_eq!(df.columns().await.unwrap(), vec!["id", "name", "stats", "types"]);
}

#[tokio::test]
async fn test_tree_string() {
    let exec = Arc::new(RecordingExecutor::new().on_schema("pokedex", pokemon_schema()));
    let bq = Builder::new(exec);
    let df = bq.sql_as("SELECT * FROM source", "pokedex").unwrap();

    assert_eq!(
        df.tree_string().await.unwrap(),
        "root\n \
         |-- id: INTEGER (NULLABLE)\n \
         |-- name: STRING (NULLABLE)\n \
         |-- stats: RECORD (NULLABLE)\n \
         |    |-- hp: INTEGER (REQUIRED)\n \
         |    |-- attack: INTEGER (NULLABLE)\n \
         |-- types: STRING (REPEATED)\n"
    );
}

#[tokio::test]
async fn test_alias_as_reuses_cached_schema() {
    let exec = Arc::new(RecordingExecutor::new().on_schema("pokedex", pokemon_schema()));
    let bq = Builder::new(exec.clone());
    let df = bq.sql_as("SELECT * FROM source", "pokedex").unwrap();
    df.schema().await.unwrap();

    let renamed = df.alias_as("pokemon").unwrap();
    assert_eq!(renamed.columns().await.unwrap().len(), 4);
    assert_eq!(exec.call_count(), 1);
}

#[tokio::test]
async fn test_execution_errors_pass_through() {
    let exec = Arc::new(RecordingExecutor::failing("Table not found: source"));
    let bq = Builder::new(exec.clone());
    let df = bq.sql("SELECT * FROM source");

    let err = df.schema().await.unwrap_err();
    match &err {
        FrameError::Execution { query, source } => {
            assert!(query.ends_with("LIMIT 0"));
            assert!(matches!(source, WorkerError::InvalidQuery(m) if m == "Table not found: source"));
        }
        other => panic!("expected Execution, got {:?}", other),
    }
    assert!(err.is_execution());

    // failures are not cached
    assert!(df.schema().await.is_err());
    assert_eq!(exec.call_count(), 2);
}

#[tokio::test]
async fn test_count() {
    let exec = Arc::new(RecordingExecutor::new().on(
        "SELECT COUNT(1) FROM pokedex",
        QueryResult::new(vec![int_field("f0_")], vec![vec![json!("151")]]),
    ));
    let bq = Builder::new(exec.clone());
    let df = bq.sql_as("SELECT * FROM source", "pokedex").unwrap();

    assert_eq!(df.count().await.unwrap(), 151);
    assert_eq!(exec.calls()[0].1, ExecutionMode::Materialize);
}

#[tokio::test]
async fn test_count_without_rows_is_unexpected() {
    let exec = Arc::new(RecordingExecutor::new().on(
        "SELECT COUNT(1) FROM pokedex",
        QueryResult::shape(vec![int_field("f0_")]),
    ));
    let bq = Builder::new(exec);
    let df = bq.sql_as("SELECT * FROM source", "pokedex").unwrap();

    assert!(matches!(
        df.count().await,
        Err(FrameError::UnexpectedResult(_))
    ));
}

#[tokio::test]
async fn test_collect_and_take() {
    let rows = vec![vec![json!(1), json!("Bulbasaur")], vec![json!(2), json!("Ivysaur")]];
    let exec = Arc::new(
        RecordingExecutor::new()
            .on(
                "LIMIT 1",
                QueryResult::new(vec![int_field("id")], rows[..1].to_vec()),
            )
            .on(
                "SELECT 1 AS id",
                QueryResult::new(vec![int_field("id")], rows.clone()),
            ),
    );
    let bq = Builder::new(exec.clone());
    let df = bq.sql("SELECT 1 AS id");

    assert_eq!(df.collect().await.unwrap(), rows);
    assert_eq!(df.take(1).await.unwrap(), rows[..1].to_vec());
    assert!(matches!(
        df.take(-1).await,
        Err(FrameError::InvalidArgument(_))
    ));
    assert_eq!(exec.call_count(), 2);
}

#[tokio::test]
async fn test_offline_builder_is_disconnected() {
    let bq = Builder::offline();
    let df = bq.sql("SELECT 1 AS id");

    assert!(matches!(df.schema().await, Err(FrameError::Disconnected)));
    assert!(matches!(df.count().await, Err(FrameError::Disconnected)));
    assert!(matches!(df.collect().await, Err(FrameError::Disconnected)));
}
