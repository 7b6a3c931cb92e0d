//! Compilation of composed frames into a single CTE statement.

use bqframe::frame::Builder;
use bqframe::sql::Dialect;
use sqlparser::dialect::{BigQueryDialect, DuckDbDialect, PostgreSqlDialect, SnowflakeDialect};
use sqlparser::parser::Parser;

fn assert_parses_bigquery(sql: &str) {
    Parser::parse_sql(&BigQueryDialect {}, sql)
        .unwrap_or_else(|e| panic!("invalid BigQuery SQL: {}\n{}", e, sql));
}

#[test]
fn test_root_frame_compiles_verbatim() {
    let bq = Builder::offline();
    let df = bq.sql("SELECT 1 AS id");
    assert_eq!(df.compile(), "SELECT 1 AS id");
}

#[test]
fn test_select_then_filter() {
    let bq = Builder::offline();
    let df = bq
        .sql("SELECT 1 AS id, 'Bulbasaur' AS name")
        .select(["id", "name"])
        .unwrap()
        .filter("id > 0");

    let sql = df.compile();
    insta::assert_snapshot!(sql, @r"
WITH `_default_alias_1` AS (
  SELECT 1 AS id, 'Bulbasaur' AS name
)
, `_default_alias_2` AS (
  SELECT
    id,
    name
  FROM _default_alias_1
)
SELECT *
FROM _default_alias_2
WHERE id > 0
");
    assert_parses_bigquery(&sql);
}

#[test]
fn test_compile_is_idempotent() {
    let bq = Builder::offline();
    let df = bq.sql("SELECT 1 AS id").filter("id > 0").limit(3).unwrap();
    assert_eq!(df.compile(), df.compile());
}

#[test]
fn test_registering_a_view_changes_existing_frames() {
    let bq = Builder::offline();
    let df = bq.sql("SELECT * FROM pokedex");
    assert_eq!(df.compile(), "SELECT * FROM pokedex");

    let pokedex = bq.sql("SELECT 1 AS id");
    bq.register_view("pokedex", &pokedex).unwrap();

    assert_eq!(
        df.compile(),
        "WITH `pokedex` AS (\n  SELECT 1 AS id\n)\nSELECT * FROM pokedex"
    );
}

#[test]
fn test_view_body_carries_its_own_dependencies() {
    let bq = Builder::offline();
    let view = bq.sql("SELECT 1 AS id").filter("id > 0");
    view.create_temp_view("positive").unwrap();

    let df = bq.sql("SELECT * FROM positive").limit(1).unwrap();
    let sql = df.compile();

    assert_eq!(
        sql,
        "WITH `positive` AS (\n  WITH `_default_alias_1` AS (\n    SELECT 1 AS id\n  )\n  SELECT *\n  FROM _default_alias_1\n  WHERE id > 0\n)\n, `_default_alias_3` AS (\n  SELECT * FROM positive\n)\nSELECT * FROM _default_alias_3 LIMIT 1"
    );
    assert_parses_bigquery(&sql);
}

#[test]
fn test_views_compile_in_registration_order() {
    let bq = Builder::offline();
    bq.register_view("first", &bq.sql("SELECT 1 AS id")).unwrap();
    bq.register_view("second", &bq.sql("SELECT 2 AS id")).unwrap();

    let sql = bq.sql("SELECT * FROM first UNION ALL SELECT * FROM second").compile();
    let first = sql.find("`first` AS").unwrap();
    let second = sql.find("`second` AS").unwrap();
    assert!(first < second);
    assert_eq!(bq.views(), vec!["first", "second"]);
}

#[test]
fn test_diamond_emits_shared_dependency_once() {
    let bq = Builder::offline();
    let base = bq.sql("SELECT 1 AS id");
    let low = base.filter("id < 10");
    let high = base.filter("id > 0");
    let both = low.union(&high).unwrap();

    assert_eq!(
        both.dependencies().aliases().collect::<Vec<_>>(),
        vec!["_default_alias_1", "_default_alias_2", "_default_alias_3"]
    );

    let sql = both.compile();
    assert_eq!(sql.matches("`_default_alias_1` AS (").count(), 1);
    assert!(sql.ends_with("SELECT * FROM _default_alias_2 UNION ALL SELECT * FROM _default_alias_3"));
    assert_parses_bigquery(&sql);
}

#[test]
fn test_repeated_alias_keeps_first_position() {
    let bq = Builder::offline();
    let t1 = bq.sql_as("SELECT 1 AS id", "t1").unwrap();
    let other = bq.sql("SELECT 2 AS id");
    let joined = other.union(&t1).unwrap().union(&t1).unwrap();

    assert_eq!(
        joined.dependencies().aliases().collect::<Vec<_>>(),
        vec!["_default_alias_1", "t1", "_default_alias_2"]
    );
}

#[test]
fn test_postgres_session_quotes_tables_but_not_ctes() {
    let pg = Builder::offline_with_dialect(Dialect::Postgres);
    let df = pg.table("public.users").select(["id"]).unwrap();
    let sql = df.compile();

    assert!(sql.starts_with("WITH _default_alias_1 AS (\n  SELECT * FROM \"public\".\"users\"\n)"));
    assert!(sql.ends_with("FROM _default_alias_1"));
    Parser::parse_sql(&PostgreSqlDialect {}, &sql).unwrap();
}

#[test]
fn test_snowflake_cte_names_match_their_references() {
    let sf = Builder::offline_with_dialect(Dialect::Snowflake);
    let df = sf.sql("SELECT 1 AS id").filter("id > 0");
    let sql = df.compile();

    assert_eq!(
        sql,
        "WITH _default_alias_1 AS (\n  SELECT 1 AS id\n)\nSELECT *\nFROM _default_alias_1\nWHERE id > 0"
    );
    Parser::parse_sql(&SnowflakeDialect {}, &sql).unwrap();
}

#[test]
fn test_postgres_mixed_case_aliases_are_defined_bare() {
    let pg = Builder::offline_with_dialect(Dialect::Postgres);
    let trainers = pg.sql("SELECT 7 AS trainer_id");
    pg.register_view("Trainers", &trainers).unwrap();

    let df = pg
        .sql_as("SELECT 1 AS id FROM Trainers", "Pokedex")
        .unwrap()
        .filter("id > 0");
    let sql = df.compile();

    assert_eq!(
        sql,
        "WITH Trainers AS (\n  SELECT 7 AS trainer_id\n)\n, Pokedex AS (\n  SELECT 1 AS id FROM Trainers\n)\nSELECT *\nFROM Pokedex\nWHERE id > 0"
    );
    assert!(!sql.contains('"'));
    Parser::parse_sql(&PostgreSqlDialect {}, &sql).unwrap();
}

#[test]
fn test_duckdb_keeps_quoted_cte_names() {
    let duck = Builder::offline_with_dialect(Dialect::DuckDb);
    let df = duck.sql_as("SELECT 1 AS id", "Pokedex").unwrap().limit(1).unwrap();
    let sql = df.compile();

    assert!(sql.starts_with("WITH \"Pokedex\" AS ("));
    assert!(sql.ends_with("SELECT * FROM Pokedex LIMIT 1"));
    Parser::parse_sql(&DuckDbDialect {}, &sql).unwrap();
}

#[test]
fn test_with_column_replace_compiles_for_bigquery() {
    let bq = Builder::offline();
    let df = bq
        .sql("SELECT 1 AS id, 'a' AS name")
        .with_column("name", "UPPER(name)", true)
        .with_column("id2", "id * 2", false);

    assert_parses_bigquery(&df.compile());
}
