//! SQL dialect identifier quoting.
//!
//! Fragments supplied by callers are passed through untouched, so the only
//! dialect-specific text this crate emits is identifiers: CTE names in the
//! `WITH` clause and table references created by [`Builder::table`].
//!
//! - BigQuery: `` `identifier` ``
//! - DuckDB/PostgreSQL/Snowflake: `"identifier"`
//! - T-SQL: `[identifier]`
//!
//! Fragments always reference CTEs by their bare alias. PostgreSQL folds a
//! bare name to lower case and Snowflake to upper case, while a quoted name
//! keeps its case, so in those two dialects CTE names are emitted bare as
//! well (see [`Dialect::cte_name`]).
//!
//! [`Builder::table`]: crate::frame::Builder::table

use serde::{Deserialize, Serialize};

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    BigQuery,
    DuckDb,
    Postgres,
    Snowflake,
    TSql,
}

impl Dialect {
    /// Dialect name for display/logging.
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::BigQuery => "bigquery",
            Dialect::DuckDb => "duckdb",
            Dialect::Postgres => "postgres",
            Dialect::Snowflake => "snowflake",
            Dialect::TSql => "tsql",
        }
    }

    /// Quote a single identifier, escaping embedded closing quotes.
    pub fn quote_identifier(&self, ident: &str) -> String {
        match self {
            Dialect::BigQuery => quote_backtick(ident),
            Dialect::DuckDb | Dialect::Postgres | Dialect::Snowflake => quote_double(ident),
            Dialect::TSql => quote_bracket(ident),
        }
    }

    /// True when unquoted identifiers are case-folded before lookup.
    pub fn folds_unquoted_case(&self) -> bool {
        matches!(self, Dialect::Postgres | Dialect::Snowflake)
    }

    /// Name of a CTE in a `WITH` clause, matching how a bare `FROM alias`
    /// reference resolves in this dialect.
    ///
    /// ```
    /// use bqframe::sql::Dialect;
    ///
    /// assert_eq!(Dialect::BigQuery.cte_name("t1"), "`t1`");
    /// assert_eq!(Dialect::Snowflake.cte_name("t1"), "t1");
    /// ```
    pub fn cte_name(&self, alias: &str) -> String {
        if self.folds_unquoted_case() {
            alias.to_string()
        } else {
            self.quote_identifier(alias)
        }
    }

    /// Quote a dotted path such as `project.dataset.table`, one part at a time.
    ///
    /// Already-quoted input is accepted and re-quoted, so the operation is
    /// idempotent. A `*` part is left bare.
    ///
    /// ```
    /// use bqframe::sql::Dialect;
    ///
    /// assert_eq!(Dialect::BigQuery.quote_path("column.name"), "`column`.`name`");
    /// assert_eq!(Dialect::BigQuery.quote_path("`table`"), "`table`");
    /// assert_eq!(Dialect::BigQuery.quote_path("t.*"), "`t`.*");
    /// ```
    pub fn quote_path(&self, path: &str) -> String {
        let stripped: String = path
            .chars()
            .filter(|c| !self.quote_chars().contains(c))
            .collect();

        stripped
            .split('.')
            .map(|part| {
                if part == "*" {
                    part.to_string()
                } else {
                    self.quote_identifier(part)
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    fn quote_chars(&self) -> &'static [char] {
        match self {
            Dialect::BigQuery => &['`'],
            Dialect::DuckDb | Dialect::Postgres | Dialect::Snowflake => &['"'],
            Dialect::TSql => &['[', ']'],
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bigquery" | "bq" => Ok(Dialect::BigQuery),
            "duckdb" | "duck" => Ok(Dialect::DuckDb),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "snowflake" => Ok(Dialect::Snowflake),
            "tsql" | "mssql" | "sqlserver" => Ok(Dialect::TSql),
            other => Err(format!("unsupported dialect: {}", other)),
        }
    }
}

/// Quote identifier with double quotes.
/// Used by: ANSI, PostgreSQL, DuckDB, Snowflake
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with backticks.
/// Used by: BigQuery
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Quote identifier with square brackets.
/// Used by: T-SQL
pub fn quote_bracket(ident: &str) -> String {
    format!("[{}]", ident.replace(']', "]]"))
}
