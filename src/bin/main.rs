//! bqframe CLI - compile and run lazily composed SQL
//!
//! Usage:
//!   bqframe compile <query.sql> [--view NAME=FILE]... [--dialect <dialect>]
//!   bqframe schema <query.sql> [--view NAME=FILE]...
//!   bqframe count <query.sql> [--view NAME=FILE]...
//!   bqframe head <query.sql> [-n <rows>] [--view NAME=FILE]...
//!
//! Examples:
//!   bqframe compile report.sql --view pokedex=pokedex.sql
//!   bqframe compile report.sql --dialect duckdb
//!   bqframe head report.sql -n 20
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default: warn).

use bqframe::config::Settings;
use bqframe::execution::{QueryExecutor, WorkerExecutor};
use bqframe::frame::{Builder, DataFrame};
use bqframe::sql::Dialect;
use bqframe::worker::WorkerClient;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "bqframe")]
#[command(about = "bqframe - lazy DataFrame-style queries compiled to SQL with CTEs")]
#[command(version)]
struct Cli {
    /// Path to a bqframe.toml (defaults to the standard lookup)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the compiled SQL of a query file (no worker needed)
    Compile {
        #[command(flatten)]
        query: QueryArgs,

        /// SQL dialect used for quoting (overrides the config file)
        #[arg(short, long)]
        dialect: Option<DialectArg>,
    },

    /// Print the schema of a query as a tree
    Schema {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Print the number of rows a query returns
    Count {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Print the first rows of a query as JSON lines
    Head {
        #[command(flatten)]
        query: QueryArgs,

        /// Number of rows
        #[arg(short = 'n', long, default_value_t = 10)]
        rows: i64,
    },
}

#[derive(Args)]
struct QueryArgs {
    /// Path to the SQL file holding the root query
    file: PathBuf,

    /// Register a view before compiling: NAME=FILE
    #[arg(long = "view", value_name = "NAME=FILE")]
    views: Vec<String>,
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Bigquery,
    Duckdb,
    Postgres,
    Snowflake,
    Tsql,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Bigquery => Dialect::BigQuery,
            DialectArg::Duckdb => Dialect::DuckDb,
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Snowflake => Dialect::Snowflake,
            DialectArg::Tsql => Dialect::TSql,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> CliResult<()> {
    let mut settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Compile { query, dialect } => {
            if let Some(dialect) = dialect {
                settings.compile.dialect = dialect.into();
            }
            let bq = Builder::from_settings(&settings, None);
            let df = load_query(&bq, &query)?;
            println!("{}", df.compile());
        }
        Commands::Schema { query } => {
            let bq = connect(&settings).await?;
            let df = load_query(&bq, &query)?;
            print!("{}", df.tree_string().await?);
        }
        Commands::Count { query } => {
            let bq = connect(&settings).await?;
            let df = load_query(&bq, &query)?;
            println!("{}", df.count().await?);
        }
        Commands::Head { query, rows } => {
            let bq = connect(&settings).await?;
            let df = load_query(&bq, &query)?;
            for row in df.take(rows).await? {
                println!("{}", serde_json::to_string(&row)?);
            }
        }
    }

    Ok(())
}

fn load_settings(path: Option<&Path>) -> CliResult<Settings> {
    let settings = match path {
        Some(path) => Settings::from_file(path)?,
        None => Settings::load()?,
    };
    Ok(settings)
}

async fn connect(settings: &Settings) -> CliResult<Builder> {
    let client = WorkerClient::spawn_with_settings(settings).await?;
    let executor = WorkerExecutor::from_settings(Arc::new(client), settings)?;
    tracing::info!(driver = %executor.driver(), "connected to worker");

    let executor: Arc<dyn QueryExecutor> = Arc::new(executor);
    Ok(Builder::from_settings(settings, Some(executor)))
}

/// Register every `--view` and return the frame of the root query file.
fn load_query(bq: &Builder, args: &QueryArgs) -> CliResult<DataFrame> {
    for view_arg in &args.views {
        let (name, file) = view_arg
            .split_once('=')
            .ok_or_else(|| format!("Invalid --view '{}': expected NAME=FILE", view_arg))?;
        let view = bq.sql(read_sql(Path::new(file))?);
        bq.register_view(name, &view)?;
    }

    Ok(bq.sql(read_sql(&args.file)?))
}

fn read_sql(path: &Path) -> CliResult<String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Error reading file '{}': {}", path.display(), e))?;
    Ok(content.trim_end().trim_end_matches(';').to_string())
}
