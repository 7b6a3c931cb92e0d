//! Query execution boundary.
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │  DataFrame::schema / count / collect          │
//! └───────────────────────────────────────────────┘
//!                       │ compiled SQL + mode
//!                       ▼
//! ┌───────────────────────────────────────────────┐
//! │  QueryExecutor (trait)                        │
//! │   - WorkerExecutor: NDJSON query worker       │
//! │   - any test double                           │
//! └───────────────────────────────────────────────┘
//! ```

mod executor;
mod worker_executor;

pub use executor::{ExecutionMode, QueryExecutor, QueryResult, Row};
pub use worker_executor::WorkerExecutor;
