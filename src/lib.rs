//! # bqframe
//!
//! Lazy, immutable, DataFrame-style query composition that compiles to a
//! single SQL statement built from CTEs.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Builder (session)                        │
//! │   alias allocator · view registry · executor · dialect   │
//! └─────────────────────────────────────────────────────────┘
//!                          │ sql / table
//!                          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │          DataFrame → QueryNode DAG (Arc-shared)          │
//! │   select · filter · sort · limit · with_column · union   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compile]
//! ┌─────────────────────────────────────────────────────────┐
//! │        WITH view AS (...), dep AS (...) <fragment>       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [execution]
//! ┌─────────────────────────────────────────────────────────┐
//! │     QueryExecutor → WorkerClient (NDJSON subprocess)     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Compilation never fails and never performs I/O. Only schema resolution,
//! `union_by_name`, `count`, and row collection reach the executor.

pub mod config;
pub mod execution;
pub mod frame;
pub mod sql;
pub mod worker;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::execution::{ExecutionMode, QueryExecutor, QueryResult, Row, WorkerExecutor};
    pub use crate::frame::{Builder, DataFrame, FieldMode, FrameError, FrameResult, SchemaField};
    pub use crate::sql::Dialect;
    pub use crate::worker::{WorkerClient, WorkerError};
}
