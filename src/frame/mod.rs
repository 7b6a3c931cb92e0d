//! Lazy query composition.
//!
//! A [`DataFrame`] is an immutable [`QueryNode`] plus the session it was
//! created from. Composition builds a DAG of nodes; compilation flattens that
//! DAG into a single statement of CTEs:
//!
//! ```text
//! Builder::sql ──► DataFrame ──select/filter/...──► DataFrame ──► compile()
//!                      │                                │
//!                      └──── Dependencies (Arc) ◄───────┘
//!
//! compile() = registry views ++ dependencies (dedup by alias) ++ fragment
//! ```

mod alias;
mod builder;
mod compile;
mod dataframe;
mod deps;
mod error;
mod node;
mod registry;
mod schema;
mod union;

pub use alias::{AliasAllocator, DEFAULT_ALIAS_PREFIX};
pub use builder::Builder;
pub use compile::CteCompiler;
pub use dataframe::DataFrame;
pub use deps::{dedup_key_value, Dependencies};
pub use error::{FrameError, FrameResult};
pub use node::QueryNode;
pub use registry::ViewRegistry;
pub use schema::{column_names, tree_string, FieldMode, SchemaField};
pub use union::ColumnPartition;
