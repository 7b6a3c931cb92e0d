//! Column reconciliation for unions resolved by name.

use std::collections::HashSet;

use super::error::{FrameError, FrameResult};
use crate::sql::text::cols_to_lines;

/// Three-way split of two column lists.
///
/// `left_only` and `common` follow the left list's order, `right_only` the
/// right list's order. The unioned shape is `left_only ++ common ++ right_only`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPartition {
    pub left_only: Vec<String>,
    pub common: Vec<String>,
    pub right_only: Vec<String>,
}

impl ColumnPartition {
    pub fn new(left: &[String], right: &[String]) -> Self {
        let left_set: HashSet<&str> = left.iter().map(String::as_str).collect();
        let right_set: HashSet<&str> = right.iter().map(String::as_str).collect();

        let (common, left_only): (Vec<String>, Vec<String>) = left
            .iter()
            .cloned()
            .partition(|col| right_set.contains(col.as_str()));
        let right_only = right
            .iter()
            .filter(|col| !left_set.contains(col.as_str()))
            .cloned()
            .collect();

        Self {
            left_only,
            common,
            right_only,
        }
    }

    /// Partition two column lists, enforcing equal column sets unless
    /// `allow_missing_columns` is set.
    pub fn reconcile(
        left: &[String],
        right: &[String],
        allow_missing_columns: bool,
    ) -> FrameResult<Self> {
        let partition = Self::new(left, right);
        if !partition.is_aligned() && !allow_missing_columns {
            return Err(FrameError::SchemaMismatch {
                left: left.to_vec(),
                right: right.to_vec(),
            });
        }
        Ok(partition)
    }

    /// True when both sides have the same column set.
    pub fn is_aligned(&self) -> bool {
        self.left_only.is_empty() && self.right_only.is_empty()
    }

    /// Column order of the unioned result.
    pub fn output_columns(&self) -> Vec<&str> {
        self.left_only
            .iter()
            .chain(&self.common)
            .chain(&self.right_only)
            .map(String::as_str)
            .collect()
    }

    /// Projection for the left side: its own columns, then NULLs for `right_only`.
    pub fn left_projection(&self) -> Vec<String> {
        self.left_only
            .iter()
            .chain(&self.common)
            .cloned()
            .chain(self.right_only.iter().map(|col| null_as(col)))
            .collect()
    }

    /// Projection for the right side: NULLs for `left_only`, then its own columns.
    pub fn right_projection(&self) -> Vec<String> {
        self.left_only
            .iter()
            .map(|col| null_as(col))
            .chain(self.common.iter().chain(&self.right_only).cloned())
            .collect()
    }

    /// The `UNION ALL` fragment aligning `left_alias` and `right_alias`.
    pub fn union_fragment(&self, left_alias: &str, right_alias: &str) -> FrameResult<String> {
        if self.output_columns().is_empty() {
            return Err(FrameError::invalid(
                "union_by_name requires at least one column",
            ));
        }

        Ok(format!(
            "SELECT\n{}\nFROM {}\nUNION ALL\nSELECT\n{}\nFROM {}",
            cols_to_lines(&self.left_projection(), 2),
            left_alias,
            cols_to_lines(&self.right_projection(), 2),
            right_alias
        ))
    }
}

fn null_as(col: &str) -> String {
    format!("NULL AS {}", col)
}
