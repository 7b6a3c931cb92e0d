//! Result shapes reported by the execution collaborator.

use serde::{Deserialize, Serialize};

/// Nullability / repetition of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldMode {
    #[default]
    Nullable,
    Required,
    Repeated,
}

impl FieldMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldMode::Nullable => "NULLABLE",
            FieldMode::Required => "REQUIRED",
            FieldMode::Repeated => "REPEATED",
        }
    }
}

/// One column of a result shape. Record columns carry their nested fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    /// Warehouse type tag (e.g. `INTEGER`, `STRING`, `RECORD`).
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub mode: FieldMode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<SchemaField>,
}

impl SchemaField {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            mode: FieldMode::Nullable,
            fields: Vec::new(),
        }
    }

    pub fn with_mode(mut self, mode: FieldMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_fields(mut self, fields: Vec<SchemaField>) -> Self {
        self.fields = fields;
        self
    }

    pub fn is_nullable(&self) -> bool {
        self.mode == FieldMode::Nullable
    }

    pub fn is_repeated(&self) -> bool {
        self.mode == FieldMode::Repeated
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.field_type.as_str(), "RECORD" | "STRUCT")
    }
}

/// Top-level field names, in order.
pub fn column_names(schema: &[SchemaField]) -> Vec<String> {
    schema.iter().map(|f| f.name.clone()).collect()
}

/// Render a schema as an indented tree.
///
/// ```text
/// root
///  |-- id: INTEGER (NULLABLE)
///  |-- s: RECORD (NULLABLE)
///  |    |-- a: INTEGER (NULLABLE)
/// ```
pub fn tree_string(schema: &[SchemaField]) -> String {
    let mut lines = vec!["root".to_string()];
    push_fields(schema, " |-- ", &mut lines);
    lines.join("\n") + "\n"
}

fn push_fields(fields: &[SchemaField], prefix: &str, lines: &mut Vec<String>) {
    for field in fields {
        lines.push(format!(
            "{}{}: {} ({})",
            prefix,
            field.name,
            field.field_type,
            field.mode.as_str()
        ));
        if field.is_struct() {
            push_fields(&field.fields, &format!(" |   {}", prefix), lines);
        }
    }
}
