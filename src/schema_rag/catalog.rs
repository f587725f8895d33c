//! Table descriptions and their text rendering.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub is_primary_key: bool,
    pub is_nullable: bool,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_primary_key: false,
            is_nullable: true,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.is_nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub column: String,
    pub foreign_table: String,
    pub foreign_column: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableInfo {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnInfo>) -> Self {
        Self {
            name: name.into(),
            columns,
            foreign_keys: Vec::new(),
        }
    }

    pub fn with_foreign_key(
        mut self,
        column: impl Into<String>,
        foreign_table: impl Into<String>,
        foreign_column: impl Into<String>,
    ) -> Self {
        self.foreign_keys.push(ForeignKey {
            column: column.into(),
            foreign_table: foreign_table.into(),
            foreign_column: foreign_column.into(),
        });
        self
    }

    pub fn to_context(&self) -> String {
        let mut lines = vec![format!("Table: {}", self.name), "Columns:".to_string()];
        for col in &self.columns {
            let mut line = format!("  - {} ({})", col.name, col.data_type);
            if col.is_primary_key {
                line.push_str(" [PRIMARY KEY]");
            }
            if !col.is_nullable {
                line.push_str(" [NOT NULL]");
            }
            lines.push(line);
        }
        if !self.foreign_keys.is_empty() {
            lines.push("Foreign Keys:".to_string());
            for fk in &self.foreign_keys {
                lines.push(format!("  - {} -> {}.{}", fk.column, fk.foreign_table, fk.foreign_column));
            }
        }
        lines.join("\n")
    }
}

/// Tables separated by a blank line.
pub fn format_tables<'a>(tables: impl Iterator<Item = &'a TableInfo>) -> String {
    tables.map(TableInfo::to_context).collect::<Vec<_>>().join("\n\n")
}
