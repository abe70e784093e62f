use std::collections::HashSet;

/// Column data type
///
/// Source attributes are stored verbatim as text; only surrogate keys,
/// foreign keys and file metadata are integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Text,
}

/// Column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
    pub nullable: bool,
    pub unique: bool,
    /// SQL default expression, e.g. `CURRENT_TIMESTAMP`
    pub default: Option<&'static str>,
}

impl Column {
    /// Create an optional (nullable) column
    pub const fn new(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: true,
            unique: false,
            default: None,
        }
    }

    /// Create an optional text column
    pub const fn text(name: &'static str) -> Self {
        Self::new(name, ColumnType::Text)
    }

    /// Create a required (non-nullable) column
    pub const fn required(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: false,
            unique: false,
            default: None,
        }
    }

    /// Add a UNIQUE constraint
    pub const fn unique(self) -> Self {
        Self {
            unique: true,
            ..self
        }
    }

    /// Set the SQL default expression
    pub const fn default_sql(self, expr: &'static str) -> Self {
        Self {
            default: Some(expr),
            ..self
        }
    }
}

/// Foreign key reference
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references_table: &'static str,
    pub references_column: &'static str,
}

impl ForeignKey {
    pub const fn new(column: &'static str, references_table: &'static str) -> Self {
        Self {
            column,
            references_table,
            references_column: "id",
        }
    }
}

/// Table schema definition
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub foreign_keys: &'static [ForeignKey],
}

impl TableSchema {
    /// Get all tables this table depends on (FK parents)
    pub fn dependencies(&self) -> HashSet<&'static str> {
        self.foreign_keys
            .iter()
            .map(|fk| fk.references_table)
            .collect()
    }

    /// Whether `column` is the source of one of this table's foreign keys
    pub fn is_foreign_key(&self, column: &str) -> bool {
        self.foreign_keys.iter().any(|fk| fk.column == column)
    }

    /// Columns that can be filled from element attributes: everything except
    /// the surrogate key and foreign keys.
    pub fn data_columns(&self) -> impl Iterator<Item = &'static Column> + '_ {
        self.columns
            .iter()
            .filter(move |c| c.name != "id" && !self.is_foreign_key(c.name))
    }

    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::{DWGCXX, SOURCE_FILE};

    #[test]
    fn test_dependencies_follow_foreign_keys() {
        let deps = DWGCXX.dependencies();
        assert!(deps.contains("source_file"));
        assert!(deps.contains("origin_jingjibiao"));
        assert!(deps.contains("origin_dxgcxx"));
        assert!(SOURCE_FILE.dependencies().is_empty());
    }

    #[test]
    fn test_data_columns_skip_keys() {
        let names: Vec<_> = DWGCXX.data_columns().map(|c| c.name).collect();
        assert!(names.contains(&"dwgcmc"));
        assert!(!names.contains(&"id"));
        assert!(!names.contains(&"file_id"));
        assert!(!names.contains(&"dxgcxx_id"));
    }
}
