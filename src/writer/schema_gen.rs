use crate::schema::{ColumnType, TableSchema};

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (\n", schema.name);
    let mut columns = Vec::new();

    for col in schema.columns {
        let sql_type = match col.col_type {
            ColumnType::Integer => "INTEGER",
            ColumnType::Text => "TEXT",
        };

        let pk = if col.name == "id" {
            " PRIMARY KEY AUTOINCREMENT"
        } else {
            ""
        };
        let null_constraint = if !col.nullable && col.name != "id" {
            " NOT NULL"
        } else {
            ""
        };
        let unique = if col.unique { " UNIQUE" } else { "" };
        let default = col
            .default
            .map(|expr| format!(" DEFAULT {}", expr))
            .unwrap_or_default();

        columns.push(format!(
            "    {} {}{}{}{}{}",
            col.name, sql_type, pk, null_constraint, unique, default
        ));
    }

    // Add foreign key constraints
    for fk in schema.foreign_keys {
        columns.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {}({})",
            fk.column, fk.references_table, fk.references_column
        ));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for foreign key columns
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    schema
        .foreign_keys
        .iter()
        .map(|fk| {
            format!(
                "CREATE INDEX IF NOT EXISTS idx_{}_{} ON {}({})",
                schema.name, fk.column, schema.name, fk.column
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::{DXGCXX, SOURCE_FILE};

    #[test]
    fn test_generate_create_table() {
        let sql = generate_create_table(&DXGCXX);
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS origin_dxgcxx"));
        assert!(sql.contains("id INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(sql.contains("dxgcmc TEXT"));
        assert!(sql.contains("FOREIGN KEY (file_id) REFERENCES source_file(id)"));
        assert!(sql.contains("FOREIGN KEY (jingjibiao_id) REFERENCES origin_jingjibiao(id)"));
    }

    #[test]
    fn test_source_file_hash_is_unique() {
        let sql = generate_create_table(&SOURCE_FILE);
        assert!(sql.contains("hash TEXT NOT NULL UNIQUE"));
        assert!(sql.contains("imported_at TEXT DEFAULT CURRENT_TIMESTAMP"));
    }

    #[test]
    fn test_generate_indexes() {
        let indexes = generate_indexes(&DXGCXX);
        assert!(indexes.iter().any(|i| i.contains("idx_origin_dxgcxx_jingjibiao_id")));
        assert!(generate_indexes(&SOURCE_FILE).is_empty());
    }
}
