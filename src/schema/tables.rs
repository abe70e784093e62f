//! Table catalog for 13jt deliverables
//!
//! Every table whose name starts with [`DEFAULT_TABLE_PREFIX`] mirrors one XML
//! tag of the source document (`origin_dxgcxx` <-> `<dxgcxx>`). Attribute
//! columns are text; the document keeps numbers in whatever format the
//! authoring tool emitted and the importer stores them untouched.

use super::types::*;

/// Prefix shared by every table that mirrors a source XML tag
pub const DEFAULT_TABLE_PREFIX: &str = "origin_";

/// The file-level anchor every imported row hangs off
pub const ANCHOR_TABLE: &str = "source_file";

/// Foreign key column referencing [`ANCHOR_TABLE`]
pub const FILE_ID_FIELD: &str = "file_id";

const FILE_FK: ForeignKey = ForeignKey::new("file_id", "source_file");
const JINGJIBIAO_FK: ForeignKey = ForeignKey::new("jingjibiao_id", "origin_jingjibiao");
const DXGCXX_FK: ForeignKey = ForeignKey::new("dxgcxx_id", "origin_dxgcxx");
const DWGCXX_FK: ForeignKey = ForeignKey::new("dwgcxx_id", "origin_dwgcxx");
const FBXX_FK: ForeignKey = ForeignKey::new("fbxx_id", "origin_fbxx");
const QDXM_FK: ForeignKey = ForeignKey::new("qdxm_id", "origin_qdxm");

// =============================================================================
// Anchor
// =============================================================================

pub static SOURCE_FILE: TableSchema = TableSchema {
    name: "source_file",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("filename", ColumnType::Text),
        Column::new("size", ColumnType::Integer),
        Column::text("extension"),
        Column::required("hash", ColumnType::Text).unique(),
        Column::text("imported_at").default_sql("CURRENT_TIMESTAMP"),
    ],
    foreign_keys: &[],
};

// =============================================================================
// Document root: 经济标
// =============================================================================

pub static JINGJIBIAO: TableSchema = TableSchema {
    name: "origin_jingjibiao",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::new("file_id", ColumnType::Integer),
        Column::text("xmbh"),
        Column::text("xmmc"),
        Column::text("jsdw"),
        Column::text("zbr"),
        Column::text("tbr"),
        Column::text("tbzj"),
        Column::text("jjfs"),
        Column::text("bzrq"),
        Column::text("bb"),
    ],
    foreign_keys: &[FILE_FK],
};

// =============================================================================
// Level 1: bid information and single projects
// =============================================================================

pub static ZBXX: TableSchema = TableSchema {
    name: "origin_zbxx",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::new("file_id", ColumnType::Integer),
        Column::new("jingjibiao_id", ColumnType::Integer),
        Column::text("zbfw"),
        Column::text("jhgq"),
        Column::text("zlyq"),
        Column::text("zbdl"),
        Column::text("lxr"),
        Column::text("lxdh"),
    ],
    foreign_keys: &[FILE_FK, JINGJIBIAO_FK],
};

pub static DXGCXX: TableSchema = TableSchema {
    name: "origin_dxgcxx",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::new("file_id", ColumnType::Integer),
        Column::new("jingjibiao_id", ColumnType::Integer),
        Column::text("dxgcbh"),
        Column::text("dxgcmc"),
        Column::text("je"),
        Column::text("aqwmf"),
        Column::text("gf"),
        Column::text("sj"),
    ],
    foreign_keys: &[FILE_FK, JINGJIBIAO_FK],
};

// =============================================================================
// Level 2: unit projects
// =============================================================================

pub static DWGCXX: TableSchema = TableSchema {
    name: "origin_dwgcxx",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::new("file_id", ColumnType::Integer),
        Column::new("jingjibiao_id", ColumnType::Integer),
        Column::new("dxgcxx_id", ColumnType::Integer),
        Column::text("dwgcbh"),
        Column::text("dwgcmc"),
        Column::text("zylb"),
        Column::text("je"),
        Column::text("aqwmf"),
        Column::text("gf"),
        Column::text("sj"),
    ],
    foreign_keys: &[FILE_FK, JINGJIBIAO_FK, DXGCXX_FK],
};

// =============================================================================
// Level 3: divisions, measures, other items, labour/material/machine summary
// =============================================================================

pub static FBXX: TableSchema = TableSchema {
    name: "origin_fbxx",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::new("file_id", ColumnType::Integer),
        Column::new("jingjibiao_id", ColumnType::Integer),
        Column::new("dxgcxx_id", ColumnType::Integer),
        Column::new("dwgcxx_id", ColumnType::Integer),
        Column::text("fbbm"),
        Column::text("fbmc"),
        Column::text("je"),
        Column::text("zgj"),
    ],
    foreign_keys: &[FILE_FK, JINGJIBIAO_FK, DXGCXX_FK, DWGCXX_FK],
};

pub static CSXM: TableSchema = TableSchema {
    name: "origin_csxm",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::new("file_id", ColumnType::Integer),
        Column::new("jingjibiao_id", ColumnType::Integer),
        Column::new("dxgcxx_id", ColumnType::Integer),
        Column::new("dwgcxx_id", ColumnType::Integer),
        Column::text("xh"),
        Column::text("xmbm"),
        Column::text("mc"),
        Column::text("jsjc"),
        Column::text("fl"),
        Column::text("je"),
    ],
    foreign_keys: &[FILE_FK, JINGJIBIAO_FK, DXGCXX_FK, DWGCXX_FK],
};

pub static QTXM: TableSchema = TableSchema {
    name: "origin_qtxm",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::new("file_id", ColumnType::Integer),
        Column::new("jingjibiao_id", ColumnType::Integer),
        Column::new("dxgcxx_id", ColumnType::Integer),
        Column::new("dwgcxx_id", ColumnType::Integer),
        Column::text("xh"),
        Column::text("mc"),
        Column::text("je"),
        Column::text("bz"),
    ],
    foreign_keys: &[FILE_FK, JINGJIBIAO_FK, DXGCXX_FK, DWGCXX_FK],
};

pub static RCJHZ: TableSchema = TableSchema {
    name: "origin_rcjhz",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::new("file_id", ColumnType::Integer),
        Column::new("jingjibiao_id", ColumnType::Integer),
        Column::new("dxgcxx_id", ColumnType::Integer),
        Column::new("dwgcxx_id", ColumnType::Integer),
        Column::text("rcjbm"),
        Column::text("mc"),
        Column::text("ggxh"),
        Column::text("dw"),
        Column::text("lb"),
        Column::text("sl"),
        Column::text("dj"),
        Column::text("hj"),
    ],
    foreign_keys: &[FILE_FK, JINGJIBIAO_FK, DXGCXX_FK, DWGCXX_FK],
};

// =============================================================================
// Level 4-5: bill items and their quota sub-items
// =============================================================================

pub static QDXM: TableSchema = TableSchema {
    name: "origin_qdxm",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::new("file_id", ColumnType::Integer),
        Column::new("jingjibiao_id", ColumnType::Integer),
        Column::new("dxgcxx_id", ColumnType::Integer),
        Column::new("dwgcxx_id", ColumnType::Integer),
        Column::new("fbxx_id", ColumnType::Integer),
        Column::text("xh"),
        Column::text("xmbm"),
        Column::text("xmmc"),
        Column::text("xmtz"),
        Column::text("jldw"),
        Column::text("gcl"),
        Column::text("zhdj"),
        Column::text("zhhj"),
        Column::text("zgj"),
    ],
    foreign_keys: &[FILE_FK, JINGJIBIAO_FK, DXGCXX_FK, DWGCXX_FK, FBXX_FK],
};

pub static DEZM: TableSchema = TableSchema {
    name: "origin_dezm",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::new("file_id", ColumnType::Integer),
        Column::new("jingjibiao_id", ColumnType::Integer),
        Column::new("dxgcxx_id", ColumnType::Integer),
        Column::new("dwgcxx_id", ColumnType::Integer),
        Column::new("fbxx_id", ColumnType::Integer),
        Column::new("qdxm_id", ColumnType::Integer),
        Column::text("debh"),
        Column::text("demc"),
        Column::text("dw"),
        Column::text("sl"),
        Column::text("dj"),
        Column::text("hj"),
    ],
    foreign_keys: &[FILE_FK, JINGJIBIAO_FK, DXGCXX_FK, DWGCXX_FK, FBXX_FK, QDXM_FK],
};

// =============================================================================
// Downstream tables (owned by the classification service, not imported)
// =============================================================================

pub static CLASSIFY_RESULT: TableSchema = TableSchema {
    name: "classify_result",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("qdxm_id", ColumnType::Integer),
        Column::text("category"),
        Column::text("confidence"),
    ],
    foreign_keys: &[QDXM_FK],
};

/// Every table known to the persistence layer, in dependency order
pub static ALL_TABLES: &[&TableSchema] = &[
    &SOURCE_FILE,
    &JINGJIBIAO,
    &ZBXX,
    &DXGCXX,
    &DWGCXX,
    &FBXX,
    &CSXM,
    &QTXM,
    &RCJHZ,
    &QDXM,
    &DEZM,
    &CLASSIFY_RESULT,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_keys_reference_known_tables() {
        for table in ALL_TABLES {
            for fk in table.foreign_keys {
                assert!(
                    ALL_TABLES.iter().any(|t| t.name == fk.references_table),
                    "{}.{} references unknown table {}",
                    table.name,
                    fk.column,
                    fk.references_table
                );
                assert!(
                    table.column(fk.column).is_some(),
                    "{} has no column {}",
                    table.name,
                    fk.column
                );
            }
        }
    }

    #[test]
    fn test_table_names_are_unique() {
        let mut names: Vec<_> = ALL_TABLES.iter().map(|t| t.name).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
