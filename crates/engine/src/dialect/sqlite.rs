//! SQLite dialect.

use super::types::SQLITE_TYPES;
use super::{CatalogQuery, SqlDialect, TypeTable};
use tablewright_core::Dialect;

/// SQLite dialect implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn type_table(&self) -> &'static TypeTable {
        &SQLITE_TYPES
    }

    fn quote_ident(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn primary_key_definition(&self) -> &'static str {
        "integer primary key autoincrement"
    }

    fn table_exists_query(&self, table: &str) -> CatalogQuery {
        CatalogQuery::new(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            vec![table.to_string()],
        )
    }

    fn index_exists_query(&self, table: &str, index: &str) -> CatalogQuery {
        CatalogQuery::new(
            "SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = ?1 AND name = ?2",
            vec![table.to_string(), index.to_string()],
        )
    }

    fn columns_query(&self, table: &str) -> CatalogQuery {
        CatalogQuery::new(
            "SELECT name FROM pragma_table_info(?1)",
            vec![table.to_string()],
        )
    }

    fn supports_index_if_not_exists(&self) -> bool {
        true
    }

    // "Cannot add a column with non-constant default"
    fn supports_non_constant_add_column_default(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_key() {
        assert_eq!(
            SqliteDialect.primary_key_definition(),
            "integer primary key autoincrement"
        );
    }

    #[test]
    fn test_columns_query_uses_pragma() {
        let q = SqliteDialect.columns_query("posts");
        assert!(q.sql.contains("pragma_table_info"));
        assert_eq!(q.params, vec!["posts"]);
    }
}
