//! MySQL/MariaDB dialect.

use super::types::MYSQL_TYPES;
use super::{CatalogQuery, SqlDialect, TypeTable};
use tablewright_core::Dialect;

/// MySQL/MariaDB dialect implementation.
///
/// MySQL has no `CREATE INDEX IF NOT EXISTS`; index creation relies on the
/// catalog check alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlDialect;

impl SqlDialect for MysqlDialect {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn type_table(&self) -> &'static TypeTable {
        &MYSQL_TYPES
    }

    fn quote_ident(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn primary_key_definition(&self) -> &'static str {
        "bigint unsigned auto_increment primary key"
    }

    fn table_exists_query(&self, table: &str) -> CatalogQuery {
        CatalogQuery::new(
            "SELECT TABLE_NAME FROM information_schema.TABLES \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?",
            vec![table.to_string()],
        )
    }

    fn index_exists_query(&self, table: &str, index: &str) -> CatalogQuery {
        CatalogQuery::new(
            "SELECT DISTINCT INDEX_NAME FROM information_schema.STATISTICS \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND INDEX_NAME = ?",
            vec![table.to_string(), index.to_string()],
        )
    }

    fn columns_query(&self, table: &str) -> CatalogQuery {
        CatalogQuery::new(
            "SELECT COLUMN_NAME FROM information_schema.COLUMNS \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
             ORDER BY ORDINAL_POSITION",
            vec![table.to_string()],
        )
    }

    fn supports_index_if_not_exists(&self) -> bool {
        false
    }

    fn max_identifier_length(&self) -> Option<usize> {
        Some(64)
    }
}
